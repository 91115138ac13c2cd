use std::io::{self, BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::{env, thread};

use anyhow::{Context, Result};
use bulk_engine_rs::{Interpreter, Logger, SessionState, Settings, setup_logging};

fn main() -> Result<()> {
    setup_logging()?;

    let (port, settings) = parse_args()?;
    let interpreter = Arc::new(Interpreter::new("inrpr", settings, Logger::stderr())?);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!(port, "bulk server listening");

    {
        let interpreter = Arc::clone(&interpreter);
        thread::spawn(move || accept_loop(listener, interpreter));
    }

    // closing stdin shuts the server down
    wait_for_stdin_eof();
    interpreter.stop_and_report();
    Ok(())
}

fn parse_args() -> Result<(u16, Settings)> {
    const USAGE: &str = "Usage: bulk_server <port> <block_size> [<nthreads>]";

    let mut args = env::args().skip(1);
    let port = args
        .next()
        .ok_or_else(|| anyhow::anyhow!(USAGE))?
        .parse()
        .context("invalid port")?;
    let block_size = args
        .next()
        .ok_or_else(|| anyhow::anyhow!(USAGE))?
        .parse()
        .context("invalid block size")?;

    let mut settings = Settings::new(block_size);
    if let Some(raw) = args.next() {
        settings.file_workers = raw.parse().context("invalid thread count")?;
    }

    Ok((port, settings))
}

fn accept_loop(listener: TcpListener, interpreter: Arc<Interpreter>) {
    for connection in listener.incoming() {
        match connection {
            Ok(stream) => {
                let interpreter = Arc::clone(&interpreter);
                thread::spawn(move || serve_connection(stream, interpreter));
            }
            Err(error) => tracing::warn!(%error, "accept failed"),
        }
    }
}

/// One stream per connection: the connection thread owns the session state
/// and threads it through every consume call. A line without a trailing
/// newline at EOF is still consumed, and EOF flushes the trailing partial
/// block.
fn serve_connection(stream: TcpStream, interpreter: Arc<Interpreter>) {
    let peer = stream.peer_addr().ok();
    tracing::debug!(?peer, "connection opened");

    let mut state = SessionState::default();
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) => state = interpreter.consume(&line, state),
            Err(error) => {
                tracing::warn!(%error, ?peer, "read failed");
                break;
            }
        }
    }
    interpreter.close_stream(state);

    tracing::debug!(?peer, "connection closed");
}

fn wait_for_stdin_eof() {
    let stdin = io::stdin();
    let mut discard = String::new();
    loop {
        discard.clear();
        match stdin.read_line(&mut discard) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }
}
