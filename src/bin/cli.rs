//! LX200 CLI Client
//!
//! Sends one command to a running bridge and prints the reply.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use lx200bridge::protocol::{Command, PROBE_BYTE, TERMINATOR};

/// LX200 CLI
#[derive(Parser, Debug)]
#[command(name = "lx200-cli")]
#[command(about = "Send LX200 commands to a bridge")]
struct Args {
    /// Bridge address
    #[arg(short, long, default_value = "127.0.0.1:4030")]
    server: String,

    /// How long to wait for a reply in milliseconds
    #[arg(short, long, default_value = "3000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a framed command, e.g. ":GVP#"
    Send {
        /// The command, markers included
        command: String,
    },

    /// Send the 0x06 capability probe
    Probe,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(reply) if reply.is_empty() => {
            println!("(no reply)");
            ExitCode::SUCCESS
        }
        Ok(reply) => {
            println!("{}", String::from_utf8_lossy(&reply));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> lx200bridge::Result<Vec<u8>> {
    let (request, single_byte) = match &args.command {
        Commands::Send { command } => {
            let command = Command::parse(command.clone().into_bytes())?;
            (command.as_bytes().to_vec(), false)
        }
        Commands::Probe => (vec![PROBE_BYTE], true),
    };

    let mut stream = TcpStream::connect(&args.server)?;
    stream.set_nodelay(true)?;
    stream.write_all(&request)?;

    // Read until '#', a single probe answer, or the timeout
    let deadline = Instant::now() + Duration::from_millis(args.timeout_ms);
    let mut reply = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        stream.set_read_timeout(Some(remaining))?;
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                reply.extend_from_slice(&buf[..n]);
                if single_byte || reply.last() == Some(&TERMINATOR) {
                    break;
                }
            }
            Err(ref e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                break
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(reply)
}
