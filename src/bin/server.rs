//! LX200 Bridge Binary
//!
//! Listens for SkySafari / Stellarium Mobile and relays to the companion
//! controller over serial.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use lx200bridge::link::{CompanionLink, SerialLinkPort};
use lx200bridge::network::{RunOutcome, Server};
use lx200bridge::{Bridge, Config};
use tracing_subscriber::{fmt, EnvFilter};

/// LX200 Bridge
#[derive(Parser, Debug)]
#[command(name = "lx200-bridge")]
#[command(about = "TCP-to-serial LX200 bridge for SkySafari and Stellarium Mobile")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:4030")]
    listen: String,

    /// Serial device connected to the companion controller
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    serial_port: String,

    /// Serial baud rate
    #[arg(short, long, default_value = "230400")]
    baud_rate: u32,

    /// Close idle client sessions after this many milliseconds
    #[arg(long, default_value = "10000")]
    idle_timeout_ms: u64,

    /// Interval between companion address queries in milliseconds
    #[arg(long, default_value = "15000")]
    status_poll_ms: u64,

    /// Station address shown on the status display (defaults to the listen address)
    #[arg(long)]
    station_addr: Option<IpAddr>,

    /// Access-point address shown on the status display
    #[arg(long, default_value = "192.168.4.1")]
    ap_addr: IpAddr,

    /// Access-point address of the companion's display peer
    #[arg(long, default_value = "192.168.4.2")]
    companion_ap_addr: IpAddr,

    /// Restart when this file appears
    #[arg(long)]
    reset_trigger: Option<PathBuf>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lx200bridge=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("LX200 Bridge v{}", lx200bridge::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Companion link: {} @ {} baud", args.serial_port, args.baud_rate);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .serial_port(&args.serial_port)
        .baud_rate(args.baud_rate)
        .client_idle_timeout_ms(args.idle_timeout_ms)
        .status_poll_interval_ms(args.status_poll_ms)
        .station_addr(args.station_addr)
        .ap_addr(args.ap_addr)
        .companion_ap_addr(args.companion_ap_addr)
        .reset_trigger(args.reset_trigger)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(2);
    }

    // Open companion link
    let port = match SerialLinkPort::open(&config.serial_port, config.baud_rate) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to open companion link: {}", e);
            std::process::exit(1);
        }
    };
    let bridge = Bridge::new(CompanionLink::with_timings(port, config.link_timings));

    // Start server
    let mut server = match Server::bind(config, bridge) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    match server.run() {
        Ok(RunOutcome::Shutdown) => tracing::info!("Server stopped"),
        Ok(RunOutcome::Restart) => {
            // Release the port and socket before the new process opens them
            drop(server);
            restart();
        }
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Replace this process with a fresh copy started with the same arguments
fn restart() -> ! {
    tracing::info!("Restarting");
    let e = lx200bridge::reset::relaunch();
    tracing::error!("Failed to restart: {}", e);
    std::process::exit(1);
}
