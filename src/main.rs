//! Gate reader daemon entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SerialTransport   SystemClock   JsonConfigFile                │
//! │  (Transport)       (ClockPort)   (ConfigPort)                  │
//! │  LogEventSink      CsvLogSink    PublishSink<NdjsonPublisher>  │
//! │  (EventSink)       (EventSink)   (EventSink → PublishPort)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ReaderService (scan orchestration)          │    │
//! │  │  Frame codec · Response scanner · Movement tracker     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use gatereader::adapters::config_file::JsonConfigFile;
use gatereader::adapters::csv_log::CsvLogSink;
use gatereader::adapters::log_sink::LogEventSink;
use gatereader::adapters::publish::{NdjsonPublisher, PublishSink, SinkFanout};
use gatereader::adapters::serial::SerialTransport;
use gatereader::adapters::time::SystemClock;
use gatereader::app::ports::ConfigPort;
use gatereader::app::service::ReaderService;
use gatereader::config::{ReaderConfig, parse_antenna_list, validate_config};
use gatereader::protocol::AckPolicy;
use gatereader::protocol::transport::NullTransport;

// ── CLI ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "gatereader", version, about = "RFID gate reader daemon", long_about = None)]
struct Args {
    /// Serial device the reader is attached to, e.g. /dev/ttyUSB0
    #[arg(short, long, required_unless_present_any = ["config", "dry_run"])]
    port: Option<String>,

    /// Transmit power in dBm (10-33)
    #[arg(long)]
    power: Option<u8>,

    /// Comma-separated antenna ports to poll, e.g. "1,2,7,8"
    #[arg(short, long)]
    antennas: Option<String>,

    /// Seconds between scan ticks
    #[arg(short, long)]
    interval: Option<f64>,

    /// Seconds before a lingering tag is reported again
    #[arg(long)]
    timeout: Option<u64>,

    /// Source label stamped on every detection
    #[arg(long)]
    device: Option<String>,

    /// Directory for the dated CSV logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Publish detections as NDJSON to a file, or "-" for stdout
    #[arg(long)]
    publish: Option<String>,

    /// Topic stamped on published detections
    #[arg(long)]
    topic: Option<String>,

    /// Accepted power acknowledgement: "requested" or "sentinel"
    #[arg(long)]
    ack_policy: Option<AckPolicy>,

    /// JSON config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the merged configuration to the --config file and exit
    #[arg(long, requires = "config")]
    save_config: bool,

    /// Run without a reader: no serial I/O, no power handshake
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    /// Overlay command-line values onto `cfg`.
    fn apply(&self, cfg: &mut ReaderConfig) -> Result<()> {
        if let Some(port) = &self.port {
            cfg.serial_port = port.clone();
        }
        if let Some(power) = self.power {
            cfg.power_dbm = power;
        }
        if let Some(list) = &self.antennas {
            cfg.antennas = parse_antenna_list(list);
        }
        if let Some(secs) = self.interval {
            if !secs.is_finite() || secs <= 0.0 {
                bail!("--interval must be a positive number of seconds");
            }
            cfg.scan_interval_ms = ((secs * 1000.0).round() as u64).max(1);
        }
        if let Some(timeout) = self.timeout {
            cfg.timeout_secs = timeout;
        }
        if let Some(device) = &self.device {
            cfg.device_label = device.clone();
        }
        if let Some(dir) = &self.log_dir {
            cfg.log_dir = dir.clone();
        }
        if let Some(topic) = &self.topic {
            cfg.publish_topic = topic.clone();
        }
        if let Some(policy) = self.ack_policy {
            cfg.ack_policy = policy;
        }
        Ok(())
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    info!("gatereader v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration: file, then flags ────────────────────
    let config_file = args.config.as_ref().map(JsonConfigFile::new);
    let mut cfg = match &config_file {
        Some(file) => file.load()?,
        None => ReaderConfig::default(),
    };
    args.apply(&mut cfg)?;
    validate_config(&cfg)?;

    if args.save_config {
        if let Some(file) = &config_file {
            file.save(&cfg)?;
        }
        return Ok(());
    }

    info!(
        "Config: port={} baud={} power={}dBm antennas={:?} interval={}ms timeout={}s gates={:?}",
        cfg.serial_port,
        cfg.baud_rate,
        cfg.power_dbm,
        cfg.antennas,
        cfg.scan_interval_ms,
        cfg.timeout_secs,
        cfg.gate_pairs,
    );

    // ── 2. Event sinks ────────────────────────────────────────
    let mut sink = SinkFanout::new()
        .with(LogEventSink::new())
        .with(CsvLogSink::new(&cfg.log_dir));
    if let Some(target) = &args.publish {
        let out: Box<dyn Write> = if target == "-" {
            Box::new(io::stdout())
        } else {
            Box::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(target)
                    .with_context(|| format!("opening publish target {target}"))?,
            )
        };
        sink.push(Box::new(PublishSink::new(
            NdjsonPublisher::new(out),
            cfg.publish_topic.clone(),
        )));
    }

    // ── 3. Signal handler ─────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown signal received...");
        r.store(false, Ordering::SeqCst);
    })?;

    // ── 4. Reader link + scan loop ────────────────────────────
    let clock = SystemClock::new();
    let mut service = ReaderService::new(&cfg)?;

    if args.dry_run {
        warn!("Dry run: no reader attached, power handshake skipped");
        service.run(&mut NullTransport, &clock, &mut sink, &running);
        return Ok(());
    }

    let mut link = SerialTransport::open(&cfg.serial_port, cfg.baud_rate, cfg.read_timeout())
        .with_context(|| format!("opening {}", cfg.serial_port))?;
    service
        .initialise(&mut link, &mut sink)
        .context("setting RF power")?;
    service.run(&mut link, &clock, &mut sink, &running);

    Ok(())
}
