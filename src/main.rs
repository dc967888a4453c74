// src/main.rs
mod config;
mod drivers;
mod engine;
mod gui;
mod headless;
mod types;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use log::{error, info};
use serialport::SerialPortType;

use crate::config::ScopeConfig;
use crate::drivers::{open_serial, LineSource, SimulatedSource};
use crate::engine::Session;
use crate::types::ChannelMode;

#[derive(Parser, Debug)]
#[command(name = "adcscope")]
#[command(about = "Live oscilloscope for line-delimited ADC samples over serial", long_about = None)]
struct Args {
    /// JSON config file; flags below override its values.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    #[arg(short = 'p', long)]
    port: Option<String>,

    #[arg(short = 'b', long)]
    baud: Option<u32>,

    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(short = 'm', long, value_enum)]
    mode: Option<ChannelMode>,

    /// Samples kept per trace.
    #[arg(long)]
    capacity: Option<usize>,

    #[arg(long)]
    window_ms: Option<f64>,

    /// Use a synthetic signal instead of a serial device.
    #[arg(long)]
    simulate: bool,

    /// No window; report frames through the log.
    #[arg(long)]
    headless: bool,

    /// Stop a headless run after this many seconds.
    #[arg(long)]
    duration_s: Option<f64>,

    #[arg(long)]
    list_ports: bool,

    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn resolve_config(&self) -> Result<ScopeConfig> {
        let mut config = match &self.config {
            Some(path) => ScopeConfig::load(path)?,
            None => ScopeConfig::default(),
        };
        if let Some(port) = &self.port {
            config.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(window_ms) = self.window_ms {
            config.window_ms = window_ms;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn list_ports() -> Result<()> {
    let ports = serialport::available_ports().context("failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("no serial ports found");
    }
    for port in ports {
        match port.port_type {
            SerialPortType::UsbPort(info) => println!(
                "{}  USB {:04x}:{:04x} {}",
                port.port_name,
                info.vid,
                info.pid,
                info.product.unwrap_or_default()
            ),
            _ => println!("{}", port.port_name),
        }
    }
    Ok(())
}

fn open_source(args: &Args, config: &ScopeConfig) -> Result<(Box<dyn LineSource>, String)> {
    if args.simulate {
        let source = SimulatedSource::new(config.mode, config.calibration, config.sample_period());
        return Ok((Box::new(source), "simulator".to_owned()));
    }
    // No retry: without a different port there is nothing to recover to.
    let source = open_serial(&config.port, config.baud_rate, config.timeout()).map_err(|err| {
        error!("{err}");
        err
    })?;
    let label = format!("{} @ {} baud", config.port, config.baud_rate);
    Ok((Box::new(source), label))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    if args.list_ports {
        return list_ports();
    }

    let config = args.resolve_config().context("invalid configuration")?;
    let (source, label) = open_source(&args, &config)?;
    info!("{:?} channel mode, {} sample buffer", config.mode, config.capacity);
    let session = Session::start(source, &config)?;

    if args.headless {
        let limit = args
            .duration_s
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64);
        let mut sink = headless::LogSink::new(config.frame_interval());
        headless::run(session, &mut sink, config.frame_interval(), limit);
        info!("{} frames rendered", sink.frames());
        return Ok(());
    }

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1000.0, 700.0])
        .with_min_inner_size([640.0, 420.0])
        .with_title(format!("adcscope - {label}"));
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let frame_interval = config.frame_interval();
    // The session (and with it the connection) is dropped when the window closes.
    eframe::run_native(
        "adcscope",
        options,
        Box::new(move |_cc| Box::new(gui::ScopeApp::new(session, label, frame_interval))),
    )
    .map_err(|e| anyhow!("display failed: {e}"))
}
