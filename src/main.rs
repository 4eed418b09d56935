use std::fs::File;
use std::io::{BufRead, BufReader};
use std::rc::Rc;
use std::{error::Error, path::PathBuf};

use chrono::{DateTime, TimeDelta};
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing::{debug, info, warn};

mod app_metrics;
mod channel_logger;
mod n2k_source;
mod pgns;

use app_metrics::{AppMetrics, MetricsLogger};
use channel_logger::ChannelLogger;
use n2k_source::Nmea2000Source;

use n2k_transport::{N2kStreamReader, candump};
use nmea_hub::config::{self, Config};
use nmea_hub::{Clock, Hub, HubEvent, ManualClock, SystemClock};

// ========== Logging Setup ==========

fn init_logging(log_config: &config::LogConfig) -> Result<(), Box<dyn Error>> {
    use tracing_appender::rolling;
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(&log_config.directory)?;

    let file_appender = rolling::daily(&log_config.directory, &log_config.file_prefix);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_timer(local_timer());

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_timer(local_timer());

    // RUST_LOG wins over the configured level
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

fn local_timer() -> OffsetTime<Rfc3339> {
    OffsetTime::local_rfc_3339().unwrap_or_else(|_| OffsetTime::new(time::UtcOffset::UTC, Rfc3339))
}

fn print_help() {
    println!("NMEA2000 Hub");
    println!();
    println!("Replays a candump frame log through fast packet reassembly into the value hub.");
    println!();
    println!("USAGE:");
    println!("    nmea_hub [OPTIONS] [CONFIG]");
    println!();
    println!("OPTIONS:");
    println!("    --validate-config, --validate, -v    Validate configuration and exit");
    println!("    --help, -h                           Show this help message");
    println!();
    println!("CONFIG defaults to config.json in the current directory");
}

// ========== Main Application ==========

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        std::process::exit(0);
    }

    let validate_only = args
        .iter()
        .any(|a| a == "--validate-config" || a == "--validate" || a == "-v");
    let config_path = args
        .iter()
        .find(|a| !a.starts_with('-'))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));

    let config = match Config::from_file(&config_path).and_then(|cfg| cfg.validate().map(|_| cfg)) {
        Ok(cfg) => {
            if validate_only {
                println!("✓ Configuration validation successful");
                println!("  Input: {}", cfg.input.candump_file);
                println!("  Replay clock: {}", cfg.input.replay_clock);
                println!("  Fast packet PGNs: {}", cfg.input.fast_packet_pgns().len());
                println!(
                    "  Hub: capacity={}, freshness={} ms",
                    cfg.hub.default_capacity, cfg.hub.freshness_window_ms
                );
                println!("  Source priorities: {} entries", cfg.source_priority.len());
                println!("  Logged channels: {}", cfg.subscriptions.channels.join(", "));
                std::process::exit(0);
            }
            cfg
        }
        Err(e) => {
            if validate_only {
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
            eprintln!("Warning: Could not load {}: {}", config_path.display(), e);
            eprintln!("Using default configuration");
            Config::default()
        }
    };

    init_logging(&config.logging)?;
    info!("NMEA2000 Hub starting...");

    // Replay drives the hub clock from the dump timestamps
    let replay_clock = config
        .input
        .replay_clock
        .then(|| Rc::new(ManualClock::default()));
    let clock: Rc<dyn Clock> = match &replay_clock {
        Some(clock) => Rc::clone(clock) as Rc<dyn Clock>,
        None => Rc::new(SystemClock),
    };

    let hub = Rc::new(Hub::new(clock, config.hub.clone()));
    for (source, priority) in &config.source_priority {
        hub.set_source_priority(source, *priority);
    }
    hub.add_event_listener(|event| match event {
        HubEvent::NewSource { channel, source } => {
            info!("New source {} for channel {}", source, channel)
        }
        HubEvent::SourceSwitched { channel, current, .. } => {
            info!("Channel {} now follows {}", channel, current)
        }
    });

    let logger = ChannelLogger::new(&hub, &config.subscriptions)?;
    info!("Logging {} channels", logger.active_subscriptions());

    let source = Nmea2000Source::new(Rc::clone(&hub));
    let mut reader = N2kStreamReader::with_config(
        config.reassembly.to_reassembly_config(),
        config.input.fast_packet_pgns(),
    );

    let mut metrics = AppMetrics::new();
    let mut metrics_logger = MetricsLogger::new(TimeDelta::seconds(60));

    info!("Replaying {}", config.input.candump_file);
    let input = BufReader::new(File::open(&config.input.candump_file)?);

    for (line_no, line) in input.lines().enumerate() {
        let line = line?;
        let record = match candump::parse_line(&line) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                metrics.dump_errors += 1;
                warn!("Line {}: {}", line_no + 1, e);
                continue;
            }
        };

        if let (Some(clock), Some(timestamp)) = (&replay_clock, record.timestamp) {
            clock.set(DateTime::UNIX_EPOCH + TimeDelta::from_std(timestamp)?);
        }

        metrics.can_frames += 1;
        if let Some(packet) = reader.process_frame(record.frame) {
            metrics.packets += 1;
            metrics.published_values += source.process(&packet) as u64;
        }

        metrics_logger.check_and_log(hub.current_time(), &mut metrics, &reader.table().stats());
    }

    let dropped = reader.table_mut().sweep();
    debug!("Dropped {} stale reassemblies at end of input", dropped);
    metrics.log(&reader.table().stats());
    info!("Logged {} channel values", logger.lines());

    info!("Channels: {}", serde_json::to_string_pretty(&hub.enumerate())?);
    info!("NMEA2000 Hub done");

    Ok(())
}
