//! Binary entrypoint for the FreeDATA auto-responder.
//!
//! Commands:
//! - `start` - verify the gateway, then poll and reply until Ctrl-C
//! - `init` - write a starter `config.toml` and create the data directory
//! - `status` - print gateway identity, radio link and the last replied id
//!
//! Exit codes: `0` on graceful shutdown, `1` when the gateway is unreachable
//! or does not identify as the expected service at startup.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::Path;

use freedata_bot::bot::Responder;
use freedata_bot::config::Config;
use freedata_bot::gateway::{Gateway, HttpGateway};
use freedata_bot::storage::{FileStore, LastReplied, ReplyState};

#[derive(Parser)]
#[command(name = "freedata-bot")]
#[command(about = "Auto-responder for the FreeDATA packet-radio gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start polling and replying
    Start,
    /// Write a default configuration file
    Init,
    /// Show gateway, radio and reply state
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            let cfg = Config::default();
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
            info!("Data directory ready at {}", cfg.storage.data_dir);
        }
        Commands::Start => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            config.validate()?;
            info!("Starting freedata-bot v{}", env!("CARGO_PKG_VERSION"));

            let gateway = match HttpGateway::connect(config.gateway.clone()).await {
                Ok((gateway, api)) => {
                    info!(
                        "Connected to {} at {} (modem version {})",
                        api.name, config.gateway.base_url, api.modem_version
                    );
                    gateway
                }
                Err(e) => {
                    error!("Startup check failed: {}", e);
                    std::process::exit(1);
                }
            };

            let store = FileStore::open(&config.storage.data_dir)?;
            let state = ReplyState::new(store, config.storage.state_key.clone());
            let responder = Responder::new(config.bot.clone(), gateway, state);
            responder.run().await;
            info!("Exiting freedata-bot");
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            config.validate()?;

            let (gateway, api) = match HttpGateway::connect(config.gateway.clone()).await {
                Ok(connected) => connected,
                Err(e) => {
                    error!("Gateway check failed: {}", e);
                    std::process::exit(1);
                }
            };
            println!("Gateway:       {} ({})", api.name, config.gateway.base_url);
            println!("Modem version: {}", api.modem_version);
            match gateway.radio_status().await {
                Ok(radio) => println!(
                    "Radio link:    {}{}",
                    if radio.radio_status { "up" } else { "down" },
                    radio
                        .radio_frequency
                        .map(|f| format!(" @ {} Hz", f))
                        .unwrap_or_default()
                ),
                Err(e) => println!("Radio link:    unknown ({})", e),
            }

            // Read-only: never create the data directory or rewrite the state here.
            if !Path::new(&config.storage.data_dir).is_dir() {
                println!("Last replied:  none (no data directory yet)");
            } else {
                let store = FileStore::open(&config.storage.data_dir)?;
                let state = ReplyState::new(store, config.storage.state_key.clone());
                match state.peek() {
                    Ok(Some(LastReplied::Id(id))) => println!("Last replied:  {}", id),
                    Ok(Some(LastReplied::None)) | Ok(None) => println!("Last replied:  none"),
                    Err(e) => println!("Last replied:  unreadable ({})", e),
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides config
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Under a service manager stdout is usually not a TTY; the file alone is enough there.
        let is_tty = atty::is(atty::Stream::Stdout);

        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());

            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }

            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
