use std::path::Path;

use anyhow::Context;
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{init_config, Config};

use emberping::{ping_with_config, PingConfiguration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configure_logging();

    let mut args = std::env::args().skip(1);
    let address = args
        .next()
        .context("Usage: emberping <host[:port]> [timeout_ms]")?;

    let config_path = Path::new("./emberping.toml");
    let mut config = if config_path.exists() {
        PingConfiguration::from_file(config_path).await?
    } else {
        PingConfiguration::default()
    };

    if let Some(timeout) = args.next() {
        config.timeout_ms = timeout.parse().context("Invalid timeout")?;
    }

    info!("Pinging {}...", address);

    let status = ping_with_config(&address, &config).await?;

    info!("MOTD: {}", status.motd.clear);
    info!(
        "Version: {} (protocol {}, major {})",
        status.version.name,
        status.version.protocol,
        status.version.major.as_deref().unwrap_or("unknown")
    );
    info!("Players: {}/{}", status.players.online, status.players.max);
    if !status.players.list.is_empty() {
        info!("Sample: {}", status.players.list.join(", "));
    }
    if !status.mods.names.is_empty() {
        info!("Mods: {}", status.mods.names.join(", "));
    }
    match status.ping {
        Some(ping) => info!("Ping: {}ms", ping),
        None => info!("Ping: unavailable"),
    }

    Ok(())
}

fn configure_logging() {
    let pattern = "[{d(%Y-%m-%d %H:%M:%S)}] {h([{l}])}: {m}\n";
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .expect("Could not build logger config");

    init_config(config).expect("Could not initialize logger config");
}
