use anyhow::{bail, Context, Result};
use clap::Parser;
use plant_config::{ConfigLoader, SensorDriver};
use plant_logging::init_logging;
use plant_monitor::{App, ShutdownHandle};
use plant_notify::EmailNotifier;
use plant_sensor::SensorProbes;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config/plant-monitor.toml")]
    config: String,

    /// Run a single collection cycle and exit
    #[arg(long)]
    once: bool,

    /// Send a test email and exit
    #[arg(long)]
    test_email: bool,

    /// Use simulated sensors instead of GPIO/IIO
    #[arg(long)]
    simulate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::new(&args.config)
        .load()
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if args.simulate {
        config.sensor.driver = SensorDriver::Simulated;
    }
    ConfigLoader::validate(&config)?;

    let log_file = init_logging(&config.logging)?;
    info!(
        config = %args.config,
        log_file = %log_file.display(),
        driver = ?config.sensor.driver,
        "Starting plant monitor"
    );

    if args.test_email {
        let notifier = EmailNotifier::from_config(&config.email)?;
        if !notifier.test_connection().await {
            bail!("Email test failed");
        }
        return Ok(());
    }

    let probes = SensorProbes::from_config(&config.sensor);
    let app = App::build(config, probes).await?;

    if args.once {
        let report = app.run_once().await;
        info!(
            values = report.snapshot.present().count(),
            stored = report.stored,
            alerts = ?report.alert_types(),
            "Single collection cycle finished"
        );
        return Ok(());
    }

    app.run(ShutdownHandle::new()).await
}
