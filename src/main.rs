use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use mtsync::cli::Cli;
use mtsync::{ClientConfig, SyncLoop};

fn init_logging(cli: &Cli) {
    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string().to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = ClientConfig::load_or_default(&cli.config);
    let options = cli.session_options(&config);
    let interval = cli.interval(&config);

    tracing::info!(
        server = %config.server_address,
        port = options.port,
        folder = %config.sync_folder.display(),
        "starting sync client"
    );

    let sync_loop = SyncLoop::new(config, options, interval);
    let cancel = CancellationToken::new();

    if cli.once {
        let report = sync_loop.run_once(1, &cancel).await;
        println!("{}", report);
        if !report.is_ok() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received, stopping");
                shutdown.cancel();
            }
            Err(e) => tracing::warn!("cannot listen for Ctrl-C: {}", e),
        }
    });

    sync_loop.run(cancel).await;
    Ok(())
}
