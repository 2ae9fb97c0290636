// Overlay entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config (file + env overrides)
// 3. Create mpsc channels
// 4. Spawn Streamer.bot client task
// 5. Spawn app logic task
// 6. Run the TUI event loop (blocking until user quits)
// 7. Cleanup on exit

use priceboard::app;
use priceboard::client;
use priceboard::config;
use priceboard::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not the terminal the TUI owns)
    init_tracing()?;
    info!("priceboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: Streamer.bot at {}:{}, moderator level {}",
        config.connection.host, config.connection.port, config.chat.moderator_level
    );

    // 3. Create mpsc channels
    let (client_tx, client_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config.clone());

    // 4. Spawn the Streamer.bot client task
    let connection = config.connection.clone();
    let client_handle = tokio::spawn(async move {
        if let Err(e) = client::run(connection, client_tx).await {
            error!("Streamer.bot client error: {}", e);
        }
    });

    // 5. Spawn the app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(client_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Run the TUI event loop (blocking until the user presses 'q')
    info!("Overlay ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 7. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    // Abort the client (it reconnects forever)
    client_handle.abort();

    info!("priceboard shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by
/// the TUI). Logs land in the platform data directory when available,
/// falling back to ./logs.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = directories::ProjectDirs::from("", "", "priceboard")
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("priceboard.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("priceboard=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
