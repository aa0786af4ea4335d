//! A terminal client for a websocket poker table.

use anyhow::{Context, Result};
use pico_args::Arguments;

use ts_client::{
    config::{ClientConfig, Overrides},
    line_client, logging,
    tui_app::TuiApp,
};

const HELP: &str = "\
Sit down at a poker table server

USAGE:
  ts_client [OPTIONS]

OPTIONS:
  --server URL          Websocket URL  [default: ws://localhost:8080/ws]
  --name NAME           Name to join with  [default: login name]
  --tui                 Use TUI (Terminal UI) mode [default: false]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  TABLE_SERVER_URL, TABLE_PLAYER_NAME, TABLE_RECONNECT_BASE_MS,
  TABLE_RECONNECT_MAX_MS, TABLE_RECONNECT_ATTEMPTS, TABLE_LOG_FILE, RUST_LOG
";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    dotenvy::dotenv().ok();

    let overrides = Overrides {
        server_url: pargs.opt_value_from_str("--server")?,
        player_name: pargs.opt_value_from_str("--name")?,
        use_tui: pargs.contains("--tui"),
    };
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}");
    }

    let config = ClientConfig::from_env(overrides).context("Failed to load configuration")?;

    if config.use_tui {
        logging::init_file(&config.log_file).with_context(|| {
            format!("Failed to open log file {}", config.log_file.display())
        })?;
        log::info!("starting TUI against {}", config.server_url);

        let terminal = ratatui::init();
        let result = TuiApp::new(&config).run(terminal).await;
        ratatui::restore();
        result?;
    } else {
        logging::init_stderr();
        log::info!("starting line mode against {}", config.server_url);
        line_client::run(config).await?;
    }

    println!("\nLeft the table.");
    Ok(())
}
