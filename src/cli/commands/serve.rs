use crate::api;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::info;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Handle the `serve` command: apply CLI overrides, set up tracing and
/// block on the HTTP server.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve { listen, static_dir } = cmd {
        let mut cfg = cfg.clone();
        if let Some(listen) = listen {
            cfg.listen = listen.clone();
        }
        if let Some(dir) = static_dir {
            cfg.static_dir = Some(dir.clone());
        }

        init_tracing();
        info(format!("Starting eventboard on http://{}", cfg.listen));

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(api::serve(&cfg))?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
