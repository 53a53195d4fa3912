use anyhow::Context as _;
use vista_app::{logging, AppConfig};

/// `vista [config.toml]`
fn main() -> anyhow::Result<()> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => AppConfig::load(&path).context("failed to load configuration")?,
        None => AppConfig::default(),
    };
    logging::init(config.log.level_filter()?)?;
    vista_app::run(config)
}
