//! Installs the global `fern` logger.
//!
//! Lines look like `[   1.234s][INFO][vista_renderer] renderer ready`.  The
//! wgpu internals log a lot at info level, so they are capped at `Warn`
//! regardless of `level`.
use std::time::Instant;

use anyhow::Context as _;
use log::LevelFilter;

const NOISY_TARGETS: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

pub fn init(level: LevelFilter) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:>8.3}s][{}][{}] {}",
                start.elapsed().as_secs_f32(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level);
    for target in NOISY_TARGETS {
        dispatch = dispatch.level_for(target, level.min(LevelFilter::Warn));
    }
    dispatch
        .chain(std::io::stdout())
        .apply()
        .context("a global logger is already installed")
}
