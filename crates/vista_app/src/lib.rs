//! `vista_app`: windowed frustum-culling demo.
//!
//! Renders a field of cube instances from an orbit camera and culls them
//! every frame, either on the CPU or with a compute kernel feeding an
//! indirect draw.
//!
//! | Input        | Action                         |
//! |--------------|--------------------------------|
//! | left drag    | orbit                          |
//! | mouse wheel  | zoom                           |
//! | `C`          | toggle CPU / GPU culling       |
//! | `Escape`     | quit                           |
//!
//! The window title shows `<visible>/<total> visible (<path>)`; GPU counts
//! carry a `~` because they are read back one or more frames late.

pub mod config;
mod graphics;
pub mod logging;
mod runner;

pub use config::{AppConfig, ConfigError};
pub use runner::run;
