//! Launchpad - bootstrapping primitives for command-line tools and services
//!
//! Two independent pieces:
//! - [`app`]: an ordered `before → run → after` lifecycle with timestamped
//!   logging and fatal-error termination
//! - [`config`]: a JSON config store deep-merged over declared defaults,
//!   with write-back

pub mod app;

pub use launchpad_config as config;

pub use app::{
    App, AppBuilder, AppContext, AppError, AppHandle, AppOptions, Outcome, Phase, PhaseError,
    PhaseResult, Stage,
};
pub use config::{ConfigError, ConfigLayout, ConfigSource, ConfigStore};
