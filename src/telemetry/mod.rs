//! 日志初始化：基于 tracing-subscriber 的结构化日志。
//!
//! Logging setup. Library code only emits `tracing` events; binaries (and
//! tests that want output) call [`init_tracing`] once.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "jinglemaker=info";

static INIT: OnceCell<()> = OnceCell::new();

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call has an effect. If another
/// subscriber is already installed globally it is left in place.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
