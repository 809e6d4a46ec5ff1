use flexi_logger::{Logger, LoggerHandle};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Start stderr logging once for the whole process. The level comes from
/// `RUST_LOG` when set, `info` otherwise. A logger that fails to start is
/// reported and the program keeps running without one.
pub fn init() {
    let started = LOGGER.get_or_try_init(|| {
        Logger::try_with_env_or_str("info")?
            .log_to_stderr()
            .start()
    });
    if let Err(err) = started {
        eprintln!("failed to initialise logger: {err}");
    }
}
