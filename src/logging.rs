use log::{warn, Level};

/// Routes `log` records to the browser console and panics to `console.error`.
/// Safe to call more than once; later calls keep the first logger.
pub fn init(level: Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        warn!("Console logger already installed");
    }
}
