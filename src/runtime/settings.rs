use tracing::warn;

use crate::config;

/// Load settings, falling back to defaults on any error.
///
/// Runs before logging is set up, so problems are also kept for later and
/// returned alongside the settings.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}

/// Report a problem recorded by [`load_settings`] once logging is up.
pub fn report_problem(problem: Option<&str>) {
    if let Some(msg) = problem {
        warn!("{msg}");
    }
}
