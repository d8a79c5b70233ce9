use cadenza::config::Settings;

/// Settings plus the reason they fell back to defaults, if they did.
///
/// Logging is configured from the settings, so the problem is reported by
/// the caller once the subscriber is installed.
pub struct LoadedSettings {
    pub settings: Settings,
    pub problem: Option<String>,
}

pub fn load_settings() -> LoadedSettings {
    match Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => LoadedSettings {
                settings: s,
                problem: None,
            },
            Err(msg) => LoadedSettings {
                settings: Settings::default(),
                problem: Some(format!("invalid config, using defaults: {msg}")),
            },
        },
        // Config is optional; a broken file must not keep the player from starting.
        Err(e) => LoadedSettings {
            settings: Settings::default(),
            problem: Some(format!("failed to load config, using defaults: {e}")),
        },
    }
}
