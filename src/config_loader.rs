use crate::error::Result;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 50021;
pub const DEFAULT_SPEAKER: u32 = 3; // Zundamon (normal)

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Full base URL, e.g. `http://192.168.1.10:50021`. Wins over host/port.
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub speaker: u32,
    // Discovery
    pub host_alias: String,
    pub route_table: String,
    pub lookup_timeout_ms: u64,
    // Request budgets
    pub health_timeout_ms: u64,
    pub query_timeout_ms: u64,
    pub synthesis_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: DEFAULT_PORT,
            speaker: DEFAULT_SPEAKER,
            host_alias: "host.docker.internal".to_string(),
            route_table: "/proc/net/route".to_string(),
            lookup_timeout_ms: 2_000,
            health_timeout_ms: 10_000,
            query_timeout_ms: 30_000,
            synthesis_timeout_ms: 60_000,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        Self::load(&Self::config_files(), None)
    }

    /// `./Voicegen.*`, then `<config dir>/zunda-voicegen/Voicegen.*`; later files win.
    pub fn config_files() -> Vec<PathBuf> {
        let mut files = vec![PathBuf::from("Voicegen")];
        if let Some(config_dir) = dirs::config_dir() {
            files.push(config_dir.join("zunda-voicegen").join("Voicegen"));
        }
        files
    }

    /// Loads settings from the optional `files` (extension picked by the config
    /// crate), reading `VOICEVOX_*` variables from `env` instead of the process
    /// environment when a map is given.
    pub fn load(files: &[PathBuf], env: Option<config::Map<String, String>>) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("port", defaults.port as i64)?
            .set_default("speaker", defaults.speaker as i64)?
            .set_default("host_alias", defaults.host_alias)?
            .set_default("route_table", defaults.route_table)?
            .set_default("lookup_timeout_ms", defaults.lookup_timeout_ms as i64)?
            .set_default("health_timeout_ms", defaults.health_timeout_ms as i64)?
            .set_default("query_timeout_ms", defaults.query_timeout_ms as i64)?
            .set_default("synthesis_timeout_ms", defaults.synthesis_timeout_ms as i64)?;

        for file in files {
            builder = builder.add_source(File::with_name(&file.to_string_lossy()).required(false));
        }

        // VOICEVOX_URL, VOICEVOX_HOST, VOICEVOX_PORT, VOICEVOX_HEALTH_TIMEOUT_MS, ...
        let builder = builder.add_source(
            Environment::with_prefix("VOICEVOX")
                .try_parsing(true)
                .source(env),
        );

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.url = settings.url.filter(|u| !u.trim().is_empty());
        settings.host = settings.host.filter(|h| !h.trim().is_empty());
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ConfigError::Message("port must be between 1 and 65535".to_string()).into());
        }
        let timeouts = [
            ("lookup_timeout_ms", self.lookup_timeout_ms),
            ("health_timeout_ms", self.health_timeout_ms),
            ("query_timeout_ms", self.query_timeout_ms),
            ("synthesis_timeout_ms", self.synthesis_timeout_ms),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::Message(format!("{} must be greater than 0", name)).into());
            }
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn timeouts(&self) -> crate::backends::Timeouts {
        crate::backends::Timeouts {
            health: Duration::from_millis(self.health_timeout_ms),
            query: Duration::from_millis(self.query_timeout_ms),
            synthesis: Duration::from_millis(self.synthesis_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RunError;
    use crate::error::VoicegenError;

    fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_config_load_defaults() {
        let settings = Settings::load(&[], Some(env(&[]))).expect("Failed to load settings");
        assert_eq!(settings.port, 50021);
        assert_eq!(settings.speaker, 3);
        assert!(settings.url.is_none());
        assert!(settings.health_timeout_ms < settings.query_timeout_ms);
        assert!(settings.query_timeout_ms < settings.synthesis_timeout_ms);
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::load(&[], Some(env(&[
            ("VOICEVOX_URL", "http://10.0.0.5:50021"),
            ("VOICEVOX_HOST", "voicevox.lan"),
            ("VOICEVOX_PORT", "50121"),
            ("VOICEVOX_HEALTH_TIMEOUT_MS", "250"),
        ])))
        .expect("Failed to load settings");

        assert_eq!(settings.url.as_deref(), Some("http://10.0.0.5:50021"));
        assert_eq!(settings.host.as_deref(), Some("voicevox.lan"));
        assert_eq!(settings.port, 50121);
        assert_eq!(settings.health_timeout_ms, 250);
    }

    #[test]
    fn test_empty_url_counts_as_unset() {
        let settings = Settings::load(&[], Some(env(&[("VOICEVOX_URL", ""), ("VOICEVOX_HOST", " ")])))
            .expect("Failed to load settings");
        assert!(settings.url.is_none());
        assert!(settings.host.is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Settings::load(&[], Some(env(&[("VOICEVOX_QUERY_TIMEOUT_MS", "0")])));
        assert!(matches!(result, Err(VoicegenError::Config(_))));
    }

    #[test]
    fn test_bad_port_is_a_setup_failure() {
        for port in ["not-a-port", "70000", "0"] {
            let err = Settings::load(&[], Some(env(&[("VOICEVOX_PORT", port)]))).unwrap_err();
            assert!(matches!(err, VoicegenError::Config(_)), "{port}");
            assert_eq!(RunError::Setup(err).exit_code(), 1, "{port}");
        }
    }

    #[test]
    fn test_file_then_env_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Voicegen.toml"),
            "port = 50121\nspeaker = 1\nhost = \"voicevox.lan\"\n",
        )
        .unwrap();
        let files = [dir.path().join("missing"), dir.path().join("Voicegen")];

        let settings = Settings::load(&files, Some(env(&[("VOICEVOX_SPEAKER", "8")])))
            .expect("Failed to load settings");

        assert_eq!(settings.port, 50121);
        assert_eq!(settings.host.as_deref(), Some("voicevox.lan"));
        assert_eq!(settings.speaker, 8);
    }
}
