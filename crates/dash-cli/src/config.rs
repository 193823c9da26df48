//! Configuration loading and management.

use std::path::{Path, PathBuf};

use dash_core::{DomainView, SessionConfig, TimelineQuery};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Inactivity before the logout warning, in milliseconds.
    pub warning_timeout_ms: u64,
    /// Time from warning to automatic logout, in milliseconds.
    pub logout_timeout_ms: u64,
    /// Minimum spacing between activity-driven resets, in milliseconds.
    pub activity_throttle_ms: u64,
    /// Days ahead the timeline looks.
    pub horizon_days: u32,
    /// View used when `--view` is not given.
    pub default_view: DomainView,
    /// Whether the inactivity monitor runs at all.
    pub session_tracking: bool,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            warning_timeout_ms: session.warning_timeout_ms,
            logout_timeout_ms: session.logout_timeout_ms,
            activity_throttle_ms: session.activity_throttle_ms,
            horizon_days: TimelineQuery::default().horizon_days,
            default_view: DomainView::Combined,
            session_tracking: true,
        }
    }
}

impl Config {
    /// Loads configuration from the default locations, then `config_path`
    /// if given, then `DASH_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (DASH_*)
        figment = figment.merge(Env::prefixed("DASH_"));

        figment.extract()
    }

    pub const fn session(&self) -> SessionConfig {
        SessionConfig {
            warning_timeout_ms: self.warning_timeout_ms,
            logout_timeout_ms: self.logout_timeout_ms,
            activity_throttle_ms: self.activity_throttle_ms,
        }
    }

    /// Timeline query with command-line overrides applied.
    pub fn timeline_query(&self, view: Option<DomainView>, horizon: Option<u32>) -> TimelineQuery {
        TimelineQuery {
            view: view.unwrap_or(self.default_view),
            horizon_days: horizon.unwrap_or(self.horizon_days),
        }
    }
}

/// Returns the platform-specific config directory for dash.
///
/// On Linux: `~/.config/dash`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dash"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_dash() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "dash");
    }

    #[test]
    fn test_default_config_matches_core_defaults() {
        let config = Config::default();
        assert_eq!(config.session(), SessionConfig::default());
        assert_eq!(config.timeline_query(None, None), TimelineQuery::default());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("dash.toml");
        std::fs::write(
            &path,
            "warning_timeout_ms = 5000\nlogout_timeout_ms = 3000\ndefault_view = \"church\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.warning_timeout_ms, 5000);
        assert_eq!(config.logout_timeout_ms, 3000);
        assert_eq!(config.default_view, DomainView::Church);
        assert_eq!(config.activity_throttle_ms, 1000);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config {
            default_view: DomainView::Work,
            horizon_days: 14,
            ..Config::default()
        };
        let query = config.timeline_query(Some(DomainView::Personal), None);
        assert_eq!(query.view, DomainView::Personal);
        assert_eq!(query.horizon_days, 14);
    }
}
