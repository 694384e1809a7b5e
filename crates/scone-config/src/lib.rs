//! Configuration management for Scone.
//!
//! Parses `scone.toml` with serde and discovers the file in the current
//! directory or its parents. CLI flags are applied on top through
//! [`CliSettings`].
//!
//! ```toml
//! [site]
//! title = "Handbook"
//! manifest = "manifest.json"
//! docs_root = "pages/"
//!
//! [source]
//! origin = "https://docs.example.com/"
//!
//! [poll]
//! enabled = true
//! interval_ms = 3000
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `site.title` and `source.origin` support `${VAR}` (error if unset) and
//! `${VAR:-default}`.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "scone.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the document origin (URL or directory).
    pub origin: Option<String>,
    /// Override the rendered page output path.
    pub output: Option<PathBuf>,
    /// Override the poll enabled flag.
    pub poll_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site presentation settings.
    pub site: SiteConfig,
    /// Change polling settings.
    pub poll: PollConfig,
    source: SourceConfigRaw,
    output: OutputConfigRaw,
    preferences: PreferencesConfigRaw,

    /// Where the manifest and documents are fetched from (set after loading).
    #[serde(skip)]
    pub origin: Origin,
    /// Rendered page snapshot path (set after loading).
    #[serde(skip)]
    pub page_path: PathBuf,
    /// Preference store path (set after loading).
    #[serde(skip)]
    pub preferences_path: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site presentation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title appended to every page title.
    pub title: String,
    /// Manifest path relative to the origin.
    pub manifest: String,
    /// Prefix for relative asset and link paths inside documents.
    pub docs_root: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Scone".to_owned(),
            manifest: "manifest.json".to_owned(),
            docs_root: "pages/".to_owned(),
        }
    }
}

/// Change polling settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Whether the displayed document is polled for changes.
    pub enabled: bool,
    /// Probe period in milliseconds.
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 3000,
        }
    }
}

impl PollConfig {
    /// Probe period.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    origin: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    page: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PreferencesConfigRaw {
    path: Option<String>,
}

/// Location the manifest and documents are served from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// HTTP(S) base URL, always ending with `/`.
    Http(String),
    /// Local directory.
    Directory(PathBuf),
}

impl Default for Origin {
    fn default() -> Self {
        Self::Directory(PathBuf::from("."))
    }
}

impl Origin {
    /// Parse an origin value, resolving directories against `base`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for empty values and URLs with a
    /// scheme other than http or https.
    pub fn parse(value: &str, base: &Path, field: &str) -> Result<Self, ConfigError> {
        require_non_empty(value, field)?;
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let mut url = value.to_owned();
            if !url.ends_with('/') {
                url.push('/');
            }
            return Ok(Self::Http(url));
        }
        if value.contains("://") {
            return Err(ConfigError::Validation(format!(
                "{field} must be a directory or start with http:// or https://"
            )));
        }
        Ok(Self::Directory(base.join(value)))
    }

    /// Human-readable form for log and console output.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Http(url) => url.clone(),
            Self::Directory(dir) => dir.display().to_string(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`source.origin`").
        field: String,
        /// Error message (e.g., "${`DOCS_URL`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `scone.toml` in the current directory and parents, falling back to
    /// defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing or
    /// validation fails, or a CLI override is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            let cwd = std::env::current_dir()?;
            config.apply_cli_settings(settings, &cwd)?;
        }

        Ok(config)
    }

    /// Apply CLI settings; relative values resolve against `cwd`.
    fn apply_cli_settings(&mut self, settings: &CliSettings, cwd: &Path) -> Result<(), ConfigError> {
        if let Some(origin) = &settings.origin {
            self.origin = Origin::parse(origin, cwd, "--origin")?;
        }
        if let Some(output) = &settings.output {
            self.page_path = cwd.join(output);
        }
        if let Some(enabled) = settings.poll_enabled {
            self.poll.enabled = enabled;
        }
        Ok(())
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            poll: PollConfig::default(),
            source: SourceConfigRaw::default(),
            output: OutputConfigRaw::default(),
            preferences: PreferencesConfigRaw::default(),
            origin: Origin::Directory(base.to_path_buf()),
            page_path: base.join(".scone").join("index.html"),
            preferences_path: base.join(".scone").join("preferences.json"),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.manifest, "site.manifest")?;
        if self.site.docs_root.starts_with('/') || self.site.docs_root.contains("://") {
            return Err(ConfigError::Validation(
                "site.docs_root must be a relative path".to_owned(),
            ));
        }
        if self.poll.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll.interval_ms must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.title = expand::expand_env(&self.site.title, "site.title")?;
        if let Some(ref origin) = self.source.origin {
            self.source.origin = Some(expand::expand_env(origin, "source.origin")?);
        }
        Ok(())
    }

    /// Resolve the origin and output paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.origin = Origin::parse(
            self.source.origin.as_deref().unwrap_or("."),
            config_dir,
            "source.origin",
        )?;
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));
        self.page_path = resolve(self.output.page.as_deref(), ".scone/index.html");
        self.preferences_path = resolve(
            self.preferences.path.as_deref(),
            ".scone/preferences.json",
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));

        assert_eq!(config.site.title, "Scone");
        assert_eq!(config.site.manifest, "manifest.json");
        assert_eq!(config.site.docs_root, "pages/");
        assert_eq!(config.origin, Origin::Directory(PathBuf::from("/test")));
        assert_eq!(config.page_path, PathBuf::from("/test/.scone/index.html"));
        assert_eq!(
            config.preferences_path,
            PathBuf::from("/test/.scone/preferences.json")
        );
        assert!(config.poll.enabled);
        assert_eq!(config.poll.interval(), Duration::from_secs(3));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site.title, "Scone");
        assert_eq!(config.poll.interval_ms, 3000);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[site]
title = "Handbook"
manifest = "nav.json"
docs_root = "docs/"

[source]
origin = "https://docs.example.com"

[poll]
enabled = false
interval_ms = 500

[output]
page = "out/page.html"

[preferences]
path = "state/prefs.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(config.site.title, "Handbook");
        assert_eq!(config.site.manifest, "nav.json");
        assert_eq!(config.site.docs_root, "docs/");
        assert_eq!(
            config.origin,
            Origin::Http("https://docs.example.com/".to_owned())
        );
        assert!(!config.poll.enabled);
        assert_eq!(config.poll.interval(), Duration::from_millis(500));
        assert_eq!(config.page_path, PathBuf::from("/project/out/page.html"));
        assert_eq!(
            config.preferences_path,
            PathBuf::from("/project/state/prefs.json")
        );
    }

    #[test]
    fn test_origin_directory_relative_to_config() {
        let origin = Origin::parse("site", Path::new("/project"), "source.origin").unwrap();
        assert_eq!(origin, Origin::Directory(PathBuf::from("/project/site")));
    }

    #[test]
    fn test_origin_keeps_trailing_slash() {
        let origin = Origin::parse("http://localhost:8080/", Path::new("/"), "source.origin")
            .unwrap();
        assert_eq!(origin, Origin::Http("http://localhost:8080/".to_owned()));
    }

    #[test]
    fn test_origin_rejects_other_schemes() {
        let err = Origin::parse("ftp://example.com", Path::new("/"), "source.origin").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("source.origin"));
    }

    #[test]
    fn test_origin_rejects_empty() {
        let err = Origin::parse("  ", Path::new("/"), "source.origin").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let settings = CliSettings {
            origin: Some("http://localhost:3000".to_owned()),
            output: Some(PathBuf::from("snapshot.html")),
            poll_enabled: Some(false),
        };
        config
            .apply_cli_settings(&settings, Path::new("/work"))
            .unwrap();

        assert_eq!(
            config.origin,
            Origin::Http("http://localhost:3000/".to_owned())
        );
        assert_eq!(config.page_path, PathBuf::from("/work/snapshot.html"));
        assert!(!config.poll.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config
            .apply_cli_settings(&CliSettings::default(), Path::new("/work"))
            .unwrap();
        assert_eq!(config.origin, Origin::Directory(PathBuf::from("/test")));
        assert!(config.poll.enabled);
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SCONE_CONFIG_TEST_ORIGIN", "https://docs.test");
        }
        let toml = r#"
[site]
title = "${SCONE_CONFIG_TEST_TITLE:-Docs}"

[source]
origin = "${SCONE_CONFIG_TEST_ORIGIN}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.site.title, "Docs");
        assert_eq!(config.source.origin.as_deref(), Some("https://docs.test"));
        unsafe {
            std::env::remove_var("SCONE_CONFIG_TEST_ORIGIN");
        }
    }

    fn assert_validation_error(config: &Config, expected: &str) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        assert!(msg.contains(expected), "Expected '{expected}' in: {msg}");
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default_with_base(Path::new("/test")).validate().is_ok());
    }

    #[test]
    fn test_validate_empty_manifest() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site.manifest = String::new();
        assert_validation_error(&config, "site.manifest");
    }

    #[test]
    fn test_validate_absolute_docs_root() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site.docs_root = "/pages/".to_owned();
        assert_validation_error(&config, "site.docs_root");
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.poll.interval_ms = 0;
        assert_validation_error(&config, "poll.interval_ms");
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/scone.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scone.toml");
        std::fs::write(&path, "[site]\ntitle = \"Team Docs\"\n\n[source]\norigin = \"public\"\n")
            .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.site.title, "Team Docs");
        assert_eq!(config.origin, Origin::Directory(dir.path().join("public")));
        assert_eq!(config.page_path, dir.path().join(".scone/index.html"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scone.toml");
        std::fs::write(&path, "[poll]\ninterval_ms = 0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_from_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scone.toml");
        std::fs::write(&path, "[site\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
