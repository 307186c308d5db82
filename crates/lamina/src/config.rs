//! Optional site.toml configuration.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub page: PageSettings,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub exclude: ExcludeSettings,
}

#[derive(Debug, Deserialize)]
pub struct PageSettings {
    /// Stylesheet href injected into every page head
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    /// Favicon href injected into every page head
    #[serde(default = "default_favicon")]
    pub favicon: String,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    /// Skip failed files instead of aborting the run
    #[serde(default)]
    pub keep_going: bool,

    /// Result channel capacity
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExcludeSettings {
    /// Directories whose path contains any of these markers are skipped
    #[serde(default = "default_vendor_markers")]
    pub vendor_markers: Vec<String>,

    /// If set, directories whose path lacks this marker are skipped
    #[serde(default)]
    pub include_marker: Option<String>,
}

fn default_stylesheet() -> String {
    "/style.css".to_string()
}
fn default_favicon() -> String {
    "/favicon.ico".to_string()
}
fn default_channel_capacity() -> usize {
    64
}
fn default_vendor_markers() -> Vec<String> {
    vec!["node_modules".to_string(), ".git".to_string()]
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            stylesheet: default_stylesheet(),
            favicon: default_favicon(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            keep_going: false,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for ExcludeSettings {
    fn default() -> Self {
        Self {
            vendor_markers: default_vendor_markers(),
            include_marker: None,
        }
    }
}

/// Load configuration from site.toml if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let config: ConfigFile = toml::from_str("").unwrap();

        assert_eq!(config.page.stylesheet, "/style.css");
        assert_eq!(config.page.favicon, "/favicon.ico");
        assert!(!config.build.keep_going);
        assert_eq!(config.build.channel_capacity, 64);
        assert_eq!(config.exclude.vendor_markers, vec!["node_modules", ".git"]);
        assert!(config.exclude.include_marker.is_none());
    }

    #[test]
    fn parses_full_file() {
        let config: ConfigFile = toml::from_str(
            r#"
[page]
stylesheet = "/assets/site.css"
favicon = "/assets/icon.png"

[build]
keep_going = true
channel_capacity = 8

[exclude]
vendor_markers = ["vendor"]
include_marker = "content"
"#,
        )
        .unwrap();

        assert_eq!(config.page.stylesheet, "/assets/site.css");
        assert!(config.build.keep_going);
        assert_eq!(config.build.channel_capacity, 8);
        assert_eq!(config.exclude.vendor_markers, vec!["vendor"]);
        assert_eq!(config.exclude.include_marker.as_deref(), Some("content"));
    }
}
