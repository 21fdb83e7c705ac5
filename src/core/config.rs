//! Application configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::theme::DEFAULT_THEME_ID;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Editor settings
    pub editor: EditorConfig,
    /// Preview and side panels
    pub preview: PreviewConfig,
    /// HTML export rendering
    pub export: ExportConfig,
    /// UI settings
    pub ui: UiConfig,
    /// File access settings
    pub persistence: PersistenceConfig,
}

/// Editor-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size in pixels
    pub font_size: f32,
    /// Save automatically after edits go quiet
    pub auto_save: bool,
    /// Quiet period before auto-save, in milliseconds
    pub auto_save_delay_ms: u64,
    /// Show the formatting toolbar above the editor
    pub show_toolbar: bool,
}

/// Markdown preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Show the preview panel
    pub visible: bool,
    /// Show the statistics panel
    pub show_stats: bool,
    /// Preview theme id, also used for exported pages
    pub theme: String,
}

/// Markdown options for HTML export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Tables, strikethrough, task lists, footnotes
    pub gfm: bool,
    /// `$inline$` and `$$display$$` math
    pub math: bool,
    /// Single newlines become line breaks
    pub breaks: bool,
    /// `{#id .class}` on headings
    pub heading_attributes: bool,
    /// Typographic quotes and dashes
    pub smart_punctuation: bool,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Sidebar width
    pub sidebar_width: f32,
}

/// File access settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Never use native file handles, only import and download
    pub force_fallback: bool,
    /// Where downloads land; defaults to the user's download folder
    pub download_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            auto_save: true,
            auto_save_delay_ms: 2000,
            show_toolbar: true,
        }
    }
}

impl EditorConfig {
    pub fn auto_save_delay(&self) -> Duration {
        Duration::from_millis(self.auto_save_delay_ms)
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            visible: true,
            show_stats: false,
            theme: DEFAULT_THEME_ID.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            math: true,
            breaks: true,
            heading_attributes: true,
            smart_punctuation: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            sidebar_width: 250.0,
        }
    }
}

impl UiConfig {
    pub fn is_dark(&self) -> bool {
        !self.theme.eq_ignore_ascii_case("light")
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "notiq", "Notiq")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}
