//! Meeting digest: turns a meeting bot's chat summaries into meeting records.
//!
//! The bot posts one rich-text message per meeting (title link, time,
//! participants, gist, overview, notes, per-person action items). Messages
//! arrive already fetched; nothing here does network I/O.

pub mod actions;
pub mod assemble;
pub mod blocks;
pub mod fields;
pub mod labels;
pub mod ledger;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DigestError;

pub const DEFAULT_VIEW_LINK_PATTERN: &str = r"https?://app\.[A-Za-z0-9.-]+/view/[^\s|>]+";

/// Digest configuration stored in ~/.huddle/digest.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestConfig {
    /// Regex for the transcription service's meeting view link.
    #[serde(default = "default_view_link_pattern")]
    pub view_link_pattern: String,
    /// Meeting title used in the ledger when a record has none.
    #[serde(default = "default_untitled_label")]
    pub untitled_label: String,
}

fn default_view_link_pattern() -> String {
    DEFAULT_VIEW_LINK_PATTERN.to_string()
}

fn default_untitled_label() -> String {
    "Untitled".to_string()
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            view_link_pattern: default_view_link_pattern(),
            untitled_label: default_untitled_label(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".huddle")
        .join("digest.json")
}

impl DigestConfig {
    pub fn load(path: &Path) -> Result<Self, DigestError> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| DigestError::ConfigParse(e.to_string()))
    }

    /// Load config, falling back to defaults if the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    log::warn!("Using default digest config ({}): {}", path.display(), e);
                }
                Self::default()
            }
        }
    }
}

pub(crate) fn default_view_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DEFAULT_VIEW_LINK_PATTERN).unwrap())
}

/// Compiled configuration shared by every extraction.
///
/// Holds no per-message state, so one `Digest` can serve many threads.
#[derive(Debug, Clone)]
pub struct Digest {
    config: DigestConfig,
    view_link: Regex,
}

impl Digest {
    pub fn new(config: DigestConfig) -> Result<Self, DigestError> {
        let view_link = Regex::new(&config.view_link_pattern)
            .map_err(|e| DigestError::InvalidPattern(e.to_string()))?;
        Ok(Self { config, view_link })
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    pub fn view_link(&self) -> &Regex {
        &self.view_link
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self {
            config: DigestConfig::default(),
            view_link: default_view_link().clone(),
        }
    }
}
