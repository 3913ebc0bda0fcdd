use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::composer::mention::{DEFAULT_MAX_QUERY_LEN, DEFAULT_POPUP_OFFSET};
use crate::composer::MentionTrigger;
use crate::grouping::{GroupingPolicy, DEFAULT_GROUP_WINDOW_SECS};
use crate::thread::{MaxReplyDepth, OrphanPolicy, ReplyPolicy};

// Default configuration
pub const DEFAULT_CHANNEL: &str = "general";
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a config directory")]
    NoConfigDir,
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub channel_id: String,
    /// The signed-in user, used as author of locally sent messages.
    pub user_id: String,
    pub theme: String,
    pub grouping_window_secs: u64,
    pub mention_max_query_len: usize,
    pub mention_popup_offset: f32,
    pub reply_depth: MaxReplyDepth,
    pub orphan_policy: OrphanPolicy,
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            channel_id: DEFAULT_CHANNEL.to_string(),
            user_id: "me".to_string(),
            theme: "dark".to_string(),
            grouping_window_secs: DEFAULT_GROUP_WINDOW_SECS,
            mention_max_query_len: DEFAULT_MAX_QUERY_LEN,
            mention_popup_offset: DEFAULT_POPUP_OFFSET,
            reply_depth: MaxReplyDepth::default(),
            orphan_policy: OrphanPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    pub fn reply_policy(&self) -> ReplyPolicy {
        ReplyPolicy {
            max_depth: self.reply_depth,
            orphans: self.orphan_policy,
        }
    }

    pub fn grouping_policy(&self) -> GroupingPolicy {
        GroupingPolicy::from_secs(self.grouping_window_secs)
    }

    pub fn mention_trigger(&self) -> MentionTrigger {
        MentionTrigger {
            max_query_len: self.mention_max_query_len,
            popup_offset: self.mention_popup_offset,
        }
    }
}

pub fn settings_path() -> Result<PathBuf, ConfigError> {
    let proj = ProjectDirs::from("com", "murmur", "murmur-client").ok_or(ConfigError::NoConfigDir)?;
    let dir = proj.config_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.join("settings.json"))
}

/// Load settings; a missing file yields the defaults.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&settings_path()?)
}

pub fn load_settings_from(path: &std::path::Path) -> Result<Settings, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    save_settings_to(&settings_path()?, settings)
}

pub fn save_settings_to(path: &std::path::Path, settings: &Settings) -> Result<(), ConfigError> {
    let data = serde_json::to_string_pretty(settings)?;
    fs::write(path, data)?;
    Ok(())
}
