use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Directory (relative to the asset root) that holds bundled avatar artwork.
pub const AVATAR_ASSETS_DIR: &str = "avatars";

/// Identifier carried by the synthesized default profile. Never persisted.
pub const DEFAULT_AVATAR_ID: &str = "avatar_default";

/// Named display state of an avatar.
///
/// Serialized as a lowercase string so it can key a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarState {
    /// Shown while the assistant is waiting.
    Idle,
    /// Shown while the assistant is speaking.
    Talking,
}

impl AvatarState {
    /// Every known state, in display order.
    pub const ALL: [AvatarState; 2] = [AvatarState::Idle, AvatarState::Talking];

    /// Lowercase wire name of the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AvatarState::Idle => "idle",
            AvatarState::Talking => "talking",
        }
    }
}

impl fmt::Display for AvatarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visual identity profile with one asset per display state.
///
/// `id` is empty until the record store saves the profile for the first time;
/// the store then assigns it together with `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    /// Store-assigned identifier. Empty for profiles that were never saved.
    #[serde(default)]
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Asset path for each display state.
    pub states: BTreeMap<AvatarState, String>,
    /// Whether this profile is the one used when nothing else is selected.
    ///
    /// The store does not enforce a single default; callers must.
    #[serde(default)]
    pub is_default: bool,
    /// Creation time in seconds since the Unix epoch. 0 until first save.
    #[serde(default)]
    pub created_at: i64,
}

impl Avatar {
    /// Creates an unsaved profile with no states.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: description.into(),
            states: BTreeMap::new(),
            is_default: false,
            created_at: 0,
        }
    }

    /// Builder-style setter for a single state's asset path.
    #[must_use]
    pub fn with_state(mut self, state: AvatarState, path: impl Into<String>) -> Self {
        self.states.insert(state, path.into());
        self
    }

    /// Returns `true` if the profile has not been assigned an identifier yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    /// Asset path configured for `state`, if any.
    #[must_use]
    pub fn state_path(&self, state: AvatarState) -> Option<&str> {
        self.states.get(&state).map(String::as_str)
    }

    /// The built-in profile returned when no avatars have been stored.
    ///
    /// Pure: the caller supplies the creation time, nothing is persisted.
    #[must_use]
    pub fn default_profile(created_at: i64) -> Self {
        let mut avatar = Self::new("Default", "Default avatar")
            .with_state(
                AvatarState::Idle,
                format!("/{AVATAR_ASSETS_DIR}/idle.png"),
            )
            .with_state(
                AvatarState::Talking,
                format!("/{AVATAR_ASSETS_DIR}/talking.gif"),
            );
        avatar.id = DEFAULT_AVATAR_ID.to_string();
        avatar.is_default = true;
        avatar.created_at = created_at;
        avatar
    }
}

/// Metadata for an uploaded avatar image. `path` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarImage {
    /// Asset path of the file; re-saving the same path overwrites.
    pub path: String,
    /// Original file name as uploaded.
    #[serde(default)]
    pub name: String,
    /// MIME type, e.g. `image/png`.
    #[serde(default)]
    pub content_type: String,
    /// File size in bytes.
    #[serde(default)]
    pub size_bytes: u64,
    /// Pixel width, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Pixel height, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Upload time in seconds since the Unix epoch.
    #[serde(default)]
    pub uploaded_at: i64,
}

impl AvatarImage {
    /// Creates image metadata with only the path populated.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: String::new(),
            content_type: String::new(),
            size_bytes: 0,
            width: None,
            height: None,
            uploaded_at: 0,
        }
    }
}

/// The active avatar configuration document (a singleton).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarList {
    /// Identifier of the selected avatar, if one is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_avatar_id: Option<String>,
    /// Profiles included in this configuration.
    #[serde(default)]
    pub avatars: Vec<Avatar>,
}

impl AvatarList {
    /// The profile matching `active_avatar_id`, if present in `avatars`.
    #[must_use]
    pub fn active(&self) -> Option<&Avatar> {
        let id = self.active_avatar_id.as_deref()?;
        self.avatars.iter().find(|a| a.id == id)
    }
}
