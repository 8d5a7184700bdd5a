//! Process settings: raw values as collected from flags and environment,
//! and the validated [`Settings`] the bot runs with.

use base64::Engine as _;
use secrecy::SecretString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::access::MAX_ACCESS_LABELS;
use crate::error::{Result, RosterError};

pub const DEFAULT_ATTACHMENT_DELAY_MS: u64 = 800;
pub const DEFAULT_HEALTH_PORT: u16 = 3000;
pub const DEFAULT_ACCESS_FILE: &str = "access.txt";

// ---------------------------------------------------------------------------
// RegisterMode
// ---------------------------------------------------------------------------

/// How slash commands are published at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterMode {
    /// Overwrite the guild's command set.
    #[default]
    Guild,
    /// Overwrite the application-wide command set.
    Global,
    /// Clear global and guild sets, then register per guild.
    GuildPurge,
    Off,
}

impl RegisterMode {
    pub fn all() -> &'static [RegisterMode] {
        &[
            RegisterMode::Guild,
            RegisterMode::Global,
            RegisterMode::GuildPurge,
            RegisterMode::Off,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegisterMode::Guild => "guild",
            RegisterMode::Global => "global",
            RegisterMode::GuildPurge => "guild-purge",
            RegisterMode::Off => "off",
        }
    }
}

impl fmt::Display for RegisterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegisterMode {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        RegisterMode::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| RosterError::InvalidConfig {
                key: "REGISTER_MODE".into(),
                reason: format!(
                    "unknown mode '{s}', expected one of guild, global, guild-purge, off"
                ),
            })
    }
}

// ---------------------------------------------------------------------------
// RawSettings
// ---------------------------------------------------------------------------

/// Unvalidated values; an empty string counts as unset.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    pub discord_token: Option<String>,
    pub client_id: Option<String>,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub sheet_id: Option<String>,
    pub client_email: Option<String>,
    pub private_key_base64: Option<String>,
    pub private_key: Option<String>,
    pub drive_folder_id: Option<String>,
    pub attachment_delay: Option<String>,
    pub register_mode: RegisterMode,
    pub health_port: u16,
    pub access_file: PathBuf,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn snowflake(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| RosterError::InvalidConfig {
            key: key.into(),
            reason: format!("'{value}' is not a numeric id"),
        })
}

/// Base64 form wins when it decodes to UTF-8; otherwise the plain form with
/// literal `\n` sequences expanded.
pub fn decode_private_key(base64_form: Option<&str>, plain: Option<&str>) -> Option<String> {
    if let Some(encoded) = base64_form {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|key| !key.trim().is_empty());
        if decoded.is_some() {
            return decoded;
        }
        tracing::warn!("GOOGLE_PRIVATE_KEY_BASE64 did not decode, trying GOOGLE_PRIVATE_KEY");
    }
    plain
        .map(|key| key.replace("\\n", "\n"))
        .filter(|key| !key.trim().is_empty())
}

/// Milliseconds; unset means the default, garbage or negative means zero.
pub fn parse_delay(value: Option<&str>) -> Duration {
    let ms = match value {
        None => DEFAULT_ATTACHMENT_DELAY_MS,
        Some(v) => v.trim().parse::<i64>().map(|n| n.max(0) as u64).unwrap_or(0),
    };
    Duration::from_millis(ms)
}

/// One label per line, trimmed, blanks dropped, first 25 kept.
pub fn parse_access_labels(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_ACCESS_LABELS)
        .map(String::from)
        .collect()
}

/// Unreadable files yield no labels; the caller reports them as missing.
pub fn load_access_labels(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_access_labels(&contents),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "access label file unreadable");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Settings {
    pub discord_token: SecretString,
    pub application_id: u64,
    pub guild_id: u64,
    /// Backup channel; the mirror is off when unset.
    pub backup_channel_id: Option<u64>,
    pub sheet_id: String,
    pub client_email: String,
    pub private_key: SecretString,
    pub drive_folder_id: Option<String>,
    pub attachment_delay: Duration,
    pub register_mode: RegisterMode,
    pub health_port: u16,
    pub access_labels: Vec<String>,
}

impl Settings {
    /// Validate `raw`. Every missing key is reported at once.
    pub fn resolve(raw: RawSettings) -> Result<Settings> {
        let access_labels = load_access_labels(&raw.access_file);
        Self::resolve_with_labels(raw, access_labels)
    }

    pub fn resolve_with_labels(raw: RawSettings, access_labels: Vec<String>) -> Result<Settings> {
        let private_key = decode_private_key(
            present(&raw.private_key_base64),
            present(&raw.private_key),
        );

        let mut missing = Vec::new();
        let required = [
            ("DISCORD_BOT_TOKEN", present(&raw.discord_token)),
            ("DISCORD_CLIENT_ID", present(&raw.client_id)),
            ("DISCORD_GUILD_ID", present(&raw.guild_id)),
            ("GOOGLE_SHEET_ID", present(&raw.sheet_id)),
            ("GOOGLE_CLIENT_EMAIL", present(&raw.client_email)),
        ];
        for (key, value) in required {
            if value.is_none() {
                missing.push(key.to_string());
            }
        }
        if private_key.is_none() {
            missing.push("GOOGLE_PRIVATE_KEY_BASE64/GOOGLE_PRIVATE_KEY".into());
        }
        if access_labels.is_empty() {
            missing.push(format!("{} (no labels found)", file_label(&raw.access_file)));
        }
        if !missing.is_empty() {
            return Err(RosterError::MissingConfig(missing));
        }

        let required_value = |v: &Option<String>| present(v).unwrap_or_default().to_string();
        let backup_channel_id = present(&raw.channel_id)
            .map(|id| snowflake("DISCORD_CHANNEL_ID", id))
            .transpose()?;

        Ok(Settings {
            discord_token: SecretString::from(required_value(&raw.discord_token)),
            application_id: snowflake("DISCORD_CLIENT_ID", &required_value(&raw.client_id))?,
            guild_id: snowflake("DISCORD_GUILD_ID", &required_value(&raw.guild_id))?,
            backup_channel_id,
            sheet_id: required_value(&raw.sheet_id),
            client_email: required_value(&raw.client_email),
            private_key: SecretString::from(private_key.unwrap_or_default()),
            drive_folder_id: present(&raw.drive_folder_id).map(String::from),
            attachment_delay: parse_delay(present(&raw.attachment_delay)),
            register_mode: raw.register_mode,
            health_port: raw.health_port,
            access_labels,
        })
    }

    /// Human-readable lines without any secret material.
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("application id: {}", self.application_id),
            format!("guild id: {}", self.guild_id),
            format!(
                "backup channel: {}",
                self.backup_channel_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "(not set)".into())
            ),
            format!("sheet id: {}", self.sheet_id),
            format!("service account: {}", self.client_email),
            format!(
                "drive folder: {}",
                self.drive_folder_id.as_deref().unwrap_or("(not set)")
            ),
            format!("attachment delay: {}ms", self.attachment_delay.as_millis()),
            format!("register mode: {}", self.register_mode),
            format!("health port: {}", self.health_port),
            format!(
                "access labels ({}): {}",
                self.access_labels.len(),
                self.access_labels.join(", ")
            ),
        ]
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_ACCESS_FILE.to_string())
}
