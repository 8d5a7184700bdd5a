use clap::Args;
use roster_core::config::{
    RawSettings, RegisterMode, Settings, DEFAULT_ACCESS_FILE, DEFAULT_HEALTH_PORT,
};
use std::path::PathBuf;

/// Every setting is a flag with an environment fallback.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Bot token
    #[arg(long, global = true, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_token: Option<String>,

    /// Application (client) id
    #[arg(long, global = true, env = "DISCORD_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Guild the commands are registered in
    #[arg(long, global = true, env = "DISCORD_GUILD_ID")]
    pub guild_id: Option<String>,

    /// Channel whose attachments are mirrored to Drive
    #[arg(long, global = true, env = "DISCORD_CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// Roster spreadsheet id
    #[arg(long, global = true, env = "GOOGLE_SHEET_ID")]
    pub sheet_id: Option<String>,

    /// Service account email
    #[arg(long, global = true, env = "GOOGLE_CLIENT_EMAIL")]
    pub client_email: Option<String>,

    /// Service account private key, base64-encoded PEM
    #[arg(long, global = true, env = "GOOGLE_PRIVATE_KEY_BASE64", hide_env_values = true)]
    pub private_key_base64: Option<String>,

    /// Service account private key, PEM with literal \n sequences
    #[arg(long, global = true, env = "GOOGLE_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Drive folder receiving mirrored attachments
    #[arg(long, global = true, env = "GDRIVE_FOLDER_ID")]
    pub drive_folder_id: Option<String>,

    /// Milliseconds to wait before mirroring a message's attachments
    #[arg(long, global = true, env = "ATTACHMENT_DELAY")]
    pub attachment_delay: Option<String>,

    /// Command registration at startup: guild, global, guild-purge or off
    #[arg(long, global = true, env = "REGISTER_MODE", default_value = "guild")]
    pub register_mode: RegisterMode,

    /// Port of the health endpoint
    #[arg(long, global = true, env = "HEALTH_PORT", default_value_t = DEFAULT_HEALTH_PORT)]
    pub health_port: u16,

    /// Line-delimited list of access labels
    #[arg(long, global = true, env = "ACCESS_FILE", default_value = DEFAULT_ACCESS_FILE)]
    pub access_file: PathBuf,
}

impl ConfigArgs {
    pub fn into_raw(self) -> RawSettings {
        RawSettings {
            discord_token: self.discord_token,
            client_id: self.client_id,
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            sheet_id: self.sheet_id,
            client_email: self.client_email,
            private_key_base64: self.private_key_base64,
            private_key: self.private_key,
            drive_folder_id: self.drive_folder_id,
            attachment_delay: self.attachment_delay,
            register_mode: self.register_mode,
            health_port: self.health_port,
            access_file: self.access_file,
        }
    }

    pub fn resolve(self) -> anyhow::Result<Settings> {
        Ok(Settings::resolve(self.into_raw())?)
    }
}
