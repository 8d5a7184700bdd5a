use anyhow::{Context as _, Result};
use google_client::{DriveClient, ServiceAccount, SheetsClient, TokenSource};
use roster_core::backup::BackupMirror;
use secrecy::{ExposeSecret, SecretString};
use serenity::all::{ApplicationId, ChannelId, GatewayIntents, GuildId};
use serenity::cache::Settings as CacheSettings;
use serenity::http::Http;
use serenity::Client;
use std::sync::Arc;

use crate::backend::drive::DriveArchive;
use crate::backend::sheets::SheetsRosterStore;
use crate::discord::{commands, Handler};
use crate::settings::ConfigArgs;

/// Messages kept per channel so edits can be compared with their previous
/// version.
const CACHED_MESSAGES: usize = 100;

pub fn run(config: ConfigArgs) -> Result<()> {
    let settings = config.resolve()?;
    for line in settings.summary() {
        tracing::info!("{line}");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let auth: Arc<dyn TokenSource> = Arc::new(ServiceAccount::new(
            settings.client_email.clone(),
            SecretString::from(settings.private_key.expose_secret().to_owned()),
        ));
        let store = SheetsRosterStore::new(SheetsClient::new(
            settings.sheet_id.clone(),
            Arc::clone(&auth),
        ));

        let backup_channel = settings.backup_channel_id.map(ChannelId::new);
        let mirror = match (backup_channel, &settings.drive_folder_id) {
            (Some(_), Some(folder)) => {
                let archive = DriveArchive::new(DriveClient::new(Arc::clone(&auth)), folder.clone());
                let mirror = BackupMirror::new(archive, settings.attachment_delay)
                    .context("failed to prepare attachment work directory")?;
                Some(Arc::new(mirror))
            }
            _ => None,
        };

        let guild_id = GuildId::new(settings.guild_id);
        let application_id = ApplicationId::new(settings.application_id);
        let token = settings.discord_token.expose_secret();

        let http = Http::new(token);
        http.set_application_id(application_id);
        if let Err(e) = commands::register(&http, guild_id, settings.register_mode).await {
            tracing::error!(mode = %settings.register_mode, error = %e, "command registration failed");
        }

        let handler = Handler {
            guild_id,
            backup_channel,
            store: Arc::new(store),
            access_labels: Arc::new(settings.access_labels.clone()),
            mirror,
        };

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MEMBERS;
        let mut cache_settings = CacheSettings::default();
        cache_settings.max_messages = CACHED_MESSAGES;

        let mut client = Client::builder(token, intents)
            .event_handler(handler)
            .application_id(application_id)
            .cache_settings(cache_settings)
            .await
            .context("failed to build Discord client")?;
        let shard_manager = client.shard_manager.clone();

        tokio::select! {
            result = roster_health::serve(settings.health_port) => {
                result.context("health server stopped")?;
            }
            result = client.start() => {
                result.context("Discord client stopped")?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                shard_manager.shutdown_all().await;
            }
        }
        Ok(())
    })
}
