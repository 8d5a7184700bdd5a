//! Gateway event handling: slash-command dispatch and the attachment mirror.

pub mod access_menu;
pub mod backup;
pub mod commands;
pub mod reply;
pub mod roster;

use async_trait::async_trait;
use roster_core::backup::new_attachments;
use roster_core::store::RosterStore;
use serenity::all::{
    ChannelId, Context, EventHandler, GuildId, Interaction, Message, MessageUpdateEvent, Ready,
};
use std::sync::Arc;

use backup::Mirror;

pub struct Handler {
    pub guild_id: GuildId,
    pub backup_channel: Option<ChannelId>,
    pub store: Arc<dyn RosterStore>,
    pub access_labels: Arc<Vec<String>>,
    /// `None` when no backup channel or Drive folder is configured.
    pub mirror: Option<Arc<Mirror>>,
}

impl Handler {
    /// The mirror, if `channel_id` is the watched backup channel.
    fn mirror_for(&self, channel_id: ChannelId) -> Option<&Arc<Mirror>> {
        match self.backup_channel {
            Some(watched) if watched == channel_id => self.mirror.as_ref(),
            _ => None,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, guild = %self.guild_id, "logged in");
        match (self.backup_channel, &self.mirror) {
            (Some(channel), Some(_)) => tracing::info!(channel = %channel, "mirroring attachments to Drive"),
            (Some(channel), None) => {
                tracing::warn!(channel = %channel, "GDRIVE_FOLDER_ID is not set, attachment mirror disabled")
            }
            (None, _) => tracing::info!("DISCORD_CHANNEL_ID is not set, attachment mirror disabled"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        let result = match command.data.name.as_str() {
            commands::ROSTER => {
                roster::handle(&ctx, &command, self.store.as_ref(), &self.access_labels).await
            }
            commands::BACKUP => backup::self_test(&ctx, &command, self.backup_channel).await,
            other => {
                tracing::debug!(command = other, "ignoring unknown command");
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::error!(command = %command.data.name, user = %command.user.id, error = %e, "command failed");
        }
    }

    async fn message(&self, ctx: Context, message: Message) {
        let Some(mirror) = self.mirror_for(message.channel_id) else {
            return;
        };
        let attachments = backup::attachment_refs(&message.attachments);
        backup::spawn_mirror(ctx, mirror.clone(), message.channel_id, attachments);
    }

    async fn message_update(
        &self,
        ctx: Context,
        old_if_available: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        let Some(mirror) = self.mirror_for(event.channel_id) else {
            return;
        };
        let Some(current) = event.attachments.as_deref() else {
            return;
        };
        let previous = old_if_available.map(|old| backup::attachment_refs(&old.attachments));
        let added = new_attachments(previous.as_deref(), backup::attachment_refs(current));
        backup::spawn_mirror(ctx, mirror.clone(), event.channel_id, added);
    }
}
