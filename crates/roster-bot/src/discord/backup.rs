//! `/backup test` and the attachment mirror hooks.

use roster_core::backup::{
    confirmation, AttachmentRef, BackupMirror, ChannelCheck, MirrorOutcome, PostResult,
    CHANNEL_NOT_FOUND_TEXT, NO_CHANNEL_TEXT, SELF_TEST_MESSAGE,
};
use serenity::all::{
    Attachment, Channel, ChannelId, ChannelType, CommandInteraction, Context, Permissions,
};
use std::sync::Arc;

use super::reply;
use crate::backend::drive::DriveArchive;

pub type Mirror = BackupMirror<DriveArchive>;

pub fn attachment_refs(attachments: &[Attachment]) -> Vec<AttachmentRef> {
    attachments
        .iter()
        .map(|a| AttachmentRef {
            id: a.id.get(),
            filename: a.filename.clone(),
            url: a.url.clone(),
        })
        .collect()
}

/// Wait out the debounce, then mirror each attachment in order and confirm
/// successful uploads in `channel_id`. Runs detached from the event.
pub fn spawn_mirror(
    ctx: Context,
    mirror: Arc<Mirror>,
    channel_id: ChannelId,
    attachments: Vec<AttachmentRef>,
) {
    if attachments.is_empty() {
        return;
    }
    tokio::spawn(async move {
        tokio::time::sleep(mirror.delay()).await;
        for attachment in &attachments {
            if let MirrorOutcome::Uploaded { .. } = mirror.process(attachment).await {
                if let Err(e) = channel_id
                    .say(&ctx.http, confirmation(&attachment.filename))
                    .await
                {
                    tracing::warn!(channel = %channel_id, error = %e, "could not post upload confirmation");
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// /backup test
// ---------------------------------------------------------------------------

fn kind_label(kind: ChannelType) -> String {
    match kind {
        ChannelType::Text => "GuildText".to_string(),
        ChannelType::PublicThread => "PublicThread".to_string(),
        ChannelType::PrivateThread => "PrivateThread".to_string(),
        ChannelType::Forum => "GuildForum".to_string(),
        other => format!("type={}", u8::from(other)),
    }
}

async fn check_channel(ctx: &Context, channel_id: ChannelId) -> serenity::Result<String> {
    let channel = match channel_id.to_channel(ctx).await? {
        Channel::Guild(channel) => channel,
        _ => return Ok(CHANNEL_NOT_FOUND_TEXT.to_string()),
    };

    let bot_id = ctx.cache.current_user().id;
    let permissions = channel
        .permissions_for_user(&ctx.cache, bot_id)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not compute channel permissions");
            Permissions::empty()
        });

    let check = ChannelCheck {
        channel_id: channel.id.get(),
        kind: kind_label(channel.kind),
        view_channel: permissions.contains(Permissions::VIEW_CHANNEL),
        send_messages: permissions.contains(Permissions::SEND_MESSAGES),
        read_message_history: permissions.contains(Permissions::READ_MESSAGE_HISTORY),
    };

    let post = if check.can_post() {
        match channel.id.say(&ctx.http, SELF_TEST_MESSAGE).await {
            Ok(_) => PostResult::Ok,
            Err(e) => PostResult::Failed(e.to_string()),
        }
    } else {
        PostResult::Skipped
    };
    Ok(check.report(&post))
}

pub async fn self_test(
    ctx: &Context,
    command: &CommandInteraction,
    channel: Option<ChannelId>,
) -> anyhow::Result<()> {
    let Some(channel_id) = channel else {
        reply::ephemeral(ctx, command, NO_CHANNEL_TEXT).await?;
        return Ok(());
    };
    if !reply::defer(ctx, command).await? {
        return Ok(());
    }

    let text = match check_channel(ctx, channel_id).await {
        Ok(report) => report,
        Err(e) => format!("Error: {e}"),
    };
    reply::edit(ctx, command, text).await?;
    Ok(())
}
