//! Ephemeral reply helpers shared by the command handlers.

use serenity::all::{
    CommandInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
    EditInteractionResponse,
};
use serenity::http::HttpError;

/// Discord's "Unknown interaction": the token expired before we answered.
pub const UNKNOWN_INTERACTION: isize = 10062;

pub fn is_unknown_interaction(code: isize) -> bool {
    code == UNKNOWN_INTERACTION
}

pub fn is_expired(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if is_unknown_interaction(response.error.code)
    )
}

/// Defer ephemerally. `Ok(false)` when the interaction already expired; the
/// caller should stop without replying.
pub async fn defer(ctx: &Context, command: &CommandInteraction) -> serenity::Result<bool> {
    match command.defer_ephemeral(&ctx.http).await {
        Ok(()) => Ok(true),
        Err(e) if is_expired(&e) => {
            tracing::warn!(command = %command.data.name, "interaction expired before defer");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Replace the deferred response's content.
pub async fn edit(
    ctx: &Context,
    command: &CommandInteraction,
    content: impl Into<String>,
) -> serenity::Result<()> {
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
        .await?;
    Ok(())
}

/// Answer immediately, without deferring.
pub async fn ephemeral(
    ctx: &Context,
    command: &CommandInteraction,
    content: impl Into<String>,
) -> serenity::Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
}
