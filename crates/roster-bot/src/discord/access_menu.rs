//! Ephemeral multi-select with Save / Keep current / Clear buttons, driven by
//! [`roster_core::access::run_dialog`].

use async_trait::async_trait;
use futures::StreamExt;
use roster_core::access::{
    run_dialog, AccessAction, AccessDialog, AccessEvent, AccessOutcome, DialogSurface, Step,
    ACCESS_DIALOG_TIMEOUT, MAX_ACCESS_LABELS, OPEN_TEXT, TIMED_OUT_TEXT,
};
use roster_core::roster::AccessPicker;
use roster_core::RosterError;
use serenity::all::{
    ButtonStyle, CommandInteraction, ComponentInteraction, ComponentInteractionCollector,
    ComponentInteractionDataKind, Context, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, MessageId,
};
use std::time::Duration;
use tokio::sync::mpsc;

pub const SELECT_ID: &str = "access-select";
pub const SAVE_ID: &str = "access-save";
pub const KEEP_ID: &str = "access-keep";
pub const CLEAR_ID: &str = "access-clear";

const PLACEHOLDER: &str = "Select access labels (optional)";

/// Select row plus button row, with `selected` labels pre-checked.
pub fn menu_rows(labels: &[String], selected: &[String]) -> Vec<CreateActionRow> {
    let options: Vec<CreateSelectMenuOption> = labels
        .iter()
        .take(MAX_ACCESS_LABELS)
        .map(|label| {
            CreateSelectMenuOption::new(label, label).default_selection(selected.contains(label))
        })
        .collect();
    let max = options.len().min(MAX_ACCESS_LABELS) as u8;

    let select = CreateSelectMenu::new(SELECT_ID, CreateSelectMenuKind::String { options })
        .placeholder(PLACEHOLDER)
        .min_values(0)
        .max_values(max);

    vec![
        CreateActionRow::SelectMenu(select),
        CreateActionRow::Buttons(vec![
            CreateButton::new(SAVE_ID)
                .label("Save")
                .style(ButtonStyle::Primary),
            CreateButton::new(KEEP_ID)
                .label("Keep current")
                .style(ButtonStyle::Secondary),
            CreateButton::new(CLEAR_ID)
                .label("Clear")
                .style(ButtonStyle::Danger),
        ]),
    ]
}

/// Map a component's custom id (and selected values, for the menu) to a
/// dialog action. Unknown ids are ignored.
pub fn action_for(custom_id: &str, values: Option<&[String]>) -> Option<AccessAction> {
    match (custom_id, values) {
        (SELECT_ID, Some(values)) => Some(AccessAction::Select(values.to_vec())),
        (SAVE_ID, None) => Some(AccessAction::Save),
        (KEEP_ID, None) => Some(AccessAction::Keep),
        (CLEAR_ID, None) => Some(AccessAction::Clear),
        _ => None,
    }
}

fn component_action(component: &ComponentInteraction) -> Option<AccessAction> {
    let values = match &component.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => Some(values.as_slice()),
        ComponentInteractionDataKind::Button => None,
        _ => return None,
    };
    action_for(&component.data.custom_id, values)
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

struct MenuSurface<'a> {
    ctx: &'a Context,
    command: &'a CommandInteraction,
    message_id: MessageId,
    labels: &'a [String],
}

#[async_trait]
impl DialogSurface<ComponentInteraction> for MenuSurface<'_> {
    async fn acknowledge(&mut self, reply: ComponentInteraction, step: &Step, dialog: &AccessDialog) {
        let response = match step {
            Step::Selected => CreateInteractionResponse::Acknowledge,
            Step::Cleared => CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(step.message().unwrap_or(OPEN_TEXT))
                    .components(menu_rows(self.labels, dialog.selection())),
            ),
            Step::Done(_) => CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(step.message().unwrap_or(OPEN_TEXT))
                    .components(Vec::new()),
            ),
        };
        if let Err(e) = reply.create_response(&self.ctx.http, response).await {
            tracing::warn!(error = %e, "could not acknowledge access menu interaction");
        }
    }

    async fn expire(&mut self) {
        let closed = CreateInteractionResponseFollowup::new()
            .content(TIMED_OUT_TEXT)
            .components(Vec::new());
        if let Err(e) = self
            .command
            .edit_followup(&self.ctx.http, self.message_id, closed)
            .await
        {
            tracing::debug!(error = %e, "could not close timed-out access menu");
        }
    }
}

// ---------------------------------------------------------------------------
// Picker
// ---------------------------------------------------------------------------

/// Asks the invoking member for access labels through an ephemeral followup.
pub struct AccessMenu<'a> {
    ctx: &'a Context,
    command: &'a CommandInteraction,
    labels: &'a [String],
}

impl<'a> AccessMenu<'a> {
    pub fn new(ctx: &'a Context, command: &'a CommandInteraction, labels: &'a [String]) -> Self {
        Self {
            ctx,
            command,
            labels,
        }
    }
}

#[async_trait]
impl AccessPicker for AccessMenu<'_> {
    async fn pick(&mut self, preselected: Vec<String>) -> roster_core::Result<AccessOutcome> {
        let message = self
            .command
            .create_followup(
                &self.ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content(OPEN_TEXT)
                    .components(menu_rows(self.labels, &preselected))
                    .ephemeral(true),
            )
            .await
            .map_err(|e| RosterError::Backend(e.to_string()))?;

        // The collector outlives the dialog slightly so the last click inside
        // the window is still delivered.
        let collector = ComponentInteractionCollector::new(&self.ctx.shard)
            .message_id(message.id)
            .timeout(ACCESS_DIALOG_TIMEOUT + Duration::from_secs(5));
        let (tx, mut rx) = mpsc::channel(16);
        let forward = tokio::spawn(async move {
            let mut stream = Box::pin(collector.stream());
            while let Some(component) = stream.next().await {
                let Some(action) = component_action(&component) else {
                    continue;
                };
                let event = AccessEvent {
                    user_id: component.user.id.get(),
                    action,
                    reply: component,
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        let mut surface = MenuSurface {
            ctx: self.ctx,
            command: self.command,
            message_id: message.id,
            labels: self.labels,
        };
        let outcome = run_dialog(
            AccessDialog::new(preselected),
            self.command.user.id.get(),
            &mut rx,
            ACCESS_DIALOG_TIMEOUT,
            &mut surface,
        )
        .await;
        forward.abort();

        tracing::debug!(labels = ?outcome.labels(), "access selection finished");
        Ok(outcome)
    }
}
