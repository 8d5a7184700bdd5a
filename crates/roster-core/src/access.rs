//! Access selection dialog.
//!
//! The dialog is opened with the labels already stored for a class cell and
//! runs until the invoking member saves, keeps, or the fixed deadline passes.
//! Input arrives on a channel as tagged [`AccessAction`]s; the transport side
//! (Discord components) only translates interactions into actions and renders
//! each resulting [`Step`].

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Hard deadline measured from the moment the dialog opens.
pub const ACCESS_DIALOG_TIMEOUT: Duration = Duration::from_secs(60);

/// Platform limit on options in one select menu.
pub const MAX_ACCESS_LABELS: usize = 25;

pub const OPEN_TEXT: &str = "Access selection:";
pub const SAVED_TEXT: &str = "Access captured.";
pub const KEPT_TEXT: &str = "Access unchanged.";
pub const CLEARED_TEXT: &str = "Access selection: (cleared)";
pub const TIMED_OUT_TEXT: &str = "Access selection skipped (timeout).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessAction {
    /// The multi-select changed; carries the full new selection.
    Select(Vec<String>),
    Save,
    Keep,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    Saved(Vec<String>),
    Kept(Vec<String>),
    TimedOut(Vec<String>),
}

impl AccessOutcome {
    pub fn labels(&self) -> &[String] {
        match self {
            AccessOutcome::Saved(l) | AccessOutcome::Kept(l) | AccessOutcome::TimedOut(l) => l,
        }
    }

    pub fn into_labels(self) -> Vec<String> {
        match self {
            AccessOutcome::Saved(l) | AccessOutcome::Kept(l) | AccessOutcome::TimedOut(l) => l,
        }
    }
}

/// Result of feeding one action to the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Selection updated silently; dialog stays open.
    Selected,
    /// Selection reset to empty; dialog stays open.
    Cleared,
    /// Dialog closed.
    Done(AccessOutcome),
}

impl Step {
    /// Text the dialog message should show after this step, if it changes.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Step::Selected => None,
            Step::Cleared => Some(CLEARED_TEXT),
            Step::Done(AccessOutcome::Saved(_)) => Some(SAVED_TEXT),
            Step::Done(AccessOutcome::Kept(_)) => Some(KEPT_TEXT),
            Step::Done(AccessOutcome::TimedOut(_)) => Some(TIMED_OUT_TEXT),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Done(_))
    }
}

// ---------------------------------------------------------------------------
// AccessDialog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AccessDialog {
    preselected: Vec<String>,
    current: Vec<String>,
    closed: bool,
}

impl AccessDialog {
    pub fn new(preselected: Vec<String>) -> Self {
        Self {
            current: preselected.clone(),
            preselected,
            closed: false,
        }
    }

    pub fn preselected(&self) -> &[String] {
        &self.preselected
    }

    pub fn selection(&self) -> &[String] {
        &self.current
    }

    pub fn is_open(&self) -> bool {
        !self.closed
    }

    pub fn apply(&mut self, action: AccessAction) -> Step {
        match action {
            AccessAction::Select(values) => {
                self.current = values;
                Step::Selected
            }
            AccessAction::Clear => {
                self.current.clear();
                Step::Cleared
            }
            AccessAction::Save => {
                self.closed = true;
                Step::Done(AccessOutcome::Saved(self.current.clone()))
            }
            AccessAction::Keep => {
                self.closed = true;
                Step::Done(AccessOutcome::Kept(self.preselected.clone()))
            }
        }
    }

    /// Close the dialog because the deadline passed.
    pub fn expire(&mut self) -> AccessOutcome {
        self.closed = true;
        AccessOutcome::TimedOut(self.preselected.clone())
    }
}

// ---------------------------------------------------------------------------
// Driving the dialog
// ---------------------------------------------------------------------------

/// One interaction from the transport, tagged with its author. `reply` is
/// whatever handle the surface needs to acknowledge that interaction.
#[derive(Debug)]
pub struct AccessEvent<R> {
    pub user_id: u64,
    pub action: AccessAction,
    pub reply: R,
}

/// Rendering side of the dialog.
#[async_trait]
pub trait DialogSurface<R: Send>: Send {
    /// Acknowledge an accepted interaction and render `step`.
    async fn acknowledge(&mut self, reply: R, step: &Step, dialog: &AccessDialog);

    /// Close the dialog after the deadline passed with no terminal action.
    async fn expire(&mut self);
}

/// Run `dialog` until a terminal action from `owner` or until `timeout`
/// elapses. Events from other users are dropped unacknowledged. A closed
/// channel is treated like the deadline.
pub async fn run_dialog<R, S>(
    mut dialog: AccessDialog,
    owner: u64,
    events: &mut mpsc::Receiver<AccessEvent<R>>,
    timeout: Duration,
    surface: &mut S,
) -> AccessOutcome
where
    R: Send,
    S: DialogSurface<R> + ?Sized,
{
    let deadline = Instant::now() + timeout;
    loop {
        let event = match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) | Err(_) => break,
        };
        if event.user_id != owner {
            continue;
        }
        let step = dialog.apply(event.action);
        surface.acknowledge(event.reply, &step, &dialog).await;
        if let Step::Done(outcome) = step {
            return outcome;
        }
    }
    surface.expire().await;
    dialog.expire()
}
