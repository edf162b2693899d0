use crate::graph::{InsertAnchor, InsertSlot};
use crate::workflow::StepId;
use tokio::sync::mpsc;

/// Requests a node component can send up to the owning editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    /// Insert a blank step into the given gap.
    RequestInsert(InsertSlot),
    Remove(StepId),
    Move { step_id: StepId, to_index: usize },
}

/// Handed to node components so they can address the editor directly.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<EditorCommand>,
}

/// The editor side of the command channel.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: mpsc::UnboundedReceiver<EditorCommand>,
}

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { tx }, CommandReceiver { rx })
}

impl CommandSender {
    /// Asks for a new step between `before` and `after`.
    /// Returns `false` once the editor is gone.
    pub fn on_request_insert(&self, before: InsertAnchor, after: Option<StepId>) -> bool {
        self.send(EditorCommand::RequestInsert(InsertSlot { before, after }))
    }

    pub fn request_removal(&self, step_id: StepId) -> bool {
        self.send(EditorCommand::Remove(step_id))
    }

    pub fn request_move(&self, step_id: StepId, to_index: usize) -> bool {
        self.send(EditorCommand::Move { step_id, to_index })
    }

    pub fn send(&self, command: EditorCommand) -> bool {
        match self.tx.send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(command = ?e.0, "Editor is gone, dropping command");
                false
            }
        }
    }
}

impl CommandReceiver {
    /// Next queued command, if any, without waiting.
    pub fn try_next(&mut self) -> Option<EditorCommand> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next command. `None` once every sender is dropped.
    pub async fn next(&mut self) -> Option<EditorCommand> {
        self.rx.recv().await
    }
}
