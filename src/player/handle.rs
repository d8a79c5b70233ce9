use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::session::{Action, SessionSnapshot};

use super::controller::Controller;
use super::output::{AudioOutput, OutputEvent};
use super::types::{PlayerCmd, SnapshotHandle};

/// Handle to a running controller task.
pub struct Player {
    tx: UnboundedSender<PlayerCmd>,
    state: SnapshotHandle,
    task: Option<JoinHandle<()>>,
}

impl Player {
    /// Spawn `controller` on the current tokio runtime.
    pub fn spawn<O>(controller: Controller<O>, output_events: UnboundedReceiver<OutputEvent>) -> Self
    where
        O: AudioOutput + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = controller.snapshot_handle();
        let task = tokio::spawn(controller.run(rx, output_events));
        Self {
            tx,
            state,
            task: Some(task),
        }
    }

    pub fn send(&self, cmd: PlayerCmd) -> bool {
        self.tx.send(cmd).is_ok()
    }

    pub fn apply(&self, action: Action) -> bool {
        self.send(PlayerCmd::Apply(action))
    }

    pub fn sender(&self) -> UnboundedSender<PlayerCmd> {
        self.tx.clone()
    }

    pub fn state_handle(&self) -> SnapshotHandle {
        self.state.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Ask the controller to stop and wait for it.
    pub async fn shutdown(mut self) {
        let _ = self.tx.send(PlayerCmd::Quit);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "player task ended abnormally");
            }
        }
    }
}
