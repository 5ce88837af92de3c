use std::sync::Arc;
use tracing::{debug, warn};
use crate::notify::Notifier;
use crate::runtime::runner::{Admission, TaskRunner};
use crate::runtime::task::ClientId;

pub mod command;

pub use command::Command;

/// Routes incoming chat text: welcome, usage hint, or a generation request.
pub struct Dispatcher {
    runner: Arc<TaskRunner>,
    notifier: Arc<dyn Notifier>,
    trigger: String,
}

impl Dispatcher {
    pub fn new(runner: Arc<TaskRunner>, notifier: Arc<dyn Notifier>, trigger: impl Into<String>) -> Self {
        Self {
            runner,
            notifier,
            trigger: trigger.into(),
        }
    }

    pub fn runner(&self) -> &Arc<TaskRunner> {
        &self.runner
    }

    /// Returns the admission when the text was a generation request.
    pub async fn handle(&self, client: ClientId, text: &str) -> Option<Admission> {
        let command = Command::parse(text, &self.trigger);
        debug!(client = %client, command = ?command, "Incoming message");

        match command {
            Command::Start => {
                if let Err(e) = self.notifier.notify_welcome(&client).await {
                    warn!(client = %client, error = ?e, "Notification failed");
                }
                None
            }
            Command::Unrecognized => {
                if let Err(e) = self.notifier.notify_usage(&client).await {
                    warn!(client = %client, error = ?e, "Notification failed");
                }
                None
            }
            Command::Generate(prompt) => Some(self.runner.submit(client, &prompt).await),
        }
    }
}
