use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use crate::notify::messages::Messages;
use crate::notify::{FailureReason, Notifier};
use crate::runtime::task::{ArtifactRef, ClientId};

/// Emits every reply as an `info` event. Never fails.
#[derive(Debug, Clone)]
pub struct TracingNotifier {
    messages: Messages,
}

impl TracingNotifier {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }

    fn send(&self, client: &ClientId, kind: &str, text: String) -> Result<()> {
        info!(client = %client, kind, "[REPLY] {}", text);
        Ok(())
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify_welcome(&self, client: &ClientId) -> Result<()> {
        self.send(client, "welcome", self.messages.welcome())
    }

    async fn notify_usage(&self, client: &ClientId) -> Result<()> {
        self.send(client, "usage", self.messages.usage())
    }

    async fn notify_rejected_too_short(&self, client: &ClientId) -> Result<()> {
        self.send(client, "rejected", self.messages.too_short())
    }

    async fn notify_rejected_already_active(&self, client: &ClientId) -> Result<()> {
        self.send(client, "rejected", self.messages.already_active())
    }

    async fn notify_started(&self, client: &ClientId, prompt: &str) -> Result<()> {
        self.send(client, "started", self.messages.started(prompt))
    }

    async fn notify_waiting(&self, client: &ClientId) -> Result<()> {
        self.send(client, "waiting", self.messages.waiting())
    }

    async fn notify_success(&self, client: &ClientId, prompt: &str, artifact: &ArtifactRef) -> Result<()> {
        self.send(client, "success", self.messages.success(prompt, artifact))
    }

    async fn notify_failure(&self, client: &ClientId, prompt: &str, reason: FailureReason) -> Result<()> {
        self.send(client, "failure", self.messages.failure(prompt, reason))
    }
}
