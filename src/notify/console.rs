use anyhow::{Result, Context as AnyhowContext};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use crate::notify::messages::Messages;
use crate::notify::{FailureReason, Notifier};
use crate::runtime::task::{ArtifactRef, ClientId};

/// Prints replies to stdout as `[client] text`, one reply per write.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    messages: Messages,
}

impl ConsoleNotifier {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }

    async fn send(&self, client: &ClientId, text: String) -> Result<()> {
        let line = format!("[{}] {}\n", client, text);
        let mut out = tokio::io::stdout();
        out.write_all(line.as_bytes()).await.context("Failed to write reply to stdout")?;
        out.flush().await.context("Failed to flush stdout")?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify_welcome(&self, client: &ClientId) -> Result<()> {
        self.send(client, self.messages.welcome()).await
    }

    async fn notify_usage(&self, client: &ClientId) -> Result<()> {
        self.send(client, self.messages.usage()).await
    }

    async fn notify_rejected_too_short(&self, client: &ClientId) -> Result<()> {
        self.send(client, self.messages.too_short()).await
    }

    async fn notify_rejected_already_active(&self, client: &ClientId) -> Result<()> {
        self.send(client, self.messages.already_active()).await
    }

    async fn notify_started(&self, client: &ClientId, prompt: &str) -> Result<()> {
        self.send(client, self.messages.started(prompt)).await
    }

    async fn notify_waiting(&self, client: &ClientId) -> Result<()> {
        self.send(client, self.messages.waiting()).await
    }

    async fn notify_success(&self, client: &ClientId, prompt: &str, artifact: &ArtifactRef) -> Result<()> {
        self.send(client, self.messages.success(prompt, artifact)).await
    }

    async fn notify_failure(&self, client: &ClientId, prompt: &str, reason: FailureReason) -> Result<()> {
        self.send(client, self.messages.failure(prompt, reason)).await
    }
}
