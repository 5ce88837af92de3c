use std::future::Future;
use std::sync::Arc;
use anyhow::Result;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use crate::client::{GenerationService, StatusOutcome};
use crate::config::Settings;
use crate::error::Rejection;
use crate::notify::{FailureReason, Notifier};
use crate::runtime::policy::{MIN_PROMPT_CHARS, PollPolicy};
use crate::runtime::registry::{TaskGuard, TaskRegistry};
use crate::runtime::task::{ArtifactRef, ClientId, TaskId, TaskRecord};

/// Lifecycle of one accepted request. Releasing the registry slot follows
/// every terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Submitting,
    AwaitingInitialWindow,
    Polling,
    Succeeded,
    Exhausted,
    Failed,
}

/// Terminal result of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded(ArtifactRef),
    /// Create failed; nothing was polled
    Failed,
    /// Every poll attempt came back without a video
    Exhausted,
}

impl Outcome {
    pub fn state(&self) -> TaskState {
        match self {
            Outcome::Succeeded(_) => TaskState::Succeeded,
            Outcome::Failed => TaskState::Failed,
            Outcome::Exhausted => TaskState::Exhausted,
        }
    }
}

/// What `submit` did with a request.
#[derive(Debug)]
pub enum Admission {
    /// The task runs on its own tokio task; the handle yields its outcome.
    Accepted(JoinHandle<Outcome>),
    Rejected(Rejection),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Admission::Rejected(r) => Some(*r),
            Admission::Accepted(_) => None,
        }
    }
}

/// Submits prompts, polls the service on a fixed schedule and reports the
/// result. One spawned unit per accepted request; units for different
/// clients run in parallel.
pub struct TaskRunner {
    service: Arc<dyn GenerationService>,
    registry: Arc<TaskRegistry>,
    notifier: Arc<dyn Notifier>,
    policy: PollPolicy,
    min_prompt_chars: usize,
}

impl TaskRunner {
    pub fn new(
        service: Arc<dyn GenerationService>,
        registry: Arc<TaskRegistry>,
        notifier: Arc<dyn Notifier>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            service,
            registry,
            notifier,
            policy,
            min_prompt_chars: MIN_PROMPT_CHARS,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        service: Arc<dyn GenerationService>,
        registry: Arc<TaskRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(service, registry, notifier, settings.polling)
            .with_min_prompt_chars(settings.bot.min_prompt_chars)
    }

    pub fn with_min_prompt_chars(mut self, min_prompt_chars: usize) -> Self {
        self.min_prompt_chars = min_prompt_chars;
        self
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Validates the prompt and claims the client's slot, then spawns the
    /// task. Rejections are decided here, before anything is spawned or
    /// sent to the service.
    pub async fn submit(self: &Arc<Self>, client: ClientId, prompt: &str) -> Admission {
        let prompt = prompt.trim();

        if prompt.chars().count() < self.min_prompt_chars {
            info!(client = %client, len = prompt.chars().count(), "Prompt rejected: too short");
            self.deliver(&client, "rejected_too_short", self.notifier.notify_rejected_too_short(&client)).await;
            return Admission::Rejected(Rejection::TooShort { min: self.min_prompt_chars });
        }

        let guard = match self.registry.try_acquire(client.clone(), prompt) {
            Ok(guard) => guard,
            Err(busy) => {
                info!(client = %client, "Prompt rejected: task already in progress");
                self.deliver(&client, "rejected_already_active", self.notifier.notify_rejected_already_active(&client)).await;
                return Admission::Rejected(busy.into());
            }
        };

        info!(client = %client, run_id = %guard.record().run_id(), "Task accepted");
        let runner = Arc::clone(self);
        Admission::Accepted(tokio::spawn(async move { runner.run(guard).await }))
    }

    async fn run(&self, guard: TaskGuard) -> Outcome {
        let record = guard.record().clone();
        let outcome = self.drive(&guard).await;
        self.transition(&record, outcome.state());
        self.report(&record, &outcome).await;
        // Released last, whatever the notifier did.
        drop(guard);
        outcome
    }

    async fn drive(&self, guard: &TaskGuard) -> Outcome {
        let record = guard.record();
        let client = record.client_id();

        self.transition(record, TaskState::Submitting);
        let task_id = match self.service.create(record.prompt()).await {
            Ok(task_id) => task_id,
            Err(e) => {
                error!(client = %client, run_id = %record.run_id(), error = %e, "Generation submission failed");
                return Outcome::Failed;
            }
        };
        guard.bind_task_id(task_id.clone());
        info!(client = %client, run_id = %record.run_id(), task_id = %task_id, "Generation started");

        self.deliver(client, "started", self.notifier.notify_started(client, record.prompt())).await;
        self.deliver(client, "waiting", self.notifier.notify_waiting(client)).await;

        self.transition(record, TaskState::AwaitingInitialWindow);
        sleep(self.policy.initial_wait()).await;

        self.transition(record, TaskState::Polling);
        match self.poll(record, &task_id).await {
            Some(artifact) => Outcome::Succeeded(artifact),
            None => Outcome::Exhausted,
        }
    }

    /// At most `max_attempts` status calls. A failed call counts as a pending
    /// attempt; there is no wait after the last one.
    async fn poll(&self, record: &TaskRecord, task_id: &TaskId) -> Option<ArtifactRef> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            match self.service.check_status(task_id).await {
                Ok(StatusOutcome::Ready(artifact)) => {
                    info!(run_id = %record.run_id(), task_id = %task_id, attempt, "Video ready");
                    return Some(artifact);
                }
                Ok(StatusOutcome::Pending) => {
                    debug!(run_id = %record.run_id(), task_id = %task_id, attempt, "Video not ready yet");
                }
                Err(e) => {
                    warn!(run_id = %record.run_id(), task_id = %task_id, attempt, error = %e, "Status check failed");
                }
            }

            if attempt < max_attempts {
                sleep(self.policy.poll_interval()).await;
            }
        }

        warn!(run_id = %record.run_id(), task_id = %task_id, max_attempts, "Poll attempts exhausted");
        None
    }

    async fn report(&self, record: &TaskRecord, outcome: &Outcome) {
        let client = record.client_id();
        let prompt = record.prompt();
        match outcome {
            Outcome::Succeeded(artifact) => {
                self.deliver(client, "success", self.notifier.notify_success(client, prompt, artifact)).await
            }
            Outcome::Failed => {
                self.deliver(client, "failure", self.notifier.notify_failure(client, prompt, FailureReason::SubmissionFailed)).await
            }
            Outcome::Exhausted => {
                self.deliver(client, "failure", self.notifier.notify_failure(client, prompt, FailureReason::TimedOut)).await
            }
        }
    }

    async fn deliver(&self, client: &ClientId, kind: &'static str, send: impl Future<Output = Result<()>>) {
        if let Err(e) = send.await {
            warn!(client = %client, kind, error = ?e, "Notification failed");
        }
    }

    fn transition(&self, record: &TaskRecord, state: TaskState) {
        debug!(client = %record.client_id(), run_id = %record.run_id(), state = ?state, "Task state");
    }
}
