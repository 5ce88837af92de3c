#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use veobot::client::{GenerationService, StatusOutcome};
use veobot::error::ServiceError;
use veobot::notify::{FailureReason, Notifier};
use veobot::runtime::policy::PollPolicy;
use veobot::runtime::registry::TaskRegistry;
use veobot::runtime::runner::TaskRunner;
use veobot::runtime::task::{ArtifactRef, ClientId, TaskId};

/// One scripted answer to a status check.
#[derive(Debug, Clone)]
pub enum Step {
    Ready(&'static str),
    Pending,
    Fail,
    Panic,
}

/// In-process service that replays a script and records when it was called.
pub struct ScriptedService {
    task_id: Option<&'static str>,
    steps: Mutex<VecDeque<Step>>,
    created_at: Mutex<Option<Instant>>,
    status_offsets: Mutex<Vec<Duration>>,
    create_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedService {
    /// `task_id = None` makes create fail as if the body had no `taskId`.
    /// Status checks past the end of the script return pending.
    pub fn new(task_id: Option<&'static str>, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            task_id,
            steps: Mutex::new(steps.into()),
            created_at: Mutex::new(None),
            status_offsets: Mutex::new(Vec::new()),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        })
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Time of each status call, measured from the create call.
    pub fn status_offsets(&self) -> Vec<Duration> {
        self.status_offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn create(&self, _prompt: &str) -> Result<TaskId, ServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.created_at.lock().unwrap() = Some(Instant::now());
        self.task_id
            .map(TaskId::new)
            .ok_or_else(|| ServiceError::Submission("response has no taskId".to_string()))
    }

    async fn check_status(&self, _task_id: &TaskId) -> Result<StatusOutcome, ServiceError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let created_at = self.created_at.lock().unwrap().expect("status before create");
        self.status_offsets.lock().unwrap().push(created_at.elapsed());

        let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Pending);
        match step {
            Step::Ready(url) => Ok(StatusOutcome::Ready(ArtifactRef::new(url))),
            Step::Pending => Ok(StatusOutcome::Pending),
            Step::Fail => Err(ServiceError::StatusCheck("connection reset".to_string())),
            Step::Panic => panic!("scripted panic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Welcome,
    Usage,
    TooShort,
    AlreadyActive,
    Started(String),
    Waiting,
    Success(String, String),
    Failure(String, FailureReason),
}

/// Records every notification. Can be told to fail every call, and can
/// check whether the client's slot is still held when the result goes out.
pub struct RecordingNotifier {
    events: Mutex<Vec<(ClientId, Event)>>,
    fail: bool,
    registry: Option<Arc<TaskRegistry>>,
    active_at_result: Mutex<Vec<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(false, None))
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::build(true, None))
    }

    pub fn watching(registry: Arc<TaskRegistry>) -> Arc<Self> {
        Arc::new(Self::build(false, Some(registry)))
    }

    fn build(fail: bool, registry: Option<Arc<TaskRegistry>>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail,
            registry,
            active_at_result: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<(ClientId, Event)> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, client: &ClientId) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|(c, _)| c == client)
            .map(|(_, e)| e)
            .collect()
    }

    pub fn active_at_result(&self) -> Vec<bool> {
        self.active_at_result.lock().unwrap().clone()
    }

    fn record(&self, client: &ClientId, event: Event) -> Result<()> {
        if matches!(event, Event::Success(..) | Event::Failure(..)) {
            if let Some(registry) = &self.registry {
                self.active_at_result.lock().unwrap().push(registry.is_active(client));
            }
        }
        self.events.lock().unwrap().push((client.clone(), event));
        if self.fail {
            return Err(anyhow!("chat transport unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_welcome(&self, client: &ClientId) -> Result<()> {
        self.record(client, Event::Welcome)
    }

    async fn notify_usage(&self, client: &ClientId) -> Result<()> {
        self.record(client, Event::Usage)
    }

    async fn notify_rejected_too_short(&self, client: &ClientId) -> Result<()> {
        self.record(client, Event::TooShort)
    }

    async fn notify_rejected_already_active(&self, client: &ClientId) -> Result<()> {
        self.record(client, Event::AlreadyActive)
    }

    async fn notify_started(&self, client: &ClientId, prompt: &str) -> Result<()> {
        self.record(client, Event::Started(prompt.to_string()))
    }

    async fn notify_waiting(&self, client: &ClientId) -> Result<()> {
        self.record(client, Event::Waiting)
    }

    async fn notify_success(&self, client: &ClientId, prompt: &str, artifact: &ArtifactRef) -> Result<()> {
        self.record(client, Event::Success(prompt.to_string(), artifact.to_string()))
    }

    async fn notify_failure(&self, client: &ClientId, prompt: &str, reason: FailureReason) -> Result<()> {
        self.record(client, Event::Failure(prompt.to_string(), reason))
    }
}

pub fn runner(
    service: Arc<ScriptedService>,
    registry: Arc<TaskRegistry>,
    notifier: Arc<RecordingNotifier>,
) -> Arc<TaskRunner> {
    Arc::new(TaskRunner::new(service, registry, notifier, PollPolicy::default()))
}
