//! Task snapshots and the task-lifecycle event union.
//!
//! Tasks are owned by the task service; this service only ever sees them as
//! payloads of lifecycle events delivered over the event channel. The wire
//! form is `{"type": <int>, "task": {...}}`; the numeric codes are part of the
//! channel contract and any other code fails decoding.

use crate::errors::AnalyticsError;
use crate::identifiers::{BrigadeId, ObjectId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task as assigned by the task service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TaskStatus {
    /// Task registered but not yet assigned.
    Created,
    /// A brigade is working the task.
    InProgress,
    /// Terminal: the field work completed successfully.
    Done,
    /// Terminal: the task was withdrawn.
    Cancelled,
}

impl TaskStatus {
    /// Numeric wire code of this status.
    pub fn code(self) -> i32 {
        match self {
            Self::Created => 1,
            Self::InProgress => 2,
            Self::Done => 3,
            Self::Cancelled => 4,
        }
    }
}

impl From<TaskStatus> for i32 {
    fn from(status: TaskStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i32> for TaskStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Created),
            2 => Ok(Self::InProgress),
            3 => Ok(Self::Done),
            4 => Ok(Self::Cancelled),
            other => Err(format!("unknown task status code: {other}")),
        }
    }
}

/// A point-in-time snapshot of a task as carried in a lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub comment: Option<String>,
    pub plan_visit_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub brigade_id: Option<BrigadeId>,
    pub object_id: ObjectId,
}

/// Raw wire form of a task-lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEventEnvelope {
    #[serde(rename = "type")]
    pub kind: i32,
    pub task: Task,
}

/// A task-lifecycle event, one of exactly three kinds.
///
/// The union is closed on purpose: every consumer dispatches with an
/// exhaustive `match`, so introducing a new lifecycle stage is a
/// compile-time-visible change at every handling site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// The task was registered.
    Added(Task),
    /// A brigade started working the task.
    Started(Task),
    /// The task reached a terminal state.
    Finished(Task),
}

impl TaskEvent {
    const CODE_ADDED: i32 = 1;
    const CODE_STARTED: i32 = 2;
    const CODE_FINISHED: i32 = 3;

    /// Decode a single event from its JSON wire form.
    pub fn decode(payload: &[u8]) -> Result<Self, AnalyticsError> {
        let envelope: TaskEventEnvelope = serde_json::from_slice(payload)
            .map_err(|err| AnalyticsError::MalformedEvent(format!("invalid event payload: {err}")))?;
        Self::try_from(envelope)
    }

    /// The task snapshot carried by this event.
    pub fn task(&self) -> &Task {
        match self {
            Self::Added(task) | Self::Started(task) | Self::Finished(task) => task,
        }
    }
}

impl TryFrom<TaskEventEnvelope> for TaskEvent {
    type Error = AnalyticsError;

    fn try_from(envelope: TaskEventEnvelope) -> Result<Self, Self::Error> {
        match envelope.kind {
            Self::CODE_ADDED => Ok(Self::Added(envelope.task)),
            Self::CODE_STARTED => Ok(Self::Started(envelope.task)),
            Self::CODE_FINISHED => Ok(Self::Finished(envelope.task)),
            other => Err(AnalyticsError::UnknownEventType(other)),
        }
    }
}
