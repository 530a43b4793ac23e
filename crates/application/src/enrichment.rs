//! Enrichment engine: task-lifecycle event handling.
//!
//! One event in, at most one fact row out. `Added` and `Started` are
//! acknowledged no-ops reserved for future behavior; `Finished` joins the
//! task with the three authoritative services and appends the denormalized
//! record. The engine never retries: a failed event is reported up and left
//! to the channel's redelivery.

use crate::ports::{BrigadeLookup, DedupePolicy, FinishedTaskStore, InspectionLookup, ObjectLookup};
use field_analytics_domain::{
    AnalyticsError, AnalyticsResult, FinishedTaskRecord, Task, TaskEvent, TaskStatus,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Consumes task-lifecycle events and maintains the fact store.
pub struct EnrichmentEngine {
    inspections: Arc<dyn InspectionLookup>,
    brigades: Arc<dyn BrigadeLookup>,
    objects: Arc<dyn ObjectLookup>,
    facts: Arc<dyn FinishedTaskStore>,
    dedupe: DedupePolicy,
}

impl EnrichmentEngine {
    pub fn new(
        inspections: Arc<dyn InspectionLookup>,
        brigades: Arc<dyn BrigadeLookup>,
        objects: Arc<dyn ObjectLookup>,
        facts: Arc<dyn FinishedTaskStore>,
        dedupe: DedupePolicy,
    ) -> Self {
        Self {
            inspections,
            brigades,
            objects,
            facts,
            dedupe,
        }
    }

    /// Handle one task-lifecycle event.
    #[instrument(skip_all, fields(task_id = %event.task().id))]
    pub async fn handle(&self, event: TaskEvent) -> AnalyticsResult<()> {
        match event {
            TaskEvent::Added(task) => {
                debug!(task_id = %task.id, "task added, nothing to enrich");
                Ok(())
            }
            TaskEvent::Started(task) => {
                debug!(task_id = %task.id, "task started, nothing to enrich");
                Ok(())
            }
            TaskEvent::Finished(task) => self.handle_finished(task).await,
        }
    }

    async fn handle_finished(&self, task: Task) -> AnalyticsResult<()> {
        if task.status != TaskStatus::Done {
            return Err(AnalyticsError::MalformedEvent(format!(
                "finished event for task {} carries status code {}",
                task.id,
                task.status.code()
            )));
        }

        let brigade_id = task.brigade_id.ok_or_else(|| {
            AnalyticsError::MalformedEvent(format!("finished task {} has no brigade", task.id))
        })?;

        // The three lookups are independent; all of them run to completion so
        // none is left dangling, then the first failure (in lookup order)
        // aborts the handling.
        let (inspection, brigade, object) = tokio::join!(
            self.inspections.by_task_id(task.id),
            self.brigades.by_id(brigade_id),
            self.objects.by_id(task.object_id),
        );
        let inspection = inspection?;
        let brigade = brigade?;
        let object = object?;

        let record = FinishedTaskRecord::from_parts(task, inspection, brigade, object)?;

        debug!(task_id = %record.task_id, "appending finished task record");
        self.facts.append(&record, self.dedupe).await
    }
}
