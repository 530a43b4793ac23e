//! Engine behavior against deterministic in-memory fakes of all ports.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use field_analytics_application::{
    BrigadeLookup, DedupePolicy, EnrichmentEngine, FileTransfer, FinishedTaskStore,
    InspectionLookup, ObjectLookup, ReportArtifact, ReportEngine, ReportRecord, ReportRow,
    ReportStore,
};
use field_analytics_domain::{
    AnalyticsError, AnalyticsResult, Brigade, BrigadeId, EnrichmentSource, FileId,
    FinishedTaskRecord, Inspection, InspectionId, InspectionType, MethodBy, NewReport,
    ObjectExtended, ObjectId, ReasonType, Report, ReportId, ReportType, Resolution, StoredFile,
    Subscriber, SubscriberId, SubscriberStatus, Task, TaskEvent, TaskId, TaskStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// fakes
// ---------------------------------------------------------------------------

/// One fake standing in for all three enrichment services. A `None` slot
/// makes the corresponding lookup fail.
#[derive(Default)]
struct FakeCluster {
    inspection: Option<Inspection>,
    brigade: Option<Brigade>,
    object: Option<ObjectExtended>,
}

#[async_trait]
impl InspectionLookup for FakeCluster {
    async fn by_task_id(&self, _task_id: TaskId) -> AnalyticsResult<Inspection> {
        self.inspection
            .clone()
            .ok_or_else(|| AnalyticsError::enrichment(EnrichmentSource::Inspection, "unavailable"))
    }
}

#[async_trait]
impl BrigadeLookup for FakeCluster {
    async fn by_id(&self, _id: BrigadeId) -> AnalyticsResult<Brigade> {
        self.brigade
            .clone()
            .ok_or_else(|| AnalyticsError::enrichment(EnrichmentSource::Brigade, "unavailable"))
    }
}

#[async_trait]
impl ObjectLookup for FakeCluster {
    async fn by_id(&self, _id: ObjectId) -> AnalyticsResult<ObjectExtended> {
        self.object
            .clone()
            .ok_or_else(|| AnalyticsError::enrichment(EnrichmentSource::Object, "unavailable"))
    }
}

#[derive(Default)]
struct InMemoryFacts {
    rows: Mutex<Vec<FinishedTaskRecord>>,
}

impl InMemoryFacts {
    fn rows(&self) -> Vec<FinishedTaskRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl FinishedTaskStore for InMemoryFacts {
    async fn append(
        &self,
        record: &FinishedTaskRecord,
        policy: DedupePolicy,
    ) -> AnalyticsResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if policy == DedupePolicy::SkipDuplicates
            && rows.iter().any(|row| row.task_id == record.task_id)
        {
            return Ok(());
        }
        rows.push(record.clone());
        Ok(())
    }

    async fn by_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> AnalyticsResult<Vec<FinishedTaskRecord>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.finished_at >= period_start && row.finished_at < period_end)
            .cloned()
            .collect())
    }
}

/// In-memory report index. `fail_attachments` simulates the attachment insert
/// failing inside the transaction: the whole add is rejected and nothing
/// becomes observable.
#[derive(Default)]
struct InMemoryReports {
    records: Mutex<Vec<ReportRecord>>,
    next_id: AtomicI64,
    fail_attachments: bool,
}

#[async_trait]
impl ReportStore for InMemoryReports {
    async fn add(&self, report: NewReport) -> AnalyticsResult<Report> {
        if self.fail_attachments {
            return Err(AnalyticsError::persistence(
                "add report",
                "attachment insert failed, transaction rolled back",
            ));
        }

        let id = ReportId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created_at = Utc.with_ymd_and_hms(2026, 3, 4, 7, 0, 0).unwrap();

        self.records.lock().unwrap().push(ReportRecord {
            id,
            report_type: report.report_type,
            file_ids: report.files.iter().map(|file| file.id).collect(),
            period_start: report.period_start,
            period_end: report.period_end,
            created_at,
        });

        Ok(Report {
            id,
            report_type: report.report_type,
            files: report.files,
            period_start: report.period_start,
            period_end: report.period_end,
            created_at,
        })
    }

    async fn all(&self) -> AnalyticsResult<Vec<ReportRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct FakeFiles {
    known: Mutex<HashMap<FileId, StoredFile>>,
    uploads: Mutex<Vec<String>>,
    next_id: AtomicI64,
}

impl FakeFiles {
    fn register(&self, id: i64, name: &str) {
        let file = StoredFile {
            id: FileId::new(id),
            file_name: name.to_owned(),
            file_size: 1,
            bucket: "reports".to_owned(),
            url: format!("https://files.local/{id}"),
        };
        self.known.lock().unwrap().insert(file.id, file);
    }
}

#[async_trait]
impl FileTransfer for FakeFiles {
    async fn upload(&self, file_name: &str, content: Vec<u8>) -> AnalyticsResult<StoredFile> {
        let id = FileId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let file = StoredFile {
            id,
            file_name: file_name.to_owned(),
            file_size: content.len() as i64,
            bucket: "reports".to_owned(),
            url: format!("https://files.local/{id}"),
        };
        self.known.lock().unwrap().insert(id, file.clone());
        self.uploads.lock().unwrap().push(file_name.to_owned());
        Ok(file)
    }

    async fn by_ids(&self, ids: &[FileId]) -> AnalyticsResult<Vec<StoredFile>> {
        let known = self.known.lock().unwrap();
        Ok(ids.iter().filter_map(|id| known.get(id).cloned()).collect())
    }
}

/// Captures projected rows instead of rendering a real spreadsheet.
#[derive(Default)]
struct CapturingArtifact {
    rows: Mutex<Vec<ReportRow>>,
}

impl ReportArtifact for CapturingArtifact {
    fn render(&self, rows: &[ReportRow]) -> AnalyticsResult<Vec<u8>> {
        *self.rows.lock().unwrap() = rows.to_vec();
        Ok(b"artifact".to_vec())
    }
}

// ---------------------------------------------------------------------------
// fixtures
// ---------------------------------------------------------------------------

fn finished_task(id: i64) -> Task {
    Task {
        id: TaskId::new(id),
        comment: Some("meter sealed".to_owned()),
        plan_visit_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap()),
        started_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 6, 30, 0).unwrap()),
        finished_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()),
        status: TaskStatus::Done,
        brigade_id: Some(BrigadeId::new(4)),
        object_id: ObjectId::new(9),
    }
}

fn inspection(kind: InspectionType, resolution: Resolution) -> Inspection {
    Inspection {
        id: InspectionId::new(21),
        kind,
        resolution,
        limit_reason: Some("debt".to_owned()),
        method: "seal".to_owned(),
        method_by: MethodBy::Inspector,
        reason_type: ReasonType::Debt,
        reason_description: None,
        is_restriction_checked: true,
        is_violation_detected: false,
        is_expense_available: true,
        violation_description: None,
        is_unauthorized_consumers: false,
        unauthorized_description: None,
        unauthorized_explanation: None,
        inspected_at: Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap(),
        energy_action_at: Utc.with_ymd_and_hms(2026, 3, 2, 7, 30, 0).unwrap(),
    }
}

fn brigade() -> Brigade {
    Brigade {
        id: BrigadeId::new(4),
        inspectors: Vec::new(),
    }
}

fn object() -> ObjectExtended {
    ObjectExtended {
        id: ObjectId::new(9),
        address: "Sadovaya st. 3".to_owned(),
        have_automaton: true,
        subscriber: Subscriber {
            id: SubscriberId::new(14),
            account_number: "AC-300".to_owned(),
            surname: "Smirnov".to_owned(),
            name: "Oleg".to_owned(),
            patronymic: "Pavlovich".to_owned(),
            phone_number: "+7 900 111-22-33".to_owned(),
            email: "smirnov@example.com".to_owned(),
            tax_id: "7711111111".to_owned(),
            birth_date: "1975-11-20".to_owned(),
            status: SubscriberStatus::Suspended,
        },
    }
}

fn full_cluster() -> FakeCluster {
    FakeCluster {
        inspection: Some(inspection(InspectionType::Limitation, Resolution::Limited)),
        brigade: Some(brigade()),
        object: Some(object()),
    }
}

fn enrichment_engine(
    cluster: Arc<FakeCluster>,
    facts: Arc<InMemoryFacts>,
    dedupe: DedupePolicy,
) -> EnrichmentEngine {
    EnrichmentEngine::new(cluster.clone(), cluster.clone(), cluster, facts, dedupe)
}

struct ReportHarness {
    facts: Arc<InMemoryFacts>,
    reports: Arc<InMemoryReports>,
    files: Arc<FakeFiles>,
    artifact: Arc<CapturingArtifact>,
    engine: ReportEngine,
}

fn report_harness(fail_attachments: bool) -> ReportHarness {
    let facts = Arc::new(InMemoryFacts::default());
    let reports = Arc::new(InMemoryReports {
        fail_attachments,
        ..Default::default()
    });
    let files = Arc::new(FakeFiles::default());
    let artifact = Arc::new(CapturingArtifact::default());
    let engine = ReportEngine::new(
        facts.clone(),
        reports.clone(),
        files.clone(),
        artifact.clone(),
    );
    ReportHarness {
        facts,
        reports,
        files,
        artifact,
        engine,
    }
}

fn seeded_record(task_id: i64, kind: InspectionType, resolution: Resolution) -> FinishedTaskRecord {
    FinishedTaskRecord::from_parts(
        finished_task(task_id),
        inspection(kind, resolution),
        brigade(),
        object(),
    )
    .unwrap()
}

fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 0, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// enrichment engine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn finished_event_with_wrong_status_is_malformed_and_appends_nothing() {
    let facts = Arc::new(InMemoryFacts::default());
    let engine = enrichment_engine(
        Arc::new(full_cluster()),
        facts.clone(),
        DedupePolicy::AllowDuplicates,
    );

    let mut task = finished_task(1);
    task.status = TaskStatus::InProgress;

    let err = engine.handle(TaskEvent::Finished(task)).await.unwrap_err();

    assert!(matches!(err, AnalyticsError::MalformedEvent(_)));
    assert!(facts.rows().is_empty());
}

#[tokio::test]
async fn successful_enrichment_appends_exactly_one_round_tripped_record() {
    let cluster = Arc::new(full_cluster());
    let facts = Arc::new(InMemoryFacts::default());
    let engine = enrichment_engine(cluster.clone(), facts.clone(), DedupePolicy::AllowDuplicates);

    engine
        .handle(TaskEvent::Finished(finished_task(1)))
        .await
        .unwrap();

    let rows = facts.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].task_id, TaskId::new(1));
    assert_eq!(Some(&rows[0].inspection), cluster.inspection.as_ref());
    assert_eq!(Some(&rows[0].brigade), cluster.brigade.as_ref());
    assert_eq!(Some(&rows[0].object), cluster.object.as_ref());
    assert_eq!(rows[0].comment.as_deref(), Some("meter sealed"));
}

#[tokio::test]
async fn added_and_started_events_are_acknowledged_without_enrichment() {
    // No cluster data at all: any fetch would fail, so success proves no-op.
    let cluster = Arc::new(FakeCluster::default());
    let facts = Arc::new(InMemoryFacts::default());
    let engine = enrichment_engine(cluster, facts.clone(), DedupePolicy::AllowDuplicates);

    let mut task = finished_task(1);
    task.status = TaskStatus::Created;

    engine.handle(TaskEvent::Added(task.clone())).await.unwrap();
    engine.handle(TaskEvent::Started(task)).await.unwrap();

    assert!(facts.rows().is_empty());
}

#[tokio::test]
async fn failed_lookup_aborts_handling_and_names_its_source() {
    let cluster = Arc::new(FakeCluster {
        brigade: None,
        ..full_cluster()
    });
    let facts = Arc::new(InMemoryFacts::default());
    let engine = enrichment_engine(cluster, facts.clone(), DedupePolicy::AllowDuplicates);

    let err = engine
        .handle(TaskEvent::Finished(finished_task(1)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalyticsError::Enrichment {
            lookup: EnrichmentSource::Brigade,
            ..
        }
    ));
    assert!(facts.rows().is_empty());
}

#[tokio::test]
async fn finished_task_without_brigade_is_malformed() {
    let facts = Arc::new(InMemoryFacts::default());
    let engine = enrichment_engine(
        Arc::new(full_cluster()),
        facts.clone(),
        DedupePolicy::AllowDuplicates,
    );

    let mut task = finished_task(1);
    task.brigade_id = None;

    let err = engine.handle(TaskEvent::Finished(task)).await.unwrap_err();
    assert!(matches!(err, AnalyticsError::MalformedEvent(_)));
}

/// Documents the current non-idempotent default: redelivering the same
/// finished event appends a second row with the same task id. The
/// `SkipDuplicates` policy is the configurable fix.
#[tokio::test]
async fn redelivery_duplicates_rows_unless_dedupe_is_configured() {
    let cluster = Arc::new(full_cluster());

    let facts = Arc::new(InMemoryFacts::default());
    let engine = enrichment_engine(cluster.clone(), facts.clone(), DedupePolicy::AllowDuplicates);
    engine.handle(TaskEvent::Finished(finished_task(7))).await.unwrap();
    engine.handle(TaskEvent::Finished(finished_task(7))).await.unwrap();
    let rows = facts.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].task_id, rows[1].task_id);

    let deduped = Arc::new(InMemoryFacts::default());
    let engine = enrichment_engine(cluster, deduped.clone(), DedupePolicy::SkipDuplicates);
    engine.handle(TaskEvent::Finished(finished_task(7))).await.unwrap();
    engine.handle(TaskEvent::Finished(finished_task(7))).await.unwrap();
    assert_eq!(deduped.rows().len(), 1);
}

// ---------------------------------------------------------------------------
// report engine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_over_a_short_or_inverted_window_is_invalid() {
    let harness = report_harness(false);

    let err = harness
        .engine
        .create_basic_report(day(2), day(2))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidPeriod { days: 0 }));

    let err = harness
        .engine
        .create_basic_report(day(5), day(2))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidPeriod { days: -3 }));
}

#[tokio::test]
async fn report_over_an_empty_window_is_no_data_not_an_empty_report() {
    let harness = report_harness(false);

    let err = harness
        .engine
        .create_basic_report(day(2), day(3))
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyticsError::NoData { .. }));
    assert!(harness.reports.all().await.unwrap().is_empty());
    assert!(harness.files.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn basic_report_projects_classification_uploads_and_persists() {
    let harness = report_harness(false);
    harness
        .facts
        .append(
            &seeded_record(1, InspectionType::Resumption, Resolution::Resumed),
            DedupePolicy::AllowDuplicates,
        )
        .await
        .unwrap();
    harness
        .facts
        .append(
            &seeded_record(2, InspectionType::Limitation, Resolution::Limited),
            DedupePolicy::AllowDuplicates,
        )
        .await
        .unwrap();

    let report = harness
        .engine
        .create_basic_report(day(2), day(3))
        .await
        .unwrap();

    // Classification per row (work-result column).
    let rows = harness.artifact.rows.lock().unwrap().clone();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].number, 1);
    assert_eq!(rows[0].work_result, "Resumption");
    assert_eq!(rows[1].work_result, "Access denied");

    // Deterministic artifact name from the localized period bounds.
    let uploads = harness.files.uploads.lock().unwrap().clone();
    assert_eq!(uploads, vec!["Report 02.03.2026-03.03.2026.xlsx".to_owned()]);

    // Persisted report carries the uploaded file and normalized bounds.
    assert_eq!(report.report_type, ReportType::Basic);
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].file_name, "Report 02.03.2026-03.03.2026.xlsx");
    assert_eq!(whole_days_between(report.period_start, report.period_end), 1);

    let stored = harness.reports.all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].file_ids, vec![report.files[0].id]);
}

fn whole_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days()
}

#[tokio::test]
async fn failed_report_persistence_leaves_the_index_unchanged() {
    let harness = report_harness(true);
    harness
        .facts
        .append(
            &seeded_record(1, InspectionType::Control, Resolution::Refused),
            DedupePolicy::AllowDuplicates,
        )
        .await
        .unwrap();

    let err = harness
        .engine
        .create_basic_report(day(2), day(3))
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyticsError::Persistence { .. }));
    // Rollback: listing still returns the prior (empty) set.
    assert!(harness.engine.list_reports().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// report index reader
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listing_resolves_every_attached_file() {
    let harness = report_harness(false);
    harness.files.register(31, "a.xlsx");
    harness.files.register(32, "b.xlsx");
    harness.reports.records.lock().unwrap().push(ReportRecord {
        id: ReportId::new(1),
        report_type: ReportType::Basic,
        file_ids: vec![FileId::new(31), FileId::new(32)],
        period_start: day(2),
        period_end: day(3),
        created_at: day(3),
    });

    let reports = harness.engine.list_reports().await.unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].files.len(), 2);
    assert_eq!(reports[0].files[0].file_name, "a.xlsx");
    assert_eq!(reports[0].files[1].url, "https://files.local/32");
}

#[tokio::test]
async fn listing_fails_when_a_referenced_file_cannot_be_resolved() {
    let harness = report_harness(false);
    harness.reports.records.lock().unwrap().push(ReportRecord {
        id: ReportId::new(1),
        report_type: ReportType::Basic,
        file_ids: vec![FileId::new(99)],
        period_start: day(2),
        period_end: day(3),
        created_at: day(3),
    });

    let err = harness.engine.list_reports().await.unwrap_err();
    assert!(matches!(err, AnalyticsError::DataConsistency(_)));
}

#[tokio::test]
async fn report_without_attachments_lists_with_an_empty_file_set() {
    let harness = report_harness(false);
    harness.reports.records.lock().unwrap().push(ReportRecord {
        id: ReportId::new(1),
        report_type: ReportType::Basic,
        file_ids: Vec::new(),
        period_start: day(2),
        period_end: day(3),
        created_at: day(3),
    });

    let reports = harness.engine.list_reports().await.unwrap();

    assert_eq!(reports.len(), 1);
    assert!(reports[0].files.is_empty());
}
