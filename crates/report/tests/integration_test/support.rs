//! Test doubles for the query service and object storage.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use apiwatch_athena::{AthenaConfig, AthenaError, QueryRequest, QueryService, QueryState, QueryStatus};
use apiwatch_core::ReportConfig;
use apiwatch_report::ReportPipeline;
use apiwatch_storage::{ObjectStorage, StorageError};

pub const QUERY_ID: &str = "exec-1";

pub const SAMPLE_CSV: &str = "\
\"eventSource\",\"userAgent\",\"principal_type\",\"principal\",\"eventName\",\"frequency\"
\"s3.amazonaws.com\",\"aws-cli\",\"IAMUser\",\"arn:aws:iam::1:user/a\",\"GetObject\",\"42\"
\"sts.amazonaws.com\",\"boto3\",\"AssumedRole\",\"arn:aws:sts::1:assumed-role/ci/run\",\"AssumeRole\",\"30\"
\"s3.amazonaws.com\",\"aws-cli\",\"IAMUser\",\"arn:aws:iam::1:user/a\",\"ListBuckets\",\"12\"
\"kms.amazonaws.com\",\"AWS Internal\",\"AWSService\",\"UNKNOWN\",\"Decrypt\",\"9\"
\"s3.amazonaws.com\",\"console\",\"Root\",\"arn:aws:iam::1:root\",\"PutObject\",\"4\"
\"ec2.amazonaws.com\",\"console\",\"Root\",\"arn:aws:iam::1:root\",\"DescribeInstances\",\"2\"
";

// ── Query service ───────────────────────────────────────────────────

/// Replays scripted states; the last one repeats.
pub struct FakeQueries {
    states: Mutex<VecDeque<QueryState>>,
    last: Mutex<Option<QueryState>>,
    pub submitted: Mutex<Vec<QueryRequest>>,
    pub status_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
}

impl FakeQueries {
    pub fn new(states: &[QueryState]) -> Self {
        Self {
            states: Mutex::new(states.iter().copied().collect()),
            last: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QueryService for FakeQueries {
    async fn submit(&self, request: &QueryRequest) -> Result<String, AthenaError> {
        self.submitted.lock().unwrap().push(request.clone());
        Ok(QUERY_ID.to_string())
    }

    async fn status(&self, _query_id: &str) -> Result<QueryStatus, AthenaError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.states.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if next.is_some() {
            *last = next;
        }
        let state = (*last).unwrap_or(QueryState::Queued);
        let status = QueryStatus::new(state);
        Ok(match state {
            QueryState::Failed => status.with_reason("SYNTAX_ERROR: bad table"),
            _ => status,
        })
    }

    async fn cancel(&self, _query_id: &str) -> Result<(), AthenaError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Object storage ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// In-memory buckets with call counters.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
    pub presigns: AtomicUsize,
}

impl MemoryStorage {
    pub fn with_object(bucket: &str, key: &str, body: &str) -> Self {
        let storage = Self::default();
        storage.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: Bytes::from(body.to_string()),
                content_type: "text/csv".into(),
            },
        );
        storage
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.object(bucket, key)
            .map(|o| o.body)
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.presigns.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://{}.s3.amazonaws.com/{}?X-Amz-Expires={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}

// ── Wiring ──────────────────────────────────────────────────────────

pub fn fast_athena_config() -> AthenaConfig {
    AthenaConfig {
        output_bucket: "my-athena-queries".into(),
        poll_interval_ms: 1,
        timeout_seconds: 5,
        ..AthenaConfig::default()
    }
}

/// Storage pre-seeded with the CSV Athena would write for [`QUERY_ID`].
pub fn seeded_storage(athena: &AthenaConfig, csv: &str) -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::with_object(
        &athena.output_bucket,
        &athena.result_key(QUERY_ID),
        csv,
    ))
}

pub fn pipeline(
    queries: Arc<FakeQueries>,
    storage: Arc<MemoryStorage>,
    athena: AthenaConfig,
    report: ReportConfig,
) -> ReportPipeline {
    ReportPipeline::new(queries, storage, athena, report)
}
