//! End-to-end submit + poll against a scripted QueryService.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use apiwatch_athena::*;
use async_trait::async_trait;

struct Sequence {
    states: Vec<QueryState>,
    cursor: AtomicUsize,
    submitted: Mutex<Vec<QueryRequest>>,
}

impl Sequence {
    fn new(states: Vec<QueryState>) -> Self {
        Self {
            states,
            cursor: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl QueryService for Sequence {
    async fn submit(&self, request: &QueryRequest) -> Result<String, AthenaError> {
        self.submitted.lock().unwrap().push(request.clone());
        Ok("exec-42".into())
    }

    async fn status(&self, _query_id: &str) -> Result<QueryStatus, AthenaError> {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        let state = self.states[i.min(self.states.len() - 1)];
        Ok(QueryStatus::new(state))
    }

    async fn cancel(&self, _query_id: &str) -> Result<(), AthenaError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_submit_then_wait() {
    let svc = Sequence::new(vec![QueryState::Queued, QueryState::Running, QueryState::Succeeded]);
    let athena = AthenaConfig::default();
    let request = ApiActivityQuery::from_report_config(&Default::default()).request(&athena);

    let id = svc.submit(&request).await.unwrap();
    let policy = PollPolicy {
        interval: Duration::from_millis(1),
        timeout: Some(Duration::from_secs(5)),
    };
    let status = wait_for_completion(&svc, &id, &policy).await.unwrap();

    assert_eq!(id, "exec-42");
    assert_eq!(status.state, QueryState::Succeeded);
    assert_eq!(svc.submitted.lock().unwrap().len(), 1);
    assert_eq!(svc.cursor.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_failed_error_names_state() {
    let svc = Sequence::new(vec![QueryState::Running, QueryState::Failed]);
    let policy = PollPolicy {
        interval: Duration::from_millis(1),
        timeout: None,
    };

    let err = wait_for_completion(&svc, "exec-1", &policy).await.unwrap_err();

    assert_eq!(err.terminal_state(), Some(QueryState::Failed));
    assert!(err.to_string().contains("FAILED"));
}
