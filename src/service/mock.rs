//! Mock issue service for unit testing.
//!
//! Delegates to an [`InMemoryIssueService`] and can be told to fail groups of
//! operations, so the HTTP layer's error paths can be exercised without a real
//! backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::issues::{
    ComputerId, Issue, IssueComment, IssueComputer, IssueId, IssueStatus, NewIssue, UserId,
};

use super::{InMemoryIssueService, IssueService, ServiceResult};

/// Configuration for mock service behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Fail every read operation.
    pub fail_reads: bool,
    /// Fail every write operation.
    pub fail_writes: bool,
    /// Fail only `create_issue_computers`.
    pub fail_computer_insert: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock issue service for testing.
#[derive(Debug, Default)]
pub struct MockIssueService {
    inner: InMemoryIssueService,
    config: Mutex<MockConfig>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MockIssueService {
    /// Create a mock that behaves like the in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config: Mutex::new(config),
            ..Self::default()
        }
    }

    /// Replace the failure configuration.
    pub fn set_config(&self, config: MockConfig) {
        if let Ok(mut current) = self.config.lock() {
            *current = config;
        }
    }

    /// Number of read calls seen.
    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write calls seen.
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The wrapped store, for inspecting state directly.
    pub fn store(&self) -> &InMemoryIssueService {
        &self.inner
    }

    fn snapshot(&self) -> MockConfig {
        self.config
            .lock()
            .map(|config| config.clone())
            .unwrap_or_default()
    }

    async fn before_read(&self, op: &str) -> ServiceResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let config = self.snapshot();
        simulate_latency(config.latency_ms).await;
        if config.fail_reads {
            return Err(ServiceError::Unavailable(format!("mock read failure in {}", op)));
        }
        Ok(())
    }

    async fn before_write(&self, op: &str) -> ServiceResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let config = self.snapshot();
        simulate_latency(config.latency_ms).await;
        if config.fail_writes {
            return Err(ServiceError::Unavailable(format!("mock write failure in {}", op)));
        }
        Ok(())
    }
}

async fn simulate_latency(latency_ms: u64) {
    if latency_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(latency_ms)).await;
    }
}

#[async_trait]
impl IssueService for MockIssueService {
    async fn create_issue(&self, issue: NewIssue) -> ServiceResult<IssueId> {
        self.before_write("create_issue").await?;
        self.inner.create_issue(issue).await
    }

    async fn create_issue_computers(
        &self,
        issue_id: IssueId,
        computer_ids: &[ComputerId],
    ) -> ServiceResult<()> {
        self.before_write("create_issue_computers").await?;
        if self.snapshot().fail_computer_insert {
            return Err(ServiceError::Unavailable(
                "mock failure in create_issue_computers".to_string(),
            ));
        }
        self.inner.create_issue_computers(issue_id, computer_ids).await
    }

    async fn get_issues(&self) -> ServiceResult<Vec<Issue>> {
        self.before_read("get_issues").await?;
        self.inner.get_issues().await
    }

    async fn get_issue_by_id(&self, issue_id: IssueId) -> ServiceResult<Option<Issue>> {
        self.before_read("get_issue_by_id").await?;
        self.inner.get_issue_by_id(issue_id).await
    }

    async fn get_computers_for_issue(
        &self,
        issue_id: IssueId,
    ) -> ServiceResult<Vec<IssueComputer>> {
        self.before_read("get_computers_for_issue").await?;
        self.inner.get_computers_for_issue(issue_id).await
    }

    async fn update_issue_status(
        &self,
        issue_id: IssueId,
        status: IssueStatus,
    ) -> ServiceResult<()> {
        self.before_write("update_issue_status").await?;
        self.inner.update_issue_status(issue_id, status).await
    }

    async fn update_issue_computer_status(
        &self,
        issue_id: IssueId,
        computer_id: ComputerId,
        status: &str,
    ) -> ServiceResult<()> {
        self.before_write("update_issue_computer_status").await?;
        self.inner
            .update_issue_computer_status(issue_id, computer_id, status)
            .await
    }

    async fn get_issue_comments(&self, issue_id: IssueId) -> ServiceResult<Vec<IssueComment>> {
        self.before_read("get_issue_comments").await?;
        self.inner.get_issue_comments(issue_id).await
    }

    async fn add_issue_comment(
        &self,
        issue_id: IssueId,
        user_id: UserId,
        comment: &str,
    ) -> ServiceResult<()> {
        self.before_write("add_issue_comment").await?;
        self.inner.add_issue_comment(issue_id, user_id, comment).await
    }
}
