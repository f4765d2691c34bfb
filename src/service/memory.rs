//! In-process issue store backed by concurrent maps.

use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::ServiceError;
use crate::issues::{
    CommentId, ComputerId, Issue, IssueComment, IssueComputer, IssueId, IssueStatus, NewIssue,
    UserId,
};

use super::{IssueService, ServiceResult};

/// Issue store held entirely in memory.
///
/// Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryIssueService {
    issues: DashMap<IssueId, Issue>,
    computers: DashMap<IssueId, Vec<IssueComputer>>,
    comments: DashMap<IssueId, Vec<IssueComment>>,
    next_issue_id: AtomicI64,
    next_comment_id: AtomicI64,
}

impl InMemoryIssueService {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            issues: DashMap::new(),
            computers: DashMap::new(),
            comments: DashMap::new(),
            next_issue_id: AtomicI64::new(1),
            next_comment_id: AtomicI64::new(1),
        }
    }

    /// Number of stored issues.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    fn next_comment_id(&self) -> CommentId {
        self.next_comment_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for InMemoryIssueService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IssueService for InMemoryIssueService {
    async fn create_issue(&self, issue: NewIssue) -> ServiceResult<IssueId> {
        let issue_id = self.next_issue_id.fetch_add(1, Ordering::SeqCst);
        self.issues.insert(
            issue_id,
            Issue {
                issue_id,
                user_id: issue.user_id,
                title: issue.title,
                description: issue.description,
                status: issue.status,
            },
        );
        debug!(issue_id, "issue created");
        Ok(issue_id)
    }

    async fn create_issue_computers(
        &self,
        issue_id: IssueId,
        computer_ids: &[ComputerId],
    ) -> ServiceResult<()> {
        if !self.issues.contains_key(&issue_id) {
            return Err(ServiceError::IssueNotFound(issue_id));
        }

        let mut rows = self.computers.entry(issue_id).or_default();
        for &computer_id in computer_ids {
            // one association per computer
            if rows.iter().any(|row| row.computer_id == computer_id) {
                continue;
            }
            rows.push(IssueComputer {
                issue_id,
                computer_id,
                status: IssueStatus::Pending,
            });
        }
        debug!(issue_id, count = rows.len(), "issue computers stored");
        Ok(())
    }

    async fn get_issues(&self) -> ServiceResult<Vec<Issue>> {
        let mut issues: Vec<Issue> = self.issues.iter().map(|e| e.value().clone()).collect();
        issues.sort_by_key(|issue| issue.issue_id);
        Ok(issues)
    }

    async fn get_issue_by_id(&self, issue_id: IssueId) -> ServiceResult<Option<Issue>> {
        Ok(self.issues.get(&issue_id).map(|e| e.value().clone()))
    }

    async fn get_computers_for_issue(
        &self,
        issue_id: IssueId,
    ) -> ServiceResult<Vec<IssueComputer>> {
        Ok(self
            .computers
            .get(&issue_id)
            .map(|rows| rows.value().clone())
            .unwrap_or_default())
    }

    async fn update_issue_status(
        &self,
        issue_id: IssueId,
        status: IssueStatus,
    ) -> ServiceResult<()> {
        match self.issues.get_mut(&issue_id) {
            Some(mut issue) => {
                debug!(issue_id, from = %issue.status, to = %status, "issue status updated");
                issue.status = status;
            }
            None => debug!(issue_id, "status update for unknown issue ignored"),
        }
        Ok(())
    }

    async fn update_issue_computer_status(
        &self,
        issue_id: IssueId,
        computer_id: ComputerId,
        status: &str,
    ) -> ServiceResult<()> {
        let status = IssueStatus::from_str(status)
            .map_err(|_| ServiceError::InvalidStatus(status.to_string()))?;

        if let Some(mut rows) = self.computers.get_mut(&issue_id) {
            if let Some(row) = rows.iter_mut().find(|row| row.computer_id == computer_id) {
                row.status = status;
                debug!(issue_id, computer_id, %status, "issue computer status updated");
            }
        }
        Ok(())
    }

    async fn get_issue_comments(&self, issue_id: IssueId) -> ServiceResult<Vec<IssueComment>> {
        Ok(self
            .comments
            .get(&issue_id)
            .map(|rows| rows.value().clone())
            .unwrap_or_default())
    }

    async fn add_issue_comment(
        &self,
        issue_id: IssueId,
        user_id: UserId,
        comment: &str,
    ) -> ServiceResult<()> {
        if !self.issues.contains_key(&issue_id) {
            return Err(ServiceError::IssueNotFound(issue_id));
        }

        let row = IssueComment {
            comment_id: self.next_comment_id(),
            issue_id,
            user_id,
            comment: comment.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.comments.entry(issue_id).or_default().push(row);
        Ok(())
    }
}
