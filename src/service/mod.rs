//! Issue persistence layer.
//!
//! - [`IssueService`]: the data operations the HTTP layer depends on
//! - [`InMemoryIssueService`]: concurrent in-process store
//! - [`MockIssueService`]: failure-injecting wrapper for tests

pub mod memory;
pub mod mock;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::issues::{ComputerId, Issue, IssueComment, IssueComputer, IssueId, IssueStatus, NewIssue, UserId};

pub use memory::InMemoryIssueService;
pub use mock::{MockConfig, MockIssueService};

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Data operations behind the issue API.
#[async_trait]
pub trait IssueService: Send + Sync {
    /// Create an issue and return its id.
    async fn create_issue(&self, issue: NewIssue) -> ServiceResult<IssueId>;

    /// Attach computers to an existing issue, one association per id.
    async fn create_issue_computers(
        &self,
        issue_id: IssueId,
        computer_ids: &[ComputerId],
    ) -> ServiceResult<()>;

    /// All issues, ordered by id.
    async fn get_issues(&self) -> ServiceResult<Vec<Issue>>;

    /// A single issue, `None` if absent.
    async fn get_issue_by_id(&self, issue_id: IssueId) -> ServiceResult<Option<Issue>>;

    /// Associations for an issue, in insertion order.
    async fn get_computers_for_issue(&self, issue_id: IssueId)
        -> ServiceResult<Vec<IssueComputer>>;

    /// Set an issue's status. Updating an absent issue changes nothing.
    async fn update_issue_status(&self, issue_id: IssueId, status: IssueStatus)
        -> ServiceResult<()>;

    /// Set one association's status. `status` is validated here, not by the caller.
    async fn update_issue_computer_status(
        &self,
        issue_id: IssueId,
        computer_id: ComputerId,
        status: &str,
    ) -> ServiceResult<()>;

    /// Comments on an issue, oldest first.
    async fn get_issue_comments(&self, issue_id: IssueId) -> ServiceResult<Vec<IssueComment>>;

    /// Append a comment to an existing issue.
    async fn add_issue_comment(
        &self,
        issue_id: IssueId,
        user_id: UserId,
        comment: &str,
    ) -> ServiceResult<()>;

    /// Create an issue together with its computers.
    ///
    /// The default runs the two steps in sequence and leaves the issue in place
    /// if the second step fails. Backends with transactions should override it.
    async fn submit_issue(
        &self,
        issue: NewIssue,
        computer_ids: &[ComputerId],
    ) -> ServiceResult<IssueId> {
        let issue_id = self.create_issue(issue).await?;
        self.create_issue_computers(issue_id, computer_ids).await?;
        Ok(issue_id)
    }
}
