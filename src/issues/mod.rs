//! Issue domain types.

pub mod types;

pub use types::{
    AddCommentRequest, CommentId, ComputerId, CreateIssueRequest, Issue, IssueComment,
    IssueComputer, IssueId, IssueStatus, NewIssue, StatusUpdateRequest, UserId,
};
