//! Issue records and request payloads.

use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

/// Issue identifier.
pub type IssueId = i64;
/// User identifier.
pub type UserId = i64;
/// Computer identifier.
pub type ComputerId = i64;
/// Comment identifier.
pub type CommentId = i64;

/// Lifecycle status shared by issues and issue-computer associations.
///
/// Transitions are unconstrained: any status may follow any other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueStatus {
    /// Reported, not yet looked at.
    #[default]
    Pending,
    /// Fixed.
    Solved,
    /// Looked at and could not be fixed.
    Unsolved,
}

impl IssueStatus {
    /// All accepted statuses.
    pub const ALL: [IssueStatus; 3] = [
        IssueStatus::Pending,
        IssueStatus::Solved,
        IssueStatus::Unsolved,
    ];
}

/// A reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier, assigned by the service.
    pub issue_id: IssueId,
    /// Reporting user.
    pub user_id: UserId,
    /// Short summary.
    pub title: String,
    /// Free-form details.
    pub description: String,
    /// Current status.
    pub status: IssueStatus,
}

/// Link between an issue and one affected computer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComputer {
    /// Owning issue.
    pub issue_id: IssueId,
    /// Affected computer.
    pub computer_id: ComputerId,
    /// Per-computer status, independent of the issue status.
    pub status: IssueStatus,
}

/// Remark attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub comment_id: CommentId,
    pub issue_id: IssueId,
    /// Author.
    pub user_id: UserId,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields needed to create an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub status: IssueStatus,
}

/// Body of `POST /issues`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIssueRequest {
    /// Reporter; defaults to the authenticated caller.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub title: String,
    pub description: String,
    pub status: IssueStatus,
    pub computer_ids: Vec<ComputerId>,
}

impl CreateIssueRequest {
    /// Split into the issue fields and the computer list, filling in the reporter.
    pub fn into_parts(self, caller: UserId) -> (NewIssue, Vec<ComputerId>) {
        let issue = NewIssue {
            user_id: self.user_id.unwrap_or(caller),
            title: self.title,
            description: self.description,
            status: self.status,
        };
        (issue, self.computer_ids)
    }
}

/// Body of both status-update endpoints.
///
/// Kept as a raw string so the handlers decide how strictly to validate it.
/// A missing, null or non-string field reads as empty, which no status accepts.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Other(_) => String::new(),
    })
}

/// Body of `POST /issues/:id/comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCommentRequest {
    /// Author; defaults to the authenticated caller.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_parses_exact_wire_names() {
        assert_eq!(IssueStatus::from_str("solved").unwrap(), IssueStatus::Solved);
        assert_eq!(IssueStatus::from_str("unsolved").unwrap(), IssueStatus::Unsolved);
        assert_eq!(IssueStatus::from_str("pending").unwrap(), IssueStatus::Pending);
        assert!(IssueStatus::from_str("Solved").is_err());
        assert!(IssueStatus::from_str("closed").is_err());
        assert!(IssueStatus::from_str("").is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&IssueStatus::Unsolved).unwrap(), "\"unsolved\"");
        assert_eq!(IssueStatus::Solved.to_string(), "solved");
    }

    #[test]
    fn create_request_falls_back_to_caller() {
        let req: CreateIssueRequest = serde_json::from_value(serde_json::json!({
            "title": "No display",
            "description": "Monitor stays black",
            "status": "pending",
            "computer_ids": [7, 12]
        }))
        .unwrap();

        let (issue, computers) = req.into_parts(42);
        assert_eq!(issue.user_id, 42);
        assert_eq!(issue.status, IssueStatus::Pending);
        assert_eq!(computers, vec![7, 12]);
    }

    #[test]
    fn create_request_keeps_explicit_reporter() {
        let req: CreateIssueRequest = serde_json::from_value(serde_json::json!({
            "user_id": 3,
            "title": "t",
            "description": "d",
            "status": "solved",
            "computer_ids": []
        }))
        .unwrap();

        let (issue, _) = req.into_parts(42);
        assert_eq!(issue.user_id, 3);
    }

    #[test]
    fn status_update_tolerates_non_string_values() {
        for body in [
            serde_json::json!({ "status": null }),
            serde_json::json!({ "status": 5 }),
            serde_json::json!({ "status": ["solved"] }),
            serde_json::json!({}),
        ] {
            let req: StatusUpdateRequest = serde_json::from_value(body).unwrap();
            assert_eq!(req.status, "");
        }

        let req: StatusUpdateRequest =
            serde_json::from_value(serde_json::json!({ "status": "solved" })).unwrap();
        assert_eq!(req.status, "solved");
    }

    #[test]
    fn create_request_rejects_unknown_status() {
        let result: Result<CreateIssueRequest, _> = serde_json::from_value(serde_json::json!({
            "title": "t",
            "description": "d",
            "status": "closed",
            "computer_ids": []
        }));
        assert!(result.is_err());
    }
}
