//! Issue endpoint handlers.
//!
//! Each handler makes its service calls, turns a missing issue or a bad status
//! into a client error, and turns every service failure into a 500 with a fixed
//! message. The failure itself is only logged.

use std::future::Future;
use std::str::FromStr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ServiceError};
use crate::issues::{
    AddCommentRequest, ComputerId, CreateIssueRequest, Issue, IssueComment, IssueComputer,
    IssueId, IssueStatus, StatusUpdateRequest,
};
use crate::metrics;
use crate::service::ServiceResult;

use super::extract::{ApiJson, ApiPath};
use super::handlers::AppState;

/// `GET /issues` response.
#[derive(Debug, Serialize)]
pub struct IssuesResponse {
    pub issues: Vec<Issue>,
}

/// `GET /issues/:id` response.
#[derive(Debug, Serialize)]
pub struct IssueDetailResponse {
    pub issue: Issue,
    pub computers: Vec<IssueComputer>,
}

/// `POST /issues` response.
#[derive(Debug, Serialize)]
pub struct CreatedIssueResponse {
    pub issue_id: IssueId,
}

/// `GET /issues/:id/comments` response.
#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<IssueComment>,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn timed<T>(call: impl Future<Output = ServiceResult<T>>) -> ServiceResult<T> {
    let timer = metrics::timer_service_call();
    let result = call.await;
    debug!(elapsed_ms = timer.elapsed_ms(), ok = result.is_ok(), "service call finished");
    result
}

fn failed(operation: &'static str, message: &'static str) -> impl FnOnce(ServiceError) -> ApiError {
    move |source| {
        metrics::inc_service_failures(operation);
        ApiError::internal(message)(source)
    }
}

/// GET /issues
pub async fn list_issues(State(state): State<AppState>) -> Result<Json<IssuesResponse>, ApiError> {
    let issues = timed(state.service.get_issues())
        .await
        .map_err(failed("get_issues", "Error fetching issues"))?;

    Ok(Json(IssuesResponse { issues }))
}

/// GET /issues/:id
pub async fn get_issue(
    State(state): State<AppState>,
    ApiPath(issue_id): ApiPath<IssueId>,
) -> Result<Json<IssueDetailResponse>, ApiError> {
    const FAILED: &str = "Error fetching issue";

    let issue = timed(state.service.get_issue_by_id(issue_id))
        .await
        .map_err(failed("get_issue_by_id", FAILED))?
        .ok_or(ApiError::NotFound("Issue not found"))?;

    let computers = timed(state.service.get_computers_for_issue(issue.issue_id))
        .await
        .map_err(failed("get_computers_for_issue", FAILED))?;

    Ok(Json(IssueDetailResponse { issue, computers }))
}

/// POST /issues
#[instrument(skip_all, fields(caller = user.id))]
pub async fn create_issue(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(req): ApiJson<CreateIssueRequest>,
) -> Result<(StatusCode, Json<CreatedIssueResponse>), ApiError> {
    let (issue, computer_ids) = req.into_parts(user.id);

    let issue_id = timed(state.service.submit_issue(issue, &computer_ids))
        .await
        .map_err(failed("submit_issue", "Error creating issue"))?;

    metrics::inc_issues_created();
    info!(issue_id, computers = computer_ids.len(), "issue reported");

    Ok((StatusCode::CREATED, Json(CreatedIssueResponse { issue_id })))
}

/// PUT /issues/:id/status
#[instrument(skip_all, fields(caller = user.id, issue_id = issue_id))]
pub async fn update_issue_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(issue_id): ApiPath<IssueId>,
    ApiJson(req): ApiJson<StatusUpdateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let status =
        IssueStatus::from_str(&req.status).map_err(|_| ApiError::Validation("Invalid status"))?;

    timed(state.service.update_issue_status(issue_id, status))
        .await
        .map_err(failed("update_issue_status", "Failed to update issue status"))?;

    info!(%status, "issue status changed");
    Ok(Json(MessageResponse {
        message: "Status updated",
    }))
}

/// PUT /issues/:id/computer/:computer_id
#[instrument(skip_all, fields(caller = user.id, issue_id = issue_id, computer_id = computer_id))]
pub async fn update_issue_computer_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath((issue_id, computer_id)): ApiPath<(IssueId, ComputerId)>,
    ApiJson(req): ApiJson<StatusUpdateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    timed(
        state
            .service
            .update_issue_computer_status(issue_id, computer_id, &req.status),
    )
    .await
    .map_err(failed(
        "update_issue_computer_status",
        "Error updating computer issue status",
    ))?;

    info!(status = %req.status, "issue computer status changed");
    Ok(Json(MessageResponse {
        message: "Computer issue status updated",
    }))
}

/// GET /issues/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(issue_id): ApiPath<IssueId>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let comments = timed(state.service.get_issue_comments(issue_id))
        .await
        .map_err(failed("get_issue_comments", "Failed to fetch comments"))?;

    Ok(Json(CommentsResponse { comments }))
}

/// POST /issues/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(issue_id): ApiPath<IssueId>,
    ApiJson(req): ApiJson<AddCommentRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let author = req.user_id.unwrap_or(user.id);

    timed(state.service.add_issue_comment(issue_id, author, &req.comment))
        .await
        .map_err(failed("add_issue_comment", "Failed to add comment"))?;

    metrics::inc_comments_added();
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Comment added",
        }),
    ))
}
