use crate::{
    application::{
        list_comments::dto::{CommentCount, CommentListResponse},
        post_comment::dto::{CommentForm, CommentSubmission, SubmissionOutcome},
    },
    domain::{
        comment::{entity::Comment, errors::CommentError, validation::ValidationResult},
        target::{entity::TypeTag, locator::TargetSpec},
    },
    presentation::http::{
        errors::AppError, middleware::user::resolve_actor, state::AppState, templates,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const POSTED_URL: &str = "/comments/posted";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FormQuery {
    pub is_ajax: Option<String>,
}

impl FormQuery {
    fn is_ajax(&self) -> bool {
        self.is_ajax.as_deref().is_some_and(|v| !v.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct PostedQuery {
    pub c: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub form: CommentForm,
    pub templates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub comment: Comment,
    pub duplicate: bool,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub result: ValidationResult,
    pub templates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PostedResponse {
    pub comment: Option<Comment>,
    pub templates: Vec<String>,
}

fn reject(state: &AppState) -> impl Fn(CommentError) -> AppError + '_ {
    move |err| AppError::from_comment_error(err, state.config.debug)
}

fn tag_of(type_tag: &str) -> Option<TypeTag> {
    TypeTag::parse(type_tag)
}

/// Relative `next` targets only; anything else falls back to the confirmation page.
fn redirect_target(next: Option<&str>, comment_id: Uuid) -> String {
    let base = next
        .filter(|n| n.starts_with('/') && !n.starts_with("//"))
        .unwrap_or(POSTED_URL);
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}c={}", base, separator, comment_id)
}

fn outcome_response(outcome: SubmissionOutcome, next: Option<&str>) -> Response {
    let duplicate = matches!(outcome, SubmissionOutcome::Duplicate(_));
    match outcome {
        SubmissionOutcome::Saved(comment) | SubmissionOutcome::Duplicate(comment) => {
            Json(SavedResponse {
                redirect: redirect_target(next, comment.id),
                comment,
                duplicate,
            })
            .into_response()
        }
        SubmissionOutcome::Preview(result) => {
            let templates = tag_of(&result.draft.target_type)
                .map(|tag| templates::preview_templates(&tag))
                .unwrap_or_default();
            Json(PreviewResponse { result, templates }).into_response()
        }
    }
}

fn form_response(form: CommentForm, query: &FormQuery) -> Json<FormResponse> {
    let templates = tag_of(&form.content_type)
        .map(|tag| templates::edit_form_templates(&tag, query.is_ajax()))
        .unwrap_or_default();
    Json(FormResponse { form, templates })
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path((ctype, pk)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    let listing = state
        .listing
        .render_comment_list(&ctype, &pk, query.sort.as_deref(), query.page)
        .await
        .map_err(reject(&state))?;
    let templates = tag_of(&listing.target.key.type_tag)
        .map(|tag| templates::list_templates(&tag))
        .unwrap_or_default();
    Ok(Json(listing.into_response(templates)))
}

pub async fn count_comments(
    State(state): State<AppState>,
    Path((ctype, pk)): Path<(String, String)>,
) -> Result<Json<CommentCount>, AppError> {
    let count = state
        .listing
        .count_comments(&ctype, &pk)
        .await
        .map_err(reject(&state))?;
    Ok(Json(count))
}

pub async fn new_comment_form(
    State(state): State<AppState>,
    Path((ctype, pk)): Path<(String, String)>,
    Query(query): Query<FormQuery>,
) -> Result<Json<FormResponse>, AppError> {
    let form = state
        .lifecycle
        .new_comment_form(TargetSpec::Explicit {
            type_tag: ctype,
            primary_key: pk,
        })
        .await
        .map_err(reject(&state))?;
    Ok(form_response(form, &query))
}

pub async fn reply_form(
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
    Query(query): Query<FormQuery>,
) -> Result<Json<FormResponse>, AppError> {
    let form = state
        .lifecycle
        .new_comment_form(TargetSpec::Parent(parent_id))
        .await
        .map_err(reject(&state))?;
    Ok(form_response(form, &query))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Query(query): Query<FormQuery>,
    headers: HeaderMap,
) -> Result<Json<FormResponse>, AppError> {
    let actor = resolve_actor(&headers, &state.config.jwt_secret);
    let form = state
        .lifecycle
        .edit_comment_form(comment_id, &actor)
        .await
        .map_err(reject(&state))?;
    Ok(form_response(form, &query))
}

async fn submit(
    state: &AppState,
    headers: &HeaderMap,
    submission: CommentSubmission,
) -> Result<Response, AppError> {
    let actor = resolve_actor(headers, &state.config.jwt_secret);
    let next = submission.next.clone();
    let outcome = state
        .lifecycle
        .submit_comment(submission, &actor)
        .await
        .map_err(reject(state))?;
    Ok(outcome_response(outcome, next.as_deref()))
}

/// Target fields come from the body.
pub async fn post_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<CommentSubmission>,
) -> Result<Response, AppError> {
    submit(&state, &headers, submission).await
}

/// Target fields come from the path and override the body.
pub async fn post_new_comment(
    State(state): State<AppState>,
    Path((ctype, pk)): Path<(String, String)>,
    headers: HeaderMap,
    Json(submission): Json<CommentSubmission>,
) -> Result<Response, AppError> {
    let submission = CommentSubmission {
        content_type: Some(ctype),
        object_pk: Some(pk),
        parent_pk: None,
        ..submission
    };
    submit(&state, &headers, submission).await
}

pub async fn post_reply(
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
    headers: HeaderMap,
    Json(submission): Json<CommentSubmission>,
) -> Result<Response, AppError> {
    let submission = CommentSubmission {
        parent_pk: Some(parent_id),
        ..submission
    };
    submit(&state, &headers, submission).await
}

pub async fn post_edit(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    headers: HeaderMap,
    Json(submission): Json<CommentSubmission>,
) -> Result<Response, AppError> {
    let actor = resolve_actor(&headers, &state.config.jwt_secret);
    let next = submission.next.clone();
    let outcome = state
        .lifecycle
        .edit_comment(comment_id, submission, &actor)
        .await
        .map_err(reject(&state))?;
    Ok(outcome_response(outcome, next.as_deref()))
}

/// Confirmation after a post. An unknown or malformed `c` still renders the
/// page, without a comment.
pub async fn comment_posted(
    State(state): State<AppState>,
    Query(query): Query<PostedQuery>,
) -> Result<Json<PostedResponse>, AppError> {
    let comment = match query.c.as_deref().and_then(|c| Uuid::parse_str(c).ok()) {
        Some(id) => state.comments.get(id).await.map_err(reject(&state))?,
        None => None,
    };
    Ok(Json(PostedResponse {
        comment,
        templates: templates::posted_templates(),
    }))
}

pub async fn view_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let url = state
        .links
        .comment_url(comment_id)
        .await
        .map_err(reject(&state))?;
    Ok(Redirect::to(&url))
}
