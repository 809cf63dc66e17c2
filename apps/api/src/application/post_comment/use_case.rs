use super::dto::{
    CommentForm, CommentSubmission, FormInitial, MAX_USER_EMAIL_LENGTH, MAX_USER_NAME_LENGTH,
    MAX_USER_URL_LENGTH, SubmissionOutcome,
};
use crate::{
    domain::{
        comment::{
            entity::{Comment, EDIT_FLAG},
            errors::CommentError,
            events::{CommentEvent, ObserverRegistry},
            permissions::{Actor, Authorizer, Capability},
            repository::CommentRepository,
            validation::{FieldError, FieldErrorCode, ValidationResult},
        },
        target::{
            entity::TargetRef,
            locator::{ContentLocator, TargetSpec},
        },
    },
    infrastructure::security::{
        ContentPolicy, SecurityHashCodec, TimestampRule, security_hash::check_timestamp,
    },
};
use chrono::{Duration, TimeZone, Utc};
use sqlx::types::ipnetwork::IpNetwork;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionMode {
    New(TargetSpec),
    Edit(Uuid),
}

/// A comment being created or edited, with its resolved target.
#[derive(Debug, Clone)]
pub struct Draft {
    pub comment: Comment,
    pub target: TargetRef,
    pub is_new: bool,
}

/// Create and edit flow for a single comment.
pub struct CommentLifecycle {
    locator: Arc<ContentLocator>,
    comments: Arc<dyn CommentRepository>,
    codec: Arc<SecurityHashCodec>,
    policy: ContentPolicy,
    authorizer: Arc<dyn Authorizer>,
    observers: Arc<ObserverRegistry>,
}

impl CommentLifecycle {
    pub fn new(
        locator: Arc<ContentLocator>,
        comments: Arc<dyn CommentRepository>,
        codec: Arc<SecurityHashCodec>,
        policy: ContentPolicy,
        authorizer: Arc<dyn Authorizer>,
        observers: Arc<ObserverRegistry>,
    ) -> Self {
        Self {
            locator,
            comments,
            codec,
            policy,
            authorizer,
            observers,
        }
    }

    /// Resolves the target and prepares the comment the submission applies to.
    pub async fn build(&self, mode: &SubmissionMode) -> Result<Draft, CommentError> {
        match mode {
            SubmissionMode::New(spec) => {
                let resolved = self.locator.resolve_spec(spec).await?;
                let mut comment = Comment::draft(&resolved.target.key, Utc::now());
                if let Some(parent) = &resolved.parent {
                    comment.attach_to(parent);
                }
                Ok(Draft {
                    comment,
                    target: resolved.target,
                    is_new: true,
                })
            }
            SubmissionMode::Edit(id) => {
                let comment = self
                    .comments
                    .get(*id)
                    .await?
                    .ok_or(CommentError::CommentNotFound(*id))?;
                let target = self.locator.resolve_comment(&comment).await?;
                Ok(Draft {
                    comment,
                    target,
                    is_new: false,
                })
            }
        }
    }

    /// Hidden security fields and presentation data for `draft`.
    ///
    /// Edit forms sign the comment's stored submission time, so re-rendering
    /// one always yields the same token.
    pub fn form(&self, draft: &Draft) -> CommentForm {
        let key = &draft.target.key;
        let timestamp = draft.comment.submit_timestamp();
        let (action_url, title) = match (draft.is_new, draft.comment.parent_id) {
            (true, Some(parent)) => (format!("/comments/reply/{}", parent), "Post a reply"),
            (true, None) => (
                format!("/comments/new/{}/{}", key.type_tag, key.primary_key),
                "Post new comment",
            ),
            (false, _) => (format!("/comments/edit/{}", draft.comment.id), "Edit comment"),
        };
        let initial = if draft.is_new {
            FormInitial::default()
        } else {
            FormInitial {
                user_name: draft.comment.user_name.clone(),
                user_email: draft.comment.user_email.clone(),
                user_url: draft.comment.user_url.clone(),
                comment: draft.comment.body.clone(),
            }
        };
        CommentForm {
            content_type: key.type_tag.clone(),
            object_pk: key.primary_key.clone(),
            timestamp,
            security_hash: self.codec.issue(&key.type_tag, &key.primary_key, timestamp),
            parent_pk: draft.comment.parent_id.filter(|_| draft.is_new),
            action_url,
            title: title.to_string(),
            target: draft.target.clone(),
            initial,
        }
    }

    pub fn can_create(&self, actor: &Actor) -> bool {
        self.authorizer.has_capability(actor, Capability::AddComment)
    }

    /// Owner with change permission, or any moderator.
    pub fn can_edit(&self, comment: &Comment, actor: &Actor) -> bool {
        let is_owner = matches!((actor.user_id(), comment.user_id), (Some(a), Some(b)) if a == b);
        (is_owner && self.authorizer.has_capability(actor, Capability::ChangeComment))
            || self.authorizer.has_capability(actor, Capability::CanModerate)
    }

    pub async fn new_comment_form(&self, spec: TargetSpec) -> Result<CommentForm, CommentError> {
        let draft = self.build(&SubmissionMode::New(spec)).await?;
        Ok(self.form(&draft))
    }

    pub async fn edit_comment_form(&self, id: Uuid, actor: &Actor) -> Result<CommentForm, CommentError> {
        let draft = self.build(&SubmissionMode::Edit(id)).await?;
        if !self.can_edit(&draft.comment, actor) {
            return Err(CommentError::Unauthorized);
        }
        Ok(self.form(&draft))
    }

    #[instrument(skip(self, submission, actor), fields(authenticated = actor.is_authenticated()))]
    pub async fn submit_comment(
        &self,
        submission: CommentSubmission,
        actor: &Actor,
    ) -> Result<SubmissionOutcome, CommentError> {
        let submission = submission.normalized();
        let spec = TargetSpec::from_parts(
            submission.content_type.as_deref(),
            submission.object_pk.as_deref(),
            submission.parent_pk,
        )?;
        let draft = self.build(&SubmissionMode::New(spec)).await?;
        if !self.can_create(actor) {
            return Err(CommentError::Unauthorized);
        }
        self.process(draft, submission, actor).await
    }

    #[instrument(skip(self, submission, actor))]
    pub async fn edit_comment(
        &self,
        comment_id: Uuid,
        submission: CommentSubmission,
        actor: &Actor,
    ) -> Result<SubmissionOutcome, CommentError> {
        let draft = self.build(&SubmissionMode::Edit(comment_id)).await?;
        if !self.can_edit(&draft.comment, actor) {
            return Err(CommentError::Unauthorized);
        }
        self.process(draft, submission.normalized(), actor).await
    }

    async fn process(
        &self,
        mut draft: Draft,
        submission: CommentSubmission,
        actor: &Actor,
    ) -> Result<SubmissionOutcome, CommentError> {
        let errors = self.validate(&mut draft, &submission, actor)?;
        if submission.preview || !errors.is_empty() {
            let key = &draft.target.key;
            let timestamp = submission.timestamp.unwrap_or_else(|| draft.comment.submit_timestamp());
            let token = self.codec.token(&key.type_tag, &key.primary_key, timestamp);
            return Ok(SubmissionOutcome::Preview(ValidationResult {
                draft: draft.comment,
                errors,
                preview: submission.preview,
                token,
            }));
        }
        self.save(draft, actor).await
    }

    /// Security checks first (fatal), then field checks (returned).
    ///
    /// Applies the submitted fields to the draft. Blank name and email fall
    /// back to the stored values on edits and to the actor's profile on new
    /// comments.
    pub fn validate(
        &self,
        draft: &mut Draft,
        submission: &CommentSubmission,
        actor: &Actor,
    ) -> Result<Vec<FieldError>, CommentError> {
        self.policy.check_honeypot(submission.honeypot.as_deref())?;

        let timestamp = submission.timestamp.ok_or(CommentError::TimestampInvalid)?;
        let rule = if draft.is_new {
            TimestampRule::Fresh {
                now: Utc::now().timestamp(),
            }
        } else {
            TimestampRule::MatchesSubmission(draft.comment.submit_timestamp())
        };
        check_timestamp(timestamp, rule)?;

        let digest = submission
            .security_hash
            .as_deref()
            .ok_or(CommentError::SecurityHashInvalid)?;
        let key = &draft.target.key;
        self.codec
            .check_digest(&key.type_tag, &key.primary_key, timestamp, digest)?;

        let mut errors = field_errors(submission);
        errors.extend(self.policy.validate_body(&submission.comment));

        let user = actor.user.as_ref();
        let comment = &mut draft.comment;
        fill(
            &mut comment.user_name,
            submission.user_name.as_deref(),
            user.map(|u| u.display_name.as_str()),
        );
        fill(
            &mut comment.user_email,
            submission.user_email.as_deref(),
            user.map(|u| u.email.as_str()),
        );
        fill(&mut comment.user_url, submission.user_url.as_deref(), None);
        comment.body = submission.comment.clone();

        // Fallbacks bypass the form validators.
        for (field, value, max) in [
            ("user_name", &comment.user_name, MAX_USER_NAME_LENGTH),
            ("user_email", &comment.user_email, MAX_USER_EMAIL_LENGTH),
            ("user_url", &comment.user_url, MAX_USER_URL_LENGTH),
        ] {
            if value.chars().count() > max && !errors.iter().any(|e| e.field == field) {
                errors.push(FieldError::new(
                    field,
                    FieldErrorCode::TooLong,
                    format!("Ensure this value has at most {} characters.", max),
                ));
            }
        }

        Ok(errors)
    }

    /// Same target, same author, same UTC day and identical body.
    pub async fn detect_duplicate(&self, comment: &Comment) -> Result<Option<Comment>, CommentError> {
        let Some(midnight) = comment.submitted_at.date_naive().and_hms_opt(0, 0, 0) else {
            return Ok(None);
        };
        let from = Utc.from_utc_datetime(&midnight);
        let candidates = self
            .comments
            .find_submitted_between(&comment.target_key(), from, from + Duration::days(1))
            .await?;
        let author = comment.author();
        Ok(candidates
            .into_iter()
            .find(|c| c.id != comment.id && c.body == comment.body && c.author().matches(&author)))
    }

    pub async fn save(&self, draft: Draft, actor: &Actor) -> Result<SubmissionOutcome, CommentError> {
        let mut comment = draft.comment;

        if !draft.is_new {
            let user_id = actor.user_id().ok_or(CommentError::Unauthorized)?;
            let (flag, created) = self
                .comments
                .get_or_create_flag(comment.id, user_id, EDIT_FLAG)
                .await?;
            let saved = self.comments.update(&comment).await?;
            info!(comment_id = %saved.id, editor = %user_id, "comment edited");
            self.observers
                .publish(&CommentEvent::WasEdited {
                    comment: saved.clone(),
                    flag,
                    created,
                })
                .await;
            return Ok(SubmissionOutcome::Saved(saved));
        }

        comment.ip_address = actor.ip.map(IpNetwork::from);
        if let Some(user) = &actor.user {
            comment.user_id = Some(user.id);
        }

        if let Some(existing) = self.detect_duplicate(&comment).await? {
            info!(comment_id = %existing.id, "duplicate submission, returning existing comment");
            return Ok(SubmissionOutcome::Duplicate(existing));
        }

        self.observers
            .dispatch_vetoable(&CommentEvent::WillBePosted {
                comment: comment.clone(),
            })
            .await?;
        let saved = self.comments.insert(&comment).await?;
        info!(comment_id = %saved.id, target = %saved.target_key(), level = saved.level, "comment posted");
        self.observers
            .publish(&CommentEvent::WasPosted {
                comment: saved.clone(),
            })
            .await;
        Ok(SubmissionOutcome::Saved(saved))
    }
}

fn fill(current: &mut String, submitted: Option<&str>, fallback: Option<&str>) {
    match submitted {
        Some(value) => *current = value.to_string(),
        None if current.is_empty() => {
            if let Some(value) = fallback {
                *current = value.to_string();
            }
        }
        None => {}
    }
}

fn field_errors(submission: &CommentSubmission) -> Vec<FieldError> {
    let Err(errors) = submission.validate() else {
        return Vec::new();
    };
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let code = match e.code.as_ref() {
                    "email" => FieldErrorCode::InvalidEmail,
                    "url" => FieldErrorCode::InvalidUrl,
                    _ => FieldErrorCode::TooLong,
                };
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}.", field));
                FieldError::new(&field, code, message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}
