use crate::domain::comment::events::{CommentEvent, CommentObserver, ObserverResponse};
use async_trait::async_trait;
use tracing::info;

/// Logs every lifecycle event; never vetoes.
#[derive(Debug, Default)]
pub struct TracingObserver;

#[async_trait]
impl CommentObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn on_event(&self, event: &CommentEvent) -> ObserverResponse {
        let comment = event.comment();
        match event {
            CommentEvent::WasEdited { flag, created, .. } => info!(
                event = event.name(),
                comment_id = %comment.id,
                flagged_by = %flag.user_id,
                new_flag = created,
                "comment edited"
            ),
            _ => info!(
                event = event.name(),
                comment_id = %comment.id,
                target = %comment.target_key(),
                level = comment.level,
                authenticated = comment.user_id.is_some(),
                "comment lifecycle event"
            ),
        }
        ObserverResponse::Continue
    }
}
