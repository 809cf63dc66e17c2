use super::{
    entity::{Comment, CommentFlag},
    errors::CommentError,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum CommentEvent {
    /// Sent before a new comment is stored. Any observer may veto it.
    WillBePosted { comment: Comment },
    WasPosted { comment: Comment },
    WasEdited {
        comment: Comment,
        flag: CommentFlag,
        created: bool,
    },
}

impl CommentEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WillBePosted { .. } => "comment_will_be_posted",
            Self::WasPosted { .. } => "comment_was_posted",
            Self::WasEdited { .. } => "comment_was_flagged",
        }
    }

    pub fn comment(&self) -> &Comment {
        match self {
            Self::WillBePosted { comment }
            | Self::WasPosted { comment }
            | Self::WasEdited { comment, .. } => comment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverResponse {
    Continue,
    Veto(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentObserver: Send + Sync {
    fn name(&self) -> &str;
    async fn on_event(&self, event: &CommentEvent) -> ObserverResponse;
}

/// Ordered list of lifecycle observers.
#[derive(Default, Clone)]
pub struct ObserverRegistry {
    observers: Vec<Arc<dyn CommentObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn CommentObserver>) -> &mut Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Delivers `event` to every observer and collects their answers.
    pub async fn publish(&self, event: &CommentEvent) -> Vec<(String, ObserverResponse)> {
        let mut responses = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            let response = observer.on_event(event).await;
            debug!(event = event.name(), observer = observer.name(), ?response);
            responses.push((observer.name().to_string(), response));
        }
        responses
    }

    /// Delivers a vetoable event, stopping at the first veto.
    pub async fn dispatch_vetoable(&self, event: &CommentEvent) -> Result<(), CommentError> {
        for observer in &self.observers {
            if let ObserverResponse::Veto(reason) = observer.on_event(event).await {
                warn!(
                    event = event.name(),
                    observer = observer.name(),
                    comment_id = %event.comment().id,
                    "comment vetoed: {}",
                    reason
                );
                return Err(CommentError::PostRejectedByExtension {
                    observer: observer.name().to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}
