//! Observability hooks for the comment lifecycle.

pub mod comment_events;

pub use comment_events::TracingObserver;
