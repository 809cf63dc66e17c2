pub mod authorization;
pub mod comment_moderator;
pub mod content_policy;
pub mod security_hash;

pub use authorization::RoleAuthorizer;
pub use comment_moderator::KeywordModerator;
pub use content_policy::ContentPolicy;
pub use security_hash::{SecurityHashCodec, TimestampRule};
