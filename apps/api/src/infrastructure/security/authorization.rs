use crate::domain::comment::permissions::{Actor, Authorizer, Capability};

/// Maps token roles to comment capabilities.
#[derive(Debug, Clone)]
pub struct RoleAuthorizer {
    allow_anonymous: bool,
}

impl RoleAuthorizer {
    pub fn new(allow_anonymous: bool) -> Self {
        Self { allow_anonymous }
    }
}

impl Authorizer for RoleAuthorizer {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool {
        let Some(user) = &actor.user else {
            return self.allow_anonymous && capability == Capability::AddComment;
        };
        match user.role.to_ascii_lowercase().as_str() {
            "admin" | "moderator" => true,
            "user" => matches!(capability, Capability::AddComment | Capability::ChangeComment),
            _ => false,
        }
    }
}
