use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    AddComment,
    ChangeComment,
    CanModerate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorUser {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: String,
}

/// The party behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Actor {
    pub user: Option<ActorUser>,
    pub ip: Option<IpAddr>,
}

impl Actor {
    pub fn anonymous(ip: Option<IpAddr>) -> Self {
        Self { user: None, ip }
    }

    pub fn authenticated(user: ActorUser, ip: Option<IpAddr>) -> Self {
        Self {
            user: Some(user),
            ip,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Authorizer: Send + Sync {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool;
}
