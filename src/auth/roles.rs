//! Role-based permission gating.
//!
//! Every user carries exactly one role string. Handlers gate each operation on
//! a role group: the request proceeds only when the caller's role is a member
//! of the group.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Pastor,
    Treasurer,
    Secretary,
    Leader,
    Member,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Pastor,
        Role::Treasurer,
        Role::Secretary,
        Role::Leader,
        Role::Member,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pastor => "pastor",
            Role::Treasurer => "treasurer",
            Role::Secretary => "secretary",
            Role::Leader => "leader",
            Role::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ROLES_ADMIN: &[Role] = &[Role::Admin];

pub const ROLES_FINANCE: &[Role] = &[Role::Admin, Role::Pastor, Role::Treasurer];

pub const ROLES_FINANCE_READ: &[Role] = &[Role::Admin, Role::Pastor, Role::Treasurer, Role::Secretary];

pub const ROLES_MEMBERSHIP: &[Role] = &[Role::Admin, Role::Pastor, Role::Secretary];

pub const ROLES_MEMBERSHIP_READ: &[Role] = &[
    Role::Admin,
    Role::Pastor,
    Role::Secretary,
    Role::Treasurer,
    Role::Leader,
];

pub const ROLES_ACTIVITIES: &[Role] = &[Role::Admin, Role::Pastor, Role::Secretary, Role::Leader];

pub const ROLES_ACTIVITIES_READ: &[Role] = &Role::ALL;

pub const ROLES_REPORTS: &[Role] = &[Role::Admin, Role::Pastor, Role::Treasurer];

/// True when `role` names a known role contained in `allowed`.
pub fn has_permission(role: &str, allowed: &[Role]) -> bool {
    role.parse::<Role>()
        .map(|r| allowed.contains(&r))
        .unwrap_or(false)
}

pub fn check_permission(user: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if has_permission(&user.role, allowed) {
        return Ok(());
    }

    tracing::warn!(
        user = %user.email,
        role = %user.role,
        "permission denied"
    );
    Err(ApiError::forbidden("You do not have permission to perform this action"))
}
