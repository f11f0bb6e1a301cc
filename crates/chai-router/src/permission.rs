//! Permission and role checks
//!
//! A [`PermissionSet`] holds what the signed-in user was granted. Menu nodes,
//! routes and UI actions are checked against it. Admins (role `admin` or
//! `super_admin`, or the `*` permission) pass every check, and an empty
//! requirement is always satisfied.

use crate::route::RouteMeta;
use chai_core::PermissionNode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Permission granting everything
pub const WILDCARD_PERMISSION: &str = "*";

const ADMIN_ROLES: [&str; 2] = ["admin", "super_admin"];

/// Permissions and roles granted to the current user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    permissions: HashSet<String>,
    roles: HashSet<String>,
}

impl PermissionSet {
    /// Create a set from granted permissions and roles
    pub fn new<P, R>(permissions: P, roles: R) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the user bypasses all checks
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.permissions.contains(WILDCARD_PERMISSION)
            || ADMIN_ROLES.iter().any(|role| self.roles.contains(*role))
    }

    /// Check one permission
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        permission.is_empty() || self.is_admin() || self.permissions.contains(permission)
    }

    /// Check that at least one permission is granted
    pub fn has_any_permission<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check(required, &self.permissions, Match::Any)
    }

    /// Check that every permission is granted
    pub fn has_all_permissions<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check(required, &self.permissions, Match::All)
    }

    /// Check one role
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        role.is_empty() || self.is_admin() || self.roles.contains(role)
    }

    /// Check that at least one role is held
    pub fn has_any_role<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check(required, &self.roles, Match::Any)
    }

    /// Check that every role is held
    pub fn has_all_roles<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check(required, &self.roles, Match::All)
    }

    /// Whether a menu node is accessible; untagged nodes always are
    #[must_use]
    pub fn has_menu_permission(&self, node: &PermissionNode) -> bool {
        self.has_permission(&node.permissions)
    }

    /// Whether a route's permission tag is satisfied
    #[must_use]
    pub fn check_route(&self, meta: &RouteMeta) -> bool {
        self.has_permission(&meta.permissions)
    }

    fn check<I, S>(&self, required: I, granted: &HashSet<String>, mode: Match) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let required: Vec<S> = required.into_iter().collect();
        if required.is_empty() || self.is_admin() {
            return true;
        }
        let mut held = required.iter().map(|item| granted.contains(item.as_ref()));
        match mode {
            Match::Any => held.any(|ok| ok),
            Match::All => held.all(|ok| ok),
        }
    }
}

#[derive(Clone, Copy)]
enum Match {
    Any,
    All,
}

/// How several permissions combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Any one suffices
    #[default]
    Or,
    /// All are required
    And,
}

/// What happens to a guarded element when the check fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeniedAction {
    /// Remove the element
    #[default]
    Hide,
    /// Show the element but disable it
    Disable,
}

/// Outcome of evaluating a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Shown and usable
    Visible,
    /// Not rendered
    Hidden,
    /// Rendered but inert
    Disabled,
}

/// Permission requirement attached to a UI element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionRequirement {
    /// One permission, hidden when missing
    Single(String),
    /// Any of several permissions, hidden when all are missing
    AnyOf(Vec<String>),
    /// Explicit combination mode and denial action
    Rule {
        /// Required permissions
        permissions: Vec<String>,
        /// How the permissions combine
        #[serde(default)]
        mode: PermissionMode,
        /// What to do when the check fails
        #[serde(default)]
        action: DeniedAction,
    },
}

impl PermissionRequirement {
    /// Whether the requirement is met
    #[must_use]
    pub fn is_satisfied(&self, granted: &PermissionSet) -> bool {
        match self {
            Self::Single(permission) => granted.has_permission(permission),
            Self::AnyOf(permissions) => granted.has_any_permission(permissions),
            Self::Rule {
                permissions,
                mode: PermissionMode::Or,
                ..
            } => granted.has_any_permission(permissions),
            Self::Rule {
                permissions,
                mode: PermissionMode::And,
                ..
            } => granted.has_all_permissions(permissions),
        }
    }

    /// Decide how a guarded element renders
    #[must_use]
    pub fn evaluate(&self, granted: &PermissionSet) -> Visibility {
        if self.is_satisfied(granted) {
            return Visibility::Visible;
        }
        match self {
            Self::Rule {
                action: DeniedAction::Disable,
                ..
            } => Visibility::Disabled,
            _ => Visibility::Hidden,
        }
    }
}
