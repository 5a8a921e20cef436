//! Permission catalog and permission sets.
//!
//! Permissions are `resource:action` strings. Two wildcard forms exist:
//! `*` grants everything and `resource:*` grants every action on a resource.

use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;

pub const WILDCARD: &str = "*";

/// Every permission the system knows about: (permission, description)
pub const CATALOG: &[(&str, &str)] = &[
    ("hospital:read", "View hospital profile"),
    ("hospital:update", "Edit hospital profile"),
    ("departments:create", "Create departments"),
    ("departments:read", "View departments"),
    ("departments:update", "Edit departments"),
    ("departments:delete", "Deactivate and reactivate departments"),
    ("users:create", "Create staff accounts"),
    ("users:read", "View staff"),
    ("users:update", "Edit staff profiles"),
    ("users:delete", "Deactivate and reactivate staff"),
    ("users:assign_roles", "Assign roles to staff"),
    ("roles:create", "Create roles"),
    ("roles:read", "View roles"),
    ("roles:update", "Edit roles"),
    ("roles:delete", "Delete roles"),
    ("patients:create", "Register patients"),
    ("patients:read", "View patients"),
    ("patients:update", "Edit patients"),
    ("patients:delete", "Deactivate patients"),
    ("vitals:create", "Record vitals"),
    ("vitals:read", "View vitals"),
    ("prescriptions:create", "Write prescriptions"),
    ("prescriptions:read", "View prescriptions"),
    ("prescriptions:cancel", "Cancel prescriptions"),
    ("dispensing:create", "Dispense medication"),
    ("dispensing:read", "View dispensing records"),
    ("appointments:create", "Book appointments"),
    ("appointments:read", "View appointments"),
    ("appointments:update", "Reschedule appointments and change their status"),
];

/// Catalog entry returned by the permissions endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionInfo {
    #[schema(example = "patients:read")]
    pub permission: String,
    pub resource: String,
    pub action: String,
    pub description: String,
}

/// List the full catalog
pub fn catalog() -> Vec<PermissionInfo> {
    CATALOG
        .iter()
        .map(|(permission, description)| {
            let (resource, action) = split(permission);
            PermissionInfo {
                permission: permission.to_string(),
                resource: resource.to_string(),
                action: action.to_string(),
                description: description.to_string(),
            }
        })
        .collect()
}

/// Whether a permission string may be stored on a role.
///
/// Accepts catalog entries, `*`, and `resource:*` for a known resource.
pub fn is_known_permission(permission: &str) -> bool {
    if permission == WILDCARD {
        return true;
    }
    match permission.split_once(':') {
        Some((resource, "*")) => CATALOG.iter().any(|(p, _)| split(p).0 == resource),
        Some(_) => CATALOG.iter().any(|(p, _)| *p == permission),
        None => false,
    }
}

fn split(permission: &str) -> (&str, &str) {
    permission.split_once(':').unwrap_or((permission, ""))
}

/// A resolved, de-duplicated set of permission grants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    grants: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, permission: impl Into<String>) {
        self.grants.insert(permission.into());
    }

    pub fn extend<I, S>(&mut self, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grants.extend(permissions.into_iter().map(Into::into));
    }

    /// Does this set grant `permission` (directly or through a wildcard)?
    pub fn grants(&self, permission: &str) -> bool {
        if self.grants.contains(WILDCARD) || self.grants.contains(permission) {
            return true;
        }
        let (resource, _) = split(permission);
        self.has_resource_wildcard(resource)
    }

    /// `*` or `resource:*`
    pub fn has_resource_wildcard(&self, resource: &str) -> bool {
        self.grants.contains(WILDCARD) || self.grants.contains(&format!("{}:*", resource))
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.grants.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        set.extend(iter);
        set
    }
}
