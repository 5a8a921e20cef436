//! Roles and role-hierarchy permission resolution.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::department::{normalize_code, CODE_RE};
use super::permission::{PermissionSet, WILDCARD};
use super::RecordStatus;
use crate::config::{
    ROLE_DOCTOR, ROLE_HOSPITAL_ADMIN, ROLE_NURSE, ROLE_PHARMACIST, ROLE_RECEPTIONIST, ROLE_STAFF,
};

/// Role domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    #[schema(example = "DOCTOR")]
    pub code: String,
    pub description: Option<String>,
    /// Permissions granted directly by this role
    pub permissions: Vec<String>,
    /// Parent role whose permissions are inherited
    pub parent_id: Option<Uuid>,
    /// Seeded roles cannot change code or permissions, nor be deleted
    pub is_system: bool,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(tenant_id: Uuid, name: String, code: &str, permissions: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name,
            code: normalize_code(code),
            description: None,
            permissions,
            parent_id: None,
            is_system: false,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRole {
    #[validate(length(min = 1, max = 80, message = "Name is required"))]
    #[schema(example = "Ward Nurse")]
    pub name: String,
    #[validate(length(min = 2, max = 40, message = "Code must be 2-40 characters"))]
    #[validate(regex(path = *CODE_RE, message = "Code may only contain letters, digits, _ and -"))]
    #[schema(example = "ward_nurse")]
    pub code: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRole {
    #[validate(length(min = 1, max = 80, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 40, message = "Code must be 2-40 characters"))]
    #[validate(regex(path = *CODE_RE, message = "Code may only contain letters, digits, _ and -"))]
    pub code: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleFilter {
    pub status: Option<RecordStatus>,
    pub search: Option<String>,
}

/// Role with its effective (inherited) permissions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub effective_permissions: Vec<String>,
}

/// Resolve the effective permissions of a set of assigned roles.
///
/// Each role contributes its own permissions plus those of every ancestor.
/// Inactive roles, and roles missing from `roles`, contribute nothing and
/// stop the walk. A visited set guards against corrupted parent cycles.
pub fn resolve_permissions(role_ids: &[Uuid], roles: &HashMap<Uuid, Role>) -> PermissionSet {
    let mut set = PermissionSet::new();
    let mut visited = HashSet::new();

    for role_id in role_ids {
        let mut current = Some(*role_id);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let Some(role) = roles.get(&id).filter(|r| r.is_active()) else {
                break;
            };
            set.extend(role.permissions.iter().cloned());
            current = role.parent_id;
        }
    }

    set
}

fn perms(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

/// Build the system roles seeded for every new tenant.
///
/// `HOSPITAL_ADMIN` holds `*`; the clinical and front-desk roles inherit
/// from `STAFF`.
pub fn system_roles(tenant_id: Uuid) -> Vec<Role> {
    let system = |name: &str, code: &str, permissions: Vec<String>| {
        let mut role = Role::new(tenant_id, name.to_string(), code, permissions);
        role.is_system = true;
        role
    };

    let admin = system("Hospital Administrator", ROLE_HOSPITAL_ADMIN, perms(&[WILDCARD]));
    let staff = system(
        "Staff",
        ROLE_STAFF,
        perms(&["hospital:read", "departments:read", "users:read"]),
    );

    let mut inherited = vec![
        system(
            "Doctor",
            ROLE_DOCTOR,
            perms(&[
                "patients:create",
                "patients:read",
                "patients:update",
                "vitals:create",
                "vitals:read",
                "prescriptions:create",
                "prescriptions:read",
                "prescriptions:cancel",
                "appointments:read",
                "appointments:update",
            ]),
        ),
        system(
            "Nurse",
            ROLE_NURSE,
            perms(&[
                "patients:read",
                "patients:update",
                "vitals:create",
                "vitals:read",
                "prescriptions:read",
                "appointments:read",
                "appointments:update",
            ]),
        ),
        system(
            "Pharmacist",
            ROLE_PHARMACIST,
            perms(&[
                "patients:read",
                "prescriptions:read",
                "dispensing:create",
                "dispensing:read",
            ]),
        ),
        system(
            "Receptionist",
            ROLE_RECEPTIONIST,
            perms(&[
                "patients:create",
                "patients:read",
                "patients:update",
                "appointments:create",
                "appointments:read",
                "appointments:update",
            ]),
        ),
    ];
    for role in &mut inherited {
        role.parent_id = Some(staff.id);
    }

    let mut roles = vec![admin, staff];
    roles.extend(inherited);
    roles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::permission::is_known_permission;

    fn index(roles: Vec<Role>) -> HashMap<Uuid, Role> {
        roles.into_iter().map(|r| (r.id, r)).collect()
    }

    #[test]
    fn test_inherits_parent_permissions() {
        let roles = system_roles(Uuid::new_v4());
        let doctor = roles.iter().find(|r| r.code == ROLE_DOCTOR).unwrap().id;
        let map = index(roles);

        let set = resolve_permissions(&[doctor], &map);
        assert!(set.grants("vitals:create"));
        // inherited from STAFF
        assert!(set.grants("departments:read"));
        assert!(!set.grants("dispensing:create"));
    }

    #[test]
    fn test_inactive_role_contributes_nothing() {
        let tenant = Uuid::new_v4();
        let mut role = Role::new(tenant, "Temp".into(), "TEMP", vec!["patients:read".into()]);
        role.status = RecordStatus::Inactive;
        let id = role.id;

        let set = resolve_permissions(&[id], &index(vec![role]));
        assert!(set.is_empty());
    }

    #[test]
    fn test_inactive_parent_stops_inheritance() {
        let tenant = Uuid::new_v4();
        let mut parent = Role::new(tenant, "Base".into(), "BASE", vec!["users:read".into()]);
        parent.status = RecordStatus::Inactive;
        let mut child = Role::new(tenant, "Child".into(), "CHILD", vec!["vitals:read".into()]);
        child.parent_id = Some(parent.id);
        let child_id = child.id;

        let set = resolve_permissions(&[child_id], &index(vec![parent, child]));
        assert!(set.grants("vitals:read"));
        assert!(!set.grants("users:read"));
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        let tenant = Uuid::new_v4();
        let mut a = Role::new(tenant, "A".into(), "A_ROLE", vec!["patients:read".into()]);
        let mut b = Role::new(tenant, "B".into(), "B_ROLE", vec!["vitals:read".into()]);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let a_id = a.id;

        let set = resolve_permissions(&[a_id], &index(vec![a, b]));
        assert!(set.grants("patients:read"));
        assert!(set.grants("vitals:read"));
    }

    #[test]
    fn test_system_roles_use_known_permissions() {
        for role in system_roles(Uuid::new_v4()) {
            assert!(role.is_system);
            for p in &role.permissions {
                assert!(is_known_permission(p), "unknown permission {}", p);
            }
        }
    }
}
