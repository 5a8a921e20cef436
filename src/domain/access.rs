//! Request principal and attribute-based access checks.
//!
//! Role permissions answer "may this person do X at all"; attribute policies
//! answer "may they do X to this particular record". Policies are plain
//! functions keyed by permission.

use uuid::Uuid;

use super::permission::PermissionSet;
use crate::errors::{AppError, AppResult};

/// The authenticated caller, resolved once per request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub staff_id: Uuid,
    pub tenant_id: Uuid,
    pub department_id: Option<Uuid>,
    pub email: String,
    pub permissions: PermissionSet,
}

/// Attributes of the record being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAttributes {
    pub tenant_id: Uuid,
    pub department_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl ResourceAttributes {
    pub fn new(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            department_id: None,
            owner_id: None,
        }
    }

    pub fn department(mut self, department_id: Option<Uuid>) -> Self {
        self.department_id = department_id;
        self
    }

    pub fn owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

type Policy = fn(&Principal, &ResourceAttributes) -> bool;

/// Records without a department are visible to every department.
fn same_department(principal: &Principal, resource: &ResourceAttributes) -> bool {
    match resource.department_id {
        None => true,
        Some(department) => principal.department_id == Some(department),
    }
}

fn owner(principal: &Principal, resource: &ResourceAttributes) -> bool {
    resource.owner_id == Some(principal.staff_id)
}

const DEPARTMENT_POLICIES: &[Policy] = &[same_department];
const OWNER_POLICIES: &[Policy] = &[owner];

fn policies_for(permission: &str) -> &'static [Policy] {
    match permission {
        "patients:read" | "patients:update" | "vitals:read" | "vitals:create" => {
            DEPARTMENT_POLICIES
        }
        "prescriptions:cancel" => OWNER_POLICIES,
        _ => &[],
    }
}

impl Principal {
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.grants(permission)
    }

    /// Role-based check only.
    pub fn require(&self, permission: &str) -> AppResult<()> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::debug!(staff = %self.staff_id, permission, "Permission denied");
            Err(AppError::forbidden(
                "INSUFFICIENT_PERMISSIONS",
                format!("Missing permission: {}", permission),
            ))
        }
    }

    /// Role check, tenant check, then the attribute policies for `permission`.
    ///
    /// Holding `*` or `resource:*` skips the policies of that resource.
    pub fn authorize(&self, permission: &str, resource: &ResourceAttributes) -> AppResult<()> {
        self.require(permission)?;

        if resource.tenant_id != self.tenant_id {
            tracing::warn!(
                staff = %self.staff_id,
                tenant = %self.tenant_id,
                resource_tenant = %resource.tenant_id,
                "Cross-tenant access attempt"
            );
            return Err(AppError::forbidden(
                "TENANT_MISMATCH",
                "Resource belongs to another hospital",
            ));
        }

        let resource_name = permission.split(':').next().unwrap_or(permission);
        if self.permissions.has_resource_wildcard(resource_name) {
            return Ok(());
        }

        if policies_for(permission).iter().all(|policy| policy(self, resource)) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "POLICY_DENIED",
                format!("Access policy denies {} on this record", permission),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(perms: &[&str], department: Option<Uuid>) -> Principal {
        Principal {
            staff_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            department_id: department,
            email: "doc@example.com".into(),
            permissions: perms.iter().copied().collect(),
        }
    }

    #[test]
    fn test_require_missing_permission() {
        let p = principal(&["patients:read"], None);
        let err = p.require("patients:update").unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_PERMISSIONS");
    }

    #[test]
    fn test_tenant_mismatch() {
        let p = principal(&["*"], None);
        let other = ResourceAttributes::new(Uuid::new_v4());
        let err = p.authorize("patients:read", &other).unwrap_err();
        assert_eq!(err.code(), "TENANT_MISMATCH");
    }

    #[test]
    fn test_same_department_policy() {
        let ward = Uuid::new_v4();
        let p = principal(&["patients:read"], Some(ward));

        let mine = ResourceAttributes::new(p.tenant_id).department(Some(ward));
        assert!(p.authorize("patients:read", &mine).is_ok());

        let theirs = ResourceAttributes::new(p.tenant_id).department(Some(Uuid::new_v4()));
        assert_eq!(
            p.authorize("patients:read", &theirs).unwrap_err().code(),
            "POLICY_DENIED"
        );

        let unassigned = ResourceAttributes::new(p.tenant_id);
        assert!(p.authorize("patients:read", &unassigned).is_ok());
    }

    #[test]
    fn test_resource_wildcard_bypasses_policy() {
        let p = principal(&["patients:*"], Some(Uuid::new_v4()));
        let elsewhere = ResourceAttributes::new(p.tenant_id).department(Some(Uuid::new_v4()));
        assert!(p.authorize("patients:update", &elsewhere).is_ok());
    }

    #[test]
    fn test_owner_policy() {
        let p = principal(&["prescriptions:cancel"], None);
        let own = ResourceAttributes::new(p.tenant_id).owner(p.staff_id);
        assert!(p.authorize("prescriptions:cancel", &own).is_ok());

        let foreign = ResourceAttributes::new(p.tenant_id).owner(Uuid::new_v4());
        assert_eq!(
            p.authorize("prescriptions:cancel", &foreign)
                .unwrap_err()
                .code(),
            "POLICY_DENIED"
        );
    }

    #[test]
    fn test_unpoliced_permission_only_checks_tenant() {
        let p = principal(&["appointments:read"], Some(Uuid::new_v4()));
        let any = ResourceAttributes::new(p.tenant_id).department(Some(Uuid::new_v4()));
        assert!(p.authorize("appointments:read", &any).is_ok());
    }
}
