//! Department entity, inputs and tree assembly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{RecordStatus, StaffResponse};

/// Department domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    /// Upper-case code, unique per tenant
    #[schema(example = "CARDIO")]
    pub code: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub head_id: Option<Uuid>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Department {
    pub fn new(tenant_id: Uuid, name: String, code: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name,
            code: normalize_code(code),
            description: None,
            parent_id: None,
            head_id: None,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn set_status(&mut self, status: RecordStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Letters, digits, `_` and `-`. Shared by hospital, department and role codes.
pub(crate) static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[A-Za-z0-9_-]+\s*$").expect("valid code pattern"));

/// Codes are stored trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDepartment {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    #[schema(example = "Cardiology")]
    pub name: String,
    #[validate(length(min = 2, max = 20, message = "Code must be 2-20 characters"))]
    #[validate(regex(path = *CODE_RE, message = "Code may only contain letters, digits, _ and -"))]
    #[schema(example = "cardio")]
    pub code: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub head_id: Option<Uuid>,
}

/// Partial update. `parent_id`/`head_id` use a double option so clients can
/// clear them with an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDepartment {
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 20, message = "Code must be 2-20 characters"))]
    #[validate(regex(path = *CODE_RE, message = "Code may only contain letters, digits, _ and -"))]
    pub code: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub head_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepartmentFilter {
    pub status: Option<RecordStatus>,
    /// Case-insensitive match on name or code
    pub search: Option<String>,
}

/// A department with its nested sub-departments
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentNode {
    #[serde(flatten)]
    pub department: Department,
    pub children: Vec<DepartmentNode>,
}

/// A department's staff roster
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentStaff {
    pub department: Department,
    pub head: Option<StaffResponse>,
    pub members: Vec<StaffResponse>,
}

/// Assemble departments into a forest.
///
/// First pass indexes every node by id; second pass attaches each node to
/// its parent, or to the root list when it has no parent or the parent is
/// not part of `departments`. Sibling order follows input order.
pub fn build_tree(departments: Vec<Department>) -> Vec<DepartmentNode> {
    let index: HashMap<Uuid, usize> = departments
        .iter()
        .enumerate()
        .map(|(i, d)| (d.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); departments.len()];
    let mut roots = Vec::new();

    for (i, department) in departments.iter().enumerate() {
        match department.parent_id.and_then(|p| index.get(&p).copied()) {
            Some(parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut slots: Vec<Option<Department>> = departments.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|i| attach(i, &children, &mut slots))
        .collect()
}

fn attach(
    i: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<Department>],
) -> Option<DepartmentNode> {
    let department = slots[i].take()?;
    let nested = children[i]
        .iter()
        .filter_map(|&c| attach(c, children, slots))
        .collect();
    Some(DepartmentNode {
        department,
        children: nested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(tenant: Uuid, name: &str, parent: Option<Uuid>) -> Department {
        let mut d = Department::new(tenant, name.to_string(), name);
        d.parent_id = parent;
        d
    }

    #[test]
    fn test_code_is_upper_cased() {
        let d = Department::new(Uuid::new_v4(), "Cardiology".into(), " cardio ");
        assert_eq!(d.code, "CARDIO");
    }

    #[test]
    fn test_build_tree_nests_children_in_input_order() {
        let tenant = Uuid::new_v4();
        let clinical = dept(tenant, "Clinical", None);
        let admin = dept(tenant, "Admin", None);
        let cardio = dept(tenant, "Cardiology", Some(clinical.id));
        let neuro = dept(tenant, "Neurology", Some(clinical.id));
        let peds = dept(tenant, "Pediatric Cardiology", Some(cardio.id));

        let tree = build_tree(vec![
            admin.clone(),
            cardio.clone(),
            clinical.clone(),
            neuro.clone(),
            peds.clone(),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].department.id, admin.id);
        assert_eq!(tree[1].department.id, clinical.id);
        let clinical_children: Vec<_> = tree[1].children.iter().map(|n| n.department.id).collect();
        assert_eq!(clinical_children, vec![cardio.id, neuro.id]);
        assert_eq!(tree[1].children[0].children[0].department.id, peds.id);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let tenant = Uuid::new_v4();
        let orphan = dept(tenant, "Orphan", Some(Uuid::new_v4()));
        let tree = build_tree(vec![orphan.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].department.id, orphan.id);
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let tenant = Uuid::new_v4();
        let mut d = dept(tenant, "Loop", None);
        d.parent_id = Some(d.id);
        let tree = build_tree(vec![d]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(Vec::new()).is_empty());
    }
}
