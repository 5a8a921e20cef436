//! Navigation menu filtered by the caller's permissions.

use serde::Serialize;
use utoipa::ToSchema;

use super::permission::PermissionSet;

struct MenuEntry {
    key: &'static str,
    label: &'static str,
    path: Option<&'static str>,
    /// `None` on a leaf means every authenticated user sees it
    permission: Option<&'static str>,
    children: &'static [MenuEntry],
}

const fn leaf(
    key: &'static str,
    label: &'static str,
    path: &'static str,
    permission: Option<&'static str>,
) -> MenuEntry {
    MenuEntry {
        key,
        label,
        path: Some(path),
        permission,
        children: &[],
    }
}

const fn group(
    key: &'static str,
    label: &'static str,
    children: &'static [MenuEntry],
) -> MenuEntry {
    MenuEntry {
        key,
        label,
        path: None,
        permission: None,
        children,
    }
}

const MENU: &[MenuEntry] = &[
    leaf("dashboard", "Dashboard", "/dashboard", None),
    group(
        "clinical",
        "Clinical",
        &[
            leaf("patients", "Patients", "/patients", Some("patients:read")),
            leaf("vitals", "Vitals", "/vitals", Some("vitals:read")),
            leaf("appointments", "Appointments", "/appointments", Some("appointments:read")),
        ],
    ),
    group(
        "pharmacy",
        "Pharmacy",
        &[
            leaf("prescriptions", "Prescriptions", "/prescriptions", Some("prescriptions:read")),
            leaf("dispensing", "Dispensing", "/dispensing", Some("dispensing:read")),
        ],
    ),
    group(
        "administration",
        "Administration",
        &[
            leaf("departments", "Departments", "/departments", Some("departments:read")),
            leaf("staff", "Staff", "/users", Some("users:read")),
            leaf("roles", "Roles & Permissions", "/roles", Some("roles:read")),
            leaf("hospital", "Hospital Settings", "/hospital", Some("hospital:update")),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MenuItem {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

/// Visible menu for a permission set. A group shows when any child does.
pub fn build_menu(permissions: &PermissionSet) -> Vec<MenuItem> {
    filter(MENU, permissions)
}

fn filter(entries: &[MenuEntry], permissions: &PermissionSet) -> Vec<MenuItem> {
    entries
        .iter()
        .filter_map(|entry| {
            let children = filter(entry.children, permissions);
            let visible = if entry.children.is_empty() {
                entry.permission.map_or(true, |p| permissions.grants(p))
            } else {
                !children.is_empty()
            };
            visible.then(|| MenuItem {
                key: entry.key.to_string(),
                label: entry.label.to_string(),
                path: entry.path.map(str::to_string),
                children,
            })
        })
        .collect()
}
