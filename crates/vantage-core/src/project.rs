//! Project domain model
//!
//! The project record as exchanged with the console's Project API, plus
//! drafts and role-membership preparation for save.

use serde::{Deserialize, Serialize};

/// A user or group principal referenced by ownership and role memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Stable system name of the principal
    pub system_name: String,
    /// Human-readable name, present on records coming from the console
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Principal {
    pub fn named(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            display_name: None,
        }
    }
}

/// A role name together with its member principals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMembership {
    /// Role system name (e.g. "editor", "readOnly")
    pub role: String,
    #[serde(default)]
    pub users: Vec<Principal>,
    #[serde(default)]
    pub groups: Vec<Principal>,
}

impl RoleMembership {
    /// Collapse member principals to their system names before transmission.
    ///
    /// The console expects bare principal names on save; decorated fields
    /// returned by earlier reads are stripped.
    pub fn prepare_for_save(&mut self) {
        for user in &mut self.users {
            user.display_name = None;
        }
        for group in &mut self.groups {
            group.display_name = None;
        }
    }
}

/// A user-supplied property attached to a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProperty {
    pub system_name: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// Descriptor for the user fields a new project can carry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFieldDescriptor {
    pub system_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub required: bool,
}

/// A project record.
///
/// `id` is assigned by the console on create and is immutable afterwards.
/// A record with `id == None` is a draft and never enters the cached
/// collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: Option<String>,
    /// Human-readable display name
    #[serde(default)]
    pub project_name: Option<String>,
    /// Normalized, identifier-safe derivative of the display name
    #[serde(default)]
    pub system_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Material icon name
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_color: Option<String>,
    #[serde(default)]
    pub notebook_folder_enabled: bool,
    #[serde(default)]
    pub owner: Option<Principal>,
    #[serde(default)]
    pub user_properties: Vec<UserProperty>,
    #[serde(default)]
    pub role_memberships: Vec<RoleMembership>,
}

impl Project {
    /// Create a fresh unsaved draft with empty collections
    pub fn draft() -> Self {
        Self::default()
    }

    /// Whether this record has not yet been persisted by the console
    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }

    /// Display name lowered for case-insensitive matching
    pub fn lowername(&self) -> Option<String> {
        self.project_name.as_deref().map(str::to_lowercase)
    }

    /// Case-insensitive prefix match against the display name
    pub fn name_starts_with(&self, lowercase_query: &str) -> bool {
        self.lowername()
            .is_some_and(|name| name.starts_with(lowercase_query))
    }

    /// Prepare all role memberships for transmission
    pub fn prepare_role_memberships(&mut self) {
        for membership in &mut self.role_memberships {
            membership.prepare_for_save();
        }
    }
}
