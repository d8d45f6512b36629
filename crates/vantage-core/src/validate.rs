//! Project name validation
//!
//! Duplicate and reserved-name checks run client-side against the cached
//! collection on every name edit; the console re-validates authoritatively
//! on save. Each check surfaces as an independent flag so the form can mark
//! the offending field precisely.

use crate::project::Project;

/// Names projects may not take, matched case-insensitively
pub const RESERVED_PROJECT_NAMES: &[&str] = &["thinkbig"];

/// Independent validity flags for the display and system name fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameValidation {
    /// Another cached record carries the same display name
    pub duplicate_display_name: bool,
    /// Another cached record carries the same system name
    pub duplicate_system_name: bool,
    /// The display name is on the reserved denylist
    pub reserved_display_name: bool,
    /// The system name is on the reserved denylist
    pub reserved_system_name: bool,
    /// The system name differs from its canonical derived form
    pub system_name_mismatch: bool,
}

impl NameValidation {
    pub fn is_valid(&self) -> bool {
        !(self.duplicate_display_name
            || self.duplicate_system_name
            || self.reserved_display_name
            || self.reserved_system_name
            || self.system_name_mismatch)
    }
}

/// Whether a name is on the reserved denylist
pub fn is_reserved(name: &str) -> bool {
    let lower = name.to_lowercase();
    RESERVED_PROJECT_NAMES.contains(&lower.as_str())
}

/// True if any other cached record (excluding `draft` itself, by id) has
/// the given display name. Comparison is exact, matching the console.
pub fn display_name_exists(draft: &Project, cache: &[Project], name: &str) -> bool {
    cache
        .iter()
        .filter(|other| is_other(draft, other))
        .any(|other| other.project_name.as_deref() == Some(name))
}

/// True if any other cached record has the given system name
pub fn system_name_exists(draft: &Project, cache: &[Project], name: &str) -> bool {
    cache
        .iter()
        .filter(|other| is_other(draft, other))
        .any(|other| other.system_name.as_deref() == Some(name))
}

fn is_other(draft: &Project, candidate: &Project) -> bool {
    match (&draft.id, &candidate.id) {
        (Some(draft_id), Some(candidate_id)) => draft_id != candidate_id,
        _ => true,
    }
}

/// Compute all validity flags for the draft against the cached collection.
///
/// `canonical` is the system name the naming collaborator derived for the
/// current system-name input; `None` skips the mismatch check.
pub fn check_names(draft: &Project, cache: &[Project], canonical: Option<&str>) -> NameValidation {
    let mut validation = NameValidation::default();

    if let Some(display_name) = draft.project_name.as_deref() {
        validation.duplicate_display_name = display_name_exists(draft, cache, display_name);
        validation.reserved_display_name = is_reserved(display_name);
    }

    if let Some(system_name) = draft.system_name.as_deref() {
        validation.duplicate_system_name = system_name_exists(draft, cache, system_name);
        validation.reserved_system_name = is_reserved(system_name);
        if let Some(canonical) = canonical {
            validation.system_name_mismatch = system_name != canonical;
        }
    }

    validation
}

/// Normalize a display name into its identifier-safe system form.
///
/// Lowercases alphanumerics, turns whitespace and dashes into underscores,
/// drops everything else, and collapses runs of underscores. Mirrors the
/// console's naming endpoint so offline backends agree with it.
pub fn normalize_system_name(display_name: &str) -> String {
    let mut out = String::with_capacity(display_name.len());
    for ch in display_name.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !out.ends_with('_') {
                out.push('_');
            }
        }
    }
    out.trim_matches('_').to_string()
}
