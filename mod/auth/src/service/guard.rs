//! Authorization Guard — role and tenant checks applied by handlers
//! before any mutation.
//!
//! This layer is advisory defense-in-depth: the store has no row-level
//! security of its own, so these checks are the authorization surface.

use crate::model::RequesterProfile;

/// Tenant/owner slice of a resource, as read from its indexed columns.
#[derive(Debug, Clone, Default)]
pub struct ResourceScope {
    pub company_id: Option<String>,
    /// Declared owner: the `manager_id` (or `user_id`) reference.
    pub owner_id: Option<String>,
}

/// Whether the requester holds the global admin role.
pub fn is_admin(requester: &RequesterProfile) -> bool {
    requester.role == "admin"
}

/// Company-scope check: admin, or both company ids present and equal.
pub fn can_access_company_scope(
    requester: &RequesterProfile,
    target_company_id: Option<&str>,
) -> bool {
    if is_admin(requester) {
        return true;
    }
    match (requester.company_id.as_deref(), target_company_id) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Resource check: admin bypasses everything; otherwise the resource's
/// tenant must match the requester's, or its declared owner must be
/// the requester.
pub fn can_access_resource(requester: &RequesterProfile, resource: &ResourceScope) -> bool {
    if is_admin(requester) {
        return true;
    }

    if let (Some(a), Some(b)) = (requester.company_id.as_deref(), resource.company_id.as_deref())
        && a == b
    {
        return true;
    }

    matches!(resource.owner_id.as_deref(), Some(owner) if owner == requester.id)
}
