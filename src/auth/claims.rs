use crate::oidc::types::Claims;

use super::error::AuthError;

/// Permission helpers on verified claims
impl Claims {
    /// Check if the `permissions` claim contains `permission`
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .map_or(false, |granted| granted.iter().any(|p| p == permission))
    }

    /// Granted permissions, empty when the claim is absent
    pub fn granted_permissions(&self) -> &[String] {
        self.permissions.as_deref().unwrap_or(&[])
    }
}

/// Confirm that `claims` grant `required`
///
/// An empty `required` permission always succeeds without looking at the
/// claims. Otherwise the token must carry a `permissions` claim that contains
/// the required string.
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    if required.is_empty() {
        return Ok(());
    }

    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if granted.iter().any(|p| p == required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied(required.to_string()))
    }
}
