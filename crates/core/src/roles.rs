//! Well-known role name constants.
//!
//! These must match the `chk_user_roles_role` constraint in the initial
//! migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
pub const ROLE_FINANCE: &str = "financeiro";
pub const ROLE_VIEWER: &str = "viewer";

/// Every role the platform recognises.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER, ROLE_FINANCE, ROLE_VIEWER];

/// Whether `role` is one of [`ALL_ROLES`].
pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles() {
        assert!(is_known_role("admin"));
        assert!(is_known_role("financeiro"));
        assert!(!is_known_role("superuser"));
    }
}
