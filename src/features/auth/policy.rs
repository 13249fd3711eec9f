//! Pure role-based access decisions.
//!
//! The decision table lives here, separated from transport-level request
//! handling; guards and middleware call into [`is_allowed`].

use crate::features::auth::model::Role;

/// Actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// View the dashboard
    ViewDashboard,
    /// List and view letters, download attachments
    ReadLetters,
    /// Create, edit, and delete letters
    WriteLetters,
    /// List active categories (needed by letter create/edit forms)
    ReadActiveCategories,
    /// Full category administration
    ManageCategories,
    /// User administration
    ManageUsers,
}

/// Decide whether `role` may perform `action`.
pub fn is_allowed(role: Role, action: Action) -> bool {
    match action {
        Action::ViewDashboard | Action::ReadLetters | Action::ReadActiveCategories => true,
        Action::WriteLetters => matches!(role, Role::Admin | Role::Staff),
        Action::ManageCategories | Action::ManageUsers => matches!(role, Role::Admin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_can_read() {
        for role in [Role::Admin, Role::Staff, Role::Leader] {
            assert!(is_allowed(role, Action::ViewDashboard));
            assert!(is_allowed(role, Action::ReadLetters));
            assert!(is_allowed(role, Action::ReadActiveCategories));
        }
    }

    #[test]
    fn test_letter_writes_exclude_leader() {
        assert!(is_allowed(Role::Admin, Action::WriteLetters));
        assert!(is_allowed(Role::Staff, Action::WriteLetters));
        assert!(!is_allowed(Role::Leader, Action::WriteLetters));
    }

    #[test]
    fn test_admin_only_actions() {
        for action in [Action::ManageCategories, Action::ManageUsers] {
            assert!(is_allowed(Role::Admin, action));
            assert!(!is_allowed(Role::Staff, action));
            assert!(!is_allowed(Role::Leader, action));
        }
    }
}
