//! Role-level permissions. Ownership (own booking, own property) is checked by
//! the services once the row is loaded.

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Confirm,
    Cancel,
    ViewStats,
    Promote,
    BulkDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Property,
    Booking,
    Review,
    Payment,
}

pub fn can(role: Role, action: Action, resource: Resource) -> bool {
    use Action::*;
    use Resource::*;

    match role {
        Role::Admin => true,
        Role::Host => matches!(
            (action, resource),
            (Create | Read | Update | Delete | ViewStats, Property)
                | (Read | Confirm | Cancel, Booking)
                | (Read, Review)
                | (Read, Payment)
        ),
        Role::Guest => matches!(
            (action, resource),
            (Read, Property)
                | (Create | Read | Update | Delete | Cancel, Booking)
                | (Create | Read | Update | Delete, Review)
                | (Create | Read, Payment)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_do_everything() {
        for action in [Action::Promote, Action::BulkDelete, Action::Delete] {
            assert!(can(Role::Admin, action, Resource::User));
            assert!(can(Role::Admin, action, Resource::Property));
        }
    }

    #[test]
    fn only_hosts_and_admins_list_properties_for_rent() {
        assert!(can(Role::Host, Action::Create, Resource::Property));
        assert!(!can(Role::Guest, Action::Create, Resource::Property));
    }

    #[test]
    fn hosts_do_not_book_and_guests_do_not_confirm() {
        assert!(!can(Role::Host, Action::Create, Resource::Booking));
        assert!(can(Role::Host, Action::Confirm, Resource::Booking));
        assert!(!can(Role::Guest, Action::Confirm, Resource::Booking));
        assert!(can(Role::Guest, Action::Cancel, Resource::Booking));
    }

    #[test]
    fn user_management_is_admin_only() {
        assert!(!can(Role::Host, Action::Read, Resource::User));
        assert!(!can(Role::Guest, Action::Promote, Resource::User));
        assert!(!can(Role::Host, Action::BulkDelete, Resource::Property));
    }
}
