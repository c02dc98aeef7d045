//! Authorization policy: pure decision functions over the closed [`Role`]
//! set. Handlers call these and translate a deny into a flash + redirect.

use crate::models::{Restaurant, Review, Role, User};

/// Owner or master may edit/delete a restaurant.
pub fn can_modify_restaurant(user: &User, restaurant: &Restaurant) -> bool {
    match user.role {
        Role::Master => true,
        Role::Member => user.id == restaurant.author_id,
    }
}

/// Editing a review is reserved to its author; masters get no shortcut here.
pub fn can_edit_review(user: &User, review: &Review) -> bool {
    user.id == review.author_id
}

/// Deleting additionally allows masters, for moderation.
pub fn can_delete_review(user: &User, review: &Review) -> bool {
    match user.role {
        Role::Master => true,
        Role::Member => user.id == review.author_id,
    }
}

pub fn can_manage_users(user: &User) -> bool {
    match user.role {
        Role::Master => true,
        Role::Member => false,
    }
}

/// Profile edits are strictly self-service. Deliberately no master bypass:
/// masters change roles through the manage screen, not other people's
/// profiles.
pub fn can_edit_profile(user: &User, target_user_id: &str) -> bool {
    user.id == target_user_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_owned(),
            username: id.to_owned(),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_owned(),
            role,
        }
    }

    fn restaurant(author_id: &str) -> Restaurant {
        Restaurant {
            id: "r1".to_owned(),
            name: "Jip".to_owned(),
            cuisine: "korean".to_owned(),
            description: "good".to_owned(),
            location: None,
            author_id: author_id.to_owned(),
        }
    }

    fn review(author_id: &str) -> Review {
        Review {
            id: "v1".to_owned(),
            restaurant_id: "r1".to_owned(),
            author_id: author_id.to_owned(),
            body: "tasty".to_owned(),
            rating: 5,
            image_url: None,
            image_filename: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn restaurant_modification_matrix() {
        let owner = user("owner", Role::Member);
        let stranger = user("stranger", Role::Member);
        let master = user("boss", Role::Master);
        let r = restaurant("owner");

        assert!(can_modify_restaurant(&owner, &r));
        assert!(!can_modify_restaurant(&stranger, &r));
        assert!(can_modify_restaurant(&master, &r));
    }

    #[test]
    fn review_edit_is_owner_only_but_delete_allows_master() {
        let author = user("author", Role::Member);
        let master = user("boss", Role::Master);
        let v = review("author");

        assert!(can_edit_review(&author, &v));
        assert!(!can_edit_review(&master, &v));
        assert!(can_delete_review(&author, &v));
        assert!(can_delete_review(&master, &v));
    }

    #[test]
    fn user_management_is_master_only() {
        assert!(can_manage_users(&user("boss", Role::Master)));
        assert!(!can_manage_users(&user("kim", Role::Member)));
    }

    #[test]
    fn profile_edit_has_no_master_bypass() {
        let master = user("boss", Role::Master);
        let member = user("kim", Role::Member);

        assert!(can_edit_profile(&member, "kim"));
        assert!(!can_edit_profile(&member, "boss"));
        assert!(can_edit_profile(&master, "boss"));
        assert!(!can_edit_profile(&master, "kim"));
    }
}
