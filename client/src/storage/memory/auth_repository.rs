use log::info;
use tokio::sync::watch;

use crate::domain::models::User;
use crate::storage::traits::AuthRepository;

/// Session held in memory. Starts signed out unless built with a user.
pub struct InMemoryAuthRepository {
    user: watch::Sender<Option<User>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        let (user, _) = watch::channel(None);
        Self { user }
    }

    pub fn signed_in(user: User) -> Self {
        let (user, _) = watch::channel(Some(user));
        Self { user }
    }

    pub fn login(&self, user: User) {
        info!("User {} signed in", user.username);
        self.user.send_replace(Some(user));
    }

    pub fn logout(&self) {
        if let Some(previous) = self.user.send_replace(None) {
            info!("User {} signed out", previous.username);
        }
    }
}

impl Default for InMemoryAuthRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthRepository for InMemoryAuthRepository {
    fn logged_in_user(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Tan".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn test_guest_by_default() {
        let auth = InMemoryAuthRepository::new();
        assert!(!auth.is_logged_in());
        assert_eq!(auth.current_user(), None);
    }

    #[test]
    fn test_login_and_logout_are_observed() {
        let auth = InMemoryAuthRepository::new();
        let mut receiver = auth.logged_in_user();

        auth.login(alice());
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().as_ref().map(|u| u.id.clone()), Some("u1".to_string()));
        assert!(auth.is_logged_in());

        auth.logout();
        assert!(receiver.borrow().is_none());
        assert!(!auth.is_logged_in());
    }
}
