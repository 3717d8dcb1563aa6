//! Local user persistence.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::users::types::{NewUser, User, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),
}

/// The local store the aggregation service reads users from.
pub trait UserRepository: Send + Sync {
    fn find_user_by_id(&self, id: UserId) -> Option<User>;

    /// Persist a new user, assigning its id.
    fn save_user(&self, user: NewUser) -> Result<User, UserStoreError>;
}

/// Process-local user store. E-mail addresses are unique, compared
/// case-insensitively.
#[derive(Debug)]
pub struct InMemoryUserStore {
    users: DashMap<UserId, User>,
    emails: DashMap<String, UserId>,
    next_id: AtomicU64,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserRepository for InMemoryUserStore {
    fn find_user_by_id(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|r| r.value().clone())
    }

    fn save_user(&self, new: NewUser) -> Result<User, UserStoreError> {
        // Holding the e-mail entry makes check-and-insert atomic per address.
        match self.emails.entry(new.email.to_lowercase()) {
            Entry::Occupied(_) => Err(UserStoreError::DuplicateEmail(new.email)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let user = User {
                    id,
                    first_name: new.first_name,
                    last_name: new.last_name,
                    email: new.email,
                    department_id: new.department_id,
                };
                self.users.insert(id, user.clone());
                slot.insert(id);
                Ok(user)
            }
        }
    }
}
