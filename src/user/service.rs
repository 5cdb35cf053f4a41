use std::sync::Arc;

use crate::database::DataStore;
use crate::user::model::{Role, User};
use crate::utils::error::CustomError;

pub struct UserService {
    store: Arc<DataStore>,
}

impl UserService {
    pub fn new(store: Arc<DataStore>) -> Self {
        UserService { store }
    }

    /// Register a new account. Self-registration always produces a
    /// subscriber; elevated roles are provisioned out of band.
    pub fn register_user(&self, username: &str, email: &str) -> Result<User, CustomError> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(CustomError::ValidationError(
                "missing required parameter `username`".into(),
            ));
        }

        if username.len() > 50 {
            return Err(CustomError::ValidationError(
                "invalid value for parameter `username`: too long".into(),
            ));
        }

        if email.is_empty() || !email.contains('@') {
            return Err(CustomError::ValidationError(
                "invalid value for parameter `email`".into(),
            ));
        }

        if self.store.find_user_by_username(username).is_some() {
            return Err(CustomError::ValidationError(
                "invalid value for parameter `username`: already taken".into(),
            ));
        }

        Ok(self.store.insert_user(username, email, Role::Subscriber))
    }

    pub fn get_user(&self, id: u64) -> Option<User> {
        self.store.find_user(id)
    }
}
