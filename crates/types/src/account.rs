//! User account types.

use crate::Username;

/// A full user account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Natural key, at most 15 bytes.
    pub username: Username,

    /// Plain-text password, at most 15 bytes. The workload stores synthetic
    /// credentials only.
    pub password: String,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,
}

/// The (username, password) pair guarded writes authenticate with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username to look up.
    pub username: Username,

    /// Password that must match the stored row.
    pub password: String,
}

impl Account {
    /// Borrow this account's credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
