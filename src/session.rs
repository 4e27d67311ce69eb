//! Session identity held for the lifetime of a browsing session.
//!
//! DESIGN
//! ======
//! The document name is fixed when the session is created. The user name
//! may change at any time, but every mutating action checks it first.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

/// Alert text shown when a mutating action is attempted without a user name.
pub const MISSING_IDENTITY_MESSAGE: &str = "Please enter a user name";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    user_name: String,
    document_name: String,
}

impl Session {
    #[must_use]
    pub fn new(user_name: impl Into<String>, document_name: impl Into<String>) -> Self {
        Self { user_name: user_name.into(), document_name: document_name.into() }
    }

    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    #[must_use]
    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.user_name = user_name.into().trim().to_string();
    }

    /// Returns the user name if one is set.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        if self.user_name.is_empty() { None } else { Some(&self.user_name) }
    }
}
