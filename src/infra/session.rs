/// Authenticated session handle, constructed from an opaque bearer token.
///
/// Where the token comes from (and where it is stored) belongs to the
/// embedding application; every component that talks to the backend receives
/// a `Session` explicitly instead of reading ambient state. A missing token
/// is handled by the external navigation layer before any `Session` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
