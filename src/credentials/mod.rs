//! Session credentials supplied by the caller
//!
//! The crawler never logs in on its own. A user copies the cookie string of
//! a logged-in browser session, and this module turns it into a
//! [`CredentialSet`] that is checked for the three cookies the search
//! endpoint insists on.

mod parser;

pub use parser::parse_credentials;

use crate::CredentialError;

/// Session token cookie
pub const SESSION_TOKEN: &str = "SESSDATA";

/// CSRF token cookie
pub const CSRF_TOKEN: &str = "bili_jct";

/// Device identifier cookie
pub const DEVICE_ID: &str = "buvid3";

/// Cookies that must be present before any request is made
pub const REQUIRED_KEYS: [&str; 3] = [SESSION_TOKEN, CSRF_TOKEN, DEVICE_ID];

/// An ordered set of cookie name/value pairs
///
/// Insertion order is preserved so the rendered `Cookie` header matches what
/// the user pasted. A later pair with the same name replaces the earlier
/// value in place.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    cookies: Vec<(String, String)>,
}

impl CredentialSet {
    /// Creates an empty credential set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a credential set from pairs without validating it
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name, value);
        }
        set
    }

    /// Inserts or replaces a cookie
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    /// Gets the value of a cookie
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Cookie names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies.iter().map(|(n, _)| n.as_str())
    }

    /// Returns the required cookies that are absent or blank
    pub fn missing_keys(&self) -> Vec<String> {
        REQUIRED_KEYS
            .iter()
            .filter(|key| self.get(key).map_or(true, str::is_empty))
            .map(|key| key.to_string())
            .collect()
    }

    /// Checks that every required cookie is present
    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.is_empty() {
            return Err(CredentialError::Empty);
        }

        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(CredentialError::MissingKeys(missing));
        }

        Ok(())
    }

    /// Renders the set as a `Cookie` header value
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// Values are secrets; only names are printed.
impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
