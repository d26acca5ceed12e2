use std::{
    fmt,
    fmt::{Debug, Display},
};

/// Wraps a sensitive value (e.g. the staff access token) so that it never ends up in logs by accident.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl Secret<String> {
    /// True if a non-empty secret has been configured.
    pub fn is_set(&self) -> bool {
        !self.value.is_empty()
    }

    /// Compares the candidate against the secret without short-circuiting on the first differing byte.
    /// An unset secret never matches.
    pub fn matches(&self, candidate: &str) -> bool {
        if !self.is_set() || candidate.len() != self.value.len() {
            return false;
        }
        self.value.bytes().zip(candidate.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
