// =====================================================================
// File: btree/key.rs
//
// Description:
//   Keys are plain integers. Anything typed at the prompt arrives as
//   text, so the engine accepts any `IntoKey` value and rejects input
//   that does not parse or falls outside `±KEY_LIMIT` before it touches
//   the tree.
// =====================================================================
use crate::error::BTreeError;

/// Integer key stored in the tree.
pub type Key = i64;

/// Largest accepted key magnitude.
pub const KEY_LIMIT: Key = 1_000_000_000;

/// Conversion from raw caller input into a validated [`Key`].
///
/// # Example
/// ```
/// use btree_trace::IntoKey;
/// assert_eq!(" 42 ".into_key(), Ok(42));
/// assert!("abc".into_key().is_err());
/// ```
pub trait IntoKey {
    fn into_key(self) -> Result<Key, BTreeError>;
}

impl IntoKey for &str {
    fn into_key(self) -> Result<Key, BTreeError> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return Err(invalid(self, "empty input"));
        }
        let key = trimmed
            .parse::<Key>()
            .map_err(|_| invalid(self, "not an integer"))?;
        check_range(self, key)
    }
}

impl IntoKey for &String {
    fn into_key(self) -> Result<Key, BTreeError> {
        self.as_str().into_key()
    }
}

impl IntoKey for String {
    fn into_key(self) -> Result<Key, BTreeError> {
        self.as_str().into_key()
    }
}

impl IntoKey for i64 {
    fn into_key(self) -> Result<Key, BTreeError> {
        check_range(&self.to_string(), self)
    }
}

impl IntoKey for i32 {
    fn into_key(self) -> Result<Key, BTreeError> {
        i64::from(self).into_key()
    }
}

fn check_range(raw: &str, key: Key) -> Result<Key, BTreeError> {
    if (-KEY_LIMIT..=KEY_LIMIT).contains(&key) {
        Ok(key)
    } else {
        Err(invalid(raw, "outside the accepted key range"))
    }
}

fn invalid(raw: &str, reason: &'static str) -> BTreeError {
    BTreeError::InvalidInput {
        raw: raw.to_string(),
        reason,
    }
}
