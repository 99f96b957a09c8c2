//! Hierarchical per-user value storage.

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};

/// A stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 32-bit number
    Dword(u32),
    /// Text
    String(String),
}

impl Value {
    /// Returns the number, if this is a [`Value::Dword`].
    #[inline]
    pub fn as_dword(&self) -> Option<u32> {
        match self {
            Self::Dword(value) => Some(*value),
            Self::String(_) => None,
        }
    }

    /// Returns the text, if this is a [`Value::String`].
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            Self::Dword(_) => None,
        }
    }
}

/// Storage of named values under keys, one tree per user.
///
/// `owner` identifies the user whose tree is addressed, e.g. a SID string.
pub trait Hive {
    /// An open key.
    type Key;

    /// Opens the key at `path`, creating it and its parents if `create` is set.
    fn open_key(&mut self, owner: &str, path: &str, create: bool) -> Result<Self::Key, HiveError>;

    /// Reads a value, `None` if it is not set.
    fn query(&self, key: &Self::Key, name: &str) -> Result<Option<Value>, HiveError>;

    /// Stores a value, replacing any previous one.
    fn set(&mut self, key: &Self::Key, name: &str, value: Value) -> Result<(), HiveError>;

    /// Removes a value. Removing a value that is not set succeeds.
    fn delete(&mut self, key: &Self::Key, name: &str) -> Result<(), HiveError>;

    /// Lists all values of a key, sorted by name.
    fn values(&self, key: &Self::Key) -> Result<Vec<(String, Value)>, HiveError>;
}

/// Error returned by [`Hive`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HiveError {
    /// The key does not exist.
    #[error("key not found: {0}")]
    KeyNotFound(String),
    /// The caller may not access the key.
    #[error("access denied")]
    AccessDenied,
}

/// Key handle of a [`MemoryHive`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MemoryKey {
    owner: String,
    path: String,
}

/// [`Hive`] kept in memory.
///
/// Key paths are compared case-insensitively.
#[derive(Debug, Default)]
pub struct MemoryHive {
    keys: BTreeMap<MemoryKey, BTreeMap<String, Value>>,
}

impl MemoryHive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key exists.
    pub fn contains_key(&self, owner: &str, path: &str) -> bool {
        self.keys.contains_key(&Self::key(owner, path))
    }

    fn key(owner: &str, path: &str) -> MemoryKey {
        MemoryKey {
            owner: owner.to_string(),
            path: path.trim_end_matches('\\').to_ascii_lowercase(),
        }
    }

    fn entry(&self, key: &MemoryKey) -> Result<&BTreeMap<String, Value>, HiveError> {
        self.keys
            .get(key)
            .ok_or_else(|| HiveError::KeyNotFound(key.path.clone()))
    }

    fn entry_mut(&mut self, key: &MemoryKey) -> Result<&mut BTreeMap<String, Value>, HiveError> {
        self.keys
            .get_mut(key)
            .ok_or_else(|| HiveError::KeyNotFound(key.path.clone()))
    }
}

impl Hive for MemoryHive {
    type Key = MemoryKey;

    fn open_key(&mut self, owner: &str, path: &str, create: bool) -> Result<MemoryKey, HiveError> {
        let key = Self::key(owner, path);
        if self.keys.contains_key(&key) {
            return Ok(key);
        }
        if !create {
            return Err(HiveError::KeyNotFound(key.path));
        }

        // Parents are created along with the key
        for (end, _) in key.path.match_indices('\\') {
            let parent = Self::key(owner, &key.path[..end]);
            self.keys.entry(parent).or_default();
        }
        self.keys.insert(key.clone(), BTreeMap::new());
        Ok(key)
    }

    fn query(&self, key: &MemoryKey, name: &str) -> Result<Option<Value>, HiveError> {
        Ok(self.entry(key)?.get(name).cloned())
    }

    fn set(&mut self, key: &MemoryKey, name: &str, value: Value) -> Result<(), HiveError> {
        self.entry_mut(key)?.insert(name.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &MemoryKey, name: &str) -> Result<(), HiveError> {
        self.entry_mut(key)?.remove(name);
        Ok(())
    }

    fn values(&self, key: &MemoryKey) -> Result<Vec<(String, Value)>, HiveError> {
        Ok(self
            .entry(key)?
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }
}
