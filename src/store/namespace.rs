//! A single named sub-storage within a [`super::KvStore`].
//!
//! One `SubStorage` exists per plugin plus one for `matterbridge` itself
//! (§3 "Node (supervisor) storage"), and one per Matter store ID under the
//! Matter store. Each is backed by its own `sled::Tree`.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// Typed `get`/`set`/`remove`/`listKeys`/`clearAll` over one `sled::Tree`.
pub struct SubStorage {
    name: String,
    tree: sled::Tree,
}

impl SubStorage {
    pub(super) fn new(name: impl Into<String>, tree: sled::Tree) -> Self {
        Self {
            name: name.into(),
            tree,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read `key` as `T`, falling back to `default` when absent.
    pub fn get<T>(&self, key: &str, default: T) -> Result<T, StorageError>
    where
        T: DeserializeOwned,
    {
        match self.tree.get(key).map_err(|e| StorageError::Backend(e.to_string()))? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Deserialize(key.to_string(), self.name.clone(), e)),
            None => Ok(default),
        }
    }

    /// Read `key` as `T`, returning `None` if absent.
    pub fn get_opt<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        match self.tree.get(key).map_err(|e| StorageError::Backend(e.to_string()))? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Deserialize(key.to_string(), self.name.clone(), e))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn set<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| StorageError::Deserialize(key.to_string(), self.name.clone(), e))?;
        self.tree
            .insert(key, bytes)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.tree
            .remove(key)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    pub fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        self.tree
            .iter()
            .keys()
            .map(|k| {
                let k = k.map_err(|e| StorageError::Backend(e.to_string()))?;
                Ok(String::from_utf8_lossy(&k).into_owned())
            })
            .collect()
    }

    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.tree
            .clear()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    /// Verify every key in this sub-storage still deserializes. Used by the
    /// open protocol's corruption check (§4.1 step 2): a read failure here
    /// marks the whole store corrupt.
    pub(super) fn verify_readable(&self) -> Result<(), StorageError> {
        for kv in self.tree.iter() {
            let (key, value) = kv.map_err(|e| StorageError::Backend(e.to_string()))?;
            let key_str = String::from_utf8_lossy(&key).into_owned();
            serde_json::from_slice::<serde_json::Value>(&value).map_err(|e| {
                StorageError::Corrupt(self.name.clone(), format!("key `{key_str}`: {e}"))
            })?;
        }
        Ok(())
    }
}
