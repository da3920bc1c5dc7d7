//! Typed, keyed collections over [`Storage`]
//!
//! A [`Collection`] maps `u32` ids to JSON documents under a fixed key
//! prefix and implements the shared get/add/replace/delete contract used by
//! the voter, poll and votes stores.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::common::storage::Storage;
use crate::common::{Error, Result};

/// An entity addressable by a caller-chosen numeric id.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Human-readable kind, used in error messages ("voter", "poll", ...).
    const KIND: &'static str;
    /// Storage key prefix, e.g. `voter:`.
    const KEY_PREFIX: &'static str;

    fn id(&self) -> u32;
}

/// Deterministic storage key for a document id.
pub fn document_key<T: Document>(id: u32) -> String {
    format!("{}{}", T::KEY_PREFIX, id)
}

pub struct Collection<T> {
    storage: Storage,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            _marker: PhantomData,
        }
    }

    /// Every stored document, ordered by id. Never fails on an empty store.
    pub async fn get_all(&self) -> Result<Vec<T>> {
        let keys = self.storage.keys(T::KEY_PREFIX).await?;
        let mut docs = Vec::with_capacity(keys.len());
        for key in keys {
            // A concurrent delete can remove the key between listing and reading.
            if let Some(raw) = self.storage.get(&key).await? {
                docs.push(serde_json::from_str::<T>(&raw)?);
            }
        }
        docs.sort_by_key(|d| d.id());
        Ok(docs)
    }

    pub async fn find(&self, id: u32) -> Result<Option<T>> {
        match self.storage.get(&document_key::<T>(id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn get(&self, id: u32) -> Result<T> {
        self.find(id)
            .await?
            .ok_or_else(|| Error::not_found(T::KIND, id))
    }

    /// Insert a new document; fails if the id is taken.
    pub async fn insert(&self, doc: &T) -> Result<()> {
        if self.find(doc.id()).await?.is_some() {
            return Err(Error::already_exists(T::KIND, doc.id()));
        }
        self.save(doc).await
    }

    /// Unconditional write.
    pub async fn save(&self, doc: &T) -> Result<()> {
        let raw = serde_json::to_string(doc)?;
        self.storage.put(&document_key::<T>(doc.id()), raw).await
    }

    /// Load, mutate and write back one document.
    pub async fn modify<F, R>(&self, id: u32, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Result<R> + Send,
        R: Send,
    {
        let mut doc = self.get(id).await?;
        let out = f(&mut doc)?;
        self.save(&doc).await?;
        Ok(out)
    }

    pub async fn remove(&self, id: u32) -> Result<()> {
        if self.storage.delete(&document_key::<T>(id)).await? {
            Ok(())
        } else {
            Err(Error::not_found(T::KIND, id))
        }
    }

    pub async fn clear(&self) -> Result<()> {
        for key in self.storage.keys(T::KEY_PREFIX).await? {
            self.storage.delete(&key).await?;
        }
        Ok(())
    }
}
