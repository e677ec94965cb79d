//! In-memory bucket/object store

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::wire;

/// Store-level failures, each mapped to one HTTP status by the handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{}", wire::DETAIL_BUCKET_EXISTS)]
    BucketExists(String),
    #[error("{}", wire::DETAIL_BUCKET_NOT_FOUND)]
    BucketNotFound(String),
    #[error("{}", wire::DETAIL_OBJECT_NOT_FOUND)]
    ObjectNotFound { bucket: String, object: String },
}

/// Objects of one bucket, listed in insertion order.
#[derive(Debug, Default)]
struct Bucket {
    objects: HashMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl Bucket {
    fn put(&mut self, name: &str, data: Vec<u8>) {
        if self.objects.insert(name.to_owned(), data).is_none() {
            self.order.push(name.to_owned());
        }
    }
}

#[derive(Debug, Default)]
struct Buckets {
    by_name: HashMap<String, Bucket>,
    order: Vec<String>,
}

impl Buckets {
    fn get_or_create(&mut self, name: &str) -> &mut Bucket {
        if !self.by_name.contains_key(name) {
            self.order.push(name.to_owned());
        }
        self.by_name.entry(name.to_owned()).or_default()
    }
}

/// Bucket/object store shared by every request handler.
///
/// Nothing is persisted; the contents live as long as the store.
#[derive(Debug, Default)]
pub struct Store {
    buckets: RwLock<Buckets>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Buckets> {
        self.buckets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Buckets> {
        self.buckets.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut buckets = self.write();
        if buckets.by_name.contains_key(bucket) {
            return Err(StoreError::BucketExists(bucket.to_owned()));
        }
        buckets.get_or_create(bucket);
        Ok(())
    }

    pub fn list_buckets(&self) -> Vec<String> {
        self.read().order.clone()
    }

    pub fn list_objects(&self, bucket: &str) -> Result<Vec<String>, StoreError> {
        self.read()
            .by_name
            .get(bucket)
            .map(|b| b.order.clone())
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_owned()))
    }

    /// Stores `data` under `object`, creating the bucket if needed.
    /// Returns the stored size in bytes.
    pub fn put_object(&self, bucket: &str, object: &str, data: Vec<u8>) -> usize {
        let size = data.len();
        self.write().get_or_create(bucket).put(object, data);
        size
    }

    pub fn get_object(&self, bucket: &str, object: &str) -> Result<Vec<u8>, StoreError> {
        let buckets = self.read();
        let found = buckets
            .by_name
            .get(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_owned()))?;
        found
            .objects
            .get(object)
            .cloned()
            .ok_or_else(|| StoreError::ObjectNotFound {
                bucket: bucket.to_owned(),
                object: object.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{Store, StoreError};

    #[test]
    fn create_bucket_rejects_duplicates() {
        let store = Store::new();
        store.create_bucket("a").expect("first create must succeed");
        assert_eq!(
            store.create_bucket("a"),
            Err(StoreError::BucketExists("a".to_owned()))
        );
    }

    #[test]
    fn buckets_and_objects_keep_insertion_order() {
        let store = Store::new();
        store.create_bucket("zeta").expect("create zeta");
        store.create_bucket("alpha").expect("create alpha");
        store.put_object("zeta", "b", b"1".to_vec());
        store.put_object("zeta", "a", b"2".to_vec());
        store.put_object("zeta", "b", b"3".to_vec());

        assert_eq!(store.list_buckets(), vec!["zeta", "alpha"]);
        assert_eq!(
            store.list_objects("zeta").expect("bucket exists"),
            vec!["b", "a"]
        );
        assert_eq!(store.get_object("zeta", "b").expect("object exists"), b"3");
    }

    #[test]
    fn put_object_creates_missing_bucket() {
        let store = Store::new();
        let size = store.put_object("implicit", "k", "héllo".as_bytes().to_vec());
        assert_eq!(size, 6);
        assert_eq!(store.list_buckets(), vec!["implicit"]);
    }

    #[test]
    fn get_object_distinguishes_bucket_and_object() {
        let store = Store::new();
        assert_eq!(
            store.get_object("nope", "k"),
            Err(StoreError::BucketNotFound("nope".to_owned()))
        );
        store.create_bucket("b").expect("create b");
        assert!(matches!(
            store.get_object("b", "k"),
            Err(StoreError::ObjectNotFound { .. })
        ));
        assert!(matches!(
            store.list_objects("nope"),
            Err(StoreError::BucketNotFound(_))
        ));
    }
}
