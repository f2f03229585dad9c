//! In-process [`RecordStore`] with the hosted store's path semantics.

use crate::error::StoreError;
use crate::store::RecordStore;
use parking_lot::Mutex;
use serde_json::{Map, Value};

/// A JSON tree held in memory.
///
/// Generated keys increase monotonically, so the map's key order matches
/// insertion order the same way the hosted store's push keys do.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    root: Value,
    next_key: u64,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the whole tree.
    pub fn dump(&self) -> Value {
        self.inner.lock().root.clone()
    }
}

impl Inner {
    fn lookup(&self, path: &str) -> Option<&Value> {
        segments(path).try_fold(&self.root, |node, key| node.get(key))
    }

    /// Walk to `path`, turning every missing or scalar node on the way into an object.
    fn slot(&mut self, path: &str) -> &mut Value {
        segments(path).fold(&mut self.root, |node, key| {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            &mut node[key]
        })
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.lookup(path).filter(|v| !v.is_null()).cloned())
    }

    fn put(&self, path: &str, document: &Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        *inner.slot(path) = document.clone();
        Ok(())
    }

    fn post(&self, path: &str, document: &Value) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.lock();
        let key = format!("-K{:012}", inner.next_key);
        inner.next_key += 1;

        let child = format!("{}/{}", path.trim_end_matches('/'), key);
        *inner.slot(&child) = document.clone();
        Ok(Some(key))
    }
}
