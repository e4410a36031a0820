//! In-process document store.
//!
//! Holds the whole tree as one JSON value and applies the same read/patch
//! semantics as the REST store. Reads and patches can be made to fail per
//! path, and every successful patch is recorded.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::traits::{DocumentStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    root: Mutex<Value>,
    failing_reads: Mutex<HashSet<String>>,
    failing_patches: Mutex<HashSet<String>>,
    patch_log: Mutex<Vec<(String, Value)>>,
}

impl MemoryDocumentStore {
    pub fn new(root: Value) -> Self {
        Self {
            root: Mutex::new(root),
            ..Self::default()
        }
    }

    /// Make every read of `path` fail until [`heal`](Self::heal) is called.
    pub fn fail_reads_at(&self, path: &str) {
        lock(&self.failing_reads).insert(normalize(path));
    }

    /// Make every patch of `path` fail until [`heal`](Self::heal) is called.
    pub fn fail_patches_at(&self, path: &str) {
        lock(&self.failing_patches).insert(normalize(path));
    }

    pub fn heal(&self) {
        lock(&self.failing_reads).clear();
        lock(&self.failing_patches).clear();
    }

    /// Copy of the document at `path` (`null` when absent).
    pub fn document(&self, path: &str) -> Value {
        let root = lock(&self.root);
        let doc = resolve(&root, &normalize(path)).cloned();
        doc.unwrap_or(Value::Null)
    }

    /// Successful patches in the order they were applied.
    pub fn patch_log(&self) -> Vec<(String, Value)> {
        lock(&self.patch_log).clone()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch_document(&self, path: &str) -> Result<Value, StoreError> {
        let path = normalize(path);
        if lock(&self.failing_reads).contains(&path) {
            return Err(StoreError::Unavailable(format!("read of '{path}' refused")));
        }
        Ok(self.document(&path))
    }

    async fn patch_document(&self, path: &str, fields: &Value) -> Result<(), StoreError> {
        let path = normalize(path);
        if lock(&self.failing_patches).contains(&path) {
            return Err(StoreError::Unavailable(format!("patch of '{path}' refused")));
        }
        let Some(fields) = fields.as_object() else {
            return Err(StoreError::Status {
                status: 400,
                body: "patch body must be an object".to_string(),
            });
        };

        {
            let mut root = lock(&self.root);
            let target = resolve_mut(&mut root, &path);
            for (key, value) in fields {
                if value.is_null() {
                    target.remove(key);
                } else {
                    target.insert(key.clone(), value.clone());
                }
            }
        }

        lock(&self.patch_log).push((path, Value::Object(fields.clone())));
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(root, |node, key| node.get(key))
}

/// Walk to `path`, turning anything in the way into an object.
fn resolve_mut<'a>(root: &'a mut Value, path: &str) -> &'a mut Map<String, Value> {
    let mut node = root;
    for key in segments(path) {
        node = ensure_object(node)
            .entry(key.to_string())
            .or_insert(Value::Null);
    }
    ensure_object(node)
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}
