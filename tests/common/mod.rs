//! In-memory [`DataStore`] backend for exercising the router without a
//! running store. Ordering semantics mirror the real backend: sorted-set
//! ranges come back score-descending with a deterministic member tie-break,
//! list pushes go to the head, and out-of-range slices are empty.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use bites::error::AppError;
use bites::store::{DataStore, SearchDoc};

#[derive(Default)]
struct Inner {
    strings: HashMap<String, String>,
    hashes: HashMap<String, HashMap<String, String>>,
    zsets: HashMap<String, HashMap<String, f64>>,
    lists: HashMap<String, Vec<String>>,
    sets: HashMap<String, HashSet<String>>,
    filters: HashMap<String, HashSet<String>>,
    docs: HashMap<String, Value>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn slice(items: &[String], start: isize, stop: isize) -> Vec<String> {
    let len = items.len() as isize;
    if len == 0 || start >= len || stop < start {
        return Vec::new();
    }
    let start = start.max(0) as usize;
    let stop = stop.min(len - 1) as usize;
    items[start..=stop].to_vec()
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.inner.lock().unwrap().strings.get(key).cloned())
    }

    async fn set_ex(&self, key: &str, value: &str, _seconds: u64) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .strings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.strings.contains_key(key)
            || inner.hashes.contains_key(key)
            || inner.lists.contains_key(key)
            || inner.sets.contains_key(key)
            || inner.docs.contains_key(key))
    }

    async fn del(&self, key: &str) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.strings.remove(key).is_some()
            | inner.hashes.remove(key).is_some()
            | inner.docs.remove(key).is_some();
        Ok(removed)
    }

    async fn hset(&self, key: &str, fields: &[(&str, String)]) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.to_string(), value.clone());
        }
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field).cloned()))
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .hashes
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn hincr(&self, key: &str, field: &str, delta: i64) -> Result<i64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        let current: i64 = hash.get(field).and_then(|v| v.parse().ok()).unwrap_or(0);
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn hincr_float(&self, key: &str, field: &str, delta: f64) -> Result<f64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let hash = inner.hashes.entry(key.to_string()).or_default();
        let current: f64 = hash.get(field).and_then(|v| v.parse().ok()).unwrap_or(0.0);
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .zsets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn zrevrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, AppError> {
        let inner = self.inner.lock().unwrap();
        let Some(zset) = inner.zsets.get(key) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<(&String, f64)> = zset.iter().map(|(m, s)| (m, *s)).collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.0.cmp(a.0))
        });
        let members: Vec<String> = entries.into_iter().map(|(m, _)| m.clone()).collect();
        Ok(slice(&members, start, stop))
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<i64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let list = inner.lists.entry(key.to_string()).or_default();
        list.insert(0, value.to_string());
        Ok(list.len() as i64)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, AppError> {
        let inner = self.inner.lock().unwrap();
        let Some(list) = inner.lists.get(key) else {
            return Ok(Vec::new());
        };
        Ok(slice(list, start, stop))
    }

    async fn lrem(&self, key: &str, value: &str) -> Result<i64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(list) = inner.lists.get_mut(key) else {
            return Ok(0);
        };
        let before = list.len();
        list.retain(|v| v != value);
        Ok((before - list.len()) as i64)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut members: Vec<String> = inner
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        Ok(members)
    }

    async fn bf_add(&self, key: &str, item: &str) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .filters
            .entry(key.to_string())
            .or_default()
            .insert(item.to_string());
        Ok(())
    }

    async fn bf_exists(&self, key: &str, item: &str) -> Result<bool, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .filters
            .get(key)
            .is_some_and(|filter| filter.contains(item)))
    }

    async fn json_set(&self, key: &str, doc: &Value) -> Result<(), AppError> {
        self.inner
            .lock()
            .unwrap()
            .docs
            .insert(key.to_string(), doc.clone());
        Ok(())
    }

    async fn json_get(&self, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self.inner.lock().unwrap().docs.get(key).cloned())
    }

    async fn ft_search(&self, _index: &str, query: &str) -> Result<Vec<SearchDoc>, AppError> {
        // Only the `@name:<prefix>*` shape the API issues.
        let prefix = query
            .strip_prefix("@name:")
            .map(|rest| rest.trim_end_matches('*').to_lowercase())
            .unwrap_or_default();

        let inner = self.inner.lock().unwrap();
        let mut docs: Vec<SearchDoc> = inner
            .hashes
            .iter()
            .filter(|(key, _)| key.starts_with("bites:restaurant:"))
            .filter(|(_, fields)| {
                fields
                    .get("name")
                    .is_some_and(|name| name.to_lowercase().starts_with(&prefix))
            })
            .map(|(key, fields)| SearchDoc {
                key: key.clone(),
                fields: fields.clone(),
            })
            .collect();
        docs.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(docs)
    }
}
