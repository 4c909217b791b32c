//! Abstract key-value/data-structure store consumed by the core.
//!
//! Every structure the API maintains (record hashes, the rating sorted set,
//! review ledgers, cuisine sets, the duplicate filter, detail documents, and
//! the full-text index) is reached through this trait. The composition root
//! picks the backend; each individual call is atomic, sequences of calls are
//! not.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

/// One document returned by a full-text prefix query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchDoc {
    pub key: String,
    pub fields: HashMap<String, String>,
}

#[async_trait]
pub trait DataStore: Send + Sync {
    // scalars
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), AppError>;
    async fn exists(&self, key: &str) -> Result<bool, AppError>;
    async fn del(&self, key: &str) -> Result<bool, AppError>;

    // hashes
    async fn hset(&self, key: &str, fields: &[(&str, String)]) -> Result<(), AppError>;
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, AppError>;
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, AppError>;
    async fn hincr(&self, key: &str, field: &str, delta: i64) -> Result<i64, AppError>;
    async fn hincr_float(&self, key: &str, field: &str, delta: f64) -> Result<f64, AppError>;

    // sorted set backing the rating index; ranges are rank-based, descending
    // by score, ties broken by the store's member ordering
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), AppError>;
    async fn zrevrange(&self, key: &str, start: isize, stop: isize)
        -> Result<Vec<String>, AppError>;

    // lists backing the review ledgers; push returns the new length
    async fn lpush(&self, key: &str, value: &str) -> Result<i64, AppError>;
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, AppError>;
    async fn lrem(&self, key: &str, value: &str) -> Result<i64, AppError>;

    // sets backing the cuisine index
    async fn sadd(&self, key: &str, member: &str) -> Result<(), AppError>;
    async fn smembers(&self, key: &str) -> Result<Vec<String>, AppError>;

    // probabilistic membership filter: no false negatives, bounded false
    // positives, never shrinks
    async fn bf_add(&self, key: &str, item: &str) -> Result<(), AppError>;
    async fn bf_exists(&self, key: &str, item: &str) -> Result<bool, AppError>;

    // detail documents, whole-document semantics only
    async fn json_set(&self, key: &str, doc: &Value) -> Result<(), AppError>;
    async fn json_get(&self, key: &str) -> Result<Option<Value>, AppError>;

    // full-text index, maintained by the store itself on every hash write;
    // the core only queries it
    async fn ft_search(&self, index: &str, query: &str) -> Result<Vec<SearchDoc>, AppError>;
}
