//! Redis Stack implementation of [`DataStore`].
//!
//! One [`ConnectionManager`] is created at startup with bounded timeouts and
//! cloned per operation; it is the only connection state in the process.
//! Bootstrap also sizes the duplicate filter (`BF.RESERVE`) and creates the
//! write-through name index (`FT.CREATE`) over restaurant record hashes, both
//! as idempotent calls that ignore an already-exists reply.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client, Value as RedisValue,
};
use serde_json::Value;
use tracing::info;

use crate::{
    config::Config,
    error::AppError,
    keys,
    store::{DataStore, SearchDoc},
};

pub struct RedisStore {
    manager: ConnectionManager,
}

pub async fn init_redis(config: &Config) -> Result<RedisStore, AppError> {
    let manager_config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(config.redis_url.as_str())?;
    let manager = client
        .get_connection_manager_with_config(manager_config)
        .await?;
    info!("Redis connected");

    let store = RedisStore { manager };
    store.reserve_filter(config).await?;
    store.create_search_index().await?;
    Ok(store)
}

impl RedisStore {
    fn con(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Sizes the duplicate filter once. The filter cannot grow in place;
    /// changing capacity or error rate means rebuilding it from the
    /// restaurant records.
    async fn reserve_filter(&self, config: &Config) -> Result<(), AppError> {
        let mut con = self.con();
        let reserved: Result<(), redis::RedisError> = redis::cmd("BF.RESERVE")
            .arg(keys::bloom())
            .arg(config.bloom_error_rate)
            .arg(config.bloom_capacity)
            .query_async(&mut con)
            .await;

        match reserved {
            Ok(()) => info!(
                "Reserved duplicate filter: capacity {}, error rate {}",
                config.bloom_capacity, config.bloom_error_rate
            ),
            Err(e) if e.to_string().contains("exists") => {
                info!("Duplicate filter already reserved")
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Creates the name index over restaurant hashes. The store keeps it in
    /// sync on every hash write; the API only issues prefix queries.
    async fn create_search_index(&self) -> Result<(), AppError> {
        let mut con = self.con();
        let created: Result<(), redis::RedisError> = redis::cmd("FT.CREATE")
            .arg(keys::search_index())
            .arg("ON")
            .arg("HASH")
            .arg("PREFIX")
            .arg(1)
            .arg(format!("{}:restaurant:", keys::PREFIX))
            .arg("SCHEMA")
            .arg("id")
            .arg("TEXT")
            .arg("name")
            .arg("TEXT")
            .arg("avgRating")
            .arg("NUMERIC")
            .arg("SORTABLE")
            .query_async(&mut con)
            .await;

        match created {
            Ok(()) => info!("Created restaurant name index"),
            Err(e) if e.to_string().contains("exists") => {
                info!("Restaurant name index already exists")
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut con = self.con();
        let value: Option<String> = con.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), AppError> {
        let mut con = self.con();
        let _: () = con.set_ex(key, value, seconds).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let mut con = self.con();
        let exists: bool = con.exists(key).await?;
        Ok(exists)
    }

    async fn del(&self, key: &str) -> Result<bool, AppError> {
        let mut con = self.con();
        let deleted: i64 = con.del(key).await?;
        Ok(deleted > 0)
    }

    async fn hset(&self, key: &str, fields: &[(&str, String)]) -> Result<(), AppError> {
        let mut con = self.con();
        let _: () = con.hset_multiple(key, fields).await?;
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, AppError> {
        let mut con = self.con();
        let value: Option<String> = con.hget(key, field).await?;
        Ok(value)
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, AppError> {
        let mut con = self.con();
        let fields: HashMap<String, String> = con.hgetall(key).await?;
        Ok(fields)
    }

    async fn hincr(&self, key: &str, field: &str, delta: i64) -> Result<i64, AppError> {
        let mut con = self.con();
        let value: i64 = con.hincr(key, field, delta).await?;
        Ok(value)
    }

    async fn hincr_float(&self, key: &str, field: &str, delta: f64) -> Result<f64, AppError> {
        let mut con = self.con();
        let value: f64 = redis::cmd("HINCRBYFLOAT")
            .arg(key)
            .arg(field)
            .arg(delta)
            .query_async(&mut con)
            .await?;
        Ok(value)
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), AppError> {
        let mut con = self.con();
        let _: () = con.zadd(key, member, score).await?;
        Ok(())
    }

    async fn zrevrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, AppError> {
        let mut con = self.con();
        let members: Vec<String> = con.zrevrange(key, start, stop).await?;
        Ok(members)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<i64, AppError> {
        let mut con = self.con();
        let length: i64 = con.lpush(key, value).await?;
        Ok(length)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, AppError> {
        let mut con = self.con();
        let values: Vec<String> = con.lrange(key, start, stop).await?;
        Ok(values)
    }

    async fn lrem(&self, key: &str, value: &str) -> Result<i64, AppError> {
        let mut con = self.con();
        let removed: i64 = con.lrem(key, 0, value).await?;
        Ok(removed)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), AppError> {
        let mut con = self.con();
        let _: () = con.sadd(key, member).await?;
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, AppError> {
        let mut con = self.con();
        let members: Vec<String> = con.smembers(key).await?;
        Ok(members)
    }

    async fn bf_add(&self, key: &str, item: &str) -> Result<(), AppError> {
        let mut con = self.con();
        let _: () = redis::cmd("BF.ADD")
            .arg(key)
            .arg(item)
            .query_async(&mut con)
            .await?;
        Ok(())
    }

    async fn bf_exists(&self, key: &str, item: &str) -> Result<bool, AppError> {
        let mut con = self.con();
        let exists: bool = redis::cmd("BF.EXISTS")
            .arg(key)
            .arg(item)
            .query_async(&mut con)
            .await?;
        Ok(exists)
    }

    async fn json_set(&self, key: &str, doc: &Value) -> Result<(), AppError> {
        let mut con = self.con();
        let _: () = redis::cmd("JSON.SET")
            .arg(key)
            .arg(".")
            .arg(doc.to_string())
            .query_async(&mut con)
            .await?;
        Ok(())
    }

    async fn json_get(&self, key: &str) -> Result<Option<Value>, AppError> {
        let mut con = self.con();
        let raw: Option<String> = redis::cmd("JSON.GET")
            .arg(key)
            .query_async(&mut con)
            .await?;
        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|_| AppError::Inconsistent("detail document is not valid JSON")),
            None => Ok(None),
        }
    }

    async fn ft_search(&self, index: &str, query: &str) -> Result<Vec<SearchDoc>, AppError> {
        let mut con = self.con();
        let reply: RedisValue = redis::cmd("FT.SEARCH")
            .arg(index)
            .arg(query)
            .query_async(&mut con)
            .await?;
        Ok(parse_search_reply(&reply))
    }
}

/// `FT.SEARCH` replies as a flat array: total count, then alternating
/// document key and field/value array.
fn parse_search_reply(reply: &RedisValue) -> Vec<SearchDoc> {
    let items = match reply {
        RedisValue::Array(items) => items,
        _ => return Vec::new(),
    };

    let mut docs = Vec::new();
    let mut iter = items.iter().skip(1);
    while let (Some(key), Some(fields)) = (iter.next(), iter.next()) {
        let (Some(key), RedisValue::Array(pairs)) = (as_string(key), fields) else {
            continue;
        };
        let mut map = HashMap::new();
        for pair in pairs.chunks(2) {
            if let [name, value] = pair {
                if let (Some(name), Some(value)) = (as_string(name), as_string(value)) {
                    map.insert(name, value);
                }
            }
        }
        docs.push(SearchDoc { key, fields: map });
    }
    docs
}

fn as_string(value: &RedisValue) -> Option<String> {
    match value {
        RedisValue::BulkString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        RedisValue::SimpleString(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(s: &str) -> RedisValue {
        RedisValue::BulkString(s.as_bytes().to_vec())
    }

    #[test]
    fn parses_search_reply_into_documents() {
        let reply = RedisValue::Array(vec![
            RedisValue::Int(2),
            bulk("bites:restaurant:a"),
            RedisValue::Array(vec![bulk("name"), bulk("Cafe"), bulk("avgRating"), bulk("4")]),
            bulk("bites:restaurant:b"),
            RedisValue::Array(vec![bulk("name"), bulk("Cantina")]),
        ]);

        let docs = parse_search_reply(&reply);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].key, "bites:restaurant:a");
        assert_eq!(docs[0].fields["name"], "Cafe");
        assert_eq!(docs[0].fields["avgRating"], "4");
        assert_eq!(docs[1].fields["name"], "Cantina");
    }

    #[test]
    fn empty_and_malformed_replies_yield_no_documents() {
        assert!(parse_search_reply(&RedisValue::Array(vec![RedisValue::Int(0)])).is_empty());
        assert!(parse_search_reply(&RedisValue::Nil).is_empty());
    }
}
