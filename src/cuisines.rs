//! Cuisine inverted index: restaurant/cuisine membership in both directions
//! plus the global set of cuisine names. Membership only grows; there is no
//! detach.

use crate::{error::AppError, keys, store::DataStore};

/// Three writes per cuisine: the global name set and both directions of the
/// membership. The writes are one unit by convention only; a failure
/// part-way through leaves the index asymmetric until the restaurant is
/// attached again, and nothing rolls back.
pub async fn attach(
    store: &dyn DataStore,
    restaurant_id: &str,
    cuisines: &[String],
) -> Result<(), AppError> {
    for cuisine in cuisines {
        store.sadd(&keys::cuisines(), cuisine).await?;
        store.sadd(&keys::cuisine(cuisine), restaurant_id).await?;
        store
            .sadd(&keys::restaurant_cuisines(restaurant_id), cuisine)
            .await?;
    }
    Ok(())
}

pub async fn list(store: &dyn DataStore) -> Result<Vec<String>, AppError> {
    store.smembers(&keys::cuisines()).await
}

/// Restaurants serving one cuisine, resolved to display names. Ids whose
/// record hash is missing are skipped rather than surfaced.
pub async fn members(store: &dyn DataStore, cuisine: &str) -> Result<Vec<String>, AppError> {
    let ids = store.smembers(&keys::cuisine(cuisine)).await?;

    let mut names = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(name) = store.hget(&keys::restaurant(&id), "name").await? {
            names.push(name);
        }
    }
    Ok(names)
}
