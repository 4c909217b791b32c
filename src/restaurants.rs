//! Restaurant records and the projections written at creation time: the
//! record hash, the rating index seed, cuisine membership, and the duplicate
//! filter admission.

use std::collections::HashMap;

use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{
    cuisines, error::AppError, keys, pagination::PageQuery, store::DataStore,
};

#[derive(Debug, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    /// `lng,lat` pair encoded as a string.
    pub location: String,
    #[serde(default)]
    pub cuisines: Vec<String>,
}

impl NewRestaurant {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::Validation("location must not be empty".into()));
        }
        if self.cuisines.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::Validation(
                "cuisine names must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RestaurantSummary {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct RestaurantView {
    #[serde(flatten)]
    pub fields: HashMap<String, String>,
    pub cuisines: Vec<String>,
}

/// Deterministic duplicate-filter signature: whitespace-normalized,
/// lowercased name plus the raw coordinate string. The same physical
/// restaurant always maps to the same signature.
pub fn signature(name: &str, location: &str) -> String {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{} {}", name.to_lowercase(), location.trim())
}

pub async fn create(
    store: &dyn DataStore,
    data: &NewRestaurant,
) -> Result<RestaurantSummary, AppError> {
    let sig = signature(&data.name, &data.location);
    // A positive here may be a filter false positive; that rejection rate is
    // bounded by the filter's configured error rate and accepted. A negative
    // is always genuine.
    if store.bf_exists(&keys::bloom(), &sig).await? {
        return Err(AppError::Duplicate("restaurant"));
    }

    let id = nanoid!();
    store
        .hset(
            &keys::restaurant(&id),
            &[
                ("id", id.clone()),
                ("name", data.name.clone()),
                ("location", data.location.clone()),
                ("totalStars", "0".into()),
                ("reviewCount", "0".into()),
                ("avgRating", "0".into()),
                ("viewCount", "0".into()),
            ],
        )
        .await?;
    // Unrated restaurants enter the rating index at zero and sort behind
    // every rated restaurant in descending listings.
    store.zadd(&keys::restaurants_by_rating(), &id, 0.0).await?;

    if let Err(e) = cuisines::attach(store, &id, &data.cuisines).await {
        warn!("cuisine index drift for restaurant {id}: {e}");
        return Err(e);
    }

    // Admitted last: the filter never shrinks, so the signature must not
    // enter it before the record writes have succeeded.
    store.bf_add(&keys::bloom(), &sig).await?;

    Ok(RestaurantSummary {
        id,
        name: data.name.clone(),
        location: data.location.clone(),
    })
}

/// Rating-descending listing backed by the rank index.
pub async fn list(
    store: &dyn DataStore,
    page: PageQuery,
) -> Result<Vec<HashMap<String, String>>, AppError> {
    let (start, end) = page.to_range();
    let ids = store
        .zrevrange(&keys::restaurants_by_rating(), start, end)
        .await?;

    let mut restaurants = Vec::with_capacity(ids.len());
    for id in ids {
        restaurants.push(store.hgetall(&keys::restaurant(&id)).await?);
    }
    Ok(restaurants)
}

/// Single-restaurant view; every view bumps the counter before the read.
pub async fn view(store: &dyn DataStore, id: &str) -> Result<RestaurantView, AppError> {
    store.hincr(&keys::restaurant(id), "viewCount", 1).await?;
    let fields = store.hgetall(&keys::restaurant(id)).await?;
    if fields.is_empty() {
        return Err(AppError::NotFound("restaurant"));
    }
    let cuisines = store.smembers(&keys::restaurant_cuisines(id)).await?;
    Ok(RestaurantView { fields, cuisines })
}

/// Overwrites the detail document wholesale; there is no partial patch.
pub async fn set_details(
    store: &dyn DataStore,
    id: &str,
    details: &Value,
) -> Result<(), AppError> {
    store.json_set(&keys::restaurant_details(id), details).await
}

pub async fn details(store: &dyn DataStore, id: &str) -> Result<Value, AppError> {
    store
        .json_get(&keys::restaurant_details(id))
        .await?
        .ok_or(AppError::NotFound("details"))
}
