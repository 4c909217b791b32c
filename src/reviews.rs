//! Review ledger and rating index maintenance.
//!
//! A review add touches four projections in sequence: the ledger list, the
//! review detail hash, the cumulative counters on the restaurant hash, and
//! the rating index score. Each call is atomic on its own; concurrent adds
//! for the same restaurant can interleave and momentarily write an average
//! that matches neither submission, which the next add overwrites. No lock
//! is taken, and independent restaurants never contend.

use std::collections::HashMap;

use chrono::Utc;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, keys, pagination::PageQuery, store::DataStore};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub rating: f64,
    pub review: String,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppError::Validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct Review {
    pub id: String,
    pub rating: f64,
    pub review: String,
    pub timestamp: i64,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: String,
    #[serde(rename = "avgRating")]
    pub avg_rating: f64,
}

/// Averages are kept to one decimal, the same precision the rating index
/// stores as the score.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub async fn add(
    store: &dyn DataStore,
    restaurant_id: &str,
    data: &NewReview,
) -> Result<Review, AppError> {
    let id = nanoid!();
    let timestamp = Utc::now().timestamp_millis();
    let restaurant_key = keys::restaurant(restaurant_id);

    // Newest review at the head, so pagination reads most-recent-first
    // without any secondary sort.
    store.lpush(&keys::reviews(restaurant_id), &id).await?;
    store
        .hset(
            &keys::review_details(&id),
            &[
                ("id", id.clone()),
                ("rating", data.rating.to_string()),
                ("review", data.review.clone()),
                ("timestamp", timestamp.to_string()),
                ("restaurantId", restaurant_id.to_string()),
            ],
        )
        .await?;

    // The count is an atomically incremented hash field next to the star
    // total, not a re-read of the ledger length, so the division below never
    // sees a count the ledger write failed to produce.
    let count = store.hincr(&restaurant_key, "reviewCount", 1).await?;
    let total = store
        .hincr_float(&restaurant_key, "totalStars", data.rating)
        .await?;
    if count <= 0 {
        return Err(AppError::Inconsistent(
            "review count not positive after increment",
        ));
    }

    let average = round_rating(total / count as f64);
    store
        .zadd(&keys::restaurants_by_rating(), restaurant_id, average)
        .await?;
    store
        .hset(&restaurant_key, &[("avgRating", average.to_string())])
        .await?;

    Ok(Review {
        id,
        rating: data.rating,
        review: data.review.clone(),
        timestamp,
        restaurant_id: restaurant_id.to_string(),
        avg_rating: average,
    })
}

/// One ledger page in stored order (most recent first), resolved to detail
/// records. A review whose details are missing shows up as an empty map
/// until the drift is repaired.
pub async fn page(
    store: &dyn DataStore,
    restaurant_id: &str,
    page: PageQuery,
) -> Result<Vec<HashMap<String, String>>, AppError> {
    let (start, end) = page.to_range();
    let ids = store
        .lrange(&keys::reviews(restaurant_id), start, end)
        .await?;

    let mut reviews = Vec::with_capacity(ids.len());
    for id in ids {
        reviews.push(store.hgetall(&keys::review_details(&id)).await?);
    }
    Ok(reviews)
}

/// Removes the ledger entry and the detail record. The two can drift apart
/// independently, so not-found is reported only when both are already gone.
pub async fn remove(
    store: &dyn DataStore,
    restaurant_id: &str,
    review_id: &str,
) -> Result<(), AppError> {
    let removed = store
        .lrem(&keys::reviews(restaurant_id), review_id)
        .await?;
    let deleted = store.del(&keys::review_details(review_id)).await?;
    if removed == 0 && !deleted {
        return Err(AppError::NotFound("review"));
    }
    Ok(())
}
