//! Key names for every structure in the store, under one application prefix.

pub const PREFIX: &str = "bites";

fn key(parts: &[&str]) -> String {
    format!("{PREFIX}:{}", parts.join(":"))
}

/// Restaurant record hash.
pub fn restaurant(id: &str) -> String {
    key(&["restaurant", id])
}

/// Review ledger list, newest id at the head.
pub fn reviews(restaurant_id: &str) -> String {
    key(&["reviews", restaurant_id])
}

/// Review detail hash.
pub fn review_details(review_id: &str) -> String {
    key(&["review_details", review_id])
}

/// Global set of distinct cuisine names.
pub fn cuisines() -> String {
    key(&["cuisines"])
}

/// Set of restaurant ids serving one cuisine.
pub fn cuisine(name: &str) -> String {
    key(&["cuisine", name])
}

/// Set of cuisine names one restaurant serves.
pub fn restaurant_cuisines(id: &str) -> String {
    key(&["restaurant_cuisines", id])
}

/// Rating index: sorted set of restaurant id scored by average rating.
pub fn restaurants_by_rating() -> String {
    key(&["restaurants_by_rating"])
}

/// Whole-document detail record.
pub fn restaurant_details(id: &str) -> String {
    key(&["restaurant_details", id])
}

/// Cached weather payload per restaurant.
pub fn weather(id: &str) -> String {
    key(&["weather", id])
}

/// Duplicate filter over (name, location) signatures.
pub fn bloom() -> String {
    key(&["bloom"])
}

/// Full-text index over restaurant record hashes.
pub fn search_index() -> String {
    key(&["index", "restaurants"])
}
