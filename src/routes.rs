//! Axum handlers and the restaurant-existence middleware. Handlers validate
//! request bodies, call the core operations, and wrap results in the
//! response envelope; status mapping for failures lives on [`AppError`].

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    cuisines,
    error::AppError,
    keys,
    pagination::PageQuery,
    restaurants, reviews, search,
    state::AppState,
    weather,
};

fn success(message: &str, data: impl serde::Serialize) -> Response {
    let body = Json(json!({
        "status": "success",
        "message": message,
        "data": data,
    }));
    (StatusCode::OK, body).into_response()
}

/// Confirms the restaurant record exists before any per-restaurant operation
/// runs. The core can still race a concurrent delete at the data layer; that
/// surfaces as `NotFound` from the operation itself.
pub async fn check_restaurant_exists(
    State(state): State<Arc<AppState>>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = params
        .get("restaurantId")
        .ok_or_else(|| AppError::Validation("restaurant id is required".into()))?;
    if !state.store.exists(&keys::restaurant(id)).await? {
        return Err(AppError::NotFound("restaurant"));
    }
    Ok(next.run(request).await)
}

pub async fn list_restaurants(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<Response, AppError> {
    let found = restaurants::list(state.store.as_ref(), page).await?;
    Ok(success("Restaurants found", found))
}

pub async fn create_restaurant(
    State(state): State<Arc<AppState>>,
    Json(data): Json<restaurants::NewRestaurant>,
) -> Result<Response, AppError> {
    data.validate()?;
    let created = restaurants::create(state.store.as_ref(), &data).await?;
    Ok(success("Restaurant added successfully", created))
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

pub async fn search_restaurants(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let hits = search::by_name_prefix(state.store.as_ref(), &params.q).await?;
    Ok(success("Search results found", hits))
}

pub async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
) -> Result<Response, AppError> {
    let found = restaurants::view(state.store.as_ref(), &restaurant_id).await?;
    Ok(success("Restaurant found", found))
}

pub async fn set_details(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
    Json(details): Json<Value>,
) -> Result<Response, AppError> {
    if !details.is_object() {
        return Err(AppError::Validation("details must be an object".into()));
    }
    restaurants::set_details(state.store.as_ref(), &restaurant_id, &details).await?;
    Ok(success("Details added successfully", details))
}

pub async fn get_details(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
) -> Result<Response, AppError> {
    let details = restaurants::details(state.store.as_ref(), &restaurant_id).await?;
    Ok(success("Details found", details))
}

pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
    Json(data): Json<reviews::NewReview>,
) -> Result<Response, AppError> {
    data.validate()?;
    let review = reviews::add(state.store.as_ref(), &restaurant_id, &data).await?;
    Ok(success("Review added successfully", review))
}

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Response, AppError> {
    let found = reviews::page(state.store.as_ref(), &restaurant_id, page).await?;
    Ok(success("Reviews found", found))
}

pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path((restaurant_id, review_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    reviews::remove(state.store.as_ref(), &restaurant_id, &review_id).await?;
    Ok(success("Review deleted successfully", review_id))
}

pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<String>,
) -> Result<Response, AppError> {
    let report = weather::for_restaurant(&state, &restaurant_id).await?;
    Ok(success("Weather found", report))
}

pub async fn list_cuisines(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let found = cuisines::list(state.store.as_ref()).await?;
    Ok(success("Cuisines found", found))
}

pub async fn cuisine_members(
    State(state): State<Arc<AppState>>,
    Path(cuisine): Path<String>,
) -> Result<Response, AppError> {
    let found = cuisines::members(state.store.as_ref(), &cuisine).await?;
    Ok(success("Restaurants found", found))
}
