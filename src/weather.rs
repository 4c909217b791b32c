//! Pass-through weather cache. Not core logic: the store holds the last
//! upstream payload per restaurant for an hour and everything else is
//! forwarded as-is.

use serde_json::Value;
use tracing::debug;

use crate::{error::AppError, keys, state::AppState};

const CACHE_SECONDS: u64 = 60 * 60;
const ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

pub async fn for_restaurant(state: &AppState, restaurant_id: &str) -> Result<Value, AppError> {
    let cache_key = keys::weather(restaurant_id);
    if let Some(cached) = state.store.get(&cache_key).await? {
        if let Ok(weather) = serde_json::from_str(&cached) {
            debug!("weather cache hit for {restaurant_id}");
            return Ok(weather);
        }
    }

    let api_key = state
        .config
        .weather_api_key
        .as_deref()
        .ok_or_else(|| AppError::Upstream("weather API key not configured".into()))?;

    let coords = state
        .store
        .hget(&keys::restaurant(restaurant_id), "location")
        .await?
        .ok_or(AppError::NotFound("location"))?;
    let (lng, lat) = coords
        .split_once(',')
        .ok_or(AppError::Inconsistent("location is not a lng,lat pair"))?;

    let response = state
        .http
        .get(ENDPOINT)
        .query(&[("lat", lat.trim()), ("lon", lng.trim()), ("appid", api_key)])
        .send()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    if !response.status().is_success() {
        return Err(AppError::Upstream(format!(
            "weather API returned {}",
            response.status()
        )));
    }
    let weather: Value = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    state
        .store
        .set_ex(&cache_key, &weather.to_string(), CACHE_SECONDS)
        .await?;
    Ok(weather)
}
