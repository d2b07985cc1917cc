//! Permitted request parameters.
//!
//! Update handlers take a JSON object, reject keys outside their permitted
//! list, then deserialize what is left into a typed update.

use crate::api::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub type Params = Map<String, Value>;

pub fn json_params(body: Result<Json<Params>, JsonRejection>) -> Result<Params, ApiError> {
    body.map(|Json(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Fails with the sorted list of keys that are not permitted
pub fn permit(params: &Params, permitted: &[&str]) -> Result<(), ApiError> {
    let mut disallowed: Vec<String> = params
        .keys()
        .filter(|key| !permitted.contains(&key.as_str()))
        .cloned()
        .collect();

    if disallowed.is_empty() {
        return Ok(());
    }

    disallowed.sort();
    Err(ApiError::DisallowedParameters(disallowed))
}

pub fn permitted<T: DeserializeOwned>(params: Params, permitted: &[&str]) -> Result<T, ApiError> {
    permit(&params, permitted)?;

    serde_json::from_value(Value::Object(params))
        .map_err(|e| ApiError::BadRequest(format!("Invalid parameters: {}", e)))
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
