//! HTTP handlers for the drink resource
//!
//! Protected handlers take [`Authorized`] first; the claims it carries have
//! already been verified by the route's authorization layer.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::model::DrinkPayload;
use crate::app::AppState;
use crate::axum_integration::Authorized;
use crate::error::{ApiError, Result};

fn payload(body: std::result::Result<Json<DrinkPayload>, JsonRejection>) -> Result<DrinkPayload> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn drink_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    path.map(|Path(id)| id).map_err(|_| ApiError::NotFound)
}

/// `GET /drinks`, public short listing
pub async fn list_drinks(State(state): State<AppState>) -> Result<Json<Value>> {
    let drinks = state.drinks.list().await?;
    let short: Vec<_> = drinks.iter().map(|d| d.short()).collect();
    Ok(Json(json!({"success": true, "drinks": short})))
}

/// `GET /drinks-detail`, requires `get:drinks-detail`
pub async fn drinks_detail(
    Authorized(_claims): Authorized,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    let drinks = state.drinks.list().await?;
    let long: Vec<_> = drinks.iter().map(|d| d.long()).collect();
    Ok(Json(json!({"success": true, "drinks": long})))
}

/// `POST /drinks`, requires `post:drinks`
pub async fn create_drink(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    body: std::result::Result<Json<DrinkPayload>, JsonRejection>,
) -> Result<Json<Value>> {
    let new_drink = payload(body)?.into_new_drink()?;

    let drink = state.drinks.insert(&new_drink).await?;
    tracing::info!(id = drink.id, title = %drink.title, sub = ?claims.sub, "drink created");

    let drinks = state.drinks.list().await?;
    let short: Vec<_> = drinks.iter().map(|d| d.short()).collect();
    Ok(Json(json!({"success": true, "drinks": short})))
}

/// `PATCH /drinks/{id}`, requires `patch:drinks`
pub async fn update_drink(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<DrinkPayload>, JsonRejection>,
) -> Result<Json<Value>> {
    let id = drink_id(path)?;
    let changes = payload(body)?.into_changes()?;

    let drink = state.drinks.update(id, &changes).await?;
    tracing::info!(id, sub = ?claims.sub, "drink updated");

    Ok(Json(json!({"success": true, "drinks": [drink.long()]})))
}

/// `DELETE /drinks/{id}`, requires `delete:drinks`
pub async fn delete_drink(
    Authorized(claims): Authorized,
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>> {
    let id = drink_id(path)?;

    state.drinks.delete(id).await?;
    tracing::info!(id, sub = ?claims.sub, "drink deleted");

    Ok(Json(json!({"success": true, "delete": id})))
}
