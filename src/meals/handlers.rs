use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    meals::{
        dto::{CreateMealRequest, FromTemplateRequest, MealListQuery, MealResponse},
        repo, services,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", get(get_meal))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/from-template", post(create_meal_from_template))
        .route("/meals/:id", delete(delete_meal))
}

fn created(row: crate::meals::repo_types::MealRow) -> (StatusCode, HeaderMap, Json<MealResponse>) {
    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/meals/{}", row.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    (StatusCode::CREATED, headers, Json(MealResponse::from(row)))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateMealRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<MealResponse>), ApiError> {
    services::check_write_limit(&state, user_id).await?;
    let Json(payload) = payload.map_err(ApiError::bad_json)?;
    let row = services::create_meal(&state, user_id, payload).await?;
    Ok(created(row))
}

#[instrument(skip(state, payload))]
pub async fn create_meal_from_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<FromTemplateRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<MealResponse>), ApiError> {
    services::check_write_limit(&state, user_id).await?;
    let Json(payload) = payload.map_err(ApiError::bad_json)?;
    let row = services::create_from_template(&state, user_id, payload).await?;
    Ok(created(row))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<MealListQuery>,
) -> Result<Json<Vec<MealResponse>>, ApiError> {
    let rows = repo::list_by_user(&state.db, user_id, q.date, q.limit, q.offset).await?;
    Ok(Json(rows.into_iter().map(MealResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealResponse>, ApiError> {
    let row = repo::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meal not found".into()))?;
    Ok(Json(MealResponse::from(row)))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    services::delete_meal(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
