use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiError,
    plans::{
        dto::{ActivatePlanRequest, PlanResponse, ProtocolWithPhases, SetPhaseRequest},
        repo,
        repo_types::PhaseTarget,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plan", get(get_plan).post(activate_plan))
        .route("/plan/phase", put(set_phase))
        .route("/plan/target", get(get_target))
        .route("/protocols", get(list_protocols))
        .route("/templates", get(list_templates))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PlanResponse>, ApiError> {
    let plan = repo::active_plan(&state.db, user_id)
        .await?
        .ok_or(ApiError::NoActivePlan)?;

    let protocol = repo::find_protocol(&state.db, plan.protocol_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Protocol not found".into()))?;

    let current_phase = match plan.current_phase_id {
        Some(phase_id) => repo::find_phase(&state.db, phase_id).await?,
        None => None,
    };

    Ok(Json(PlanResponse {
        id: plan.id,
        start_date: plan.start_date,
        protocol,
        current_phase,
    }))
}

#[instrument(skip(state, payload))]
pub async fn activate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ActivatePlanRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PlanResponse>), ApiError> {
    let Json(payload) = payload.map_err(ApiError::bad_json)?;

    let protocol = repo::find_protocol(&state.db, payload.protocol_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Protocol not found".into()))?;

    // Default to the protocol's first phase when none was chosen.
    let phase = match payload.current_phase_id {
        Some(phase_id) => {
            let phase = repo::find_phase(&state.db, phase_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Phase not found".into()))?;
            if phase.protocol_id != protocol.id {
                return Err(ApiError::Conflict(
                    "Phase does not belong to the chosen protocol".into(),
                ));
            }
            phase
        }
        None => repo::phases_for_protocol(&state.db, protocol.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound("Protocol has no phases".into()))?,
    };

    let start_date = OffsetDateTime::now_utc().date();
    let plan = repo::activate_plan(&state.db, user_id, protocol.id, phase.id, start_date).await?;

    info!(user_id = %user_id, plan_id = %plan.id, protocol = %protocol.name, "plan activated");
    Ok((
        StatusCode::CREATED,
        Json(PlanResponse {
            id: plan.id,
            start_date: plan.start_date,
            protocol,
            current_phase: Some(phase),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn set_phase(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<SetPhaseRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, ApiError> {
    let Json(payload) = payload.map_err(ApiError::bad_json)?;

    let plan = repo::active_plan(&state.db, user_id)
        .await?
        .ok_or(ApiError::NoActivePlan)?;

    let phase = repo::find_phase(&state.db, payload.phase_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Phase not found".into()))?;
    if phase.protocol_id != plan.protocol_id {
        return Err(ApiError::Conflict(
            "Phase does not belong to the active protocol".into(),
        ));
    }

    repo::set_current_phase(&state.db, plan.id, phase.id).await?;

    let protocol = repo::find_protocol(&state.db, plan.protocol_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Protocol not found".into()))?;

    info!(user_id = %user_id, plan_id = %plan.id, phase = %phase.phase_name, "phase changed");
    Ok(Json(PlanResponse {
        id: plan.id,
        start_date: plan.start_date,
        protocol,
        current_phase: Some(phase),
    }))
}

#[instrument(skip(state))]
pub async fn get_target(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PhaseTarget>, ApiError> {
    let target = repo::current_target(&state.db, user_id)
        .await?
        .ok_or(ApiError::NoActivePlan)?;
    Ok(Json(target))
}

#[instrument(skip(state))]
pub async fn list_protocols(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<ProtocolWithPhases>>, ApiError> {
    let protocols = repo::list_protocols(&state.db).await?;
    let mut out = Vec::with_capacity(protocols.len());
    for protocol in protocols {
        let phases = repo::phases_for_protocol(&state.db, protocol.id).await?;
        out.push(ProtocolWithPhases { protocol, phases });
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<crate::plans::repo_types::MealTemplate>>, ApiError> {
    let templates = repo::list_templates(&state.db).await?;
    Ok(Json(templates))
}
