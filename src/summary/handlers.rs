use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::ApiError,
    meals::{macros::PartialMacros, repo as meals_repo},
    plans::repo as plans_repo,
    state::AppState,
    summary::aggregate::{aggregate, DailySummary},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/summary/daily", get(daily_summary))
}

#[derive(Debug, Deserialize)]
pub struct DailySummaryQuery {
    pub date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct DailySummaryResponse {
    pub date: Date,
    #[serde(flatten)]
    pub summary: DailySummary,
}

/// Recomputed on every call; clients refetch on `meals:changed`.
#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DailySummaryQuery>,
) -> Result<Json<DailySummaryResponse>, ApiError> {
    let date = q.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());

    let target: Option<crate::meals::macros::MacroQuantity> =
        plans_repo::current_target(&state.db, user_id)
            .await?
            .map(Into::into);

    let meals: Vec<PartialMacros> = meals_repo::macros_for_date(&state.db, user_id, date)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let summary = aggregate(target.as_ref(), &meals);
    Ok(Json(DailySummaryResponse { date, summary }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn response_inlines_the_summary_next_to_the_date() {
        let response = DailySummaryResponse {
            date: date!(2025 - 06 - 01),
            summary: aggregate(None, &[]),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["date"], "2025-06-01");
        assert_eq!(json["status"], "no_active_plan");
        assert_eq!(json["meals_logged"], 0);
    }
}
