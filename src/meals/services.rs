use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::events::MealChange;
use crate::meals::dto::{CreateMealRequest, FromTemplateRequest};
use crate::meals::macros::{self, MacroMode, MacroQuantity};
use crate::meals::repo::{self, NewMeal};
use crate::meals::repo_types::MealRow;
use crate::plans;
use crate::state::AppState;

/// Per-user throttle on meal-creating writes.
pub async fn check_write_limit(state: &AppState, user_id: Uuid) -> Result<(), ApiError> {
    let now = OffsetDateTime::now_utc();
    let decision = state.rate_limiter.hit(&user_id.to_string(), now).await;
    if decision.allowed {
        debug!(user_id = %user_id, remaining = decision.remaining, "write allowed");
        Ok(())
    } else {
        info!(user_id = %user_id, "meal writes rate limited");
        Err(ApiError::RateLimited {
            retry_after: decision.retry_after(now),
        })
    }
}

pub async fn create_meal(
    state: &AppState,
    user_id: Uuid,
    req: CreateMealRequest,
) -> Result<MealRow, ApiError> {
    let errors = req.validate();
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let resolved = macros::resolve(req.macro_mode, req.ingredients.as_deref(), &req.totals())
        .map_err(|e| {
            ApiError::validation(vec![crate::error::FieldError::new(
                match e {
                    macros::ResolveError::NoIngredients => "ingredients",
                    macros::ResolveError::NoMacros => "total_calories",
                },
                e.to_string(),
            )])
        })?;

    let ingredients = match req.macro_mode {
        MacroMode::IngredientLevel => req.ingredients,
        MacroMode::MealLevel => None,
    };

    let row = repo::insert(
        &state.db,
        user_id,
        NewMeal {
            meal_name: req.meal_name,
            meal_date: req.meal_date,
            entry_mode: req.macro_mode,
            macros: resolved,
            ingredients,
        },
    )
    .await?;

    state.meal_events.publish(MealChange {
        user_id,
        date: row.meal_date,
    });
    info!(user_id = %user_id, meal_id = %row.id, date = %row.meal_date, "meal created");
    Ok(row)
}

/// Log a public template as a meal-level meal in one call.
pub async fn create_from_template(
    state: &AppState,
    user_id: Uuid,
    req: FromTemplateRequest,
) -> Result<MealRow, ApiError> {
    let template = plans::repo::find_template(&state.db, req.template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".into()))?;

    let row = repo::insert(
        &state.db,
        user_id,
        NewMeal {
            meal_name: template.name,
            meal_date: req.meal_date,
            entry_mode: MacroMode::MealLevel,
            macros: MacroQuantity {
                calories: template.total_calories,
                protein_g: template.total_protein,
                carbs_g: template.total_carbs,
                fat_g: template.total_fat,
            },
            ingredients: None,
        },
    )
    .await?;

    state.meal_events.publish(MealChange {
        user_id,
        date: row.meal_date,
    });
    info!(user_id = %user_id, meal_id = %row.id, template_id = %req.template_id, "meal logged from template");
    Ok(row)
}

pub async fn delete_meal(state: &AppState, user_id: Uuid, meal_id: Uuid) -> Result<(), ApiError> {
    let date = repo::delete(&state.db, user_id, meal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meal not found".into()))?;

    state.meal_events.publish(MealChange { user_id, date });
    info!(user_id = %user_id, meal_id = %meal_id, "meal deleted");
    Ok(())
}
