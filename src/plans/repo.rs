use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::plans::repo_types::{
    MealTemplate, NutritionProtocol, PhaseTarget, ProtocolPhase, UserNutritionPlan,
};

pub async fn list_protocols(db: &PgPool) -> anyhow::Result<Vec<NutritionProtocol>> {
    let rows = sqlx::query_as::<_, NutritionProtocol>(
        r#"
        SELECT id, name, description
        FROM nutrition_protocols
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_protocol(db: &PgPool, id: Uuid) -> anyhow::Result<Option<NutritionProtocol>> {
    let row = sqlx::query_as::<_, NutritionProtocol>(
        r#"
        SELECT id, name, description
        FROM nutrition_protocols
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn phases_for_protocol(
    db: &PgPool,
    protocol_id: Uuid,
) -> anyhow::Result<Vec<ProtocolPhase>> {
    let rows = sqlx::query_as::<_, ProtocolPhase>(
        r#"
        SELECT id, protocol_id, phase_name, phase_order,
               daily_calories, target_protein, target_carbs, target_fat
        FROM protocol_phases
        WHERE protocol_id = $1
        ORDER BY phase_order
        "#,
    )
    .bind(protocol_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_phase(db: &PgPool, phase_id: Uuid) -> anyhow::Result<Option<ProtocolPhase>> {
    let row = sqlx::query_as::<_, ProtocolPhase>(
        r#"
        SELECT id, protocol_id, phase_name, phase_order,
               daily_calories, target_protein, target_carbs, target_fat
        FROM protocol_phases
        WHERE id = $1
        "#,
    )
    .bind(phase_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn active_plan(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserNutritionPlan>> {
    let row = sqlx::query_as::<_, UserNutritionPlan>(
        r#"
        SELECT id, user_id, protocol_id, current_phase_id, start_date, is_active
        FROM user_nutrition_plans
        WHERE user_id = $1 AND is_active = TRUE
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Daily target of the caller's active plan's current phase, if any.
pub async fn current_target(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<PhaseTarget>> {
    let row = sqlx::query_as::<_, PhaseTarget>(
        r#"
        SELECT p.daily_calories, p.target_protein, p.target_carbs, p.target_fat
        FROM user_nutrition_plans u
        JOIN protocol_phases p ON p.id = u.current_phase_id
        WHERE u.user_id = $1 AND u.is_active = TRUE
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Activate a plan for the user, retiring any previously active one. One
/// active plan per user, by construction.
pub async fn activate_plan(
    db: &PgPool,
    user_id: Uuid,
    protocol_id: Uuid,
    phase_id: Uuid,
    start_date: Date,
) -> anyhow::Result<UserNutritionPlan> {
    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        UPDATE user_nutrition_plans
        SET is_active = FALSE
        WHERE user_id = $1 AND is_active = TRUE
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let plan = sqlx::query_as::<_, UserNutritionPlan>(
        r#"
        INSERT INTO user_nutrition_plans
            (user_id, protocol_id, current_phase_id, start_date, is_active)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING id, user_id, protocol_id, current_phase_id, start_date, is_active
        "#,
    )
    .bind(user_id)
    .bind(protocol_id)
    .bind(phase_id)
    .bind(start_date)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(plan)
}

pub async fn set_current_phase(
    db: &PgPool,
    plan_id: Uuid,
    phase_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE user_nutrition_plans
        SET current_phase_id = $2
        WHERE id = $1
        "#,
    )
    .bind(plan_id)
    .bind(phase_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn list_templates(db: &PgPool) -> anyhow::Result<Vec<MealTemplate>> {
    let rows = sqlx::query_as::<_, MealTemplate>(
        r#"
        SELECT id, name, description,
               total_calories, total_protein, total_carbs, total_fat, is_public
        FROM meal_templates
        WHERE is_public = TRUE
        ORDER BY name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_template(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MealTemplate>> {
    let row = sqlx::query_as::<_, MealTemplate>(
        r#"
        SELECT id, name, description,
               total_calories, total_protein, total_carbs, total_fat, is_public
        FROM meal_templates
        WHERE id = $1 AND is_public = TRUE
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
