use sqlx::types::Json;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::meals::macros::{IngredientEntry, MacroMode, MacroQuantity};
use crate::meals::repo_types::{MealMacroRow, MealRow};

const MEAL_COLUMNS: &str = "id, user_id, meal_name, meal_date, entry_mode, \
     total_calories, total_protein, total_carbs, total_fat, ingredients, \
     created_at, updated_at";

pub struct NewMeal {
    pub meal_name: String,
    pub meal_date: Date,
    pub entry_mode: MacroMode,
    pub macros: MacroQuantity,
    pub ingredients: Option<Vec<IngredientEntry>>,
}

pub async fn insert(db: &PgPool, user_id: Uuid, meal: NewMeal) -> anyhow::Result<MealRow> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        INSERT INTO meals
            (user_id, meal_name, meal_date, entry_mode,
             total_calories, total_protein, total_carbs, total_fat, ingredients)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&meal.meal_name)
    .bind(meal.meal_date)
    .bind(meal.entry_mode.as_str())
    .bind(meal.macros.calories)
    .bind(meal.macros.protein_g)
    .bind(meal.macros.carbs_g)
    .bind(meal.macros.fat_g)
    .bind(meal.ingredients.map(Json))
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Caller's meals, newest first, optionally narrowed to one date.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    date: Option<Date>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealRow>> {
    let rows = match date {
        Some(date) => {
            sqlx::query_as::<_, MealRow>(&format!(
                r#"
                SELECT {MEAL_COLUMNS}
                FROM meals
                WHERE user_id = $1 AND meal_date = $2
                ORDER BY created_at DESC
                LIMIT $3 OFFSET $4
                "#
            ))
            .bind(user_id)
            .bind(date)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, MealRow>(&format!(
                r#"
                SELECT {MEAL_COLUMNS}
                FROM meals
                WHERE user_id = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#
            ))
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn find_by_id(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<Option<MealRow>> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        WHERE id = $1 AND user_id = $2
        "#
    ))
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Delete a meal the caller owns. Returns its date for invalidation, or
/// None when no such meal exists.
pub async fn delete(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<Option<Date>> {
    let date = sqlx::query_scalar::<_, Date>(
        r#"
        DELETE FROM meals
        WHERE id = $1 AND user_id = $2
        RETURNING meal_date
        "#,
    )
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(date)
}

/// Macro columns of every meal the user logged on one date.
pub async fn macros_for_date(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
) -> anyhow::Result<Vec<MealMacroRow>> {
    let rows = sqlx::query_as::<_, MealMacroRow>(
        r#"
        SELECT total_calories, total_protein, total_carbs, total_fat
        FROM meals
        WHERE user_id = $1 AND meal_date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
