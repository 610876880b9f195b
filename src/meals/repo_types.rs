use sqlx::types::Json;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::meals::macros::{IngredientEntry, PartialMacros};

/// Meal record as stored. Totals are nullable in the schema; rows written
/// by this service always carry resolved values.
#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_name: String,
    pub meal_date: Date,
    pub entry_mode: String,
    pub total_calories: Option<f64>,
    pub total_protein: Option<f64>,
    pub total_carbs: Option<f64>,
    pub total_fat: Option<f64>,
    pub ingredients: Option<Json<Vec<IngredientEntry>>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Just the macro columns of one meal, for the daily aggregation.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct MealMacroRow {
    pub total_calories: Option<f64>,
    pub total_protein: Option<f64>,
    pub total_carbs: Option<f64>,
    pub total_fat: Option<f64>,
}

impl From<MealMacroRow> for PartialMacros {
    fn from(r: MealMacroRow) -> Self {
        Self {
            calories: r.total_calories,
            protein_g: r.total_protein,
            carbs_g: r.total_carbs,
            fat_g: r.total_fat,
        }
    }
}
