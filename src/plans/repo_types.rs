use serde::Serialize;
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

use crate::meals::macros::MacroQuantity;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NutritionProtocol {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// One time-bounded segment of a protocol with its daily macro targets.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProtocolPhase {
    pub id: Uuid,
    pub protocol_id: Uuid,
    pub phase_name: String,
    pub phase_order: i32,
    pub daily_calories: f64,
    pub target_protein: f64,
    pub target_carbs: f64,
    pub target_fat: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserNutritionPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub protocol_id: Uuid,
    pub current_phase_id: Option<Uuid>,
    pub start_date: Date,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub is_public: bool,
}

/// The daily target consumed by the aggregator.
#[derive(Debug, Clone, Copy, Serialize, FromRow)]
pub struct PhaseTarget {
    pub daily_calories: f64,
    pub target_protein: f64,
    pub target_carbs: f64,
    pub target_fat: f64,
}

impl From<PhaseTarget> for MacroQuantity {
    fn from(t: PhaseTarget) -> Self {
        Self {
            calories: t.daily_calories,
            protein_g: t.target_protein,
            carbs_g: t.target_carbs,
            fat_g: t.target_fat,
        }
    }
}
