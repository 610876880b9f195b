use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::FieldError;
use crate::meals::macros::{IngredientEntry, MacroMode, PartialMacros};
use crate::meals::repo_types::MealRow;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub meal_name: String,
    pub meal_date: Date,
    pub macro_mode: MacroMode,
    pub ingredients: Option<Vec<IngredientEntry>>,
    pub total_calories: Option<f64>,
    pub total_protein: Option<f64>,
    pub total_carbs: Option<f64>,
    pub total_fat: Option<f64>,
}

impl CreateMealRequest {
    pub fn totals(&self) -> PartialMacros {
        PartialMacros {
            calories: self.total_calories,
            protein_g: self.total_protein,
            carbs_g: self.total_carbs,
            fat_g: self.total_fat,
        }
    }

    /// Field-level checks applied before the macros are resolved.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.meal_name.is_empty() {
            errors.push(FieldError::new("meal_name", "Meal name is required"));
        } else if self.meal_name.len() > MAX_NAME_LEN {
            errors.push(FieldError::new("meal_name", "Meal name is too long"));
        }

        if let Some(ingredients) = &self.ingredients {
            for (i, ing) in ingredients.iter().enumerate() {
                if ing.name.is_empty() {
                    errors.push(FieldError::new(
                        format!("ingredients.{i}.name"),
                        "Ingredient name is required",
                    ));
                } else if ing.name.len() > MAX_NAME_LEN {
                    errors.push(FieldError::new(
                        format!("ingredients.{i}.name"),
                        "Ingredient name is too long",
                    ));
                }
                if ing.portion_size <= 0.0 {
                    errors.push(FieldError::new(
                        format!("ingredients.{i}.portionSize"),
                        "Portion size must be positive",
                    ));
                }
                for (field, value) in [
                    ("calories", ing.calories),
                    ("protein", ing.protein),
                    ("carbs", ing.carbs),
                    ("fat", ing.fat),
                ] {
                    if value < 0.0 {
                        errors.push(FieldError::new(
                            format!("ingredients.{i}.{field}"),
                            format!("{field} cannot be negative"),
                        ));
                    }
                }
            }
        }

        for (field, value) in [
            ("total_calories", self.total_calories),
            ("total_protein", self.total_protein),
            ("total_carbs", self.total_carbs),
            ("total_fat", self.total_fat),
        ] {
            if value.is_some_and(|v| v < 0.0) {
                errors.push(FieldError::new(field, format!("{field} cannot be negative")));
            }
        }

        match self.macro_mode {
            MacroMode::IngredientLevel => {
                if self.ingredients.as_ref().map_or(true, |l| l.is_empty()) {
                    errors.push(FieldError::new(
                        "ingredients",
                        "At least one ingredient is required for ingredient-level meals",
                    ));
                }
            }
            MacroMode::MealLevel => {
                if self.totals().is_empty() {
                    errors.push(FieldError::new(
                        "total_calories",
                        "At least one macro value is required for meal-level meals",
                    ));
                }
            }
        }

        errors
    }
}

#[derive(Debug, Deserialize)]
pub struct FromTemplateRequest {
    pub template_id: Uuid,
    pub meal_date: Date,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: Uuid,
    pub meal_name: String,
    pub meal_date: Date,
    pub macro_mode: MacroMode,
    pub total_calories: Option<f64>,
    pub total_protein: Option<f64>,
    pub total_carbs: Option<f64>,
    pub total_fat: Option<f64>,
    pub ingredients: Option<Vec<IngredientEntry>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<MealRow> for MealResponse {
    fn from(row: MealRow) -> Self {
        Self {
            id: row.id,
            meal_name: row.meal_name,
            meal_date: row.meal_date,
            macro_mode: MacroMode::from_db(&row.entry_mode),
            total_calories: row.total_calories,
            total_protein: row.total_protein,
            total_carbs: row.total_carbs,
            total_fat: row.total_fat,
            ingredients: row.ingredients.map(|j| j.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MealListQuery {
    pub date: Option<Date>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn meal_level_request() -> CreateMealRequest {
        CreateMealRequest {
            meal_name: "Lunch".into(),
            meal_date: date!(2025 - 06 - 01),
            macro_mode: MacroMode::MealLevel,
            ingredients: None,
            total_calories: Some(600.0),
            total_protein: None,
            total_carbs: None,
            total_fat: None,
        }
    }

    #[test]
    fn accepts_meal_level_with_a_single_macro() {
        assert!(meal_level_request().validate().is_empty());
    }

    #[test]
    fn rejects_meal_level_without_any_macro() {
        let mut req = meal_level_request();
        req.total_calories = None;
        let errors = req.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "total_calories");
    }

    #[test]
    fn rejects_ingredient_level_without_ingredients() {
        let mut req = meal_level_request();
        req.macro_mode = MacroMode::IngredientLevel;
        let errors = req.validate();
        assert!(errors.iter().any(|e| e.path == "ingredients"));
    }

    #[test]
    fn flags_bad_ingredient_fields_with_their_paths() {
        let mut req = meal_level_request();
        req.macro_mode = MacroMode::IngredientLevel;
        req.ingredients = Some(vec![IngredientEntry {
            name: String::new(),
            portion_size: 0.0,
            calories: -1.0,
            protein: 10.0,
            carbs: 10.0,
            fat: 1.0,
        }]);
        let errors = req.validate();
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"ingredients.0.name"));
        assert!(paths.contains(&"ingredients.0.portionSize"));
        assert!(paths.contains(&"ingredients.0.calories"));
    }

    #[test]
    fn rejects_empty_and_oversized_names() {
        let mut req = meal_level_request();
        req.meal_name = String::new();
        assert!(req.validate().iter().any(|e| e.path == "meal_name"));

        req.meal_name = "x".repeat(256);
        assert!(req.validate().iter().any(|e| e.path == "meal_name"));
    }

    #[test]
    fn rejects_negative_totals() {
        let mut req = meal_level_request();
        req.total_fat = Some(-2.0);
        assert!(req.validate().iter().any(|e| e.path == "total_fat"));
    }

    #[test]
    fn meal_date_parses_from_iso_date() {
        let req: CreateMealRequest = serde_json::from_str(
            r#"{
                "meal_name": "Dinner",
                "meal_date": "2025-06-01",
                "macro_mode": "meal-level",
                "total_calories": 800
            }"#,
        )
        .unwrap();
        assert_eq!(req.meal_date, date!(2025 - 06 - 01));
        assert_eq!(req.macro_mode, MacroMode::MealLevel);
    }
}
