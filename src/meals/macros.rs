use serde::{Deserialize, Serialize};

/// How a meal's macros were entered: summed from ingredients, or as one
/// direct total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MacroMode {
    IngredientLevel,
    MealLevel,
}

impl MacroMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IngredientLevel => "ingredient-level",
            Self::MealLevel => "meal-level",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "ingredient-level" => Self::IngredientLevel,
            _ => Self::MealLevel,
        }
    }
}

/// One ingredient of an ingredient-level meal. Macro values already reflect
/// the entered portion; `portion_size` is informational and never used to
/// rescale them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub name: String,
    #[serde(rename = "portionSize")]
    pub portion_size: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// The canonical macro 4-tuple. All fields are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroQuantity {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// A macro quantity with any subset of fields present. Used for meal-level
/// submissions and for nullable stored totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialMacros {
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
}

impl PartialMacros {
    pub fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein_g.is_none()
            && self.carbs_g.is_none()
            && self.fat_g.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("At least one ingredient is required for ingredient-level meals")]
    NoIngredients,
    #[error("At least one macro value is required for meal-level meals")]
    NoMacros,
}

/// Derive the canonical macro quantity for a meal at creation time.
///
/// Ingredient-level meals sum each field over their entries; meal-level
/// meals take the submitted fields with absent ones as zero, provided at
/// least one field was given.
pub fn resolve(
    mode: MacroMode,
    ingredients: Option<&[IngredientEntry]>,
    totals: &PartialMacros,
) -> Result<MacroQuantity, ResolveError> {
    match mode {
        MacroMode::IngredientLevel => {
            let entries = ingredients
                .filter(|list| !list.is_empty())
                .ok_or(ResolveError::NoIngredients)?;
            Ok(entries.iter().fold(MacroQuantity::default(), |acc, ing| {
                MacroQuantity {
                    calories: acc.calories + ing.calories,
                    protein_g: acc.protein_g + ing.protein,
                    carbs_g: acc.carbs_g + ing.carbs,
                    fat_g: acc.fat_g + ing.fat,
                }
            }))
        }
        MacroMode::MealLevel => {
            if totals.is_empty() {
                return Err(ResolveError::NoMacros);
            }
            Ok(MacroQuantity {
                calories: totals.calories.unwrap_or(0.0),
                protein_g: totals.protein_g.unwrap_or(0.0),
                carbs_g: totals.carbs_g.unwrap_or(0.0),
                fat_g: totals.fat_g.unwrap_or(0.0),
            })
        }
    }
}
