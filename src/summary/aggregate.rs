use serde::Serialize;

use crate::meals::macros::{MacroQuantity, PartialMacros};

/// Actual-vs-target for one macro field. Percentage is rounded and capped
/// at 100; remaining floors at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProgress {
    pub target: f64,
    pub actual: f64,
    pub percentage: u8,
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayReport {
    pub calories: MacroProgress,
    pub protein_g: MacroProgress,
    pub carbs_g: MacroProgress,
    pub fat_g: MacroProgress,
    pub meals_logged: usize,
}

/// Result of the daily aggregation. A missing target is its own state so
/// callers can render "set up a plan" instead of 0% everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DailySummary {
    NoActivePlan {
        actual: MacroQuantity,
        meals_logged: usize,
    },
    Tracked(DayReport),
}

fn progress(target: f64, actual: f64) -> MacroProgress {
    let percentage = if target <= 0.0 {
        0
    } else {
        ((actual / target) * 100.0).round().min(100.0) as u8
    };
    MacroProgress {
        target,
        actual,
        percentage,
        remaining: (target - actual).max(0.0),
    }
}

/// Fold the day's meals into actual totals and compare them to the target.
/// Pure over its inputs; null meal fields count as zero.
pub fn aggregate(target: Option<&MacroQuantity>, meals: &[PartialMacros]) -> DailySummary {
    let actual = meals.iter().fold(MacroQuantity::default(), |acc, m| {
        MacroQuantity {
            calories: acc.calories + m.calories.unwrap_or(0.0),
            protein_g: acc.protein_g + m.protein_g.unwrap_or(0.0),
            carbs_g: acc.carbs_g + m.carbs_g.unwrap_or(0.0),
            fat_g: acc.fat_g + m.fat_g.unwrap_or(0.0),
        }
    });

    match target {
        None => DailySummary::NoActivePlan {
            actual,
            meals_logged: meals.len(),
        },
        Some(target) => DailySummary::Tracked(DayReport {
            calories: progress(target.calories, actual.calories),
            protein_g: progress(target.protein_g, actual.protein_g),
            carbs_g: progress(target.carbs_g, actual.carbs_g),
            fat_g: progress(target.fat_g, actual.fat_g),
            meals_logged: meals.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> PartialMacros {
        PartialMacros {
            calories: Some(calories),
            protein_g: Some(protein_g),
            carbs_g: Some(carbs_g),
            fat_g: Some(fat_g),
        }
    }

    #[test]
    fn caps_percentage_and_floors_remaining_when_over_target() {
        let target = MacroQuantity {
            calories: 2867.0,
            protein_g: 133.0,
            carbs_g: 398.0,
            fat_g: 83.0,
        };
        let meals = vec![
            full(1500.0, 70.0, 200.0, 40.0),
            full(1700.0, 70.0, 210.0, 50.0),
        ];

        let DailySummary::Tracked(report) = aggregate(Some(&target), &meals) else {
            panic!("expected tracked summary");
        };

        // raw 111.6% and 105.3%, both capped
        assert_eq!(report.calories.actual, 3200.0);
        assert_eq!(report.calories.percentage, 100);
        assert_eq!(report.calories.remaining, 0.0);
        assert_eq!(report.protein_g.actual, 140.0);
        assert_eq!(report.protein_g.percentage, 100);
        assert_eq!(report.protein_g.remaining, 0.0);
        assert_eq!(report.meals_logged, 2);
    }

    #[test]
    fn halfway_to_target_reads_fifty_percent() {
        let target = MacroQuantity {
            calories: 2000.0,
            protein_g: 150.0,
            carbs_g: 250.0,
            fat_g: 70.0,
        };
        let meals = vec![full(1000.0, 75.0, 125.0, 35.0)];

        let DailySummary::Tracked(report) = aggregate(Some(&target), &meals) else {
            panic!("expected tracked summary");
        };
        assert_eq!(report.calories.percentage, 50);
        assert_eq!(report.calories.remaining, 1000.0);
    }

    #[test]
    fn missing_target_is_its_own_state_not_zeros() {
        let meals = vec![full(400.0, 30.0, 40.0, 10.0)];
        let summary = aggregate(None, &meals);
        assert_eq!(
            summary,
            DailySummary::NoActivePlan {
                actual: MacroQuantity {
                    calories: 400.0,
                    protein_g: 30.0,
                    carbs_g: 40.0,
                    fat_g: 10.0,
                },
                meals_logged: 1,
            }
        );
    }

    #[test]
    fn zero_target_field_yields_zero_percent() {
        let target = MacroQuantity {
            calories: 2000.0,
            protein_g: 0.0,
            carbs_g: 250.0,
            fat_g: 70.0,
        };
        let meals = vec![full(500.0, 40.0, 60.0, 15.0)];

        let DailySummary::Tracked(report) = aggregate(Some(&target), &meals) else {
            panic!("expected tracked summary");
        };
        assert_eq!(report.protein_g.percentage, 0);
        assert_eq!(report.protein_g.remaining, 0.0);
    }

    #[test]
    fn null_meal_fields_count_as_zero() {
        let target = MacroQuantity {
            calories: 1000.0,
            protein_g: 100.0,
            carbs_g: 100.0,
            fat_g: 50.0,
        };
        let meals = vec![
            PartialMacros {
                calories: Some(300.0),
                ..Default::default()
            },
            full(200.0, 20.0, 30.0, 5.0),
        ];

        let DailySummary::Tracked(report) = aggregate(Some(&target), &meals) else {
            panic!("expected tracked summary");
        };
        assert_eq!(report.calories.actual, 500.0);
        assert_eq!(report.protein_g.actual, 20.0);
    }

    #[test]
    fn empty_day_is_a_normal_result() {
        let target = MacroQuantity {
            calories: 2000.0,
            protein_g: 150.0,
            carbs_g: 250.0,
            fat_g: 70.0,
        };
        let DailySummary::Tracked(report) = aggregate(Some(&target), &[]) else {
            panic!("expected tracked summary");
        };
        assert_eq!(report.meals_logged, 0);
        assert_eq!(report.calories.actual, 0.0);
        assert_eq!(report.calories.percentage, 0);
        assert_eq!(report.calories.remaining, 2000.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let target = MacroQuantity {
            calories: 2500.0,
            protein_g: 180.0,
            carbs_g: 300.0,
            fat_g: 80.0,
        };
        let meals = vec![full(900.0, 60.0, 110.0, 25.0), full(650.0, 45.0, 70.0, 20.0)];
        assert_eq!(
            aggregate(Some(&target), &meals),
            aggregate(Some(&target), &meals)
        );
    }

    #[test]
    fn serializes_with_a_status_discriminant() {
        let summary = aggregate(None, &[]);
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["status"], "no_active_plan");

        let target = MacroQuantity {
            calories: 2000.0,
            protein_g: 150.0,
            carbs_g: 250.0,
            fat_g: 70.0,
        };
        let json = serde_json::to_value(aggregate(Some(&target), &[])).unwrap();
        assert_eq!(json["status"], "tracked");
        assert_eq!(json["calories"]["target"], 2000.0);
    }
}
