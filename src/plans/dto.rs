use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::plans::repo_types::{NutritionProtocol, ProtocolPhase};

#[derive(Debug, Deserialize)]
pub struct ActivatePlanRequest {
    pub protocol_id: Uuid,
    pub current_phase_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SetPhaseRequest {
    pub phase_id: Uuid,
}

/// Active plan with its protocol and current phase resolved.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub start_date: Date,
    pub protocol: NutritionProtocol,
    pub current_phase: Option<ProtocolPhase>,
}

#[derive(Debug, Serialize)]
pub struct ProtocolWithPhases {
    #[serde(flatten)]
    pub protocol: NutritionProtocol,
    pub phases: Vec<ProtocolPhase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_with_phases_flattens_protocol_fields() {
        let value = ProtocolWithPhases {
            protocol: NutritionProtocol {
                id: Uuid::new_v4(),
                name: "Cut 12wk".into(),
                description: None,
            },
            phases: vec![],
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["name"], "Cut 12wk");
        assert!(json["phases"].as_array().unwrap().is_empty());
    }
}
