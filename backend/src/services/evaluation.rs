//! Farm evaluation service
//!
//! Turns a submitted evaluation form into scores and records them.

use serde::Serialize;
use shared::{
    score_breakdown, score_evaluation, BreakdownEntry, EvaluationForm, EvaluationInput,
    FarmSummary, FarmerId, ScoreCard, ScoreSnapshot,
};

use crate::error::AppResult;
use crate::services::history::ScoreHistoryService;

/// Evaluation service
#[derive(Clone)]
pub struct EvaluationService {
    history: ScoreHistoryService,
}

/// Scores for a form that was not persisted
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationPreview {
    #[serde(flatten)]
    pub scores: ScoreCard,
    pub breakdown: Vec<BreakdownEntry>,
}

impl EvaluationService {
    pub fn new(history: ScoreHistoryService) -> Self {
        Self { history }
    }

    /// Score a form without recording anything
    pub fn preview(form: &EvaluationForm) -> AppResult<EvaluationPreview> {
        let input = EvaluationInput::parse(form)?;
        let scores = score_evaluation(&input);
        Ok(EvaluationPreview {
            scores,
            breakdown: score_breakdown(Some(&scores)),
        })
    }

    /// Validate, score and record an evaluation for the farmer.
    ///
    /// Invalid forms are rejected before anything is written.
    pub async fn submit(
        &self,
        farmer_id: &FarmerId,
        form: &EvaluationForm,
    ) -> AppResult<ScoreSnapshot> {
        let input = EvaluationInput::parse(form)?;
        let scores = score_evaluation(&input);

        tracing::debug!(
            farmer_id = %farmer_id,
            region = %input.region,
            soil_type = input.soil_type.as_str(),
            composite_score = scores.composite_score,
            "Scored evaluation"
        );

        self.history
            .record_evaluation(farmer_id, &FarmSummary::from(&input), scores)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: serde_json::Value) -> EvaluationForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_preview_scores_without_store() {
        let preview = EvaluationService::preview(&form(json!({
            "farmSize": 50,
            "region": "north",
            "cropType": "wheat",
            "soilType": "loamy",
            "soilPh": 6.5,
            "annualRainfall": 800,
            "temperature": 28,
            "lastYearYield": 4,
            "averageYield": 4
        })))
        .unwrap();

        assert_eq!(preview.scores.composite_score, 60);
        assert_eq!(preview.scores.soil_health_score, 98);
        assert_eq!(preview.breakdown.len(), 5);
    }

    #[test]
    fn test_preview_rejects_invalid_form() {
        let err = EvaluationService::preview(&form(json!({
            "farmSize": 0,
            "region": "north"
        })))
        .unwrap_err();

        match err {
            crate::error::AppError::Validation { field, .. } => assert_eq!(field, "farmSize"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
