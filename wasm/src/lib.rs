//! WebAssembly module for AgriScore
//!
//! Runs the scoring engine in the browser so the evaluation wizard can show
//! scores before the form is submitted. Results are identical to the server's.

use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{
    compute_past_yields_score, compute_soil_health_score, compute_weather_risk_score,
    score_breakdown, score_evaluation, BreakdownEntry, EvaluationForm, EvaluationInput, ScoreCard,
    ValidationError,
};

/// Scores plus breakdown, as returned to JavaScript
#[derive(Debug, Serialize)]
struct Preview {
    #[serde(flatten)]
    scores: ScoreCard,
    breakdown: Vec<BreakdownEntry>,
}

fn to_decimal(field: &str, value: f64) -> Result<Decimal, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    Decimal::try_from(value).map_err(|_| ValidationError::new(field, "is out of range"))
}

fn to_js_error(err: ValidationError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn soil_health(soil_ph: f64, soil_type: &str) -> Result<i32, ValidationError> {
    Ok(compute_soil_health_score(to_decimal("soilPh", soil_ph)?, soil_type))
}

fn weather_risk(annual_rainfall_mm: f64, average_temperature_c: f64) -> Result<i32, ValidationError> {
    Ok(compute_weather_risk_score(
        to_decimal("annualRainfall", annual_rainfall_mm)?,
        to_decimal("temperature", average_temperature_c)?,
    ))
}

fn past_yields(last_year_yield: f64, average_yield: f64) -> Result<i32, ValidationError> {
    Ok(compute_past_yields_score(
        to_decimal("lastYearYield", last_year_yield)?,
        to_decimal("averageYield", average_yield)?,
    ))
}

/// Soil health score for a pH and soil type.
///
/// Throws an `Error` for NaN or infinite input.
#[wasm_bindgen]
pub fn soil_health_score(soil_ph: f64, soil_type: &str) -> Result<i32, JsValue> {
    soil_health(soil_ph, soil_type).map_err(to_js_error)
}

/// Weather score for annual rainfall (mm) and average temperature (°C)
#[wasm_bindgen]
pub fn weather_risk_score(annual_rainfall_mm: f64, average_temperature_c: f64) -> Result<i32, JsValue> {
    weather_risk(annual_rainfall_mm, average_temperature_c).map_err(to_js_error)
}

/// Past yields score for last year's and the 5-year average yield (tons/acre)
#[wasm_bindgen]
pub fn past_yields_score(last_year_yield: f64, average_yield: f64) -> Result<i32, JsValue> {
    past_yields(last_year_yield, average_yield).map_err(to_js_error)
}

fn preview_json(form_json: &str) -> Result<String, ValidationError> {
    let form: EvaluationForm = serde_json::from_str(form_json)
        .map_err(|e| ValidationError::new("form", format!("invalid JSON: {}", e)))?;
    let input = EvaluationInput::parse(&form)?;
    let scores = score_evaluation(&input);

    let preview = Preview {
        scores,
        breakdown: score_breakdown(Some(&scores)),
    };
    serde_json::to_string(&preview).map_err(|e| ValidationError::new("form", e.to_string()))
}

/// Score a wizard form given as JSON.
///
/// Returns the preview as JSON, or throws an `Error` whose message is
/// `"<field>: <reason>"` for the first invalid field.
#[wasm_bindgen]
pub fn preview_credit_score(form_json: &str) -> Result<String, JsValue> {
    preview_json(form_json).map_err(to_js_error)
}
