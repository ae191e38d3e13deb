//! Alternative credit scoring engine
//!
//! Four pure functions turn a validated [`EvaluationInput`] into scores in
//! `0..=100`. Every score is a sum of capped terms, rounded half away from
//! zero and then clamped.
//!
//! The composite score does not combine the three sub-scores. It has its own
//! coarser weighting (farm size 20, soil 30, yield 30, weather 20).
//!
//! In the composite and the weather and yield scores, zero-valued inputs are
//! treated as "not provided" and contribute nothing. The soil health pH term
//! has no such guard: pH 0 is scored as seven units of deviation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{EvaluationInput, ScoreCard, SoilType};

/// Upper bound of every score
pub const MAX_SCORE: i32 = 100;

const OPTIMAL_SOIL_PH: i64 = 7;
const OPTIMAL_TEMPERATURE_C: i64 = 25;

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

/// `|a - b|` that cannot overflow
fn deviation(a: Decimal, b: Decimal) -> Decimal {
    a.saturating_sub(b).abs()
}

/// Round half away from zero, then clamp to `0..=MAX_SCORE`.
pub fn round_and_clamp(raw: Decimal) -> i32 {
    raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, dec(MAX_SCORE as i64))
        .to_i32()
        .unwrap_or(0)
}

// ============================================================================
// Soil health
// ============================================================================

fn soil_ph_points(soil_ph: Decimal) -> Decimal {
    let penalty = deviation(dec(OPTIMAL_SOIL_PH), soil_ph).saturating_mul(dec(5));
    dec(50).saturating_sub(penalty).max(Decimal::ZERO)
}

/// Soil health score (pH up to 50 points, soil type up to 50 points).
///
/// `soil_type` is matched case-insensitively; an unrecognised type scores 0.
pub fn compute_soil_health_score(soil_ph: Decimal, soil_type: &str) -> i32 {
    let type_points = soil_type
        .parse::<SoilType>()
        .map(|t| Decimal::from(t.points()))
        .unwrap_or(Decimal::ZERO);

    round_and_clamp(soil_ph_points(soil_ph) + type_points)
}

// ============================================================================
// Weather risk
// ============================================================================

/// Weather score (rainfall up to 50 points, temperature up to 50 points).
///
/// Despite the name, higher means more favourable conditions.
pub fn compute_weather_risk_score(annual_rainfall_mm: Decimal, average_temperature_c: Decimal) -> i32 {
    let mut score = Decimal::ZERO;

    if annual_rainfall_mm > Decimal::ZERO {
        score += (annual_rainfall_mm / dec(20)).min(dec(50));
    }

    if average_temperature_c > Decimal::ZERO {
        let penalty =
            deviation(dec(OPTIMAL_TEMPERATURE_C), average_temperature_c).saturating_mul(dec(2));
        score += dec(50).saturating_sub(penalty).max(Decimal::ZERO);
    }

    round_and_clamp(score)
}

// ============================================================================
// Past yields
// ============================================================================

/// Past yields score (5-year average up to 60 points, last year relative to
/// the average up to 40 points). A zero average skips the comparison term.
pub fn compute_past_yields_score(
    last_year_yield_tons_per_acre: Decimal,
    average_yield_tons_per_acre_5yr: Decimal,
) -> i32 {
    let average = average_yield_tons_per_acre_5yr;
    let last_year = last_year_yield_tons_per_acre;
    let mut score = Decimal::ZERO;

    if average > Decimal::ZERO {
        score += average.saturating_mul(dec(3)).min(dec(60));

        if last_year > Decimal::ZERO {
            let ratio = last_year.checked_div(average).unwrap_or(Decimal::MAX);
            score += ratio.saturating_mul(dec(40)).min(dec(40));
        }
    }

    round_and_clamp(score)
}

// ============================================================================
// Composite
// ============================================================================

pub(crate) fn farm_size_points(farm_size_acres: Decimal) -> Decimal {
    if farm_size_acres <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (farm_size_acres / dec(10)).min(dec(20))
}

fn composite_soil_points(soil_ph: Decimal) -> Decimal {
    if soil_ph <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let penalty = deviation(dec(OPTIMAL_SOIL_PH), soil_ph).saturating_mul(dec(2));
    dec(30).saturating_sub(penalty).max(Decimal::ZERO)
}

fn composite_yield_points(average_yield: Decimal) -> Decimal {
    if average_yield <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    average_yield.saturating_mul(dec(2)).min(dec(30))
}

fn composite_weather_points(rainfall_mm: Decimal, temperature_c: Decimal) -> Decimal {
    if rainfall_mm <= Decimal::ZERO || temperature_c <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let rainfall = (rainfall_mm / dec(100)).min(dec(10));
    // not floored: extreme temperatures pull the composite down
    let temperature = dec(30)
        .saturating_sub(deviation(dec(OPTIMAL_TEMPERATURE_C), temperature_c))
        .min(dec(10));
    rainfall.saturating_add(temperature)
}

/// Composite credit score from farm size, soil pH, average yield and weather.
pub fn compute_composite_score(input: &EvaluationInput) -> i32 {
    let total = farm_size_points(input.farm_size_acres)
        .saturating_add(composite_soil_points(input.soil_ph))
        .saturating_add(composite_yield_points(input.average_yield_tons_per_acre_5yr))
        .saturating_add(composite_weather_points(
            input.annual_rainfall_mm,
            input.average_temperature_c,
        ));

    round_and_clamp(total)
}

/// Run all four scores for one evaluation.
pub fn score_evaluation(input: &EvaluationInput) -> ScoreCard {
    ScoreCard {
        composite_score: compute_composite_score(input),
        soil_health_score: compute_soil_health_score(input.soil_ph, input.soil_type.as_str()),
        weather_risk_score: compute_weather_risk_score(
            input.annual_rainfall_mm,
            input.average_temperature_c,
        ),
        past_yields_score: compute_past_yields_score(
            input.last_year_yield_tons_per_acre,
            input.average_yield_tons_per_acre_5yr,
        ),
    }
}
