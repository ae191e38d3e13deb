//! Credit evaluation input models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::types::Region;
use crate::validation::{
    ensure_non_negative, required_choice, required_decimal, required_text, validate_farm_size,
    validate_soil_ph, ValidationError,
};

/// Soil classes recognised by the soil health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Clay,
    Sandy,
    Loamy,
    Silty,
}

impl SoilType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Clay => "clay",
            SoilType::Sandy => "sandy",
            SoilType::Loamy => "loamy",
            SoilType::Silty => "silty",
        }
    }

    /// Points contributed to the soil health score (max 50)
    pub fn points(&self) -> u32 {
        match self {
            SoilType::Loamy => 50,
            SoilType::Silty => 40,
            SoilType::Clay => 30,
            SoilType::Sandy => 20,
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clay" => Ok(SoilType::Clay),
            "sandy" => Ok(SoilType::Sandy),
            "loamy" => Ok(SoilType::Loamy),
            "silty" => Ok(SoilType::Silty),
            _ => Err(ValidationError::new(
                "soil_type",
                "must be one of: clay, sandy, loamy, silty",
            )),
        }
    }
}

/// Raw evaluation form as submitted by the evaluation wizard.
///
/// Every field is optional and loosely typed; [`EvaluationInput::parse`] is
/// the only way to turn it into something the scoring engine accepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationForm {
    #[serde(default, alias = "farm_size")]
    pub farm_size: Option<Value>,
    #[serde(default)]
    pub region: Option<Value>,
    #[serde(default, alias = "crop_type")]
    pub crop_type: Option<Value>,
    #[serde(default, alias = "soil_type")]
    pub soil_type: Option<Value>,
    #[serde(default, alias = "soil_ph")]
    pub soil_ph: Option<Value>,
    #[serde(default, alias = "annual_rainfall")]
    pub annual_rainfall: Option<Value>,
    #[serde(default)]
    pub temperature: Option<Value>,
    #[serde(default, alias = "last_year_yield")]
    pub last_year_yield: Option<Value>,
    #[serde(default, alias = "average_yield")]
    pub average_yield: Option<Value>,
}

/// One farmer's validated evaluation data for a single scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub farm_size_acres: Decimal,
    pub region: Region,
    /// Informational only, does not affect any score
    pub crop_type: String,
    pub soil_type: SoilType,
    pub soil_ph: Decimal,
    pub annual_rainfall_mm: Decimal,
    pub average_temperature_c: Decimal,
    pub last_year_yield_tons_per_acre: Decimal,
    /// Zero skips the yield comparison term
    pub average_yield_tons_per_acre_5yr: Decimal,
}

impl EvaluationInput {
    /// Validate a raw form. Fields are checked in wizard order and the first
    /// failing field is reported.
    pub fn parse(form: &EvaluationForm) -> Result<Self, ValidationError> {
        let farm_size_acres = required_decimal("farmSize", form.farm_size.as_ref())
            .and_then(|v| validate_farm_size("farmSize", v))?;
        let region: Region = required_choice("region", form.region.as_ref())?;
        let crop_type = required_text("cropType", form.crop_type.as_ref())?;
        let soil_type: SoilType = required_choice("soilType", form.soil_type.as_ref())?;
        let soil_ph = required_decimal("soilPh", form.soil_ph.as_ref())
            .and_then(|v| validate_soil_ph("soilPh", v))?;
        let annual_rainfall_mm = required_decimal("annualRainfall", form.annual_rainfall.as_ref())
            .and_then(|v| ensure_non_negative("annualRainfall", v))?;
        let average_temperature_c = required_decimal("temperature", form.temperature.as_ref())?;
        let last_year_yield_tons_per_acre =
            required_decimal("lastYearYield", form.last_year_yield.as_ref())
                .and_then(|v| ensure_non_negative("lastYearYield", v))?;
        let average_yield_tons_per_acre_5yr =
            required_decimal("averageYield", form.average_yield.as_ref())
                .and_then(|v| ensure_non_negative("averageYield", v))?;

        Ok(Self {
            farm_size_acres,
            region,
            crop_type,
            soil_type,
            soil_ph,
            annual_rainfall_mm,
            average_temperature_c,
            last_year_yield_tons_per_acre,
            average_yield_tons_per_acre_5yr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_form() -> EvaluationForm {
        serde_json::from_value(json!({
            "farmSize": "120",
            "region": "North",
            "cropType": "wheat",
            "soilType": "Loamy",
            "soilPh": "6.5",
            "annualRainfall": 900,
            "temperature": "-2.5",
            "lastYearYield": 3.2,
            "averageYield": "3"
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_complete_form() {
        let input = EvaluationInput::parse(&complete_form()).unwrap();
        assert_eq!(input.farm_size_acres, Decimal::from(120));
        assert_eq!(input.region, Region::North);
        assert_eq!(input.soil_type, SoilType::Loamy);
        assert_eq!(input.soil_ph, Decimal::from_str("6.5").unwrap());
        assert_eq!(input.average_temperature_c, Decimal::from_str("-2.5").unwrap());
        assert_eq!(input.crop_type, "wheat");
    }

    #[test]
    fn test_parse_accepts_snake_case_keys() {
        let form: EvaluationForm = serde_json::from_value(json!({
            "farm_size": 10,
            "region": "east",
            "crop_type": "rice",
            "soil_type": "clay",
            "soil_ph": 7,
            "annual_rainfall": 1200,
            "temperature": 27,
            "last_year_yield": 2,
            "average_yield": 2
        }))
        .unwrap();
        assert!(EvaluationInput::parse(&form).is_ok());
    }

    #[test]
    fn test_parse_reports_missing_field() {
        let mut form = complete_form();
        form.soil_ph = None;
        let err = EvaluationInput::parse(&form).unwrap_err();
        assert_eq!(err.field, "soilPh");
        assert_eq!(err.message, "is required");
    }

    #[test]
    fn test_parse_rejects_out_of_range_ph() {
        let mut form = complete_form();
        form.soil_ph = Some(json!(14.5));
        assert_eq!(EvaluationInput::parse(&form).unwrap_err().field, "soilPh");
    }

    #[test]
    fn test_parse_rejects_unknown_soil_type() {
        let mut form = complete_form();
        form.soil_type = Some(json!("peat"));
        let err = EvaluationInput::parse(&form).unwrap_err();
        assert_eq!(err.field, "soilType");
    }

    #[test]
    fn test_parse_rejects_unknown_region() {
        let mut form = complete_form();
        form.region = Some(json!("central"));
        assert_eq!(EvaluationInput::parse(&form).unwrap_err().field, "region");
    }

    #[test]
    fn test_parse_rejects_non_positive_farm_size() {
        let mut form = complete_form();
        form.farm_size = Some(json!(0));
        assert_eq!(EvaluationInput::parse(&form).unwrap_err().field, "farmSize");
    }

    #[test]
    fn test_parse_rejects_farm_size_too_large_to_store() {
        let mut form = complete_form();
        form.farm_size = Some(json!("1e15"));
        let err = EvaluationInput::parse(&form).unwrap_err();
        assert_eq!(err.field, "farmSize");
        assert_eq!(err.message, "cannot exceed 9999999999.99");

        form.farm_size = Some(json!("9999999999.99"));
        assert!(EvaluationInput::parse(&form).is_ok());
    }

    #[test]
    fn test_parse_rejects_negative_yield() {
        let mut form = complete_form();
        form.average_yield = Some(json!(-1));
        assert_eq!(EvaluationInput::parse(&form).unwrap_err().field, "averageYield");
    }

    #[test]
    fn test_parse_allows_zero_average_yield() {
        let mut form = complete_form();
        form.average_yield = Some(json!(0));
        let input = EvaluationInput::parse(&form).unwrap();
        assert_eq!(input.average_yield_tons_per_acre_5yr, Decimal::ZERO);
    }

    #[test]
    fn test_soil_type_points() {
        assert_eq!(SoilType::Loamy.points(), 50);
        assert_eq!(SoilType::Silty.points(), 40);
        assert_eq!(SoilType::Clay.points(), 30);
        assert_eq!(SoilType::Sandy.points(), 20);
    }
}
