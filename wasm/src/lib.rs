//! WebAssembly module for the Cupping Journal
//!
//! Gives the evaluation form live feedback with the same scoring core the
//! server uses:
//! - Slider validation
//! - Consistency and defect points
//! - Cup totals and radar series while a cup is being scored

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::{
    aggregate_cup, classify_by_score, to_radar_series, NewCupEvaluation, Phase, ScoringError,
};
use wasm_bindgen::prelude::*;

fn to_decimal(value: f64) -> Result<Decimal, String> {
    Decimal::try_from(value).map_err(|_| format!("Not a finite score: {}", value))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn describe(err: ScoringError) -> String {
    match err.field() {
        Some(field) => format!("{} ({})", err, field),
        None => err.to_string(),
    }
}

/// Surface an error to the browser console and to the caller
fn reject(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse_cup(cup_json: &str) -> Result<NewCupEvaluation, String> {
    serde_json::from_str(cup_json).map_err(|e| format!("Invalid cup JSON: {}", e))
}

fn slider_score(value: f64) -> Result<f64, String> {
    let score = shared::clamp_slider_score("score", to_decimal(value)?).map_err(describe)?;
    Ok(to_f64(score))
}

/// Read checkbox states, refusing anything that is not a boolean
fn parse_checks<I>(entries: I) -> Result<Vec<bool>, String>
where
    I: IntoIterator<Item = Option<bool>>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| entry.ok_or_else(|| format!("checks[{}] must be a boolean", i)))
        .collect()
}

fn check_points(checks: &[bool]) -> Result<f64, String> {
    let points = shared::consistency_points("checks", checks).map_err(describe)?;
    Ok(to_f64(points))
}

fn defect_deduction(cups_affected: u8, intensity: u8) -> Result<f64, String> {
    let points = shared::defect_points(cups_affected, intensity).map_err(describe)?;
    Ok(to_f64(points))
}

fn cup_score_json(cup_json: &str) -> Result<String, String> {
    let cup = parse_cup(cup_json)?;
    let score = aggregate_cup(&cup).map_err(describe)?;
    serde_json::to_string(&score).map_err(|e| e.to_string())
}

fn radar_json(cup_json: &str, phase: Option<&str>) -> Result<String, String> {
    let cup = parse_cup(cup_json)?;
    let phase = match phase {
        None => None,
        Some(p) => Some(Phase::from_str(p).ok_or_else(|| format!("Unknown phase: {}", p))?),
    };
    let series = to_radar_series(&cup, phase).map_err(describe)?;
    serde_json::to_string(&series.points()).map_err(|e| e.to_string())
}

/// Validate a slider value: 6.00 to 10.00 in quarter steps
#[wasm_bindgen]
pub fn clamp_slider_score(value: f64) -> Result<f64, JsValue> {
    slider_score(value).map_err(reject)
}

/// Points for one consistency check from its five cup checkboxes
#[wasm_bindgen]
pub fn consistency_points(checks: js_sys::Array) -> Result<f64, JsValue> {
    parse_checks(checks.iter().map(|v| v.as_bool()))
        .and_then(|checks| check_points(&checks))
        .map_err(reject)
}

/// Defect deduction: cups affected times intensity
#[wasm_bindgen]
pub fn defect_points(cups_affected: u8, intensity: u8) -> Result<f64, JsValue> {
    defect_deduction(cups_affected, intensity).map_err(reject)
}

/// Total, cupper's score and breakdown of a cup being edited
#[wasm_bindgen]
pub fn aggregate_cup_json(cup_json: &str) -> Result<String, JsValue> {
    cup_score_json(cup_json).map_err(reject)
}

/// Radar points of a cup being edited, optionally for a single phase
#[wasm_bindgen]
pub fn radar_series_json(cup_json: &str, phase: Option<String>) -> Result<String, JsValue> {
    radar_json(cup_json, phase.as_deref()).map_err(reject)
}

/// Classify coffee by cupping score
#[wasm_bindgen]
pub fn classify_by_cupping_score(score: f64) -> String {
    let decimal_score = Decimal::try_from(score).unwrap_or(Decimal::ZERO);
    let classification = classify_by_score(decimal_score);
    format!("{}", classification)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUP: &str = r#"{
        "aroma": "8.5",
        "scores": {
            "hot": {"flavor": "8.25", "aftertaste": "8.0", "acidity": "8.5", "body": "8.0", "balance": "8.25"},
            "cold": {"flavor": "7.75", "aftertaste": "8.0", "acidity": "8.5", "body": "8.0", "balance": "8.25"}
        },
        "checks": {
            "uniformity": [true, true, true, true, true],
            "clean_cup": [true, true, true, true, true],
            "sweetness": [true, true, true, true, true]
        }
    }"#;

    #[test]
    fn test_classify_by_cupping_score() {
        assert_eq!(classify_by_cupping_score(91.0), "Outstanding");
        assert_eq!(classify_by_cupping_score(85.0), "Excellent");
        assert_eq!(classify_by_cupping_score(84.99), "Very Good");
        assert_eq!(classify_by_cupping_score(79.5), "Below Specialty");
    }

    #[test]
    fn test_slider_score() {
        assert_eq!(slider_score(8.75).unwrap(), 8.75);
        assert!(slider_score(8.1).is_err());
        assert!(slider_score(5.75).unwrap_err().contains("score"));
        assert!(slider_score(f64::NAN).is_err());
    }

    #[test]
    fn test_check_and_defect_points() {
        assert_eq!(check_points(&[true, true, false, true, true]).unwrap(), 8.0);
        assert!(check_points(&[true; 4]).is_err());
        assert_eq!(defect_deduction(2, 4).unwrap(), 8.0);
        assert!(defect_deduction(2, 3).is_err());
    }

    #[test]
    fn test_non_boolean_check_rejected() {
        let checks = parse_checks([Some(true), Some(false), None, Some(true)]);
        assert_eq!(checks.unwrap_err(), "checks[2] must be a boolean");

        let checks = parse_checks([Some(true), Some(false), Some(true)]).unwrap();
        assert_eq!(checks, vec![true, false, true]);
    }

    #[test]
    fn test_cup_score_averages_phases() {
        let json = cup_score_json(CUP).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let total: Decimal = serde_json::from_value(value["total_score"].clone()).unwrap();
        // Flavor averages to 8.0 across hot and cold
        assert_eq!(total, Decimal::from(79) + Decimal::new(25, 2));
    }

    #[test]
    fn test_radar_json() {
        let all = radar_json(CUP, None).unwrap();
        let points: serde_json::Value = serde_json::from_str(&all).unwrap();
        assert_eq!(points.as_array().map(Vec::len), Some(7));

        assert!(radar_json(CUP, Some("cold")).is_ok());
        assert!(radar_json(CUP, Some("warm")).is_err());
        assert!(radar_json(CUP, Some("tepid")).unwrap_err().contains("tepid"));
        assert!(radar_json("{", None).unwrap_err().starts_with("Invalid cup JSON"));
    }
}
