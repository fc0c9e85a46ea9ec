//! Browser tests for the JavaScript-facing bindings
//!
//! Run with `wasm-pack test --headless --firefox wasm`.

#![cfg(target_arch = "wasm32")]

use cupping_journal_wasm::{classify_by_cupping_score, consistency_points, defect_points};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn checks(values: &[JsValue]) -> js_sys::Array {
    values.iter().collect()
}

#[wasm_bindgen_test]
fn boolean_checks_are_scored() {
    let array = checks(&[
        JsValue::TRUE,
        JsValue::TRUE,
        JsValue::FALSE,
        JsValue::TRUE,
        JsValue::TRUE,
    ]);
    assert_eq!(consistency_points(array).unwrap(), 8.0);
}

#[wasm_bindgen_test]
fn non_boolean_checks_are_rejected() {
    let array = checks(&[
        JsValue::TRUE,
        JsValue::from_f64(1.0),
        JsValue::from_str("true"),
        JsValue::NULL,
        JsValue::TRUE,
    ]);
    let err = consistency_points(array).unwrap_err();
    assert_eq!(err.as_string().as_deref(), Some("checks[1] must be a boolean"));
}

#[wasm_bindgen_test]
fn defect_table_and_classification() {
    assert_eq!(defect_points(1, 2).unwrap(), 2.0);
    assert!(defect_points(1, 3).is_err());
    assert_eq!(classify_by_cupping_score(86.5), "Excellent");
}
