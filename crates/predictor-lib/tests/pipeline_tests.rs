//! End-to-end tests: artifact file on disk -> predictor -> price

use predictor_lib::artifact::ArtifactLoader;
use predictor_lib::models::{fields, HouseAttributes, PredictionSource};
use predictor_lib::predictor::{
    FormulaFallback, HousePricePredictor, PredictorConfig, MAX_MODEL_PRICE, MIN_MODEL_PRICE,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

const FEATURES: [&str; 9] = [
    "area",
    "bedrooms",
    "bathrooms",
    "stories",
    "mainroad",
    "airconditioning",
    "furnishingstatus_furnished",
    "furnishingstatus_semi-furnished",
    "furnishingstatus_unfurnished",
];

fn bundle(coefficients: &[f64], intercept: f64) -> Value {
    json!({
        "model": {"kind": "linear", "coefficients": coefficients, "intercept": intercept},
        "scaler": {"kind": "identity"},
        "label_encoders": {
            "mainroad": {"kind": "label", "classes": ["no", "yes"]},
            "airconditioning": {"kind": "label", "classes": ["no", "yes"]}
        },
        "feature_columns": FEATURES,
        "model_name": "Linear Regression",
        "training_date": "2024-05-01",
        "model_metrics": {"r2": 0.65}
    })
}

fn write_bundle(dir: &TempDir, value: &Value) -> PathBuf {
    let path = dir.path().join("house_price_model.json");
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

fn predictor_from(value: &Value) -> (TempDir, HousePricePredictor) {
    let dir = TempDir::new().unwrap();
    let path = write_bundle(&dir, value);
    let outcome = ArtifactLoader::load(&path);
    assert!(outcome.is_loaded(), "{:?}", outcome.error());
    (
        dir,
        HousePricePredictor::from_outcome(outcome, PredictorConfig::default()),
    )
}

fn reference_house() -> HouseAttributes {
    HouseAttributes::new()
        .with(fields::AREA, 2000)
        .with(fields::BEDROOMS, 3)
        .with(fields::BATHROOMS, 2)
        .with(fields::STORIES, 2)
        .with(fields::PARKING, 1)
        .with(fields::MAINROAD, "yes")
        .with(fields::GUESTROOM, "no")
        .with(fields::BASEMENT, "no")
        .with(fields::HOTWATERHEATING, "no")
        .with(fields::AIRCONDITIONING, "yes")
        .with(fields::PREFAREA, "yes")
        .with(fields::FURNISHINGSTATUS, "furnished")
}

fn realistic_weights() -> Vec<f64> {
    vec![
        150.0, 12_000.0, 25_000.0, 8_000.0, 20_000.0, 15_000.0, 30_000.0, 10_000.0, 0.0,
    ]
}

#[test]
fn test_loaded_artifact_prediction_in_range() {
    let (_dir, predictor) = predictor_from(&bundle(&realistic_weights(), 50_000.0));

    let result = predictor.predict_price(&reference_house());
    // 150*2000 + 12000*3 + 25000*2 + 8000*2 + 20000 + 15000 + 30000 + 50000
    assert_eq!(result.price(), Some(517_000.0));
    assert!(result.diagnostic().is_none());
    assert_eq!(result.source(), PredictionSource::Model);
}

#[test]
fn test_one_hot_column_follows_furnishing() {
    let (_dir, predictor) = predictor_from(&bundle(&realistic_weights(), 50_000.0));

    let semi = reference_house().with(fields::FURNISHINGSTATUS, "semi-furnished");
    assert_eq!(predictor.predict_price(&semi).price(), Some(497_000.0));

    let none = reference_house().with(fields::FURNISHINGSTATUS, "unfurnished");
    assert_eq!(predictor.predict_price(&none).price(), Some(487_000.0));
}

#[test]
fn test_key_order_does_not_change_prediction() {
    let (_dir, predictor) = predictor_from(&bundle(&realistic_weights(), 50_000.0));

    let forward = reference_house();
    let mut pairs: Vec<_> = forward
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    pairs.reverse();
    let reversed: HouseAttributes = pairs.into_iter().collect();
    let from_json: HouseAttributes = serde_json::from_value(json!({
        "furnishingstatus": "furnished", "prefarea": "yes", "airconditioning": "yes",
        "hotwaterheating": "no", "basement": "no", "guestroom": "no", "mainroad": "yes",
        "parking": 1, "stories": 2, "bathrooms": 2, "bedrooms": 3, "area": 2000
    }))
    .unwrap();

    let expected = predictor.predict_price(&forward);
    assert_eq!(predictor.predict_price(&reversed), expected);
    assert_eq!(predictor.predict_price(&from_json), expected);
}

#[test]
fn test_prediction_is_idempotent() {
    let (_dir, predictor) = predictor_from(&bundle(&realistic_weights(), 50_000.0));
    let house = reference_house();
    assert_eq!(predictor.predict_price(&house), predictor.predict_price(&house));

    let fallback_only = HousePricePredictor::new_without_model();
    assert_eq!(
        fallback_only.predict_price(&house),
        fallback_only.predict_price(&house)
    );
}

#[test]
fn test_unknown_category_still_predicts() {
    let (_dir, predictor) = predictor_from(&bundle(&realistic_weights(), 50_000.0));

    let odd = reference_house().with(fields::MAINROAD, "gravel track");
    let result = predictor.predict_price(&odd);

    // Encoded as "no": the mainroad weight drops out
    assert_eq!(result.price(), Some(497_000.0));
    assert!(result.diagnostic().is_none());
}

#[test]
fn test_reference_house_without_artifact() {
    let dir = TempDir::new().unwrap();
    let outcome = ArtifactLoader::load(dir.path().join("missing.json"));
    assert!(!outcome.is_loaded());

    let predictor = HousePricePredictor::from_outcome(outcome, PredictorConfig::default());
    let result = predictor.predict_price(&reference_house());

    assert_eq!(result.price(), Some(708_000.0));
    assert!(!result.diagnostic().unwrap_or_default().is_empty());
}

#[test]
fn test_malformed_artifact_serves_fallback() {
    let dir = TempDir::new().unwrap();
    let mut value = bundle(&realistic_weights(), 0.0);
    value.as_object_mut().unwrap().remove("scaler");
    let path = write_bundle(&dir, &value);

    let predictor =
        HousePricePredictor::from_outcome(ArtifactLoader::load(&path), PredictorConfig::default());
    let result = predictor.predict_price(&reference_house());
    assert_eq!(result.price(), Some(708_000.0));
    assert_eq!(result.source(), PredictionSource::Fallback);
}

#[test]
fn test_width_mismatch_falls_back_to_formula() {
    // Coefficients do not match the nine feature columns
    let dir = TempDir::new().unwrap();
    let path = write_bundle(&dir, &bundle(&[1.0, 2.0], 0.0));
    let outcome = ArtifactLoader::load(&path);

    let predictor = HousePricePredictor::from_outcome(outcome, PredictorConfig::default());
    let house = reference_house();
    let result = predictor.predict_price(&house);

    let (expected, _) = FormulaFallback.price(&house).unwrap();
    assert_eq!(result.price(), Some(expected));
    assert!(result.diagnostic().unwrap().contains("inference failed"));
}

#[test]
fn test_extreme_outputs_are_clamped() {
    let (_dir, high) = predictor_from(&bundle(&[0.0; 9], 9_000_000.0));
    assert_eq!(
        high.predict_price(&reference_house()).price(),
        Some(MAX_MODEL_PRICE)
    );

    let (_dir, low) = predictor_from(&bundle(&[0.0; 9], -1_000.0));
    assert_eq!(
        low.predict_price(&reference_house()).price(),
        Some(MIN_MODEL_PRICE)
    );
}
