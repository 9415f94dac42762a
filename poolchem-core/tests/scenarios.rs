//! End-to-end scenarios through the public API.

use poolchem_core::{
    plan::build_plan, EngineBuilder, PoolChemError, SafetyLookup, StripInterpolator,
};
use poolchem_schemas::{
    adjustment::{ChemicalStatus, Compound, Direction, Severity},
    calibration::CalibrationTable,
    pool::{PoolProfile, SanitizerType, SurfaceType},
    reading::Parameter,
};
use std::collections::BTreeMap;

fn backyard() -> PoolProfile {
    PoolProfile::new("Backyard", 10000.0, SurfaceType::Concrete, SanitizerType::Chlorine)
}

#[test]
fn low_ph_needs_soda_ash_first() {
    let engine = EngineBuilder::new().build().unwrap();
    let pool = backyard();
    let view = engine.pool(&pool);

    assert_eq!(
        view.get_chemical_status(Parameter::Ph, 7.0).unwrap(),
        (ChemicalStatus::Low, Severity::Warning)
    );
    let adjustment = view.calculate_adjustment(Parameter::Ph, 7.0, 7.2).unwrap();
    assert_eq!(adjustment.direction, Direction::Increase);
    assert_eq!(adjustment.compound_name, "Soda Ash");
    assert_eq!(adjustment.amount, 12.0);
    assert_eq!(adjustment.priority, 1);
}

#[test]
fn hardness_in_range_needs_nothing() {
    let engine = EngineBuilder::new().build().unwrap();
    let pool = backyard();
    let view = engine.pool(&pool);

    let (status, _) = view.get_chemical_status_by_name("calcium_hardness", 250.0).unwrap();
    assert_eq!(status, ChemicalStatus::Ideal);
    assert_eq!(view.get_adjustment_priority(Parameter::Hardness, 250.0), 5);

    let range = view.ideal_range(Parameter::Hardness).unwrap();
    let target = range.midpoint();
    let adjustment = view.calculate_adjustment(Parameter::Hardness, 250.0, 250.0).unwrap();
    assert_eq!(adjustment.amount, 0.0);
    assert_eq!(target, 300.0);
}

#[test]
fn chlorine_never_mixes_with_muriatic_acid() {
    let safety = SafetyLookup::default();
    assert!(!safety.check_compatibility("chlorine", "muriatic_acid"));
    assert!(!safety.check_compatibility("muriatic_acid", "chlorine"));
}

#[test]
fn strip_readings_feed_the_engine() {
    let calibration: CalibrationTable = serde_json::from_str(
        r#"{
            "ph": [
                {"rgb": [255, 200, 0], "value": 6.8},
                {"rgb": [255, 150, 0], "value": 7.2},
                {"rgb": [255, 100, 0], "value": 7.8}
            ],
            "free_chlorine": [
                {"rgb": [255, 255, 255], "value": 0.0},
                {"rgb": [230, 180, 230], "value": 1.0},
                {"rgb": [200, 100, 200], "value": 3.0}
            ]
        }"#,
    )
    .unwrap();
    let strip = StripInterpolator::new(calibration);
    let pads = BTreeMap::from([
        ("ph".to_string(), [255, 200, 0]),
        ("free_chlorine".to_string(), [200, 100, 200]),
    ]);
    let results = strip.analyze(&pads);
    let readings = StripInterpolator::to_readings(&results, 50.0);
    assert_eq!(readings.len(), 2);

    let engine = EngineBuilder::new().build().unwrap();
    let pool = backyard();
    let assessment = engine.pool(&pool).assess(&readings, None).unwrap();
    let ph = assessment.get(Parameter::Ph).unwrap();
    assert_eq!(ph.status, ChemicalStatus::Low);
    assert_eq!(ph.adjustment.compound, Some(Compound::SodaAsh));

    let plan = build_plan(&assessment, engine.safety());
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].parameter, Parameter::Ph);
}

#[test]
fn salt_pool_with_vinyl_liner() {
    let engine = EngineBuilder::new().build().unwrap();
    let pool = PoolProfile::new("Spa-side", 20000.0, SurfaceType::Vinyl, SanitizerType::SaltWater);
    let view = engine.pool(&pool);

    // Vinyl tops out at 225 ppm hardness; 270 is 20% over.
    assert_eq!(
        view.get_chemical_status(Parameter::Hardness, 270.0).unwrap(),
        (ChemicalStatus::High, Severity::Warning)
    );
    let water_change = view.calculate_adjustment(Parameter::Hardness, 270.0, 225.0).unwrap();
    assert_eq!(water_change.compound, Some(Compound::PartialWaterChange));
    assert_eq!(water_change.unit, "%");
    assert_eq!(water_change.amount, 16.67);

    // Salt water stabilizer range starts at 60.
    assert_eq!(
        view.get_chemical_status(Parameter::CyanuricAcid, 50.0).unwrap().0,
        ChemicalStatus::Low
    );
}

#[test]
fn error_kinds_are_distinguishable() {
    let engine = EngineBuilder::new().build().unwrap();
    let pool = backyard();
    let view = engine.pool(&pool);

    assert!(matches!(
        view.calculate_adjustment_by_name("iron", 1.0, 0.0),
        Err(PoolChemError::InvalidParameter(_))
    ));
    assert!(matches!(
        view.get_chemical_recommendations(&BTreeMap::new(), "Chlorine Pool", None),
        Err(PoolChemError::Validation(_))
    ));

    let mut empty = backyard();
    empty.volume_gallons = -5.0;
    assert!(matches!(
        engine.pool(&empty).calculate_adjustment(Parameter::Ph, 7.0, 7.4),
        Err(PoolChemError::Dosage(_))
    ));
}
