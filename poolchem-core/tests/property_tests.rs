//! Property tests for the chemistry engine and the strip interpolator.

use poolchem_core::{
    chemistry::balance::evaluate_water_balance, EngineBuilder, ChemicalEngine, StripInterpolator,
};
use poolchem_schemas::{
    adjustment::{ChemicalStatus, Compound, Direction},
    calibration::{CalibrationSample, CalibrationTable},
    file_formats::CeilingEntry,
    pool::{PoolProfile, SanitizerType, SurfaceType},
    reading::{Parameter, Readings},
};
use proptest::prelude::*;
use proptest::sample::Index;

const SURFACES: [SurfaceType; 5] = [
    SurfaceType::Concrete,
    SurfaceType::Vinyl,
    SurfaceType::Fiberglass,
    SurfaceType::AboveGroundMetal,
    SurfaceType::AboveGroundResin,
];
const SANITIZERS: [SanitizerType; 3] = [SanitizerType::Chlorine, SanitizerType::SaltWater, SanitizerType::Bromine];
const COMPOUNDS: [Compound; 11] = [
    Compound::SodaAsh,
    Compound::MuriaticAcid,
    Compound::LiquidChlorine,
    Compound::ShockTreatment,
    Compound::SodiumThiosulfate,
    Compound::BakingSoda,
    Compound::CalciumChloride,
    Compound::Stabilizer,
    Compound::PoolSalt,
    Compound::BromineTablets,
    Compound::PartialWaterChange,
];

fn arb_parameter() -> impl Strategy<Value = Parameter> {
    prop::sample::select(Parameter::ALL.to_vec())
}

fn arb_pool() -> impl Strategy<Value = PoolProfile> {
    (
        prop::sample::select(SURFACES.to_vec()),
        prop::sample::select(SANITIZERS.to_vec()),
        1_000.0f64..100_000.0,
    )
        .prop_map(|(surface, sanitizer, volume)| PoolProfile::new("prop", volume, surface, sanitizer))
}

/// An engine whose ceilings never get in the way.
fn unbounded_engine() -> ChemicalEngine {
    EngineBuilder::new()
        .with_dosage_ceilings(
            COMPOUNDS
                .iter()
                .map(|&compound| CeilingEntry {
                    compound,
                    per_10k_gallons: 1e12,
                })
                .collect(),
        )
        .build()
        .unwrap()
}

// ── Chemical engine ───────────────────────────────────────────

proptest! {
    #[test]
    fn range_bounds_are_ideal(parameter in arb_parameter(), pool in arb_pool()) {
        let engine = EngineBuilder::new().build().unwrap();
        let view = engine.pool(&pool);
        let range = view.ideal_range(parameter).unwrap();

        let (at_min, _) = view.get_chemical_status(parameter, range.min).unwrap();
        let (at_max, _) = view.get_chemical_status(parameter, range.max).unwrap();
        prop_assert_eq!(at_min, ChemicalStatus::Ideal);
        prop_assert_eq!(at_max, ChemicalStatus::Ideal);
    }

    #[test]
    fn priority_stays_between_one_and_five(
        parameter in arb_parameter(),
        pool in arb_pool(),
        fraction in 0.0f64..=1.0,
    ) {
        let engine = EngineBuilder::new().build().unwrap();
        let view = engine.pool(&pool);
        let value = fraction * parameter.sanity_max();
        let priority = view.get_adjustment_priority(parameter, value);

        prop_assert!((1..=5).contains(&priority));
        if view.ideal_range(parameter).unwrap().contains(value) {
            prop_assert_eq!(priority, 5);
        }
    }

    #[test]
    fn larger_increase_never_needs_less(
        parameter in arb_parameter(),
        pool in arb_pool(),
        start in 0.0f64..0.5,
        a in 0.0f64..0.5,
        b in 0.0f64..0.5,
    ) {
        let engine = unbounded_engine();
        let view = engine.pool(&pool);
        let max = parameter.sanity_max();
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let current = start * max;

        let near = view.calculate_adjustment(parameter, current, current + small * max).unwrap();
        let far = view.calculate_adjustment(parameter, current, current + large * max).unwrap();
        prop_assert!(far.amount >= near.amount, "{:?} then {:?}", near, far);
    }

    #[test]
    fn larger_decrease_never_needs_less(
        parameter in arb_parameter(),
        pool in arb_pool(),
        start in 0.5f64..=1.0,
        a in 0.0f64..0.5,
        b in 0.0f64..0.5,
    ) {
        let engine = unbounded_engine();
        let view = engine.pool(&pool);
        let max = parameter.sanity_max();
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let current = start * max;

        let near = view.calculate_adjustment(parameter, current, current - small * max).unwrap();
        let far = view.calculate_adjustment(parameter, current, current - large * max).unwrap();
        prop_assert!(far.amount >= near.amount, "{:?} then {:?}", near, far);
    }

    #[test]
    fn midpoint_needs_no_adjustment(parameter in arb_parameter(), pool in arb_pool()) {
        let engine = EngineBuilder::new().build().unwrap();
        let view = engine.pool(&pool);
        let midpoint = view.ideal_range(parameter).unwrap().midpoint();

        let adjustment = view.calculate_adjustment(parameter, midpoint, midpoint).unwrap();
        prop_assert_eq!(adjustment.direction, Direction::None);
        prop_assert_eq!(adjustment.amount, 0.0);

        let assessment = view.assess(&Readings::from([(parameter, midpoint)]), None).unwrap();
        prop_assert!(assessment.adjustments().all(|a| a.direction == Direction::None && a.amount == 0.0));
    }

    #[test]
    fn lsi_is_pure_and_bounded(
        ph in 6.0f64..=9.0,
        hardness in 0.0f64..=1000.0,
        alkalinity in 0.0f64..=800.0,
        temperature in 32.0f64..=105.0,
    ) {
        let first = evaluate_water_balance(ph, alkalinity, hardness, temperature);
        let second = evaluate_water_balance(ph, alkalinity, hardness, temperature);
        prop_assert_eq!(first.to_bits(), second.to_bits());
        prop_assert!((-5.0..=5.0).contains(&first));
    }
}

// ── Strip interpolator ───────────────────────────────────────

proptest! {
    #[test]
    fn exact_color_match_is_certain(
        samples in prop::collection::btree_map(any::<[u8; 3]>(), 0.0f64..10.0, 1..8),
        pick in any::<Index>(),
    ) {
        let samples: Vec<CalibrationSample> = samples
            .into_iter()
            .map(|(rgb, value)| CalibrationSample { rgb, value })
            .collect();
        let target = samples[pick.index(samples.len())].clone();
        let strip = StripInterpolator::new(CalibrationTable::from([("ph".to_string(), samples)]));

        let (value, confidence) = strip.map_rgb_to_value("ph", target.rgb);
        prop_assert_eq!(confidence, 100.0);
        let value = value.unwrap();
        prop_assert!((value - target.value).abs() <= 0.01, "{} vs {}", value, target.value);
    }

    #[test]
    fn empty_calibration_never_guesses(chemical in "[a-z_]{1,16}", rgb in any::<[u8; 3]>()) {
        let strip = StripInterpolator::new(CalibrationTable::from([(chemical.clone(), Vec::new())]));
        prop_assert_eq!(strip.map_rgb_to_value(&chemical, rgb), (None, 0.0));
        prop_assert_eq!(StripInterpolator::default().map_rgb_to_value(&chemical, rgb), (None, 0.0));
    }

    #[test]
    fn confidence_stays_in_range(
        samples in prop::collection::vec((any::<[u8; 3]>(), 0.0f64..10.0), 1..8),
        rgb in any::<[u8; 3]>(),
    ) {
        let samples = samples
            .into_iter()
            .map(|(rgb, value)| CalibrationSample { rgb, value })
            .collect();
        let strip = StripInterpolator::new(CalibrationTable::from([("salt".to_string(), samples)]));
        let (value, confidence) = strip.map_rgb_to_value("salt", rgb);
        prop_assert!(value.is_some());
        prop_assert!((0.0..=100.0).contains(&confidence));
    }
}
