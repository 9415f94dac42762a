//! Langelier Saturation Index (LSI) from banded correction-factor tables.

use super::dosage::round2;
use serde::{Deserialize, Serialize};
use std::fmt;

const LSI_CONSTANT: f64 = 12.1;

/// Upper band edges (inclusive) and the factor for each band. The factor
/// after the last edge applies to everything above it.
const TEMPERATURE_BANDS: [(f64, f64); 10] = [
    (32.0, 0.0),
    (37.0, 0.1),
    (46.0, 0.2),
    (53.0, 0.3),
    (60.0, 0.4),
    (66.0, 0.5),
    (76.0, 0.6),
    (84.0, 0.7),
    (94.0, 0.8),
    (105.0, 0.9),
];
const TEMPERATURE_ABOVE: f64 = 1.0;

const CALCIUM_BANDS: [(f64, f64); 13] = [
    (25.0, 0.4),
    (50.0, 0.7),
    (75.0, 0.9),
    (100.0, 1.0),
    (150.0, 1.1),
    (200.0, 1.2),
    (250.0, 1.3),
    (300.0, 1.4),
    (400.0, 1.5),
    (500.0, 1.6),
    (600.0, 1.7),
    (800.0, 1.8),
    (1000.0, 1.9),
];
const CALCIUM_ABOVE: f64 = 2.0;

const ALKALINITY_BANDS: [(f64, f64); 13] = [
    (25.0, 1.4),
    (50.0, 1.7),
    (75.0, 1.9),
    (100.0, 2.0),
    (125.0, 2.1),
    (150.0, 2.2),
    (200.0, 2.3),
    (250.0, 2.4),
    (300.0, 2.5),
    (400.0, 2.6),
    (500.0, 2.7),
    (600.0, 2.8),
    (800.0, 2.9),
];
const ALKALINITY_ABOVE: f64 = 3.0;

fn band_factor(value: f64, bands: &[(f64, f64)], above: f64) -> f64 {
    bands
        .iter()
        .find(|(edge, _)| value <= *edge)
        .map_or(above, |(_, factor)| *factor)
}

pub fn temperature_factor(temperature_f: f64) -> f64 {
    band_factor(temperature_f, &TEMPERATURE_BANDS, TEMPERATURE_ABOVE)
}

pub fn calcium_factor(calcium_hardness: f64) -> f64 {
    band_factor(calcium_hardness, &CALCIUM_BANDS, CALCIUM_ABOVE)
}

pub fn alkalinity_factor(alkalinity: f64) -> f64 {
    band_factor(alkalinity, &ALKALINITY_BANDS, ALKALINITY_ABOVE)
}

/// Computes the LSI, rounded to two decimals.
pub fn evaluate_water_balance(ph: f64, alkalinity: f64, calcium_hardness: f64, temperature_f: f64) -> f64 {
    round2(
        ph + temperature_factor(temperature_f) + calcium_factor(calcium_hardness)
            + alkalinity_factor(alkalinity)
            - LSI_CONSTANT,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceTendency {
    Corrosive,
    Balanced,
    Scaling,
}

impl BalanceTendency {
    pub fn from_lsi(lsi: f64) -> Self {
        if lsi < -0.3 {
            BalanceTendency::Corrosive
        } else if lsi > 0.3 {
            BalanceTendency::Scaling
        } else {
            BalanceTendency::Balanced
        }
    }
}

impl fmt::Display for BalanceTendency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BalanceTendency::Corrosive => "Corrosive",
            BalanceTendency::Balanced => "Balanced",
            BalanceTendency::Scaling => "Scaling",
        };
        f.write_str(s)
    }
}

/// The LSI together with the factors that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterBalance {
    pub lsi: f64,
    pub temperature_factor: f64,
    pub calcium_factor: f64,
    pub alkalinity_factor: f64,
    pub tendency: BalanceTendency,
}

impl WaterBalance {
    pub fn compute(ph: f64, alkalinity: f64, calcium_hardness: f64, temperature_f: f64) -> Self {
        let lsi = evaluate_water_balance(ph, alkalinity, calcium_hardness, temperature_f);
        Self {
            lsi,
            temperature_factor: temperature_factor(temperature_f),
            calcium_factor: calcium_factor(calcium_hardness),
            alkalinity_factor: alkalinity_factor(alkalinity),
            tendency: BalanceTendency::from_lsi(lsi),
        }
    }

    pub fn advice(&self) -> &'static str {
        lsi_advice(self.lsi)
    }
}

/// What to do about a given LSI.
pub fn lsi_advice(lsi: f64) -> &'static str {
    if lsi < -0.5 {
        "Water is very corrosive. Raise pH, alkalinity or calcium hardness soon to protect surfaces and equipment."
    } else if lsi < -0.3 {
        "Water is slightly corrosive. Consider raising pH or alkalinity."
    } else if lsi <= 0.3 {
        "Water is balanced."
    } else if lsi <= 0.5 {
        "Water has a scaling tendency. Consider lowering pH or alkalinity."
    } else {
        "Water is strongly scale forming. Lower pH and alkalinity, and check calcium hardness."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_are_inclusive() {
        assert_eq!(temperature_factor(32.0), 0.0);
        assert_eq!(temperature_factor(32.5), 0.1);
        assert_eq!(temperature_factor(84.0), 0.7);
        assert_eq!(temperature_factor(106.0), 1.0);
        assert_eq!(calcium_factor(250.0), 1.3);
        assert_eq!(calcium_factor(1200.0), 2.0);
        assert_eq!(alkalinity_factor(100.0), 2.0);
        assert_eq!(alkalinity_factor(900.0), 3.0);
    }

    #[test]
    fn lsi_sums_the_band_factors() {
        // 7.5 + 0.7 (80F) + 1.3 (250) + 2.0 (100) - 12.1
        let lsi = evaluate_water_balance(7.5, 100.0, 250.0, 80.0);
        assert!((lsi - -0.6).abs() < 1e-9);
        assert_eq!(BalanceTendency::from_lsi(lsi), BalanceTendency::Corrosive);

        let balanced = evaluate_water_balance(7.8, 120.0, 400.0, 84.0);
        // 7.8 + 0.7 + 1.5 + 2.1 - 12.1
        assert!((balanced - 0.0).abs() < 1e-9);
        assert_eq!(BalanceTendency::from_lsi(balanced), BalanceTendency::Balanced);
    }

    #[test]
    fn tendency_thresholds() {
        assert_eq!(BalanceTendency::from_lsi(-0.31), BalanceTendency::Corrosive);
        assert_eq!(BalanceTendency::from_lsi(-0.3), BalanceTendency::Balanced);
        assert_eq!(BalanceTendency::from_lsi(0.3), BalanceTendency::Balanced);
        assert_eq!(BalanceTendency::from_lsi(0.31), BalanceTendency::Scaling);
    }

    #[test]
    fn advice_has_five_levels() {
        let texts = [-0.8, -0.4, 0.0, 0.4, 0.8].map(lsi_advice);
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(lsi_advice(0.1), "Water is balanced.");
    }
}
