//! Test-strip pad color interpretation.
//!
//! A sampled pad color is compared with calibration colors for the same
//! chemical. The value is an inverse-distance-weighted average of the three
//! nearest calibration samples; confidence falls linearly with the distance
//! to the nearest one, reaching zero at the diagonal of RGB space.

use crate::chemistry::{
    dosage::round2,
    ranges::{classify, strip_ranges, IdealRange},
};
use poolchem_schemas::{
    adjustment::ChemicalStatus,
    calibration::{CalibrationSample, CalibrationTable, StripReading},
    reading::{Parameter, Readings},
};
use std::collections::BTreeMap;

const NEIGHBOURS: usize = 3;
const EPSILON: f64 = 1e-6;

fn max_distance() -> f64 {
    (3.0 * 255.0_f64.powi(2)).sqrt()
}

fn distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (f64::from(x) - f64::from(y)).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Confidence (0-100) that `sample` shows the same color as `reference`.
pub fn rgb_confidence(sample: [u8; 3], reference: [u8; 3]) -> f64 {
    confidence_for(distance(sample, reference))
}

fn confidence_for(distance: f64) -> f64 {
    round1((100.0 - distance / max_distance() * 100.0).max(0.0))
}

#[derive(Debug, Clone)]
pub struct StripInterpolator {
    calibration: CalibrationTable,
    ranges: BTreeMap<Parameter, IdealRange>,
}

impl Default for StripInterpolator {
    fn default() -> Self {
        Self::new(CalibrationTable::new())
    }
}

impl StripInterpolator {
    /// Chemical names are matched case-insensitively.
    pub fn new(calibration: CalibrationTable) -> Self {
        let calibration = calibration
            .into_iter()
            .map(|(chemical, samples)| (chemical.trim().to_ascii_lowercase(), samples))
            .collect();
        Self {
            calibration,
            ranges: strip_ranges(),
        }
    }

    /// Replaces the ranges used by `get_recommendations`.
    pub fn with_ranges(mut self, ranges: BTreeMap<Parameter, IdealRange>) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn calibrated_chemicals(&self) -> impl Iterator<Item = &str> {
        self.calibration.keys().map(String::as_str)
    }

    fn samples(&self, chemical: &str) -> &[CalibrationSample] {
        self.calibration
            .get(&chemical.trim().to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Estimates the concentration shown by `rgb`.
    ///
    /// Returns `(None, 0.0)` when the chemical has no calibration samples.
    pub fn map_rgb_to_value(&self, chemical: &str, rgb: [u8; 3]) -> (Option<f64>, f64) {
        let samples = self.samples(chemical);
        if samples.is_empty() {
            return (None, 0.0);
        }

        let mut nearest: Vec<(f64, f64)> = samples
            .iter()
            .map(|s| (distance(rgb, s.rgb), s.value))
            .collect();
        nearest.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearest.truncate(NEIGHBOURS);

        let (weighted, total_weight) = nearest
            .iter()
            .fold((0.0, 0.0), |(weighted, total), &(d, value)| {
                let weight = 1.0 / (d + EPSILON);
                (weighted + weight * value, total + weight)
            });

        let value = round2(weighted / total_weight);
        (Some(value), confidence_for(nearest[0].0))
    }

    /// Interprets every pad of a strip.
    pub fn analyze(&self, pads: &BTreeMap<String, [u8; 3]>) -> BTreeMap<String, StripReading> {
        pads.iter()
            .map(|(chemical, &rgb)| {
                let (value, confidence) = self.map_rgb_to_value(chemical, rgb);
                (
                    chemical.clone(),
                    StripReading {
                        value,
                        confidence,
                        rgb,
                    },
                )
            })
            .collect()
    }

    /// Increase/decrease/good advice for each pad with a value and a known range.
    pub fn get_recommendations(&self, results: &BTreeMap<String, StripReading>) -> BTreeMap<String, String> {
        let mut recommendations = BTreeMap::new();
        for (chemical, reading) in results {
            let Some(value) = reading.value else {
                continue;
            };
            let Some(range) = chemical
                .parse::<Parameter>()
                .ok()
                .and_then(|p| self.ranges.get(&p))
            else {
                continue;
            };

            let text = match classify(value, range).status {
                ChemicalStatus::VeryLow | ChemicalStatus::Low => format!(
                    "Increase {} from {} to {}-{}",
                    chemical, value, range.min, range.max
                ),
                ChemicalStatus::High | ChemicalStatus::VeryHigh => format!(
                    "Decrease {} from {} to {}-{}",
                    chemical, value, range.min, range.max
                ),
                ChemicalStatus::Ideal => format!(
                    "{} level is good at {} (ideal: {}-{})",
                    chemical, value, range.min, range.max
                ),
            };
            recommendations.insert(chemical.clone(), text);
        }
        recommendations
    }

    /// Converts strip results into engine readings, dropping pads with no
    /// value, an unknown name, or a confidence below `min_confidence`.
    pub fn to_readings(results: &BTreeMap<String, StripReading>, min_confidence: f64) -> Readings {
        results
            .iter()
            .filter(|(_, r)| r.confidence >= min_confidence)
            .filter_map(|(chemical, r)| Some((chemical.parse::<Parameter>().ok()?, r.value?)))
            .collect()
    }
}
