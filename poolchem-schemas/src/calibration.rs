use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reference pad color and the concentration it represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub rgb: [u8; 3],
    pub value: f64,
}

/// Calibration samples keyed by chemical name, as stored in `calibration.json`.
pub type CalibrationTable = BTreeMap<String, Vec<CalibrationSample>>;

/// The interpreted value of one strip pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripReading {
    pub value: Option<f64>,
    pub confidence: f64,
    pub rgb: [u8; 3],
}
