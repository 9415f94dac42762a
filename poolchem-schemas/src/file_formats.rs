use crate::{
    adjustment::Compound,
    pool::{PoolProfile, SanitizerType, SurfaceType},
    reading::Parameter,
    weather::WeatherConditions,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One water test, as entered by hand or exported from a test kit.
#[derive(Debug, Deserialize)]
pub struct ReadingsFile {
    pub schema_version: String,
    pub pool: PoolProfile,
    #[serde(default)]
    pub pool_type: Option<String>,
    /// Values keyed by parameter name; any alias accepted by `Parameter` works.
    pub readings: BTreeMap<String, f64>,
    #[serde(default)]
    pub temperature_f: Option<f64>,
    #[serde(default)]
    pub weather: Option<WeatherConditions>,
}

/// An ideal range, optionally restricted to one surface or sanitizer.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeEntry {
    pub parameter: Parameter,
    #[serde(default)]
    pub surface: Option<SurfaceType>,
    #[serde(default)]
    pub sanitizer: Option<SanitizerType>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SanitizerFactorEntry {
    pub sanitizer: SanitizerType,
    pub parameter: Parameter,
    pub factor: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CeilingEntry {
    pub compound: Compound,
    /// Largest single addition per 10,000 gallons. For a partial water
    /// change this is the largest percentage of the pool to replace.
    pub per_10k_gallons: f64,
}

/// Overrides for the chemistry engine's built-in tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ChemistryFile {
    pub schema_version: String,
    #[serde(default)]
    pub ranges: Vec<RangeEntry>,
    #[serde(default)]
    pub sanitizer_factors: Vec<SanitizerFactorEntry>,
    #[serde(default)]
    pub dosage_ceilings: Vec<CeilingEntry>,
    #[serde(default)]
    pub default_water_temp_f: Option<f64>,
}
