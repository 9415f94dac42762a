use super::{
    dosage::DosageTable,
    engine::{ChemicalEngine, ChemistryConfig, DEFAULT_WATER_TEMP_F},
    ranges::RangeTable,
};
use crate::{error::PoolChemError, safety::SafetyLookup};
use poolchem_schemas::file_formats::{CeilingEntry, ChemistryFile, RangeEntry, SanitizerFactorEntry};
use std::{fs, path::Path};

/// Reads a `chemistry.yaml` override file.
pub fn load_chemistry_file(path: &Path) -> Result<ChemistryFile, PoolChemError> {
    let raw = fs::read_to_string(path).map_err(|e| PoolChemError::FileIO(path.display().to_string(), e))?;
    serde_yaml::from_str(&raw).map_err(|e| PoolChemError::YamlParsing(path.display().to_string(), e))
}

/// A fluent builder for constructing a `ChemicalEngine`.
///
/// Every table starts from the built-in defaults; overrides are layered on
/// top in the order they were supplied when `build` is called.
#[derive(Default)]
pub struct EngineBuilder {
    ranges: Option<RangeTable>,
    dosage: Option<DosageTable>,
    range_overrides: Vec<RangeEntry>,
    sanitizer_factors: Vec<SanitizerFactorEntry>,
    dosage_ceilings: Vec<CeilingEntry>,
    default_water_temp_f: Option<f64>,
    safety: Option<SafetyLookup>,
}

impl EngineBuilder {
    /// Creates a new, empty `EngineBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the base ideal-range table.
    pub fn with_ranges(mut self, ranges: RangeTable) -> Self {
        self.ranges = Some(ranges);
        self
    }

    /// Replaces the sanitizer factor and ceiling table.
    pub fn with_dosage_table(mut self, dosage: DosageTable) -> Self {
        self.dosage = Some(dosage);
        self
    }

    pub fn with_range_overrides(mut self, entries: Vec<RangeEntry>) -> Self {
        self.range_overrides.extend(entries);
        self
    }

    pub fn with_sanitizer_factors(mut self, entries: Vec<SanitizerFactorEntry>) -> Self {
        self.sanitizer_factors.extend(entries);
        self
    }

    pub fn with_dosage_ceilings(mut self, entries: Vec<CeilingEntry>) -> Self {
        self.dosage_ceilings.extend(entries);
        self
    }

    /// Water temperature used for the LSI when a reading set has none.
    pub fn with_default_water_temp(mut self, temperature_f: f64) -> Self {
        self.default_water_temp_f = Some(temperature_f);
        self
    }

    /// Applies every override carried by a `chemistry.yaml` file.
    pub fn with_chemistry_file(mut self, file: ChemistryFile) -> Self {
        self.range_overrides.extend(file.ranges);
        self.sanitizer_factors.extend(file.sanitizer_factors);
        self.dosage_ceilings.extend(file.dosage_ceilings);
        if let Some(temperature_f) = file.default_water_temp_f {
            self.default_water_temp_f = Some(temperature_f);
        }
        self
    }

    /// Sets the safety database consulted for dosage notes.
    pub fn with_safety(mut self, safety: SafetyLookup) -> Self {
        self.safety = Some(safety);
        self
    }

    /// Consumes the builder and returns a configured `ChemicalEngine`.
    ///
    /// # Errors
    ///
    /// Returns `PoolChemError::Validation` if an override carries an invalid
    /// range, a non-positive factor or ceiling, or a non-finite temperature.
    pub fn build(self) -> Result<ChemicalEngine, PoolChemError> {
        let mut ranges = self.ranges.unwrap_or_default();
        ranges.apply(&self.range_overrides)?;

        let mut dosage = self.dosage.unwrap_or_default();
        dosage.apply_factors(&self.sanitizer_factors)?;
        dosage.apply_ceilings(&self.dosage_ceilings)?;

        let default_water_temp_f = self.default_water_temp_f.unwrap_or(DEFAULT_WATER_TEMP_F);
        if !default_water_temp_f.is_finite() {
            return Err(PoolChemError::Validation(format!(
                "default water temperature must be finite, got {}",
                default_water_temp_f
            )));
        }

        Ok(ChemicalEngine::new(
            ChemistryConfig {
                ranges,
                dosage,
                default_water_temp_f,
            },
            self.safety.unwrap_or_default(),
        ))
    }
}
