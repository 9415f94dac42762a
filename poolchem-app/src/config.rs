use anyhow::{Context, Result};
use poolchem_core::{
    chemistry::builder::load_chemistry_file, ChemicalEngine, EngineBuilder, SafetyLookup, StripInterpolator,
};
use poolchem_schemas::{calibration::CalibrationTable, file_formats::ChemistryFile};
use std::{fs, path::Path};
use tracing::{info, warn};

const CHEMISTRY_FILE: &str = "chemistry.yaml";
const SAFETY_FILE: &str = "chemical_safety.json";
const CALIBRATION_FILE: &str = "calibration.json";

/// Reference data for a run: chemistry overrides, the chemical safety store
/// and the test strip calibration. Any file that is missing falls back to
/// the built-in tables.
pub struct KnowledgeBase {
    pub chemistry: Option<ChemistryFile>,
    pub safety: SafetyLookup,
    pub calibration: CalibrationTable,
}

impl KnowledgeBase {
    /// Loads all data from the specified base directory.
    pub fn load(base_path: &str) -> Result<Self> {
        info!(base_path, "loading knowledge base");
        let base = Path::new(base_path);

        let chemistry_path = base.join(CHEMISTRY_FILE);
        let chemistry = if chemistry_path.is_file() {
            let file = load_chemistry_file(&chemistry_path)
                .with_context(|| format!("Failed to load chemistry overrides from {:?}", chemistry_path))?;
            info!(
                schema_version = %file.schema_version,
                ranges = file.ranges.len(),
                ceilings = file.dosage_ceilings.len(),
                "chemistry overrides loaded"
            );
            Some(file)
        } else {
            warn!(path = ?chemistry_path, "no chemistry overrides found, using built-in tables");
            None
        };

        let safety_path = base.join(SAFETY_FILE);
        let safety = if safety_path.is_file() {
            let safety = SafetyLookup::load_json(&safety_path)
                .with_context(|| format!("Failed to load safety data from {:?}", safety_path))?;
            info!(chemicals = safety.chemical_ids().count(), "safety data loaded");
            safety
        } else {
            warn!(path = ?safety_path, "no safety data found, using built-in chemicals");
            SafetyLookup::default()
        };

        let calibration_path = base.join(CALIBRATION_FILE);
        let calibration = if calibration_path.is_file() {
            let content = fs::read_to_string(&calibration_path)
                .with_context(|| format!("Failed to read {:?}", calibration_path))?;
            let table: CalibrationTable = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON from {:?}", calibration_path))?;
            info!(chemicals = table.len(), "strip calibration loaded");
            table
        } else {
            warn!(path = ?calibration_path, "no strip calibration found");
            CalibrationTable::new()
        };

        Ok(Self {
            chemistry,
            safety,
            calibration,
        })
    }

    /// Builds a chemistry engine from the loaded overrides and safety data.
    pub fn engine(&self) -> Result<ChemicalEngine> {
        let mut builder = EngineBuilder::new().with_safety(self.safety.clone());
        if let Some(file) = &self.chemistry {
            builder = builder.with_chemistry_file(file.clone());
        }
        builder.build().context("Failed to build chemistry engine")
    }

    pub fn strip_interpolator(&self) -> StripInterpolator {
        StripInterpolator::new(self.calibration.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolchem_schemas::{
        adjustment::ChemicalStatus,
        pool::{PoolProfile, SanitizerType, SurfaceType},
        reading::Parameter,
    };

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("poolchem-empty-kb-{}", std::process::id()));
        let kb = KnowledgeBase::load(&dir.to_string_lossy()).unwrap();
        assert!(kb.chemistry.is_none());
        assert!(kb.calibration.is_empty());
        assert!(!kb.safety.check_compatibility("chlorine", "muriatic_acid"));
        assert!(kb.engine().is_ok());
    }

    #[test]
    fn bundled_data_loads() {
        let kb = KnowledgeBase::load("../data").unwrap();
        assert!(kb.chemistry.is_some());
        assert_eq!(kb.safety.chemical_ids().count(), 10);
        assert!(kb.calibration.contains_key("ph"));

        let engine = kb.engine().unwrap();
        let pool = PoolProfile::new("Liner", 10000.0, SurfaceType::Vinyl, SanitizerType::Chlorine);
        let (status, _) = engine.pool(&pool).get_chemical_status(Parameter::Hardness, 250.0).unwrap();
        assert_eq!(status, ChemicalStatus::High);

        let (value, confidence) = kb.strip_interpolator().map_rgb_to_value("pH", [255, 140, 30]);
        assert_eq!(value, Some(7.2));
        assert_eq!(confidence, 100.0);
    }
}
