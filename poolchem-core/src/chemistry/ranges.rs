use crate::error::PoolChemError;
use poolchem_schemas::{
    adjustment::{ChemicalStatus, Severity},
    file_formats::RangeEntry,
    pool::{PoolProfile, SanitizerType, SurfaceType},
    reading::Parameter,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deviation beyond a bound, in percent, at which a reading becomes "very" low/high.
pub const SEVERE_DEVIATION_PCT: f64 = 25.0;

/// The target `[min, max]` band for one parameter. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdealRange {
    pub min: f64,
    pub max: f64,
}

impl IdealRange {
    pub fn new(min: f64, max: f64) -> Result<Self, PoolChemError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min >= max {
            return Err(PoolChemError::Validation(format!(
                "ideal range must satisfy 0 <= min < max, got [{}, {}]",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Result of comparing a value against an ideal range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub status: ChemicalStatus,
    pub severity: Severity,
    /// The bound that was breached, or `None` when the value is in range.
    pub breached_bound: Option<f64>,
    /// Distance past the breached bound as a percentage of that bound.
    pub deviation_pct: f64,
}

/// Classifies `value` against `range`. Shared by the chemical engine and the
/// strip analyzer so both agree on what "low" and "high" mean.
pub fn classify(value: f64, range: &IdealRange) -> Classification {
    if range.contains(value) {
        return Classification {
            status: ChemicalStatus::Ideal,
            severity: Severity::Normal,
            breached_bound: None,
            deviation_pct: 0.0,
        };
    }

    let low = value < range.min;
    let bound = if low { range.min } else { range.max };
    let deviation_pct = percent_off(value, bound);
    let severe = deviation_pct > SEVERE_DEVIATION_PCT;

    let status = match (low, severe) {
        (true, true) => ChemicalStatus::VeryLow,
        (true, false) => ChemicalStatus::Low,
        (false, true) => ChemicalStatus::VeryHigh,
        (false, false) => ChemicalStatus::High,
    };
    let severity = if severe { Severity::Critical } else { Severity::Warning };

    Classification {
        status,
        severity,
        breached_bound: Some(bound),
        deviation_pct,
    }
}

fn percent_off(value: f64, bound: f64) -> f64 {
    if bound == 0.0 {
        return 100.0;
    }
    (value - bound).abs() / bound * 100.0
}

/// Ideal ranges with optional specializations per surface and sanitizer.
///
/// Lookups resolve a surface override first, then a sanitizer override, and
/// finally the base range.
#[derive(Debug, Clone)]
pub struct RangeTable {
    base: BTreeMap<Parameter, IdealRange>,
    by_surface: BTreeMap<(SurfaceType, Parameter), IdealRange>,
    by_sanitizer: BTreeMap<(SanitizerType, Parameter), IdealRange>,
}

impl Default for RangeTable {
    fn default() -> Self {
        let base = [
            (Parameter::Ph, 7.2, 7.8),
            (Parameter::FreeChlorine, 1.0, 3.0),
            (Parameter::TotalChlorine, 1.0, 3.0),
            (Parameter::Alkalinity, 80.0, 120.0),
            (Parameter::Hardness, 200.0, 400.0),
            (Parameter::CyanuricAcid, 30.0, 80.0),
            (Parameter::Salt, 2700.0, 3400.0),
            (Parameter::Bromine, 3.0, 5.0),
        ]
        .into_iter()
        .map(|(p, min, max)| (p, IdealRange { min, max }))
        .collect();

        let by_surface = [
            (SurfaceType::Vinyl, 175.0, 225.0),
            (SurfaceType::Fiberglass, 150.0, 250.0),
            (SurfaceType::AboveGroundMetal, 175.0, 225.0),
            (SurfaceType::AboveGroundResin, 175.0, 225.0),
        ]
        .into_iter()
        .map(|(s, min, max)| ((s, Parameter::Hardness), IdealRange { min, max }))
        .collect();

        let by_sanitizer = BTreeMap::from([(
            (SanitizerType::SaltWater, Parameter::CyanuricAcid),
            IdealRange { min: 60.0, max: 80.0 },
        )]);

        Self {
            base,
            by_surface,
            by_sanitizer,
        }
    }
}

impl RangeTable {
    /// Returns the range that applies to `parameter` in `pool`.
    pub fn resolve(&self, parameter: Parameter, pool: &PoolProfile) -> Result<IdealRange, PoolChemError> {
        self.by_surface
            .get(&(pool.surface_type, parameter))
            .or_else(|| self.by_sanitizer.get(&(pool.sanitizer_type, parameter)))
            .or_else(|| self.base.get(&parameter))
            .copied()
            .ok_or_else(|| PoolChemError::InvalidParameter(parameter.key().to_string()))
    }

    /// The unspecialized range for `parameter`.
    pub fn base(&self, parameter: Parameter) -> Option<IdealRange> {
        self.base.get(&parameter).copied()
    }

    /// Applies configuration entries on top of the current table.
    pub fn apply(&mut self, entries: &[RangeEntry]) -> Result<(), PoolChemError> {
        for entry in entries {
            let range = IdealRange::new(entry.min, entry.max)?;
            match (entry.surface, entry.sanitizer) {
                (Some(_), Some(_)) => {
                    return Err(PoolChemError::Validation(format!(
                        "range for {} may be specialized by surface or sanitizer, not both",
                        entry.parameter.key()
                    )))
                }
                (Some(surface), None) => {
                    self.by_surface.insert((surface, entry.parameter), range);
                }
                (None, Some(sanitizer)) => {
                    self.by_sanitizer.insert((sanitizer, entry.parameter), range);
                }
                (None, None) => {
                    self.base.insert(entry.parameter, range);
                }
            }
        }
        Ok(())
    }
}

/// Ranges used when interpreting test strips, keyed by the same parameters.
/// Stabilizer is held to a tighter band than the engine uses.
pub fn strip_ranges() -> BTreeMap<Parameter, IdealRange> {
    let mut ranges = RangeTable::default().base;
    ranges.insert(Parameter::CyanuricAcid, IdealRange { min: 30.0, max: 50.0 });
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(surface: SurfaceType, sanitizer: SanitizerType) -> PoolProfile {
        PoolProfile::new("test", 10000.0, surface, sanitizer)
    }

    // ---

    #[test]
    fn classify_is_inclusive_at_both_bounds() {
        let range = IdealRange { min: 7.2, max: 7.8 };
        assert_eq!(classify(7.2, &range).status, ChemicalStatus::Ideal);
        assert_eq!(classify(7.8, &range).status, ChemicalStatus::Ideal);
        assert_eq!(classify(7.5, &range).severity, Severity::Normal);
    }

    #[test]
    fn classify_splits_at_twenty_five_percent() {
        let range = IdealRange { min: 80.0, max: 120.0 };

        let low = classify(70.0, &range);
        assert_eq!(low.status, ChemicalStatus::Low);
        assert_eq!(low.severity, Severity::Warning);
        assert_eq!(low.breached_bound, Some(80.0));
        assert!((low.deviation_pct - 12.5).abs() < 1e-9);

        assert_eq!(classify(50.0, &range).status, ChemicalStatus::VeryLow);
        assert_eq!(classify(140.0, &range).status, ChemicalStatus::High);

        let very_high = classify(200.0, &range);
        assert_eq!(very_high.status, ChemicalStatus::VeryHigh);
        assert_eq!(very_high.severity, Severity::Critical);
    }

    #[test]
    fn rejects_inverted_or_negative_ranges() {
        assert!(IdealRange::new(5.0, 3.0).is_err());
        assert!(IdealRange::new(3.0, 3.0).is_err());
        assert!(IdealRange::new(-1.0, 3.0).is_err());
        assert!(IdealRange::new(0.0, 3.0).is_ok());
    }

    // ---

    #[test]
    fn surface_overrides_hardness() {
        let table = RangeTable::default();
        let concrete = table
            .resolve(Parameter::Hardness, &pool(SurfaceType::Concrete, SanitizerType::Chlorine))
            .unwrap();
        let vinyl = table
            .resolve(Parameter::Hardness, &pool(SurfaceType::Vinyl, SanitizerType::Chlorine))
            .unwrap();
        assert_eq!(concrete, IdealRange { min: 200.0, max: 400.0 });
        assert_eq!(vinyl, IdealRange { min: 175.0, max: 225.0 });
    }

    #[test]
    fn sanitizer_overrides_stabilizer() {
        let table = RangeTable::default();
        let salt = table
            .resolve(Parameter::CyanuricAcid, &pool(SurfaceType::Concrete, SanitizerType::SaltWater))
            .unwrap();
        assert_eq!(salt.min, 60.0);
    }

    #[test]
    fn applied_entries_replace_defaults() {
        let mut table = RangeTable::default();
        table
            .apply(&[RangeEntry {
                parameter: Parameter::Ph,
                surface: None,
                sanitizer: None,
                min: 7.4,
                max: 7.6,
            }])
            .unwrap();
        assert_eq!(table.base(Parameter::Ph), Some(IdealRange { min: 7.4, max: 7.6 }));
    }

    #[test]
    fn strip_ranges_tighten_stabilizer_only() {
        let ranges = strip_ranges();
        assert_eq!(ranges[&Parameter::CyanuricAcid].max, 50.0);
        assert_eq!(ranges[&Parameter::Ph], IdealRange { min: 7.2, max: 7.8 });
        assert_eq!(ranges.len(), Parameter::ALL.len());
    }
}
