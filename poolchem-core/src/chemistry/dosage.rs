use crate::error::{DosageError, PoolChemError};
use poolchem_schemas::{
    adjustment::{Compound, Direction},
    file_formats::{CeilingEntry, SanitizerFactorEntry},
    pool::SanitizerType,
    reading::Parameter,
};
use std::collections::BTreeMap;

/// Dosage rates are quoted for this many gallons of water.
pub const REFERENCE_GALLONS: f64 = 10_000.0;

/// How a compound's quantity scales with the change it must produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rate {
    /// `per_10k` units of compound move the parameter by `step` in 10,000 gallons.
    PerStep { step: f64, per_10k: f64 },
    /// Replace a fraction of the water; the amount is a percentage of the pool.
    WaterChange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Treatment {
    pub compound: Compound,
    pub rate: Rate,
}

impl Treatment {
    /// The product and rate used to move `parameter` in `direction`.
    pub fn for_adjustment(parameter: Parameter, direction: Direction) -> Option<Treatment> {
        use Compound::*;
        use Direction::{Decrease, Increase};
        use Parameter::*;

        let per_step = |compound, step, per_10k| Treatment {
            compound,
            rate: Rate::PerStep { step, per_10k },
        };
        let water_change = Treatment {
            compound: PartialWaterChange,
            rate: Rate::WaterChange,
        };

        let treatment = match (parameter, direction) {
            (_, Direction::None) => return None,
            (Ph, Increase) => per_step(SodaAsh, 0.1, 6.0),
            (Ph, Decrease) => per_step(MuriaticAcid, 0.1, 8.0),
            // One gallon of 12.5% liquid chlorine raises 10,000 gallons by 12.5 ppm.
            (FreeChlorine, Increase) => per_step(LiquidChlorine, 12.5, 128.0),
            (TotalChlorine, Increase) => per_step(ShockTreatment, 1.0, 2.0),
            (FreeChlorine | TotalChlorine, Decrease) => per_step(SodiumThiosulfate, 1.0, 2.6),
            (Alkalinity, Increase) => per_step(BakingSoda, 10.0, 1.5),
            (Alkalinity, Decrease) => per_step(MuriaticAcid, 10.0, 32.0),
            (Hardness, Increase) => per_step(CalciumChloride, 10.0, 1.0),
            (CyanuricAcid, Increase) => per_step(Stabilizer, 10.0, 1.3),
            (Salt, Increase) => per_step(PoolSalt, 100.0, 8.3),
            (Bromine, Increase) => per_step(BromineTablets, 1.0, 10.0),
            (Hardness | CyanuricAcid | Salt | Bromine, Decrease) => water_change,
        };
        Some(treatment)
    }

    /// Quantity needed to move a parameter by `needed` from `current`.
    ///
    /// `factor` scales compound doses and is ignored for water changes.
    pub fn amount(
        &self,
        needed: f64,
        current: f64,
        volume_gallons: f64,
        factor: f64,
    ) -> Result<f64, DosageError> {
        check_volume(volume_gallons)?;
        if !(needed > 0.0) {
            return Err(DosageError::NonPositiveAmount(needed));
        }
        let amount = match self.rate {
            Rate::PerStep { step, per_10k } => {
                needed / step * per_10k * (volume_gallons / REFERENCE_GALLONS) * factor
            }
            Rate::WaterChange => {
                if current <= 0.0 {
                    return Err(DosageError::NonPositiveAmount(current));
                }
                needed / current * 100.0
            }
        };
        Ok(round2(amount))
    }
}

pub(crate) fn check_volume(volume_gallons: f64) -> Result<(), DosageError> {
    if volume_gallons.is_finite() && volume_gallons > 0.0 {
        Ok(())
    } else {
        Err(DosageError::NonPositiveVolume(volume_gallons))
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-sanitizer multipliers and single-addition ceilings.
#[derive(Debug, Clone)]
pub struct DosageTable {
    factors: BTreeMap<(SanitizerType, Parameter), f64>,
    ceilings: BTreeMap<Compound, f64>,
}

impl Default for DosageTable {
    fn default() -> Self {
        let factors = BTreeMap::from([
            ((SanitizerType::SaltWater, Parameter::FreeChlorine), 0.8),
            ((SanitizerType::SaltWater, Parameter::TotalChlorine), 0.8),
        ]);

        // Soft backstops per 10,000 gallons; override them in chemistry.yaml.
        let ceilings = BTreeMap::from([
            (Compound::SodaAsh, 64.0),
            (Compound::MuriaticAcid, 128.0),
            (Compound::LiquidChlorine, 512.0),
            (Compound::ShockTreatment, 160.0),
            (Compound::SodiumThiosulfate, 64.0),
            (Compound::BakingSoda, 30.0),
            (Compound::CalciumChloride, 40.0),
            (Compound::Stabilizer, 13.0),
            (Compound::PoolSalt, 300.0),
            (Compound::BromineTablets, 100.0),
            (Compound::PartialWaterChange, 50.0),
        ]);

        Self { factors, ceilings }
    }
}

impl DosageTable {
    pub fn sanitizer_factor(&self, sanitizer: SanitizerType, parameter: Parameter) -> f64 {
        self.factors.get(&(sanitizer, parameter)).copied().unwrap_or(1.0)
    }

    /// Largest single addition of `compound` for a pool of `volume_gallons`.
    pub fn ceiling(&self, compound: Compound, volume_gallons: f64) -> Option<f64> {
        let per_10k = *self.ceilings.get(&compound)?;
        Some(match compound {
            Compound::PartialWaterChange => per_10k,
            _ => per_10k * volume_gallons / REFERENCE_GALLONS,
        })
    }

    pub fn apply_factors(&mut self, entries: &[SanitizerFactorEntry]) -> Result<(), PoolChemError> {
        for entry in entries {
            if !entry.factor.is_finite() || entry.factor <= 0.0 {
                return Err(PoolChemError::Validation(format!(
                    "sanitizer factor for {} must be positive, got {}",
                    entry.parameter.key(),
                    entry.factor
                )));
            }
            self.factors.insert((entry.sanitizer, entry.parameter), entry.factor);
        }
        Ok(())
    }

    pub fn apply_ceilings(&mut self, entries: &[CeilingEntry]) -> Result<(), PoolChemError> {
        for entry in entries {
            if !entry.per_10k_gallons.is_finite() || entry.per_10k_gallons <= 0.0 {
                return Err(PoolChemError::Validation(format!(
                    "ceiling for {} must be positive, got {}",
                    entry.compound, entry.per_10k_gallons
                )));
            }
            self.ceilings.insert(entry.compound, entry.per_10k_gallons);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn treatment(parameter: Parameter, direction: Direction) -> Treatment {
        Treatment::for_adjustment(parameter, direction).unwrap()
    }

    #[test]
    fn every_parameter_has_both_treatments() {
        for parameter in Parameter::ALL {
            assert!(Treatment::for_adjustment(parameter, Direction::Increase).is_some());
            assert!(Treatment::for_adjustment(parameter, Direction::Decrease).is_some());
            assert!(Treatment::for_adjustment(parameter, Direction::None).is_none());
        }
    }

    #[test]
    fn ph_constants_are_asymmetric() {
        let up = treatment(Parameter::Ph, Direction::Increase);
        let down = treatment(Parameter::Ph, Direction::Decrease);
        assert_eq!(up.compound, Compound::SodaAsh);
        assert_eq!(down.compound, Compound::MuriaticAcid);
        assert_eq!(up.amount(0.2, 7.0, 10000.0, 1.0).unwrap(), 12.0);
        assert_eq!(down.amount(0.2, 8.0, 10000.0, 1.0).unwrap(), 16.0);
    }

    #[test]
    fn liquid_chlorine_follows_gallon_per_twelve_and_a_half_ppm() {
        let chlorine = treatment(Parameter::FreeChlorine, Direction::Increase);
        // 2 ppm in 20,000 gallons: 2 * 20000 / (12.5 * 10000) * 128
        assert_eq!(chlorine.amount(2.0, 0.0, 20000.0, 1.0).unwrap(), 40.96);
        assert_eq!(chlorine.amount(2.0, 0.0, 20000.0, 0.8).unwrap(), 32.77);
    }

    #[test]
    fn water_change_is_a_percentage_of_current() {
        let change = treatment(Parameter::Hardness, Direction::Decrease);
        assert_eq!(change.compound, Compound::PartialWaterChange);
        assert_eq!(change.amount(100.0, 500.0, 10000.0, 1.0).unwrap(), 20.0);
    }

    #[test]
    fn rejects_bad_volume_and_amount() {
        let soda = treatment(Parameter::Ph, Direction::Increase);
        assert_eq!(
            soda.amount(0.2, 7.0, 0.0, 1.0),
            Err(DosageError::NonPositiveVolume(0.0))
        );
        assert_eq!(
            soda.amount(0.0, 7.0, 10000.0, 1.0),
            Err(DosageError::NonPositiveAmount(0.0))
        );
        assert!(matches!(
            soda.amount(0.2, 7.0, f64::NAN, 1.0),
            Err(DosageError::NonPositiveVolume(_))
        ));
    }

    #[test]
    fn ceilings_scale_with_volume_except_water_change() {
        let table = DosageTable::default();
        assert_eq!(table.ceiling(Compound::SodaAsh, 20000.0), Some(128.0));
        assert_eq!(table.ceiling(Compound::PartialWaterChange, 20000.0), Some(50.0));
    }

    #[test]
    fn salt_water_pools_need_less_chlorine() {
        let table = DosageTable::default();
        assert_eq!(table.sanitizer_factor(SanitizerType::SaltWater, Parameter::FreeChlorine), 0.8);
        assert_eq!(table.sanitizer_factor(SanitizerType::Chlorine, Parameter::FreeChlorine), 1.0);
        assert_eq!(table.sanitizer_factor(SanitizerType::SaltWater, Parameter::Ph), 1.0);
    }
}
