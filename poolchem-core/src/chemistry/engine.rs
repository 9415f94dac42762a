use super::{
    balance::WaterBalance,
    dosage::{check_volume, round2, DosageTable, Treatment},
    ranges::{classify, IdealRange, RangeTable},
    warnings::water_quality_warnings,
};
use crate::{
    error::{DosageError, PoolChemError},
    safety::SafetyLookup,
    weather::analyze_weather_impact,
};
use poolchem_schemas::{
    adjustment::{ChemicalAdjustment, ChemicalStatus, Compound, Direction, Severity},
    pool::{PoolProfile, PoolType},
    reading::{Parameter, Readings},
    weather::WeatherConditions,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Water temperature assumed for the LSI when none is supplied.
pub const DEFAULT_WATER_TEMP_F: f64 = 78.0;
/// Above this air temperature, chlorine burns off faster.
const HOT_WEATHER_F: f64 = 85.0;
const HIGH_UV_INDEX: f64 = 8.0;
/// Free chlorine up to this multiple of the range maximum is left to dissipate.
const CHLORINE_TOLERANCE: f64 = 1.5;
const LOWEST_PRIORITY: u8 = 5;

/// Immutable tables the engine is built from.
#[derive(Debug, Clone)]
pub struct ChemistryConfig {
    pub ranges: RangeTable,
    pub dosage: DosageTable,
    pub default_water_temp_f: f64,
}

impl Default for ChemistryConfig {
    fn default() -> Self {
        Self {
            ranges: RangeTable::default(),
            dosage: DosageTable::default(),
            default_water_temp_f: DEFAULT_WATER_TEMP_F,
        }
    }
}

/// Turns readings into statuses, dosages and a water-balance index.
///
/// The engine holds no per-pool state; borrow a [`PoolView`] with
/// [`ChemicalEngine::pool`] for each pool you want to evaluate.
#[derive(Debug, Clone)]
pub struct ChemicalEngine {
    pub(crate) config: ChemistryConfig,
    pub(crate) safety: SafetyLookup,
}

/// One parameter of an [`Assessment`].
#[derive(Debug, Clone, Serialize)]
pub struct AssessedParameter {
    pub parameter: Parameter,
    pub value: f64,
    pub range: IdealRange,
    pub status: ChemicalStatus,
    pub severity: Severity,
    pub adjustment: ChemicalAdjustment,
}

/// Everything the engine concluded about one reading set.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub pool: String,
    pub parameters: Vec<AssessedParameter>,
    pub balance: Option<WaterBalance>,
    pub temperature_f: f64,
    /// Swimmer-safety and equipment warnings, most serious first.
    pub warnings: Vec<String>,
}

impl Assessment {
    pub fn adjustments(&self) -> impl Iterator<Item = &ChemicalAdjustment> {
        self.parameters.iter().map(|p| &p.adjustment)
    }

    pub fn capped(&self) -> impl Iterator<Item = &ChemicalAdjustment> {
        self.adjustments().filter(|a| a.capped)
    }

    pub fn get(&self, parameter: Parameter) -> Option<&AssessedParameter> {
        self.parameters.iter().find(|p| p.parameter == parameter)
    }
}

struct Dose {
    compound: Compound,
    amount: f64,
}

impl ChemicalEngine {
    pub fn new(config: ChemistryConfig, safety: SafetyLookup) -> Self {
        Self { config, safety }
    }

    pub fn config(&self) -> &ChemistryConfig {
        &self.config
    }

    pub fn safety(&self) -> &SafetyLookup {
        &self.safety
    }

    /// A view of the engine bound to one pool.
    pub fn pool<'a>(&'a self, profile: &'a PoolProfile) -> PoolView<'a> {
        PoolView {
            engine: self,
            profile,
        }
    }

    pub fn evaluate_water_balance(&self, ph: f64, alkalinity: f64, calcium_hardness: f64, temperature_f: f64) -> f64 {
        super::balance::evaluate_water_balance(ph, alkalinity, calcium_hardness, temperature_f)
    }

    fn safety_notes(&self, compound: Compound) -> String {
        compound
            .safety_id()
            .map(|id| self.safety.get_safety_guidelines(id).join("; "))
            .unwrap_or_default()
    }

    fn range(&self, profile: &PoolProfile, parameter: Parameter) -> Result<IdealRange, PoolChemError> {
        self.config.ranges.resolve(parameter, profile)
    }

    fn priority(&self, profile: &PoolProfile, parameter: Parameter, value: f64) -> u8 {
        let Ok(range) = self.range(profile, parameter) else {
            return LOWEST_PRIORITY;
        };
        let classification = classify(value, &range);
        if classification.status == ChemicalStatus::Ideal {
            return LOWEST_PRIORITY;
        }
        let base = match parameter {
            Parameter::Ph => 1,
            Parameter::FreeChlorine | Parameter::TotalChlorine => 2,
            Parameter::Alkalinity => 3,
            Parameter::CyanuricAcid => 4,
            _ => LOWEST_PRIORITY,
        };
        if classification.deviation_pct > 50.0 {
            (base - 1).max(1)
        } else {
            base
        }
    }

    /// Computes the dose moving `current` to `target`, or `None` when no
    /// action is needed. A dose above the ceiling is an error.
    fn dose(
        &self,
        profile: &PoolProfile,
        parameter: Parameter,
        current: f64,
        target: f64,
    ) -> Result<Option<Dose>, PoolChemError> {
        check_volume(profile.volume_gallons)?;
        let difference = target - current;
        let direction = if difference > 0.0 {
            Direction::Increase
        } else if difference < 0.0 {
            Direction::Decrease
        } else {
            return Ok(None);
        };
        let Some(treatment) = Treatment::for_adjustment(parameter, direction) else {
            return Ok(None);
        };

        let factor = self
            .config
            .dosage
            .sanitizer_factor(profile.sanitizer_type, parameter);
        let amount = treatment.amount(difference.abs(), current, profile.volume_gallons, factor)?;
        if amount <= 0.0 {
            return Ok(None);
        }

        if let Some(ceiling) = self.config.dosage.ceiling(treatment.compound, profile.volume_gallons) {
            if amount > ceiling {
                return Err(DosageError::ExceedsCeiling {
                    compound: treatment.compound.display_name().to_string(),
                    amount,
                    ceiling,
                    unit: treatment.compound.unit().to_string(),
                }
                .into());
            }
        }

        Ok(Some(Dose {
            compound: treatment.compound,
            amount,
        }))
    }

    fn adjustment(&self, parameter: Parameter, direction: Direction, dose: Dose, priority: u8) -> ChemicalAdjustment {
        ChemicalAdjustment {
            parameter,
            direction,
            compound: Some(dose.compound),
            compound_name: dose.compound.display_name().to_string(),
            amount: dose.amount,
            unit: dose.compound.unit().to_string(),
            safety_notes: self.safety_notes(dose.compound),
            priority,
            capped: false,
        }
    }
}

fn validate_value(parameter: Parameter, value: f64) -> Result<(), PoolChemError> {
    if value.is_finite() && value >= 0.0 && value <= parameter.sanity_max() {
        Ok(())
    } else {
        Err(PoolChemError::Validation(format!(
            "{} reading {} is outside 0-{}",
            parameter.display_name(),
            value,
            parameter.sanity_max()
        )))
    }
}

fn direction_of(current: f64, target: f64) -> Direction {
    if target > current {
        Direction::Increase
    } else {
        Direction::Decrease
    }
}

/// Converts a name-keyed reading map, rejecting unknown names and two
/// names that alias the same parameter.
pub fn parse_levels(levels: &BTreeMap<String, f64>) -> Result<Readings, PoolChemError> {
    let mut readings = Readings::new();
    let mut keys: BTreeMap<Parameter, &str> = BTreeMap::new();
    for (name, value) in levels {
        let parameter: Parameter = name
            .parse()
            .map_err(|e| PoolChemError::Validation(format!("{}", e)))?;
        if let Some(previous) = keys.insert(parameter, name.as_str()) {
            return Err(PoolChemError::Validation(format!(
                "'{}' and '{}' are both {} readings",
                previous,
                name,
                parameter.display_name()
            )));
        }
        readings.insert(parameter, *value);
    }
    Ok(readings)
}

/// The engine bound to a single pool profile.
#[derive(Debug, Clone, Copy)]
pub struct PoolView<'a> {
    engine: &'a ChemicalEngine,
    profile: &'a PoolProfile,
}

impl<'a> PoolView<'a> {
    pub fn profile(&self) -> &PoolProfile {
        self.profile
    }

    pub fn ideal_range(&self, parameter: Parameter) -> Result<IdealRange, PoolChemError> {
        self.engine.range(self.profile, parameter)
    }

    pub fn get_chemical_status(
        &self,
        parameter: Parameter,
        value: f64,
    ) -> Result<(ChemicalStatus, Severity), PoolChemError> {
        validate_value(parameter, value)?;
        let classification = classify(value, &self.ideal_range(parameter)?);
        Ok((classification.status, classification.severity))
    }

    pub fn get_chemical_status_by_name(
        &self,
        parameter: &str,
        value: f64,
    ) -> Result<(ChemicalStatus, Severity), PoolChemError> {
        self.get_chemical_status(parameter.parse()?, value)
    }

    /// Priority 1 (most urgent) to 5 (no action).
    pub fn get_adjustment_priority(&self, parameter: Parameter, value: f64) -> u8 {
        self.engine.priority(self.profile, parameter, value)
    }

    /// Unknown names get the lowest priority.
    pub fn get_adjustment_priority_by_name(&self, parameter: &str, value: f64) -> u8 {
        parameter
            .parse()
            .map_or(LOWEST_PRIORITY, |p| self.get_adjustment_priority(p, value))
    }

    /// Computes the treatment that moves `parameter` from `current` to `target`.
    ///
    /// # Errors
    ///
    /// `DosageError` when the pool volume is not positive or the dose exceeds
    /// the configured ceiling; `Validation` for out-of-bounds values.
    pub fn calculate_adjustment(
        &self,
        parameter: Parameter,
        current: f64,
        target: f64,
    ) -> Result<ChemicalAdjustment, PoolChemError> {
        validate_value(parameter, current)?;
        validate_value(parameter, target)?;
        let priority = self.get_adjustment_priority(parameter, current);
        match self.engine.dose(self.profile, parameter, current, target)? {
            Some(dose) => Ok(self
                .engine
                .adjustment(parameter, direction_of(current, target), dose, priority)),
            None => Ok(ChemicalAdjustment::none(parameter, priority)),
        }
    }

    pub fn calculate_adjustment_by_name(
        &self,
        parameter: &str,
        current: f64,
        target: f64,
    ) -> Result<ChemicalAdjustment, PoolChemError> {
        self.calculate_adjustment(parameter.parse()?, current, target)
    }

    /// Evaluates every reading against its range and computes the correction
    /// toward the nearest bound. Doses above a ceiling are reduced to the
    /// ceiling and flagged as `capped` instead of failing the whole set.
    pub fn assess(&self, readings: &Readings, temperature_f: Option<f64>) -> Result<Assessment, PoolChemError> {
        if readings.is_empty() {
            return Err(PoolChemError::Validation("no readings supplied".to_string()));
        }
        check_volume(self.profile.volume_gallons)?;

        let mut parameters = Vec::with_capacity(readings.len());
        for (&parameter, &value) in readings {
            validate_value(parameter, value)?;
            let range = self.ideal_range(parameter)?;
            let classification = classify(value, &range);
            let target = classification.breached_bound.unwrap_or(value);

            let adjustment = match self.calculate_adjustment(parameter, value, target) {
                Ok(adjustment) => adjustment,
                Err(PoolChemError::Dosage(DosageError::ExceedsCeiling { ceiling, .. })) => {
                    self.capped_adjustment(parameter, value, target, ceiling)?
                }
                Err(e) => return Err(e),
            };

            parameters.push(AssessedParameter {
                parameter,
                value,
                range,
                status: classification.status,
                severity: classification.severity,
                adjustment,
            });
        }

        let temperature_f = temperature_f.unwrap_or(self.engine.config.default_water_temp_f);
        let balance = match (
            readings.get(&Parameter::Ph),
            readings.get(&Parameter::Alkalinity),
            readings.get(&Parameter::Hardness),
        ) {
            (Some(&ph), Some(&alkalinity), Some(&hardness)) => {
                Some(WaterBalance::compute(ph, alkalinity, hardness, temperature_f))
            }
            _ => None,
        };
        let warnings = water_quality_warnings(readings, self.profile.sanitizer_type, balance.as_ref());

        Ok(Assessment {
            pool: self.profile.name.clone(),
            parameters,
            balance,
            temperature_f,
            warnings,
        })
    }

    fn capped_adjustment(
        &self,
        parameter: Parameter,
        current: f64,
        target: f64,
        ceiling: f64,
    ) -> Result<ChemicalAdjustment, PoolChemError> {
        let direction = direction_of(current, target);
        let treatment = Treatment::for_adjustment(parameter, direction)
            .ok_or_else(|| PoolChemError::InvalidParameter(parameter.key().to_string()))?;
        let dose = Dose {
            compound: treatment.compound,
            amount: ceiling,
        };
        let mut adjustment =
            self.engine
                .adjustment(parameter, direction, dose, self.get_adjustment_priority(parameter, current));
        adjustment.capped = true;
        let note = "Dose limited to the single-addition ceiling; retest before adding more";
        adjustment.safety_notes = if adjustment.safety_notes.is_empty() {
            note.to_string()
        } else {
            format!("{}; {}", note, adjustment.safety_notes)
        };
        Ok(adjustment)
    }

    /// Human-readable advice per parameter, plus synthetic "Weather" and
    /// "LSI" entries when they apply.
    ///
    /// # Errors
    ///
    /// `Validation` when `current_levels` is empty, `pool_type` is unknown,
    /// or a level names an unsupported parameter.
    pub fn get_chemical_recommendations(
        &self,
        current_levels: &BTreeMap<String, f64>,
        pool_type: &str,
        weather: Option<&WeatherConditions>,
    ) -> Result<BTreeMap<String, String>, PoolChemError> {
        if current_levels.is_empty() {
            return Err(PoolChemError::Validation("no readings supplied".to_string()));
        }
        let pool_type: PoolType = pool_type.parse()?;
        let profile = pool_type.apply_to(self.profile);
        let readings = parse_levels(current_levels)?;
        let hot = weather.map_or(false, |w| w.temperature_f > HOT_WEATHER_F);

        let mut recommendations = BTreeMap::new();
        for (&parameter, &value) in &readings {
            validate_value(parameter, value)?;
            let mut range = self.engine.range(&profile, parameter)?;
            if hot {
                match parameter {
                    Parameter::FreeChlorine => range.max = round2(range.max * 1.2),
                    Parameter::Ph => range.min = round2(range.min + 0.1),
                    _ => {}
                }
            }
            let text = self.recommendation_text(&profile, parameter, value, &range)?;
            recommendations.insert(parameter.display_name().to_string(), text);
        }

        if let Some(weather) = weather {
            if weather.temperature_f > HOT_WEATHER_F || weather.uv_index > HIGH_UV_INDEX {
                let mut text = String::from(
                    "High temperature or UV: increase testing frequency and keep stabilizer in range to protect chlorine.",
                );
                for advisory in analyze_weather_impact(weather).recommendations {
                    text.push(' ');
                    text.push_str(&advisory);
                }
                recommendations.insert("Weather".to_string(), text);
            }
        }

        if let (Some(&ph), Some(&alkalinity), Some(&hardness)) = (
            readings.get(&Parameter::Ph),
            readings.get(&Parameter::Alkalinity),
            readings.get(&Parameter::Hardness),
        ) {
            let temperature = weather.map_or(self.engine.config.default_water_temp_f, |w| w.temperature_f);
            let balance = WaterBalance::compute(ph, alkalinity, hardness, temperature);
            recommendations.insert(
                "LSI".to_string(),
                format!("LSI {:.2} ({}). {}", balance.lsi, balance.tendency, balance.advice()),
            );
        }

        Ok(recommendations)
    }

    fn recommendation_text(
        &self,
        profile: &PoolProfile,
        parameter: Parameter,
        value: f64,
        range: &IdealRange,
    ) -> Result<String, PoolChemError> {
        let classification = classify(value, range);
        let Some(target) = classification.breached_bound else {
            return Ok("Level is ideal.".to_string());
        };

        if parameter == Parameter::FreeChlorine && value > range.max && value <= range.max * CHLORINE_TOLERANCE {
            return Ok(format!(
                "Slightly high at {} ppm. Let it dissipate naturally; no chemical needed.",
                value
            ));
        }

        let describe = |compound: Compound, amount: f64, suffix: &str| match compound {
            Compound::PartialWaterChange => format!(
                "Perform {:.1}% Partial Water Change to bring {} toward {}-{}.{}",
                amount,
                parameter.display_name(),
                range.min,
                range.max,
                suffix
            ),
            _ => format!(
                "Add {:.1} {} of {} to reach {} {}.{}",
                amount,
                compound.unit(),
                compound.display_name(),
                target,
                parameter.unit(),
                suffix
            ),
        };

        match self.engine.dose(profile, parameter, value, target) {
            Ok(Some(dose)) => Ok(describe(dose.compound, dose.amount, "")),
            Ok(None) => Ok(format!(
                "Marginally {} at {} {}; no measurable dose needed.",
                if value < target { "low" } else { "high" },
                value,
                parameter.unit()
            )),
            Err(PoolChemError::Dosage(DosageError::ExceedsCeiling { ceiling, .. })) => {
                let compound = Treatment::for_adjustment(parameter, direction_of(value, target))
                    .map(|t| t.compound)
                    .ok_or_else(|| PoolChemError::InvalidParameter(parameter.key().to_string()))?;
                Ok(describe(
                    compound,
                    ceiling,
                    " This is the single-dose limit; retest before adding more.",
                ))
            }
            Err(e) => Err(e),
        }
    }
}
