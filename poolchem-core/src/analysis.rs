use crate::{
    chemistry::{
        engine::PoolView,
        ranges::{classify, IdealRange},
    },
    error::PoolChemError,
    logger::HistoryEntry,
};
use chrono::{DateTime, Utc};
use poolchem_schemas::reading::{Parameter, Readings};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Percent change between first and last sample that counts as a trend.
const TREND_THRESHOLD_PCT: f64 = 5.0;

pub fn load_history(log_path: &str) -> Result<Vec<HistoryEntry>, PoolChemError> {
    let mut reader = csv::Reader::from_path(log_path)
        .map_err(|e| PoolChemError::CsvError(log_path.to_string(), e))?;
    let mut entries = Vec::new();
    for result in reader.deserialize() {
        let entry: HistoryEntry = result.map_err(|e| PoolChemError::CsvError(log_path.to_string(), e))?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Groups history rows into time-ordered series per parameter, optionally
/// restricted to one pool.
pub fn history_series(
    entries: &[HistoryEntry],
    pool: Option<&str>,
) -> Result<BTreeMap<Parameter, Vec<(DateTime<Utc>, f64)>>, PoolChemError> {
    let mut series: BTreeMap<Parameter, Vec<(DateTime<Utc>, f64)>> = BTreeMap::new();
    for entry in entries {
        if pool.map_or(false, |p| p != entry.pool) {
            continue;
        }
        let timestamp = DateTime::parse_from_rfc3339(&entry.timestamp)
            .map_err(|e| PoolChemError::Validation(format!("bad timestamp '{}': {}", entry.timestamp, e)))?
            .with_timezone(&Utc);
        series.entry(entry.parameter).or_default().push((timestamp, entry.value));
    }
    for samples in series.values_mut() {
        samples.sort_by_key(|(t, _)| *t);
    }
    Ok(series)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Trend {
    pub parameter: Parameter,
    pub direction: TrendDirection,
    pub percent_change: f64,
    /// Population standard deviation of the samples.
    pub volatility: f64,
    pub latest: f64,
    pub recommendation: String,
}

pub fn analyze_trend(parameter: Parameter, values: &[f64], range: &IdealRange) -> Result<Trend, PoolChemError> {
    let (Some(&first), Some(&latest)) = (values.first(), values.last()) else {
        return Err(PoolChemError::InsufficientData(format!("no history for {}", parameter)));
    };
    if values.len() < 2 {
        return Err(PoolChemError::InsufficientData(format!(
            "need at least two {} readings to find a trend",
            parameter
        )));
    }

    let percent_change = if first == 0.0 {
        if latest > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (latest - first) / first * 100.0
    };
    let direction = if percent_change > TREND_THRESHOLD_PCT {
        TrendDirection::Increasing
    } else if percent_change < -TREND_THRESHOLD_PCT {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let volatility = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

    let name = parameter.display_name();
    let recommendation = if latest < range.min {
        match direction {
            TrendDirection::Increasing => format!("{} is low but rising; continue treatment and retest.", name),
            _ => format!("{} is low and not recovering; add treatment.", name),
        }
    } else if latest > range.max {
        match direction {
            TrendDirection::Decreasing => format!("{} is high but falling; let it settle before treating.", name),
            _ => format!("{} is high and not falling; take corrective action.", name),
        }
    } else if volatility > (range.max - range.min) / 2.0 {
        format!("{} is in range but fluctuating; test more often.", name)
    } else {
        format!("{} is stable within range.", name)
    };

    Ok(Trend {
        parameter,
        direction,
        percent_change,
        volatility,
        latest,
        recommendation,
    })
}

/// Overall water quality from 0 to 100.
///
/// Each out-of-range parameter costs 20 points per 100% of deviation. A
/// reading set without pH, free chlorine and alkalinity scores 0.
pub fn balance_score(view: &PoolView<'_>, readings: &Readings) -> f64 {
    let required = [Parameter::Ph, Parameter::FreeChlorine, Parameter::Alkalinity];
    if required.iter().any(|p| !readings.contains_key(p)) {
        return 0.0;
    }

    let mut score = 100.0;
    for (&parameter, &value) in readings {
        if let Ok(range) = view.ideal_range(parameter) {
            score -= classify(value, &range).deviation_pct / 100.0 * 20.0;
        }
    }
    (score.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chemistry::builder::EngineBuilder, logger::TreatmentLogger};
    use chrono::TimeZone;
    use poolchem_schemas::{
        adjustment::ChemicalStatus,
        pool::{PoolProfile, SanitizerType, SurfaceType},
    };

    fn pool() -> PoolProfile {
        PoolProfile::new("Backyard", 10000.0, SurfaceType::Concrete, SanitizerType::Chlorine)
    }

    fn range(min: f64, max: f64) -> IdealRange {
        IdealRange { min, max }
    }

    // --- trends

    #[test]
    fn single_sample_is_not_enough() {
        let err = analyze_trend(Parameter::Ph, &[7.4], &range(7.2, 7.8)).unwrap_err();
        assert!(matches!(err, PoolChemError::InsufficientData(_)));
        assert!(analyze_trend(Parameter::Ph, &[], &range(7.2, 7.8)).is_err());
    }

    #[test]
    fn falling_chlorine_below_range() {
        let trend = analyze_trend(Parameter::FreeChlorine, &[2.0, 1.5, 0.8], &range(1.0, 3.0)).unwrap();
        assert_eq!(trend.direction, TrendDirection::Decreasing);
        assert!((trend.percent_change - -60.0).abs() < 1e-9);
        assert!(trend.recommendation.contains("not recovering"));
    }

    #[test]
    fn small_changes_are_stable() {
        let trend = analyze_trend(Parameter::Ph, &[7.4, 7.5, 7.45], &range(7.2, 7.8)).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.recommendation, "pH is stable within range.");
    }

    #[test]
    fn volatility_is_population_std_dev() {
        let trend = analyze_trend(Parameter::Alkalinity, &[80.0, 120.0], &range(80.0, 120.0)).unwrap();
        assert!((trend.volatility - 20.0).abs() < 1e-9);
        assert_eq!(trend.direction, TrendDirection::Increasing);
    }

    // --- score

    #[test]
    fn perfect_water_scores_100() {
        let engine = EngineBuilder::new().build().unwrap();
        let pool = pool();
        let readings = Readings::from([
            (Parameter::Ph, 7.5),
            (Parameter::FreeChlorine, 2.0),
            (Parameter::Alkalinity, 100.0),
        ]);
        assert_eq!(balance_score(&engine.pool(&pool), &readings), 100.0);
    }

    #[test]
    fn deviations_cost_points() {
        let engine = EngineBuilder::new().build().unwrap();
        let pool = pool();
        // Chlorine at 0.5 is 50% below its minimum: -10 points.
        let readings = Readings::from([
            (Parameter::Ph, 7.5),
            (Parameter::FreeChlorine, 0.5),
            (Parameter::Alkalinity, 100.0),
        ]);
        assert_eq!(balance_score(&engine.pool(&pool), &readings), 90.0);
    }

    #[test]
    fn missing_core_readings_score_zero() {
        let engine = EngineBuilder::new().build().unwrap();
        let pool = pool();
        let readings = Readings::from([(Parameter::Ph, 7.5)]);
        assert_eq!(balance_score(&engine.pool(&pool), &readings), 0.0);
    }

    // --- history

    #[test]
    fn logged_assessments_read_back_as_series() {
        let engine = EngineBuilder::new().build().unwrap();
        let pool = pool();
        let path = std::env::temp_dir().join(format!("poolchem-history-{}.csv", std::process::id()));
        let path = path.to_string_lossy().to_string();
        std::fs::remove_file(&path).ok();

        let first = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
        let early = engine
            .pool(&pool)
            .assess(&Readings::from([(Parameter::Ph, 7.0), (Parameter::Hardness, 250.0)]), None)
            .unwrap();
        let late = engine
            .pool(&pool)
            .assess(&Readings::from([(Parameter::Ph, 7.4)]), None)
            .unwrap();

        // Written out of order and from two logger instances to exercise
        // appending and sorting.
        TreatmentLogger::new(&path).unwrap().log_assessment(&late, second).unwrap();
        TreatmentLogger::new(&path).unwrap().log_assessment(&early, first).unwrap();

        let entries = load_history(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].status, ChemicalStatus::Low);
        assert!(entries[2].compound.is_none());

        let series = history_series(&entries, Some("Backyard")).unwrap();
        let ph: Vec<f64> = series[&Parameter::Ph].iter().map(|(_, v)| *v).collect();
        assert_eq!(ph, vec![7.0, 7.4]);
        assert!(history_series(&entries, Some("Other")).unwrap().is_empty());
    }

    #[test]
    fn missing_history_is_a_csv_error() {
        let err = load_history("/nonexistent/poolchem/history.csv").unwrap_err();
        assert!(matches!(err, PoolChemError::CsvError(_, _)));
    }
}
