use crate::chemistry::engine::Assessment;
use chrono::{DateTime, Utc};
use csv::{Writer, WriterBuilder};
use poolchem_schemas::{
    adjustment::{ChemicalStatus, Compound, Direction},
    reading::Parameter,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;

/// One row of the treatment history CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// RFC 3339 time of the test.
    pub timestamp: String,
    pub pool: String,
    pub parameter: Parameter,
    pub value: f64,
    pub status: ChemicalStatus,
    pub direction: Direction,
    pub compound: Option<Compound>,
    pub amount: f64,
    pub unit: String,
    pub priority: u8,
    pub lsi: Option<f64>,
}

/// Appends assessments to a CSV history file, one row per parameter.
pub struct TreatmentLogger {
    writer: Writer<fs::File>,
}

impl TreatmentLogger {
    /// Opens `path` for appending; the header row is written only when the
    /// file is new or empty.
    pub fn new(path: &str) -> Result<Self, io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let write_headers = file.metadata()?.len() == 0;
        let writer = WriterBuilder::new().has_headers(write_headers).from_writer(file);
        Ok(Self { writer })
    }

    pub fn log_assessment(&mut self, assessment: &Assessment, timestamp: DateTime<Utc>) -> Result<(), anyhow::Error> {
        let timestamp = timestamp.to_rfc3339();
        let lsi = assessment.balance.map(|b| b.lsi);

        for assessed in &assessment.parameters {
            let adjustment = &assessed.adjustment;
            let entry = HistoryEntry {
                timestamp: timestamp.clone(),
                pool: assessment.pool.clone(),
                parameter: assessed.parameter,
                value: assessed.value,
                status: assessed.status,
                direction: adjustment.direction,
                compound: adjustment.compound,
                amount: adjustment.amount,
                unit: adjustment.unit.clone(),
                priority: adjustment.priority,
                lsi,
            };
            self.writer.serialize(entry)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineBuilder;
    use poolchem_schemas::{
        pool::{PoolProfile, SanitizerType, SurfaceType},
        reading::Readings,
    };

    #[test]
    fn header_is_written_once_across_appends() {
        let engine = EngineBuilder::new().build().unwrap();
        let pool = PoolProfile::new("Backyard", 10000.0, SurfaceType::Concrete, SanitizerType::Chlorine);
        let assessment = engine
            .pool(&pool)
            .assess(&Readings::from([(Parameter::Ph, 7.0), (Parameter::FreeChlorine, 2.0)]), None)
            .unwrap();

        let path = std::env::temp_dir().join(format!("poolchem-logger-{}.csv", std::process::id()));
        let path = path.to_string_lossy().to_string();
        fs::remove_file(&path).ok();
        for _ in 0..2 {
            TreatmentLogger::new(&path)
                .unwrap()
                .log_assessment(&assessment, Utc::now())
                .unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("timestamp,pool,parameter"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("timestamp")).count(), 1);
    }
}
