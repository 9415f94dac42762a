use poolchem_schemas::{reading::UnknownParameter, pool::UnknownPoolType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolChemError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown parameter or chemical '{0}'")]
    InvalidParameter(String),

    #[error(transparent)]
    Dosage(#[from] DosageError),

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}

/// A numeric precondition of a dosage calculation was violated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DosageError {
    #[error("Pool volume must be positive, got {0} gallons")]
    NonPositiveVolume(f64),

    #[error("Amount needed must be positive, got {0}")]
    NonPositiveAmount(f64),

    #[error("{compound} dose of {amount:.1} {unit} exceeds the ceiling of {ceiling:.1} {unit}")]
    ExceedsCeiling {
        compound: String,
        amount: f64,
        ceiling: f64,
        unit: String,
    },
}

impl From<UnknownParameter> for PoolChemError {
    fn from(err: UnknownParameter) -> Self {
        PoolChemError::InvalidParameter(err.0)
    }
}

impl From<UnknownPoolType> for PoolChemError {
    fn from(err: UnknownPoolType) -> Self {
        PoolChemError::Validation(err.to_string())
    }
}
