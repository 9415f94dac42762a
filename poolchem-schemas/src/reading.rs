use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A water parameter the engine knows how to measure and correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Ph,
    FreeChlorine,
    TotalChlorine,
    Alkalinity,
    Hardness,
    CyanuricAcid,
    Salt,
    Bromine,
}

impl Parameter {
    pub const ALL: [Parameter; 8] = [
        Parameter::Ph,
        Parameter::FreeChlorine,
        Parameter::TotalChlorine,
        Parameter::Alkalinity,
        Parameter::Hardness,
        Parameter::CyanuricAcid,
        Parameter::Salt,
        Parameter::Bromine,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            Parameter::FreeChlorine => "Free Chlorine",
            Parameter::TotalChlorine => "Total Chlorine",
            Parameter::Alkalinity => "Alkalinity",
            Parameter::Hardness => "Hardness",
            Parameter::CyanuricAcid => "Cyanuric Acid",
            Parameter::Salt => "Salt",
            Parameter::Bromine => "Bromine",
        }
    }

    /// Snake-case identifier used in files and CSV logs.
    pub fn key(&self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::FreeChlorine => "free_chlorine",
            Parameter::TotalChlorine => "total_chlorine",
            Parameter::Alkalinity => "alkalinity",
            Parameter::Hardness => "hardness",
            Parameter::CyanuricAcid => "cyanuric_acid",
            Parameter::Salt => "salt",
            Parameter::Bromine => "bromine",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            _ => "ppm",
        }
    }

    /// Largest value a plausible test kit can report for this parameter.
    pub fn sanity_max(&self) -> f64 {
        match self {
            Parameter::Ph => 14.0,
            Parameter::FreeChlorine | Parameter::TotalChlorine | Parameter::Bromine => 50.0,
            Parameter::Alkalinity => 1000.0,
            Parameter::Hardness => 2000.0,
            Parameter::CyanuricAcid => 500.0,
            Parameter::Salt => 10000.0,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returned when a name does not match any supported parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParameter(pub String);

impl fmt::Display for UnknownParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported parameter '{}'", self.0)
    }
}

impl std::error::Error for UnknownParameter {}

impl FromStr for Parameter {
    type Err = UnknownParameter;

    /// Accepts snake_case keys, display names and the aliases used by
    /// strip pads and older reading files. Matching ignores case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let parameter = match normalized.as_str() {
            "ph" => Parameter::Ph,
            "free_chlorine" | "chlorine" | "fc" => Parameter::FreeChlorine,
            "total_chlorine" | "tc" => Parameter::TotalChlorine,
            "alkalinity" | "total_alkalinity" | "ta" => Parameter::Alkalinity,
            "hardness" | "calcium" | "calcium_hardness" | "ch" => Parameter::Hardness,
            "cyanuric_acid" | "stabilizer" | "cya" => Parameter::CyanuricAcid,
            "salt" => Parameter::Salt,
            "bromine" | "total_bromine" => Parameter::Bromine,
            _ => return Err(UnknownParameter(s.to_string())),
        };
        Ok(parameter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterReading {
    pub parameter: Parameter,
    pub value: f64,
}

impl ParameterReading {
    pub fn new(parameter: Parameter, value: f64) -> Self {
        Self { parameter, value }
    }
}

/// One complete set of test results, keyed by parameter.
pub type Readings = BTreeMap<Parameter, f64>;
