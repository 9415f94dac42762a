use crate::reading::Parameter;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
    None,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Increase => "increase",
            Direction::Decrease => "decrease",
            Direction::None => "none",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChemicalStatus {
    VeryLow,
    Low,
    Ideal,
    High,
    VeryHigh,
}

impl ChemicalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ChemicalStatus::VeryLow => "VERY_LOW",
            ChemicalStatus::Low => "LOW",
            ChemicalStatus::Ideal => "IDEAL",
            ChemicalStatus::High => "HIGH",
            ChemicalStatus::VeryHigh => "VERY_HIGH",
        }
    }
}

impl fmt::Display for ChemicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// A treatment product (or procedure) used to move a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compound {
    SodaAsh,
    MuriaticAcid,
    LiquidChlorine,
    ShockTreatment,
    SodiumThiosulfate,
    BakingSoda,
    CalciumChloride,
    Stabilizer,
    PoolSalt,
    BromineTablets,
    PartialWaterChange,
}

impl Compound {
    pub fn display_name(&self) -> &'static str {
        match self {
            Compound::SodaAsh => "Soda Ash",
            Compound::MuriaticAcid => "Muriatic Acid",
            Compound::LiquidChlorine => "Liquid Chlorine",
            Compound::ShockTreatment => "Shock Treatment",
            Compound::SodiumThiosulfate => "Sodium Thiosulfate",
            Compound::BakingSoda => "Baking Soda",
            Compound::CalciumChloride => "Calcium Chloride",
            Compound::Stabilizer => "Stabilizer",
            Compound::PoolSalt => "Pool Salt",
            Compound::BromineTablets => "Bromine Tablets",
            Compound::PartialWaterChange => "Partial Water Change",
        }
    }

    /// Unit the dosage amount is expressed in.
    pub fn unit(&self) -> &'static str {
        match self {
            Compound::MuriaticAcid | Compound::LiquidChlorine => "fl oz",
            Compound::SodaAsh
            | Compound::ShockTreatment
            | Compound::SodiumThiosulfate
            | Compound::BromineTablets => "oz",
            Compound::BakingSoda
            | Compound::CalciumChloride
            | Compound::Stabilizer
            | Compound::PoolSalt => "lbs",
            Compound::PartialWaterChange => "%",
        }
    }

    /// Identifier of the matching record in the chemical safety store.
    pub fn safety_id(&self) -> Option<&'static str> {
        match self {
            Compound::SodaAsh => Some("soda_ash"),
            Compound::MuriaticAcid => Some("muriatic_acid"),
            Compound::LiquidChlorine => Some("chlorine"),
            Compound::ShockTreatment => Some("calcium_hypochlorite"),
            Compound::SodiumThiosulfate => Some("sodium_thiosulfate"),
            Compound::BakingSoda => Some("sodium_bicarbonate"),
            Compound::CalciumChloride => Some("calcium_chloride"),
            Compound::Stabilizer => Some("cyanuric_acid"),
            Compound::PoolSalt => Some("sodium_chloride"),
            Compound::BromineTablets => Some("bromine"),
            Compound::PartialWaterChange => None,
        }
    }

    /// Hours to circulate before the next addition.
    pub fn wait_hours(&self) -> u32 {
        match self {
            Compound::BakingSoda | Compound::CalciumChloride => 6,
            Compound::Stabilizer | Compound::PoolSalt => 24,
            Compound::PartialWaterChange => 0,
            _ => 4,
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The correction computed for one parameter of one reading set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalAdjustment {
    pub parameter: Parameter,
    pub direction: Direction,
    pub compound: Option<Compound>,
    pub compound_name: String,
    pub amount: f64,
    pub unit: String,
    pub safety_notes: String,
    pub priority: u8,
    /// Set when the amount was reduced to the configured ceiling.
    #[serde(default)]
    pub capped: bool,
}

impl ChemicalAdjustment {
    /// An adjustment that requires no action.
    pub fn none(parameter: Parameter, priority: u8) -> Self {
        Self {
            parameter,
            direction: Direction::None,
            compound: None,
            compound_name: String::new(),
            amount: 0.0,
            unit: parameter.unit().to_string(),
            safety_notes: String::new(),
            priority,
            capped: false,
        }
    }

    pub fn is_action_required(&self) -> bool {
        self.direction != Direction::None && self.amount > 0.0
    }
}
