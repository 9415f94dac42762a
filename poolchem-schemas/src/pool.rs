use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    Concrete,
    Vinyl,
    Fiberglass,
    AboveGroundMetal,
    AboveGroundResin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizerType {
    Chlorine,
    SaltWater,
    Bromine,
}

/// The physical and chemical description of one pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolProfile {
    pub name: String,
    pub volume_gallons: f64,
    pub surface_type: SurfaceType,
    pub sanitizer_type: SanitizerType,
}

impl PoolProfile {
    pub fn new(
        name: impl Into<String>,
        volume_gallons: f64,
        surface_type: SurfaceType,
        sanitizer_type: SanitizerType,
    ) -> Self {
        Self {
            name: name.into(),
            volume_gallons,
            surface_type,
            sanitizer_type,
        }
    }
}

/// Pool categories offered to users when they describe their pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolType {
    ChlorinePool,
    SaltWaterPool,
    BrominePool,
    ConcreteGunite,
    VinylLiner,
    Fiberglass,
    AboveGroundMetalWall,
    AboveGroundResin,
    InfinityPool,
    LapPool,
    IndoorPool,
}

impl PoolType {
    pub const ALL: [PoolType; 11] = [
        PoolType::ChlorinePool,
        PoolType::SaltWaterPool,
        PoolType::BrominePool,
        PoolType::ConcreteGunite,
        PoolType::VinylLiner,
        PoolType::Fiberglass,
        PoolType::AboveGroundMetalWall,
        PoolType::AboveGroundResin,
        PoolType::InfinityPool,
        PoolType::LapPool,
        PoolType::IndoorPool,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PoolType::ChlorinePool => "Chlorine Pool",
            PoolType::SaltWaterPool => "Salt Water Pool",
            PoolType::BrominePool => "Bromine Pool",
            PoolType::ConcreteGunite => "Concrete/Gunite",
            PoolType::VinylLiner => "Vinyl Liner",
            PoolType::Fiberglass => "Fiberglass",
            PoolType::AboveGroundMetalWall => "Above Ground - Metal Wall",
            PoolType::AboveGroundResin => "Above Ground - Resin",
            PoolType::InfinityPool => "Infinity Pool",
            PoolType::LapPool => "Lap Pool",
            PoolType::IndoorPool => "Indoor Pool",
        }
    }

    /// Returns a copy of `profile` with the sanitizer or surface implied by
    /// this pool type. Types that imply neither leave the profile unchanged.
    pub fn apply_to(&self, profile: &PoolProfile) -> PoolProfile {
        let mut applied = profile.clone();
        match self {
            PoolType::ChlorinePool => applied.sanitizer_type = SanitizerType::Chlorine,
            PoolType::SaltWaterPool => applied.sanitizer_type = SanitizerType::SaltWater,
            PoolType::BrominePool => applied.sanitizer_type = SanitizerType::Bromine,
            PoolType::ConcreteGunite => applied.surface_type = SurfaceType::Concrete,
            PoolType::VinylLiner => applied.surface_type = SurfaceType::Vinyl,
            PoolType::Fiberglass => applied.surface_type = SurfaceType::Fiberglass,
            PoolType::AboveGroundMetalWall => applied.surface_type = SurfaceType::AboveGroundMetal,
            PoolType::AboveGroundResin => applied.surface_type = SurfaceType::AboveGroundResin,
            PoolType::InfinityPool | PoolType::LapPool | PoolType::IndoorPool => {}
        }
        applied
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPoolType(pub String);

impl fmt::Display for UnknownPoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pool type '{}'", self.0)
    }
}

impl std::error::Error for UnknownPoolType {}

impl FromStr for PoolType {
    type Err = UnknownPoolType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PoolType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPoolType(s.to_string()))
    }
}
