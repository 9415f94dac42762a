pub mod analysis;
pub mod chemistry;
pub mod error;
pub mod logger;
pub mod plan;
pub mod safety;
pub mod strip;
pub mod weather;

pub use chemistry::builder::EngineBuilder;
pub use chemistry::engine::{ChemicalEngine, PoolView};
pub use error::{DosageError, PoolChemError};
pub use safety::SafetyLookup;
pub use strip::StripInterpolator;
