pub mod balance;
pub mod builder;
pub mod dosage;
pub mod engine;
pub mod ranges;
pub mod warnings;
