//! Password quality rules and generation.
//!
//! - `StrengthPolicy` decides whether a password is acceptable (`strength`)
//! - `PasswordGenerator` produces passwords that pass it (`generator`)

pub mod generator;
pub mod strength;

pub use generator::PasswordGenerator;
pub use strength::{Strength, StrengthPolicy, Weakness};
