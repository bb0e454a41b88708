//! Scan simulation, synthetic data and report logic

pub mod generator;
pub mod simulator;
pub mod driver;
pub mod auth_gate;
pub mod narrative;
pub mod markdown;
pub mod export;

pub use driver::{ScanDriver, ScanTimings};
pub use simulator::{ScanError, ScanSimulator};
pub use auth_gate::{AuthGate, AuthGateError, AuthenticatedUser};
pub use narrative::{GeminiNarrative, Narrative, NarrativeError, NarrativeService};
