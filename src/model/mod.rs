//! Core data model
//!
//! Entities that live for exactly one analysis run: bidders and their
//! contact fields, risk signals, and the shared pipeline state.

pub mod bidder;
pub mod signal;
pub mod state;

pub use bidder::{Bidder, ContactField, ContactInfo};
pub use signal::{RiskSignal, Severity, SignalType};
pub use state::{AnalysisRequest, AnalysisState};
