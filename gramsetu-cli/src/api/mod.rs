//! GramSetu backend API surface

pub mod client;

pub use client::{GramsetuClient, ResidentBackend, SignupOutcome};
