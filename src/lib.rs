//! FinBot
//!
//! A conversational finance assistant that:
//! - Answers EMI / SIP questions with deterministic calculators
//! - Looks up stock prices for a fixed directory of companies
//! - Falls back to a generative model for open-ended questions
//!
//! ROUTING ORDER:
//! CALCULATOR → STOCK LOOKUP → ADVICE

pub mod advice;
pub mod api;
pub mod calculator;
pub mod config;
pub mod error;
pub mod gemini;
pub mod market;
pub mod models;
pub mod router;
pub mod stock;
pub mod symbols;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use config::Settings;
pub use router::MessageRouter;
