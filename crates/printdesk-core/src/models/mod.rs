//! Data models for print orders and quotes.

pub mod config;
pub mod document;
pub mod printout;
pub mod quote;
