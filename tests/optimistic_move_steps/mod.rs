//! Step definitions for optimistic move scenarios.

pub mod given;
pub mod then;
pub mod world;
