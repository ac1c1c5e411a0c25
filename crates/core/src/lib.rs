#![forbid(unsafe_code)]

pub mod error;
pub mod filter;
pub mod model;
pub mod navigator;
pub mod time;
pub mod validation;

pub use time::Clock;
