pub mod config;
pub mod daq;
pub mod plan;
