//! Simulation transport module.
//!
//! Software register file for development and testing without a physical
//! ASIC.

mod asic;

pub use asic::{RegisterOp, SimulatedAsic};

use asic_common::device::config::AsicConfig;
use asic_common::device::transport::RegisterTransport;

/// Factory function to create a simulation transport instance.
pub fn create_transport(config: &AsicConfig) -> Box<dyn RegisterTransport> {
    Box::new(SimulatedAsic::from_config(&config.simulation))
}
