//! ASIC device definitions.
//!
//! Constants, data types, the register transport contract and the
//! configuration of the two device tasks.

pub mod config;
pub mod consts;
pub mod transport;
pub mod types;
