//! ASIC Common Library
//!
//! Shared constants, device types and configuration loading for the
//! ASIC coordinator workspace.
//!
//! # Module Structure
//!
//! - [`device`] - Axis, register and transport definitions
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use asic_common::prelude::*;
//!
//! let axis = AxisId::new(2).unwrap();
//! assert_eq!(axis.index(), 2);
//! ```

pub mod config;
pub mod device;
pub mod prelude;
