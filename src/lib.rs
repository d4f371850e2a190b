// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Mimose Library
//!
//! This library composes, validates and applies the configuration of an
//! Infineon Mimose 24 GHz pulsed radar front-end (BGT24ATR22) and interprets
//! the metadata the device attaches to each captured frame.
//!
//! # Features
//!
//! - **Configuration** - Pulse, frame, clock and AFC settings with JSON I/O
//! - **Validation** - Field-level checks against device reported limits
//! - **Calibration** - Gain and offset correction driven by frame metadata
//! - **Simulation** - Deterministic in-process device for testing
//!
//! # Example
//!
//! ```
//! use mimose::{config::DeviceConfig, limits::ConfigLimits, validate::validate};
//!
//! let mut config = DeviceConfig::default();
//! config.pulse_config[0].tx_power_level = 40;
//!
//! let violations = validate(&config, &ConfigLimits::default()).unwrap_err();
//! assert_eq!(violations.len(), 1);
//! ```

#![warn(missing_docs)]

/// Pulse, frame, clock and AFC configuration records
pub mod config;

/// Device seam and simulated device
pub mod device;

/// Limits reported by the device
pub mod limits;

/// Frame metadata interpretation and calibration
pub mod metadata;

/// Register-level enumerations
pub mod types;

/// Validation of configurations against limits
pub mod validate;
