// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::config::Error;

/// Closed range `[min, max]` reported by the device for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    /// Smallest accepted value
    pub min: T,
    /// Largest accepted value
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Range from `min` to `max`, both inclusive.
    pub const fn new(min: T, max: T) -> Self {
        Bounds { min, max }
    }

    /// True when `value` lies inside the closed range. Unordered values
    /// such as NaN are never contained.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

impl<T: fmt::Display> fmt::Display for Bounds<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Per-field limits reported by the device. Every configuration must be
/// validated against these before it is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigLimits {
    /// Transmit power level of each pulse
    pub tx_power_level: Bounds<u16>,
    /// Samples per pulse configuration in a frame
    pub num_samples: Bounds<u16>,
    /// Pulse repetition time in seconds
    pub pulse_repetition_time_s: Bounds<f32>,
    /// Frame repetition time in seconds
    pub frame_repetition_time_s: Bounds<f32>,
    /// RF center frequency in Hz
    pub rf_center_frequency_hz: Bounds<u64>,
    /// AFC measurement duration, counter ticks
    pub afc_duration_ct: Bounds<u16>,
    /// AFC coarse threshold
    pub afc_threshold_course: Bounds<u16>,
    /// AFC fine threshold
    pub afc_threshold_fine: Bounds<u16>,
    /// System clock in Hz
    pub system_clock_hz: Bounds<u32>,
}

impl Default for ConfigLimits {
    /// Limits reported by a BGT24ATR22 with firmware defaults.
    fn default() -> Self {
        ConfigLimits {
            tx_power_level: Bounds::new(0, 31),
            num_samples: Bounds::new(8, 2048),
            pulse_repetition_time_s: Bounds::new(100e-6, 1.0),
            frame_repetition_time_s: Bounds::new(1e-3, 100.0),
            rf_center_frequency_hz: Bounds::new(24_025_000_000, 24_225_000_000),
            afc_duration_ct: Bounds::new(1, 1023),
            afc_threshold_course: Bounds::new(0, 511),
            afc_threshold_fine: Bounds::new(0, 511),
            system_clock_hz: Bounds::new(10_000_000, 40_000_000),
        }
    }
}

impl ConfigLimits {
    /// Reads limits from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes limits to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
