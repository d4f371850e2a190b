// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{f32::consts::PI, fmt};

use log::{debug, info, trace};
use num::Complex;

use crate::{
    config::DeviceConfig,
    limits::ConfigLimits,
    metadata::{self, Frame, Metadata, OffsetPolicy, PulseSamples, SensorInfo},
    types::{AbbGain, NUM_FRAME_CONFIGS, NUM_PULSE_CONFIGS},
    validate::{validate, ValidatedConfig, Violations},
};

/// Device access errors.
#[derive(Debug)]
pub enum Error {
    /// Frames were requested before a configuration was sent
    NotConfigured,
    /// The configuration violates this device's own limits
    Rejected(Violations),
    /// Frame metadata could not be interpreted
    Metadata(metadata::Error),
    /// Frame configuration index out of range
    InvalidFrameConfig(usize),
}

impl std::error::Error for Error {}

impl From<Violations> for Error {
    fn from(violations: Violations) -> Error {
        Error::Rejected(violations)
    }
}

impl From<metadata::Error> for Error {
    fn from(err: metadata::Error) -> Error {
        Error::Metadata(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NotConfigured => write!(f, "device not configured"),
            Error::Rejected(violations) => write!(f, "configuration rejected: {}", violations),
            Error::Metadata(err) => write!(f, "metadata error: {}", err),
            Error::InvalidFrameConfig(index) => write!(f, "invalid frame config: {}", index),
        }
    }
}

/// A Mimose front-end the host can configure and capture frames from.
pub trait Device {
    /// Limits the device reports for every configuration field.
    fn config_limits(&self) -> ConfigLimits;

    /// Sends a validated configuration to the device.
    fn set_config(&mut self, config: &ValidatedConfig) -> Result<(), Error>;

    /// The configuration currently active on the device.
    fn config(&self) -> Option<&DeviceConfig>;

    /// Reads the measured RF frequency and temperature.
    fn sensor_info(&mut self) -> Result<SensorInfo, Error>;

    /// Captures the next frame of the active frame configuration.
    fn next_frame(&mut self) -> Result<Frame, Error>;
}

/// Gain step the simulated device settles on in automatic gain mode.
pub const SIMULATED_AUTOMATIC_GAIN: AbbGain = AbbGain::Gain24;

/// DC offset the simulated baseband adds to I and Q, ADC counts.
pub const SIMULATED_DC_OFFSET: i16 = 37;

/// Die temperature the simulated device reports.
pub const SIMULATED_TEMPERATURE: f32 = 25.0;

/// In-process device producing deterministic frames.
///
/// Every pulse configuration sees a unit amplitude tone at an eighth of the
/// pulse sample rate, amplified by the applied gain step, plus a DC offset
/// that is left in the data only when the host is expected to remove it.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    limits: ConfigLimits,
    config: Option<DeviceConfig>,
    active_frame: usize,
    frame_counter: u64,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        SimulatedDevice::new(ConfigLimits::default())
    }
}

impl SimulatedDevice {
    /// Unconfigured device reporting `limits`.
    pub fn new(limits: ConfigLimits) -> Self {
        SimulatedDevice {
            limits,
            config: None,
            active_frame: 0,
            frame_counter: 0,
        }
    }

    /// Selects which frame configuration `next_frame` captures.
    pub fn set_active_frame(&mut self, index: usize) -> Result<(), Error> {
        if index >= NUM_FRAME_CONFIGS {
            return Err(Error::InvalidFrameConfig(index));
        }
        self.active_frame = index;
        Ok(())
    }

    /// Number of frames captured since the last configuration.
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    fn applied_gain(gain: AbbGain) -> AbbGain {
        match gain {
            AbbGain::Automatic => SIMULATED_AUTOMATIC_GAIN,
            fixed => fixed,
        }
    }
}

impl Device for SimulatedDevice {
    fn config_limits(&self) -> ConfigLimits {
        self.limits.clone()
    }

    fn set_config(&mut self, config: &ValidatedConfig) -> Result<(), Error> {
        // The caller may have validated against a different set of limits.
        validate(config, &self.limits)?;
        debug!("simulated device accepted configuration");
        self.config = Some(DeviceConfig::clone(config));
        self.frame_counter = 0;
        Ok(())
    }

    fn config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref()
    }

    fn sensor_info(&mut self) -> Result<SensorInfo, Error> {
        let config = self.config.as_ref().ok_or(Error::NotConfigured)?;
        Ok(SensorInfo {
            rf_frequency_hz: config.afc_config.rf_center_frequency_hz,
            temperature: SIMULATED_TEMPERATURE,
        })
    }

    fn next_frame(&mut self) -> Result<Frame, Error> {
        let config = self.config.as_ref().ok_or(Error::NotConfigured)?;
        let frame_config = &config.frame_config[self.active_frame];

        // Metadata is reported as raw register values, like a real device.
        let mut raw_gains = [0u32; NUM_PULSE_CONFIGS];
        for (raw, pulse) in raw_gains.iter_mut().zip(&config.pulse_config) {
            *raw = SimulatedDevice::applied_gain(pulse.abb_gain_type) as u32;
        }
        let metadata = Metadata::from_raw(raw_gains, [SIMULATED_DC_OFFSET; NUM_PULSE_CONFIGS])?;

        let pulses = frame_config
            .selected()
            .map(|index| {
                let pulse = &config.pulse_config[index];
                let gain = metadata.abb_gains[index].factor().unwrap_or(1.0);
                let offset = match pulse.aoc_mode.offset_policy() {
                    OffsetPolicy::HostCompensates => SIMULATED_DC_OFFSET as f32,
                    OffsetPolicy::AlreadyApplied | OffsetPolicy::DeviceManaged => 0.0,
                };
                let samples = (0..frame_config.num_samples)
                    .map(|n| {
                        let phase = 2.0 * PI * n as f32 / 8.0;
                        Complex::from_polar(gain, phase) + Complex::new(offset, offset)
                    })
                    .collect();
                PulseSamples {
                    pulse: index,
                    samples,
                }
            })
            .collect::<Vec<_>>();

        self.frame_counter += 1;
        trace!(
            "simulated frame {} with {} pulses",
            self.frame_counter,
            pulses.len()
        );
        if self.frame_counter == 1 {
            info!(
                "first frame captured from frame config {}",
                self.active_frame
            );
        }

        Ok(Frame { pulses, metadata })
    }
}
