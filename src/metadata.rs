// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Interpretation of the metadata the device attaches to every frame.
//!
//! The device reports the gain step it actually used and the offset tracked
//! by automatic offset control for each pulse configuration. Whether that
//! offset still has to be removed from the samples depends on the
//! [`AocMode`] of the pulse configuration.

use std::fmt;

use log::trace;
use num::Complex;

use crate::{
    config::{DeviceConfig, PulseConfig},
    types::{self, AbbGain, AocMode, NUM_PULSE_CONFIGS},
};

/// Metadata interpretation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Metadata reported automatic gain instead of the applied step
    AutomaticGain {
        /// Index of the offending pulse configuration
        pulse: usize,
    },
    /// Raw metadata carried an unknown discriminant
    InvalidValue(types::Error),
    /// Samples refer to a pulse configuration that does not exist
    InvalidPulse(usize),
}

impl std::error::Error for Error {}

impl From<types::Error> for Error {
    fn from(err: types::Error) -> Error {
        Error::InvalidValue(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::AutomaticGain { pulse } => {
                write!(f, "metadata for pulse {} reports automatic gain", pulse)
            }
            Error::InvalidValue(err) => write!(f, "invalid metadata: {}", err),
            Error::InvalidPulse(pulse) => write!(f, "invalid pulse configuration: {}", pulse),
        }
    }
}

/// Per-frame values produced by the device after capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Gain step applied to each pulse configuration
    pub abb_gains: [AbbGain; NUM_PULSE_CONFIGS],
    /// Offset tracked for each pulse configuration, ADC counts
    pub aoc_offsets: [i16; NUM_PULSE_CONFIGS],
}

impl Metadata {
    /// Builds metadata from the raw gain discriminants read from the device.
    pub fn from_raw(
        abb_gains: [u32; NUM_PULSE_CONFIGS],
        aoc_offsets: [i16; NUM_PULSE_CONFIGS],
    ) -> Result<Self, Error> {
        let mut gains = [AbbGain::Automatic; NUM_PULSE_CONFIGS];
        for (gain, raw) in gains.iter_mut().zip(abb_gains) {
            *gain = AbbGain::try_from(raw)?;
        }
        Ok(Metadata {
            abb_gains: gains,
            aoc_offsets,
        })
    }
}

/// Sensor values read alongside the frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorInfo {
    /// Measured RF frequency after frequency control
    pub rf_frequency_hz: u64,
    /// Die temperature in degrees Celsius
    pub temperature: f32,
}

impl fmt::Display for SensorInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "rf_frequency={} Hz temperature={:.1} C",
            self.rf_frequency_hz, self.temperature
        )
    }
}

/// Who removes the tracked offset from the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetPolicy {
    /// Offset is already compensated in the data
    AlreadyApplied,
    /// Offset is only tracked, the host subtracts it
    HostCompensates,
    /// The device state machine handles the offset, metadata is
    /// informational only
    DeviceManaged,
}

impl AocMode {
    /// Who removes the tracked offset under this mode.
    pub fn offset_policy(&self) -> OffsetPolicy {
        match self {
            AocMode::OffsetApplied => OffsetPolicy::AlreadyApplied,
            AocMode::OffsetTracked => OffsetPolicy::HostCompensates,
            AocMode::FsmHandled2 | AocMode::FsmHandled3 => OffsetPolicy::DeviceManaged,
        }
    }
}

/// Correction applied to the samples of one pulse configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Linear gain divided out of every sample
    pub gain: f32,
    /// Offset subtracted from I and Q, zero unless the host compensates
    pub offset: f32,
    /// Offset handling the correction was derived from
    pub policy: OffsetPolicy,
}

impl Calibration {
    /// Calibration for `pulse` given the gain and offset the device
    /// reported for it.
    pub fn new(
        index: usize,
        pulse: &PulseConfig,
        applied_gain: AbbGain,
        tracked_offset: i16,
    ) -> Result<Self, Error> {
        let gain = applied_gain
            .factor()
            .ok_or(Error::AutomaticGain { pulse: index })?;
        let policy = pulse.aoc_mode.offset_policy();
        let offset = match policy {
            OffsetPolicy::HostCompensates => tracked_offset as f32,
            OffsetPolicy::AlreadyApplied | OffsetPolicy::DeviceManaged => 0.0,
        };
        trace!(
            "pulse {} calibration gain={} offset={} policy={:?}",
            index,
            gain,
            offset,
            policy
        );
        Ok(Calibration {
            gain,
            offset,
            policy,
        })
    }

    /// Calibration of pulse configuration `index` from one frame's metadata.
    pub fn from_metadata(
        config: &DeviceConfig,
        metadata: &Metadata,
        index: usize,
    ) -> Result<Self, Error> {
        let pulse = config
            .pulse_config
            .get(index)
            .ok_or(Error::InvalidPulse(index))?;
        Calibration::new(
            index,
            pulse,
            metadata.abb_gains[index],
            metadata.aoc_offsets[index],
        )
    }

    /// Removes the offset then divides out the gain, in place.
    pub fn apply(&self, samples: &mut [Complex<f32>]) {
        let offset = Complex::new(self.offset, self.offset);
        for sample in samples.iter_mut() {
            *sample = (*sample - offset) / self.gain;
        }
    }
}

/// Samples captured for one selected pulse configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseSamples {
    /// Index of the pulse configuration
    pub pulse: usize,
    /// Complex baseband samples, I in the real part
    pub samples: Vec<Complex<f32>>,
}

/// A captured frame with the metadata the device reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Samples of each selected pulse configuration, in firing order
    pub pulses: Vec<PulseSamples>,
    /// Gain and offset reported for this frame
    pub metadata: Metadata,
}

impl Frame {
    /// Applies each pulse configuration's calibration to its samples.
    /// The frame is left untouched if any calibration cannot be derived.
    pub fn calibrate(&mut self, config: &DeviceConfig) -> Result<(), Error> {
        let calibrations = self
            .pulses
            .iter()
            .map(|pulse| Calibration::from_metadata(config, &self.metadata, pulse.pulse))
            .collect::<Result<Vec<_>, _>>()?;
        for (pulse, calibration) in self.pulses.iter_mut().zip(calibrations) {
            calibration.apply(&mut pulse.samples);
        }
        Ok(())
    }

    /// Mean power of the samples of one pulse configuration.
    pub fn mean_power(&self, pulse: usize) -> Option<f32> {
        let samples = &self.pulses.iter().find(|p| p.pulse == pulse)?.samples;
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().map(|s| s.norm_sqr()).sum::<f32>() / samples.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(aoc_mode: AocMode) -> PulseConfig {
        PulseConfig {
            aoc_mode,
            ..DeviceConfig::default().pulse_config[0]
        }
    }

    #[test]
    fn test_offset_policy() {
        assert_eq!(
            AocMode::OffsetApplied.offset_policy(),
            OffsetPolicy::AlreadyApplied
        );
        assert_eq!(
            AocMode::OffsetTracked.offset_policy(),
            OffsetPolicy::HostCompensates
        );
        assert_eq!(
            AocMode::FsmHandled2.offset_policy(),
            OffsetPolicy::DeviceManaged
        );
        assert_eq!(
            AocMode::FsmHandled3.offset_policy(),
            OffsetPolicy::DeviceManaged
        );
    }

    #[test]
    fn test_tracked_offset_subtracted() {
        let cal = Calibration::new(0, &pulse(AocMode::OffsetTracked), AbbGain::Gain12, 24).unwrap();
        assert_eq!(cal.gain, 12.0);
        assert_eq!(cal.offset, 24.0);

        let mut samples = vec![Complex::new(48.0, 24.0), Complex::new(0.0, 36.0)];
        cal.apply(&mut samples);
        assert_eq!(samples, vec![Complex::new(2.0, 0.0), Complex::new(-2.0, 1.0)]);
    }

    #[test]
    fn test_applied_offset_untouched() {
        let cal = Calibration::new(0, &pulse(AocMode::OffsetApplied), AbbGain::Gain6, 24).unwrap();
        assert_eq!(cal.offset, 0.0);
        assert_eq!(cal.policy, OffsetPolicy::AlreadyApplied);

        let mut samples = vec![Complex::new(12.0, -6.0)];
        cal.apply(&mut samples);
        assert_eq!(samples, vec![Complex::new(2.0, -1.0)]);
    }

    #[test]
    fn test_fsm_offset_informational() {
        let cal = Calibration::new(1, &pulse(AocMode::FsmHandled3), AbbGain::Gain3, -100).unwrap();
        assert_eq!(cal.offset, 0.0);
        assert_eq!(cal.policy, OffsetPolicy::DeviceManaged);
    }

    #[test]
    fn test_automatic_gain_in_metadata() {
        let err = Calibration::new(3, &pulse(AocMode::OffsetTracked), AbbGain::Automatic, 0);
        assert_eq!(err, Err(Error::AutomaticGain { pulse: 3 }));
    }

    #[test]
    fn test_metadata_from_raw() {
        let metadata = Metadata::from_raw([1, 2, 4, 8], [0, -3, 5, 7]).unwrap();
        assert_eq!(
            metadata.abb_gains,
            [
                AbbGain::Gain3,
                AbbGain::Gain6,
                AbbGain::Gain24,
                AbbGain::Gain384
            ]
        );
        assert_eq!(
            Metadata::from_raw([1, 2, 12, 8], [0; 4]),
            Err(Error::InvalidValue(types::Error::InvalidAbbGain(12)))
        );
    }

    #[test]
    fn test_frame_calibrate() {
        let config = DeviceConfig::default();
        let metadata = Metadata {
            abb_gains: [AbbGain::Gain24, AbbGain::Gain48, AbbGain::Gain3, AbbGain::Gain3],
            aoc_offsets: [10, 20, 0, 0],
        };
        let mut frame = Frame {
            pulses: vec![
                PulseSamples {
                    pulse: 0,
                    samples: vec![Complex::new(34.0, 10.0); 4],
                },
                PulseSamples {
                    pulse: 1,
                    samples: vec![Complex::new(20.0, 68.0); 2],
                },
            ],
            metadata,
        };
        frame.calibrate(&config).unwrap();
        assert_eq!(frame.pulses[0].samples, vec![Complex::new(1.0, 0.0); 4]);
        assert_eq!(frame.pulses[1].samples, vec![Complex::new(0.0, 1.0); 2]);
        assert_eq!(frame.mean_power(0), Some(1.0));
        assert_eq!(frame.mean_power(2), None);
    }

    #[test]
    fn test_frame_calibrate_invalid_pulse() {
        let mut frame = Frame {
            pulses: vec![
                PulseSamples {
                    pulse: 0,
                    samples: vec![Complex::new(24.0, 24.0)],
                },
                PulseSamples {
                    pulse: 7,
                    samples: vec![],
                },
            ],
            metadata: Metadata {
                abb_gains: [AbbGain::Gain24; 4],
                aoc_offsets: [0; 4],
            },
        };
        assert_eq!(
            frame.calibrate(&DeviceConfig::default()),
            Err(Error::InvalidPulse(7))
        );
        assert_eq!(frame.pulses[0].samples, vec![Complex::new(24.0, 24.0)]);
    }
}
