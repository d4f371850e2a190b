// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Validation of a [`DeviceConfig`] against [`ConfigLimits`].
//!
//! Validation never fails early: every field is checked and all violations
//! are returned together. A configuration with any violation is rejected as
//! a whole.

use std::{fmt, ops::Deref};

use log::{debug, trace};
use num::ToPrimitive;

use crate::{
    config::{AfcControl, ClockConfig, DeviceConfig, FrameConfig, PulseConfig},
    limits::{Bounds, ConfigLimits},
    types::RfBand,
};

/// Configuration field a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `pulse_config[pulse].tx_power_level`
    TxPowerLevel {
        /// Pulse configuration index
        pulse: usize,
    },
    /// `frame_config[frame].frame_repetition_time_s`
    FrameRepetitionTime {
        /// Frame configuration index
        frame: usize,
    },
    /// `frame_config[frame].pulse_repetition_time_s`
    PulseRepetitionTime {
        /// Frame configuration index
        frame: usize,
    },
    /// `frame_config[frame].num_samples`
    NumSamples {
        /// Frame configuration index
        frame: usize,
    },
    /// `frame_config[frame].selected_pulse_configs`
    SelectedPulseConfigs {
        /// Frame configuration index
        frame: usize,
    },
    /// `clock_config.system_clock_hz`
    SystemClock,
    /// `clock_config.system_clock_divider`
    SystemClockDivider,
    /// `clock_config.hf_on_time_usec`
    HfOnTime,
    /// `afc_config.rf_center_frequency_hz`
    RfCenterFrequency,
    /// `afc_config.afc_duration_ct`
    AfcDuration,
    /// `afc_config.afc_threshold_course`
    AfcThresholdCourse,
    /// `afc_config.afc_threshold_fine`
    AfcThresholdFine,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::TxPowerLevel { pulse } => write!(f, "pulse_config[{}].tx_power_level", pulse),
            Field::FrameRepetitionTime { frame } => {
                write!(f, "frame_config[{}].frame_repetition_time_s", frame)
            }
            Field::PulseRepetitionTime { frame } => {
                write!(f, "frame_config[{}].pulse_repetition_time_s", frame)
            }
            Field::NumSamples { frame } => write!(f, "frame_config[{}].num_samples", frame),
            Field::SelectedPulseConfigs { frame } => {
                write!(f, "frame_config[{}].selected_pulse_configs", frame)
            }
            Field::SystemClock => write!(f, "clock_config.system_clock_hz"),
            Field::SystemClockDivider => write!(f, "clock_config.system_clock_divider"),
            Field::HfOnTime => write!(f, "clock_config.hf_on_time_usec"),
            Field::RfCenterFrequency => write!(f, "afc_config.rf_center_frequency_hz"),
            Field::AfcDuration => write!(f, "afc_config.afc_duration_ct"),
            Field::AfcThresholdCourse => write!(f, "afc_config.afc_threshold_course"),
            Field::AfcThresholdFine => write!(f, "afc_config.afc_threshold_fine"),
        }
    }
}

/// What is wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViolationKind {
    /// Value outside the closed range reported by the device
    OutOfRange {
        /// Offending value
        value: f64,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Frame selects no pulse configuration
    NoPulseSelected,
    /// Samples of one frame take longer than the frame itself
    AcquisitionExceedsFrame {
        /// `num_samples * pulse_repetition_time_s`
        acquisition_s: f32,
        /// Frame repetition time
        frame_s: f32,
    },
    /// System clock divider is zero
    ZeroDivider,
    /// Divider must be a power of two unless flexible division is enabled
    DividerNotPowerOfTwo(u16),
    /// System clock does not match reference clock and divider
    ClockMismatch {
        /// Clock derived from reference and divider
        expected: u32,
        /// Configured system clock
        actual: u32,
    },
    /// Center frequency outside the selected RF band
    OutsideBand {
        /// Selected band
        band: RfBand,
        /// Configured center frequency
        value: u64,
    },
    /// Oscillator on-time does not fit into the pulse repetition time
    HfOnTimeExceedsPulse {
        /// Configured on-time
        on_time_s: f32,
        /// Shortest pulse repetition time of all frames
        pulse_repetition_time_s: f32,
    },
    /// Fine AFC threshold above the coarse threshold
    FineAboveCourse {
        /// Fine threshold
        fine: u16,
        /// Coarse threshold
        course: u16,
    },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ViolationKind::OutOfRange { value, min, max } => {
                write!(f, "{} outside [{}, {}]", value, min, max)
            }
            ViolationKind::NoPulseSelected => write!(f, "no pulse configuration selected"),
            ViolationKind::AcquisitionExceedsFrame {
                acquisition_s,
                frame_s,
            } => write!(
                f,
                "acquisition time {}s exceeds frame repetition time {}s",
                acquisition_s, frame_s
            ),
            ViolationKind::ZeroDivider => write!(f, "divider is zero"),
            ViolationKind::DividerNotPowerOfTwo(divider) => {
                write!(f, "divider {} is not a power of two", divider)
            }
            ViolationKind::ClockMismatch { expected, actual } => {
                write!(f, "{} Hz does not match derived {} Hz", actual, expected)
            }
            ViolationKind::OutsideBand { band, value } => {
                let range = band.frequency_range();
                write!(
                    f,
                    "{} Hz outside band {} [{}, {}]",
                    value,
                    band,
                    range.start(),
                    range.end()
                )
            }
            ViolationKind::HfOnTimeExceedsPulse {
                on_time_s,
                pulse_repetition_time_s,
            } => write!(
                f,
                "on-time {}s does not fit pulse repetition time {}s",
                on_time_s, pulse_repetition_time_s
            ),
            ViolationKind::FineAboveCourse { fine, course } => {
                write!(f, "fine threshold {} above coarse threshold {}", fine, course)
            }
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    /// Rejected field
    pub field: Field,
    /// Reason for the rejection
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)
    }
}

/// Every violation found in a rejected configuration. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// True when any violation refers to `field`.
    pub fn contains(&self, field: Field) -> bool {
        self.0.iter().any(|violation| violation.field == field)
    }
}

impl Deref for Violations {
    type Target = [Violation];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::error::Error for Violations {}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

/// Relative slack allowed when comparing acquisition and frame time.
const ACQUISITION_TOLERANCE: f64 = 1e-6;

#[derive(Default)]
struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    fn push(&mut self, field: Field, kind: ViolationKind) {
        trace!("violation {}: {}", field, kind);
        self.violations.push(Violation { field, kind });
    }

    fn range<T: PartialOrd + Copy + ToPrimitive>(
        &mut self,
        field: Field,
        value: T,
        bounds: &Bounds<T>,
    ) {
        if !bounds.contains(value) {
            let kind = ViolationKind::OutOfRange {
                value: value.to_f64().unwrap_or(f64::NAN),
                min: bounds.min.to_f64().unwrap_or(f64::NAN),
                max: bounds.max.to_f64().unwrap_or(f64::NAN),
            };
            self.push(field, kind);
        }
    }

    fn pulse(&mut self, index: usize, pulse: &PulseConfig, limits: &ConfigLimits) {
        self.range(
            Field::TxPowerLevel { pulse: index },
            pulse.tx_power_level,
            &limits.tx_power_level,
        );
    }

    fn frame(&mut self, index: usize, frame: &FrameConfig, limits: &ConfigLimits) {
        self.range(
            Field::FrameRepetitionTime { frame: index },
            frame.frame_repetition_time_s,
            &limits.frame_repetition_time_s,
        );
        self.range(
            Field::PulseRepetitionTime { frame: index },
            frame.pulse_repetition_time_s,
            &limits.pulse_repetition_time_s,
        );
        self.range(
            Field::NumSamples { frame: index },
            frame.num_samples,
            &limits.num_samples,
        );

        if frame.selected().next().is_none() {
            self.push(
                Field::SelectedPulseConfigs { frame: index },
                ViolationKind::NoPulseSelected,
            );
        }

        // An acquisition that exactly fills the frame must pass despite f32
        // rounding of the inputs.
        let timing = frame.timing();
        let acquisition_s = frame.num_samples as f64 * frame.pulse_repetition_time_s as f64;
        let frame_s = frame.frame_repetition_time_s as f64;
        if acquisition_s > frame_s * (1.0 + ACQUISITION_TOLERANCE) {
            self.push(
                Field::FrameRepetitionTime { frame: index },
                ViolationKind::AcquisitionExceedsFrame {
                    acquisition_s: timing.acquisition_time_s,
                    frame_s: frame.frame_repetition_time_s,
                },
            );
        }
    }

    fn clock(&mut self, clock: &ClockConfig, frames: &[FrameConfig], limits: &ConfigLimits) {
        let divider = clock.system_clock_divider;
        if divider == 0 {
            self.push(Field::SystemClockDivider, ViolationKind::ZeroDivider);
        } else if !clock.system_clock_div_flex && !divider.is_power_of_two() {
            self.push(
                Field::SystemClockDivider,
                ViolationKind::DividerNotPowerOfTwo(divider),
            );
        }

        // The RC oscillator runs independently of the reference.
        if !clock.rc_clock_enabled {
            if let Some(expected) = clock.derived_system_clock_hz() {
                if expected != clock.system_clock_hz {
                    self.push(
                        Field::SystemClock,
                        ViolationKind::ClockMismatch {
                            expected,
                            actual: clock.system_clock_hz,
                        },
                    );
                }
            }
        }

        self.range(
            Field::SystemClock,
            clock.system_clock_hz,
            &limits.system_clock_hz,
        );

        if clock.hf_on_time_usec > 0 {
            let on_time_s = clock.hf_on_time_usec as f32 * 1e-6;
            let shortest = frames
                .iter()
                .map(|frame| frame.pulse_repetition_time_s)
                .fold(f32::INFINITY, f32::min);
            if on_time_s >= shortest {
                self.push(
                    Field::HfOnTime,
                    ViolationKind::HfOnTimeExceedsPulse {
                        on_time_s,
                        pulse_repetition_time_s: shortest,
                    },
                );
            }
        }
    }

    fn afc(&mut self, afc: &AfcControl, limits: &ConfigLimits) {
        self.range(
            Field::RfCenterFrequency,
            afc.rf_center_frequency_hz,
            &limits.rf_center_frequency_hz,
        );
        if !afc.band.frequency_range().contains(&afc.rf_center_frequency_hz) {
            self.push(
                Field::RfCenterFrequency,
                ViolationKind::OutsideBand {
                    band: afc.band,
                    value: afc.rf_center_frequency_hz,
                },
            );
        }

        self.range(
            Field::AfcDuration,
            afc.afc_duration_ct,
            &limits.afc_duration_ct,
        );
        self.range(
            Field::AfcThresholdCourse,
            afc.afc_threshold_course,
            &limits.afc_threshold_course,
        );
        self.range(
            Field::AfcThresholdFine,
            afc.afc_threshold_fine,
            &limits.afc_threshold_fine,
        );

        if afc.afc_threshold_fine > afc.afc_threshold_course {
            self.push(
                Field::AfcThresholdFine,
                ViolationKind::FineAboveCourse {
                    fine: afc.afc_threshold_fine,
                    course: afc.afc_threshold_course,
                },
            );
        }
    }
}

/// Checks every field of `config` against `limits`.
///
/// Returns `Ok(())` when the configuration is accepted, otherwise all
/// violations found.
pub fn validate(config: &DeviceConfig, limits: &ConfigLimits) -> Result<(), Violations> {
    let mut validator = Validator::default();

    for (index, pulse) in config.pulse_config.iter().enumerate() {
        validator.pulse(index, pulse, limits);
    }
    for (index, frame) in config.frame_config.iter().enumerate() {
        validator.frame(index, frame, limits);
    }
    validator.clock(&config.clock_config, &config.frame_config, limits);
    validator.afc(&config.afc_config, limits);

    if validator.violations.is_empty() {
        debug!("device config accepted");
        Ok(())
    } else {
        debug!(
            "device config rejected with {} violations",
            validator.violations.len()
        );
        Err(Violations(validator.violations))
    }
}

/// A configuration that passed validation. It cannot be modified, only
/// read or sent to a device.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig(DeviceConfig);

impl ValidatedConfig {
    /// Validates `config` against `limits` and wraps it when accepted.
    pub fn new(config: DeviceConfig, limits: &ConfigLimits) -> Result<Self, Violations> {
        validate(&config, limits)?;
        Ok(ValidatedConfig(config))
    }
}

impl Deref for ValidatedConfig {
    type Target = DeviceConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
