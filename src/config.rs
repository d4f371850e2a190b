// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{fmt, io, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::{
    AbbGain, AfcRepeatCount, AocMode, Channel, RfBand, NUM_FRAME_CONFIGS, NUM_PULSE_CONFIGS,
};

/// Configuration file errors.
#[derive(Debug)]
pub enum Error {
    /// I/O error reading or writing a configuration file
    Io(io::Error),
    /// Malformed JSON configuration
    Json(serde_json::Error),
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Json(err) => write!(f, "json error: {}", err),
        }
    }
}

/// Settings of a single transmit/receive pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Antenna pairing used by the pulse
    pub channel: Channel,
    /// Transmit power level, device units
    pub tx_power_level: u16,
    /// Analog baseband gain step
    pub abb_gain_type: AbbGain,
    /// Automatic offset control mode
    pub aoc_mode: AocMode,
}

impl PulseConfig {
    fn with_channel(channel: Channel) -> Self {
        PulseConfig {
            channel,
            tx_power_level: 31,
            abb_gain_type: AbbGain::Automatic,
            aoc_mode: AocMode::OffsetTracked,
        }
    }
}

/// Timing of a frame and the pulse configurations it fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Time between the start of consecutive frames
    pub frame_repetition_time_s: f32,
    /// Time between consecutive pulse groups inside a frame
    pub pulse_repetition_time_s: f32,
    /// Pulse configurations fired in each pulse group, in order
    pub selected_pulse_configs: [bool; NUM_PULSE_CONFIGS],
    /// Samples captured per selected pulse configuration
    pub num_samples: u16,
}

impl FrameConfig {
    /// Indices of the selected pulse configurations in firing order.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected_pulse_configs
            .iter()
            .enumerate()
            .filter_map(|(index, &selected)| selected.then_some(index))
    }

    /// Derived timing of the frame.
    pub fn timing(&self) -> FrameTiming {
        let num_pulses = self.selected().count();
        let acquisition_time_s = self.num_samples as f32 * self.pulse_repetition_time_s;
        FrameTiming {
            num_pulses,
            acquisition_time_s,
            idle_time_s: self.frame_repetition_time_s - acquisition_time_s,
            duty_cycle: acquisition_time_s / self.frame_repetition_time_s,
            sample_rate_hz: 1.0 / self.pulse_repetition_time_s,
        }
    }
}

/// Values derived from a [`FrameConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Number of selected pulse configurations
    pub num_pulses: usize,
    /// Time spent capturing samples in one frame
    pub acquisition_time_s: f32,
    /// Remaining time of the frame after acquisition, negative when the
    /// acquisition overruns the frame
    pub idle_time_s: f32,
    /// Fraction of the frame spent acquiring
    pub duty_cycle: f32,
    /// Sample rate seen by each pulse configuration
    pub sample_rate_hz: f32,
}

impl fmt::Display for FrameTiming {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "pulses={} acquisition={:.6}s idle={:.6}s duty={:.2}% sample_rate={:.1}Hz",
            self.num_pulses,
            self.acquisition_time_s,
            self.idle_time_s,
            self.duty_cycle * 100.0,
            self.sample_rate_hz
        )
    }
}

/// Clock tree settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// External reference clock
    pub reference_clock_hz: u32,
    /// System clock, derived from the reference unless the RC clock is used
    pub system_clock_hz: u32,
    /// Run the system clock from the internal RC oscillator
    pub rc_clock_enabled: bool,
    /// High frequency oscillator on-time per pulse, 0 for automatic
    pub hf_on_time_usec: u32,
    /// Reference to system clock divider
    pub system_clock_divider: u16,
    /// Allow dividers that are not a power of two
    pub system_clock_div_flex: bool,
    /// Route the system clock to the I2C block
    pub sys_clk_to_i2c: bool,
}

impl ClockConfig {
    /// System clock the reference and divider produce, rounded to the
    /// nearest Hz. `None` for a zero divider.
    pub fn derived_system_clock_hz(&self) -> Option<u32> {
        match self.system_clock_divider as u64 {
            0 => None,
            divider => {
                let reference = self.reference_clock_hz as u64;
                Some(((reference + divider / 2) / divider) as u32)
            }
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            reference_clock_hz: 38_400_000,
            system_clock_hz: 19_200_000,
            rc_clock_enabled: false,
            hf_on_time_usec: 0,
            system_clock_divider: 2,
            system_clock_div_flex: false,
            sys_clk_to_i2c: false,
        }
    }
}

/// Automatic frequency control settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AfcControl {
    /// RF band the center frequency must fall in
    pub band: RfBand,
    /// Target center frequency of the local oscillator
    pub rf_center_frequency_hz: u64,
    /// Measurement duration, counter ticks
    pub afc_duration_ct: u16,
    /// Coarse correction threshold
    pub afc_threshold_course: u16,
    /// Fine correction threshold
    pub afc_threshold_fine: u16,
    /// Frames between AFC runs
    pub afc_period: u16,
    /// AFC iterations per run
    pub afc_repeat_count: AfcRepeatCount,
}

impl Default for AfcControl {
    fn default() -> Self {
        AfcControl {
            band: RfBand::IsmSrr200MHz,
            rf_center_frequency_hz: 24_125_000_000,
            afc_duration_ct: 100,
            afc_threshold_course: 200,
            afc_threshold_fine: 30,
            afc_period: 1,
            afc_repeat_count: AfcRepeatCount::Count1,
        }
    }
}

/// Complete device configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Pulse configurations, indexed by `selected_pulse_configs`
    pub pulse_config: [PulseConfig; NUM_PULSE_CONFIGS],
    /// Frame configurations
    pub frame_config: [FrameConfig; NUM_FRAME_CONFIGS],
    /// Clock tree settings
    pub clock_config: ClockConfig,
    /// Automatic frequency control settings
    pub afc_config: AfcControl,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            pulse_config: [
                PulseConfig::with_channel(Channel::Tx1Rx1),
                PulseConfig::with_channel(Channel::Tx2Rx2),
                PulseConfig::with_channel(Channel::Tx1Rx2),
                PulseConfig::with_channel(Channel::Tx2Rx1),
            ],
            frame_config: [
                FrameConfig {
                    frame_repetition_time_s: 0.25,
                    pulse_repetition_time_s: 500e-6,
                    selected_pulse_configs: [true, false, false, false],
                    num_samples: 128,
                },
                FrameConfig {
                    frame_repetition_time_s: 1.0,
                    pulse_repetition_time_s: 1e-3,
                    selected_pulse_configs: [true, true, false, false],
                    num_samples: 256,
                },
            ],
            clock_config: ClockConfig::default(),
            afc_config: AfcControl::default(),
        }
    }
}

impl DeviceConfig {
    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("loading device config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_order() {
        let frame = FrameConfig {
            frame_repetition_time_s: 1.0,
            pulse_repetition_time_s: 1e-3,
            selected_pulse_configs: [false, true, false, true],
            num_samples: 64,
        };
        assert_eq!(frame.selected().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_frame_timing() {
        let timing = DeviceConfig::default().frame_config[0].timing();
        assert_eq!(timing.num_pulses, 1);
        assert!((timing.acquisition_time_s - 0.064).abs() < 1e-6);
        assert!((timing.idle_time_s - 0.186).abs() < 1e-6);
        assert!((timing.duty_cycle - 0.256).abs() < 1e-5);
        assert!((timing.sample_rate_hz - 2000.0).abs() < 1e-2);
    }

    #[test]
    fn test_derived_system_clock() {
        let mut clock = ClockConfig::default();
        assert_eq!(clock.derived_system_clock_hz(), Some(19_200_000));
        clock.system_clock_divider = 3;
        assert_eq!(clock.derived_system_clock_hz(), Some(12_800_000));
        clock.reference_clock_hz = 10;
        assert_eq!(clock.derived_system_clock_hz(), Some(3));
        clock.system_clock_divider = 0;
        assert_eq!(clock.derived_system_clock_hz(), None);
    }

    #[test]
    fn test_load_testdata() {
        let config = DeviceConfig::load("testdata/two_channel.json").unwrap();
        assert_eq!(config.pulse_config[1].channel, Channel::Tx1Rx2);
        assert_eq!(config.pulse_config[1].abb_gain_type, AbbGain::Gain48);
        assert_eq!(config.frame_config[0].selected().count(), 2);
        assert_eq!(config.afc_config.band, RfBand::IsmSrr100MHz);
        assert_eq!(config.afc_config.afc_repeat_count, AfcRepeatCount::Count4);
    }

    #[test]
    fn test_save_load() {
        let path = std::env::temp_dir().join("mimose_config_save_load.json");
        let mut config = DeviceConfig::default();
        config.afc_config.rf_center_frequency_hz = 24_100_000_000;
        config.save(&path).unwrap();
        let loaded = DeviceConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing() {
        match DeviceConfig::load("testdata/does_not_exist.json") {
            Err(Error::Io(_)) => (),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
