// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::path::PathBuf;

use clap::Parser;
use mimose::{
    config::{self, DeviceConfig},
    limits::ConfigLimits,
    types::RfBand,
};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Device configuration JSON file, the built-in default is used when
    /// not given.
    #[arg(long, env)]
    pub config: Option<PathBuf>,

    /// Configuration limits JSON file, the simulated device reports the
    /// BGT24ATR22 limits when not given.
    #[arg(long, env)]
    pub limits: Option<PathBuf>,

    /// Print the default device configuration as JSON and exit.
    #[arg(long)]
    pub dump_default: bool,

    /// Print the configuration limits as JSON and exit.
    #[arg(long)]
    pub dump_limits: bool,

    /// Override the RF band of the frequency control.
    #[arg(long, env, value_enum)]
    pub band: Option<RfBand>,

    /// Override the RF center frequency in Hz.
    #[arg(long, env)]
    pub rf_center_frequency: Option<u64>,

    /// Frame configuration to capture from (0 or 1).
    #[arg(long, env, default_value = "0")]
    pub frame_config: usize,

    /// Number of frames to capture and calibrate after the configuration
    /// is accepted.
    #[arg(long, env, default_value = "0")]
    pub frames: usize,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,
}

impl Args {
    /// Loads the device configuration and applies the command line
    /// overrides.
    pub fn device_config(&self) -> Result<DeviceConfig, config::Error> {
        let mut config = match &self.config {
            Some(path) => DeviceConfig::load(path)?,
            None => DeviceConfig::default(),
        };

        if let Some(band) = self.band {
            config.afc_config.band = band;
        }

        if let Some(frequency) = self.rf_center_frequency {
            config.afc_config.rf_center_frequency_hz = frequency;
        }

        Ok(config)
    }

    pub fn config_limits(&self) -> Result<ConfigLimits, config::Error> {
        match &self.limits {
            Some(path) => ConfigLimits::load(path),
            None => Ok(ConfigLimits::default()),
        }
    }
}
