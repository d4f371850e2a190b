// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Register-level enumerations of the Mimose front-end.
//!
//! Each enumeration carries the raw discriminant used by the device, so a
//! value read back from the sensor can be converted with `TryFrom<u32>` and
//! a configured value written with `as u32`.

use std::{fmt, ops::RangeInclusive};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of pulse configurations held by the device.
pub const NUM_PULSE_CONFIGS: usize = 4;

/// Number of frame configurations held by the device.
pub const NUM_FRAME_CONFIGS: usize = 2;

/// Raw discriminant conversion errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Unknown analog baseband gain discriminant
    InvalidAbbGain(u32),
    /// Unknown offset control mode discriminant
    InvalidAocMode(u32),
    /// Unknown antenna pairing discriminant
    InvalidChannel(u32),
    /// Unknown RF band discriminant
    InvalidRfBand(u32),
    /// Unknown AFC repeat count discriminant
    InvalidAfcRepeatCount(u32),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidAbbGain(value) => write!(f, "invalid abb gain: {}", value),
            Error::InvalidAocMode(value) => write!(f, "invalid aoc mode: {}", value),
            Error::InvalidChannel(value) => write!(f, "invalid channel: {}", value),
            Error::InvalidRfBand(value) => write!(f, "invalid rf band: {}", value),
            Error::InvalidAfcRepeatCount(value) => {
                write!(f, "invalid afc repeat count: {}", value)
            }
        }
    }
}

/// Analog baseband gain step.
///
/// `Automatic` lets the device pick the step per frame; the step actually
/// used is reported back in the frame metadata.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum AbbGain {
    /// Gain step chosen by the device
    #[default]
    #[serde(rename = "automatic")]
    #[value(name = "automatic")]
    Automatic = 0,
    /// Linear gain of 3
    #[serde(rename = "gain3")]
    #[value(name = "gain3")]
    Gain3 = 1,
    /// Linear gain of 6
    #[serde(rename = "gain6")]
    #[value(name = "gain6")]
    Gain6 = 2,
    /// Linear gain of 12
    #[serde(rename = "gain12")]
    #[value(name = "gain12")]
    Gain12 = 3,
    /// Linear gain of 24
    #[serde(rename = "gain24")]
    #[value(name = "gain24")]
    Gain24 = 4,
    /// Linear gain of 48
    #[serde(rename = "gain48")]
    #[value(name = "gain48")]
    Gain48 = 5,
    /// Linear gain of 96
    #[serde(rename = "gain96")]
    #[value(name = "gain96")]
    Gain96 = 6,
    /// Linear gain of 192
    #[serde(rename = "gain192")]
    #[value(name = "gain192")]
    Gain192 = 7,
    /// Linear gain of 384
    #[serde(rename = "gain384")]
    #[value(name = "gain384")]
    Gain384 = 8,
}

impl AbbGain {
    /// Linear gain of the step, `None` for automatic gain.
    pub fn factor(&self) -> Option<f32> {
        match self {
            AbbGain::Automatic => None,
            // Steps double from 3: 3 * 2^(n-1)
            step => Some(3.0 * (1u32 << (*step as u32 - 1)) as f32),
        }
    }
}

impl TryFrom<u32> for AbbGain {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AbbGain::Automatic),
            1 => Ok(AbbGain::Gain3),
            2 => Ok(AbbGain::Gain6),
            3 => Ok(AbbGain::Gain12),
            4 => Ok(AbbGain::Gain24),
            5 => Ok(AbbGain::Gain48),
            6 => Ok(AbbGain::Gain96),
            7 => Ok(AbbGain::Gain192),
            8 => Ok(AbbGain::Gain384),
            _ => Err(Error::InvalidAbbGain(value)),
        }
    }
}

impl fmt::Display for AbbGain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.factor() {
            None => write!(f, "automatic"),
            Some(factor) => write!(f, "gain{}", factor),
        }
    }
}

/// How the offset tracked by automatic offset control is treated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum AocMode {
    /// The tracked offset is already compensated in the sample data.
    #[serde(rename = "applied")]
    #[value(name = "applied")]
    OffsetApplied = 0,
    /// The offset is tracked only; the host must subtract it.
    #[default]
    #[serde(rename = "tracked")]
    #[value(name = "tracked")]
    OffsetTracked = 1,
    /// Offset is handled by the device state machine (variant 2).
    #[serde(rename = "fsm2")]
    #[value(name = "fsm2")]
    FsmHandled2 = 2,
    /// Offset is handled by the device state machine (variant 3).
    #[serde(rename = "fsm3")]
    #[value(name = "fsm3")]
    FsmHandled3 = 3,
}

impl TryFrom<u32> for AocMode {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AocMode::OffsetApplied),
            1 => Ok(AocMode::OffsetTracked),
            2 => Ok(AocMode::FsmHandled2),
            3 => Ok(AocMode::FsmHandled3),
            _ => Err(Error::InvalidAocMode(value)),
        }
    }
}

impl fmt::Display for AocMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AocMode::OffsetApplied => write!(f, "applied"),
            AocMode::OffsetTracked => write!(f, "tracked"),
            AocMode::FsmHandled2 => write!(f, "fsm2"),
            AocMode::FsmHandled3 => write!(f, "fsm3"),
        }
    }
}

/// Transmit and receive antenna pairing used by a pulse.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum Channel {
    /// TX1 to RX1
    #[default]
    #[serde(rename = "tx1_rx1")]
    #[value(name = "tx1_rx1")]
    Tx1Rx1 = 0,
    /// TX2 to RX2
    #[serde(rename = "tx2_rx2")]
    #[value(name = "tx2_rx2")]
    Tx2Rx2 = 1,
    /// TX1 to RX2
    #[serde(rename = "tx1_rx2")]
    #[value(name = "tx1_rx2")]
    Tx1Rx2 = 2,
    /// TX2 to RX1
    #[serde(rename = "tx2_rx1")]
    #[value(name = "tx2_rx1")]
    Tx2Rx1 = 3,
}

impl Channel {
    /// Transmit antenna number (1 or 2).
    pub fn tx(&self) -> u8 {
        match self {
            Channel::Tx1Rx1 | Channel::Tx1Rx2 => 1,
            Channel::Tx2Rx2 | Channel::Tx2Rx1 => 2,
        }
    }

    /// Receive antenna number (1 or 2).
    pub fn rx(&self) -> u8 {
        match self {
            Channel::Tx1Rx1 | Channel::Tx2Rx1 => 1,
            Channel::Tx2Rx2 | Channel::Tx1Rx2 => 2,
        }
    }
}

impl TryFrom<u32> for Channel {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Channel::Tx1Rx1),
            1 => Ok(Channel::Tx2Rx2),
            2 => Ok(Channel::Tx1Rx2),
            3 => Ok(Channel::Tx2Rx1),
            _ => Err(Error::InvalidChannel(value)),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tx{}_rx{}", self.tx(), self.rx())
    }
}

/// RF band of the 24 GHz ISM short range radar allocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum RfBand {
    /// 100 MHz wide band
    #[serde(rename = "ism_100mhz")]
    #[value(name = "ism_100mhz")]
    IsmSrr100MHz = 0,
    /// 200 MHz wide band
    #[default]
    #[serde(rename = "ism_200mhz")]
    #[value(name = "ism_200mhz")]
    IsmSrr200MHz = 1,
}

/// Center of both SRR bands in Hz.
pub const BAND_CENTER_HZ: u64 = 24_125_000_000;

impl RfBand {
    /// Occupied bandwidth in Hz.
    pub fn bandwidth_hz(&self) -> u64 {
        match self {
            RfBand::IsmSrr100MHz => 100_000_000,
            RfBand::IsmSrr200MHz => 200_000_000,
        }
    }

    /// Closed range of center frequencies the band allows, in Hz.
    pub fn frequency_range(&self) -> RangeInclusive<u64> {
        let half = self.bandwidth_hz() / 2;
        BAND_CENTER_HZ - half..=BAND_CENTER_HZ + half
    }
}

impl TryFrom<u32> for RfBand {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RfBand::IsmSrr100MHz),
            1 => Ok(RfBand::IsmSrr200MHz),
            _ => Err(Error::InvalidRfBand(value)),
        }
    }
}

impl fmt::Display for RfBand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RfBand::IsmSrr100MHz => write!(f, "ism_100mhz"),
            RfBand::IsmSrr200MHz => write!(f, "ism_200mhz"),
        }
    }
}

/// Number of AFC iterations run per AFC period.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum AfcRepeatCount {
    /// 1 iteration
    #[default]
    #[serde(rename = "1")]
    #[value(name = "1")]
    Count1 = 0,
    /// 2 iterations
    #[serde(rename = "2")]
    #[value(name = "2")]
    Count2 = 1,
    /// 4 iterations
    #[serde(rename = "4")]
    #[value(name = "4")]
    Count4 = 2,
    /// 8 iterations
    #[serde(rename = "8")]
    #[value(name = "8")]
    Count8 = 3,
}

impl AfcRepeatCount {
    /// Number of iterations.
    pub fn count(&self) -> u32 {
        1 << (*self as u32)
    }
}

impl TryFrom<u32> for AfcRepeatCount {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AfcRepeatCount::Count1),
            1 => Ok(AfcRepeatCount::Count2),
            2 => Ok(AfcRepeatCount::Count4),
            3 => Ok(AfcRepeatCount::Count8),
            _ => Err(Error::InvalidAfcRepeatCount(value)),
        }
    }
}

impl fmt::Display for AfcRepeatCount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abb_gain_factor() {
        assert_eq!(AbbGain::Automatic.factor(), None);
        assert_eq!(AbbGain::Gain3.factor(), Some(3.0));
        assert_eq!(AbbGain::Gain24.factor(), Some(24.0));
        assert_eq!(AbbGain::Gain384.factor(), Some(384.0));
        assert_eq!(AbbGain::Gain48.to_string(), "gain48");
    }

    #[test]
    fn test_raw_discriminants() {
        for raw in 0..9 {
            assert_eq!(AbbGain::try_from(raw).unwrap() as u32, raw);
        }
        assert_eq!(AbbGain::try_from(9), Err(Error::InvalidAbbGain(9)));
        assert_eq!(AocMode::try_from(3), Ok(AocMode::FsmHandled3));
        assert_eq!(AocMode::try_from(4), Err(Error::InvalidAocMode(4)));
        assert_eq!(Channel::try_from(2), Ok(Channel::Tx1Rx2));
        assert_eq!(Channel::try_from(7), Err(Error::InvalidChannel(7)));
        assert_eq!(RfBand::try_from(1), Ok(RfBand::IsmSrr200MHz));
        assert_eq!(RfBand::try_from(2), Err(Error::InvalidRfBand(2)));
        assert_eq!(
            AfcRepeatCount::try_from(5),
            Err(Error::InvalidAfcRepeatCount(5))
        );
    }

    #[test]
    fn test_channel_antennas() {
        assert_eq!((Channel::Tx1Rx1.tx(), Channel::Tx1Rx1.rx()), (1, 1));
        assert_eq!((Channel::Tx2Rx2.tx(), Channel::Tx2Rx2.rx()), (2, 2));
        assert_eq!((Channel::Tx1Rx2.tx(), Channel::Tx1Rx2.rx()), (1, 2));
        assert_eq!((Channel::Tx2Rx1.tx(), Channel::Tx2Rx1.rx()), (2, 1));
        assert_eq!(Channel::Tx2Rx1.to_string(), "tx2_rx1");
    }

    #[test]
    fn test_band_ranges() {
        assert_eq!(
            RfBand::IsmSrr100MHz.frequency_range(),
            24_075_000_000..=24_175_000_000
        );
        assert_eq!(
            RfBand::IsmSrr200MHz.frequency_range(),
            24_025_000_000..=24_225_000_000
        );
    }

    #[test]
    fn test_repeat_count() {
        assert_eq!(AfcRepeatCount::Count1.count(), 1);
        assert_eq!(AfcRepeatCount::Count8.count(), 8);
        assert_eq!(AfcRepeatCount::Count4.to_string(), "4");
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&RfBand::IsmSrr100MHz).unwrap();
        assert_eq!(json, format!("\"{}\"", RfBand::IsmSrr100MHz));
        let mode: AocMode = serde_json::from_str("\"fsm2\"").unwrap();
        assert_eq!(mode, AocMode::FsmHandled2);
    }
}
