// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser;
use mimose::{
    device::{Device, SimulatedDevice},
    validate::ValidatedConfig,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt as _, Layer as _, Registry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(args.rust_log);

    let journald = match tracing_journald::layer() {
        Ok(journald) => Some(journald.with_filter(args.rust_log)),
        Err(_) => None,
    };

    let subscriber = Registry::default().with(stdout_log).with(journald);
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    tracing_log::LogTracer::init()?;

    if args.dump_default {
        let config = mimose::config::DeviceConfig::default();
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let limits = args.config_limits()?;

    if args.dump_limits {
        println!("{}", serde_json::to_string_pretty(&limits)?);
        return Ok(());
    }

    let config = args.device_config()?;

    for (index, frame) in config.frame_config.iter().enumerate() {
        info!("frame_config[{}]: {}", index, frame.timing());
    }

    let config = match ValidatedConfig::new(config, &limits) {
        Ok(config) => config,
        Err(violations) => {
            for violation in violations.iter() {
                error!("{}", violation);
            }
            println!("rejected: {} violations", violations.len());
            std::process::exit(2);
        }
    };
    println!("accepted");

    if args.frames == 0 {
        return Ok(());
    }

    let mut device = SimulatedDevice::new(limits);
    device.set_config(&config)?;
    device.set_active_frame(args.frame_config)?;

    let sensor = device.sensor_info()?;
    info!("sensor: {}", sensor);

    for _ in 0..args.frames {
        let mut frame = device.next_frame()?;
        if let Err(err) = frame.calibrate(&config) {
            warn!("frame {} not calibrated: {}", device.frame_counter(), err);
            continue;
        }

        for pulse in &frame.pulses {
            let index = pulse.pulse;
            println!(
                "frame {} pulse {} ({}) gain={} offset={} power={:.4}",
                device.frame_counter(),
                index,
                config.pulse_config[index].channel,
                frame.metadata.abb_gains[index],
                frame.metadata.aoc_offsets[index],
                frame.mean_power(index).unwrap_or(0.0)
            );
        }
    }

    Ok(())
}
