// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;

use clap::ValueHint;
use clap::{ArgAction, Command, arg, command, value_parser};

use crate::sampler::SamplerKind;

pub const DEFAULT_INTERVAL_MS: &str = "2000";

#[must_use]
pub fn build() -> Command {
    command!()
    .about("🌙 Night light controller driven by system utilization")
    .long_about(
        "Adjusts the Windows night light (blue light reduction) intensity from memory or CPU utilization by rewriting its CloudStore registry records. Without a subcommand it polls until interrupted and then restores the original setting."
    )
    .subcommand_required(false)
    .arg_required_else_help(false)
    .subcommand(
        Command::new("on")
            .about("🌙 Turn the night light on")
    )
    .subcommand(
        Command::new("off")
            .about("☀️ Turn the night light off")
    )
    .subcommand(
        Command::new("status")
            .about("📊 Show night light state and intensity")
            .long_about("Decode the state and settings records and print the on/off status, the last change timestamp and the current intensity.")
    )
    .subcommand(
        Command::new("get")
            .about("🔍 Print the current intensity in percent")
    )
    .subcommand(
        Command::new("set")
            .about("🎚️ Set the intensity in percent (turns the night light on)")
            .arg(
                arg!(<percent> "Intensity between 0 and 100")
                .value_parser(value_parser!(i64).range(0..=100))
            )
    )
    .subcommand(
        Command::new("seed")
            .about("🌱 Write synthetic records into --store-dir for dry runs")
    )
    .subcommand(
        Command::new("save-config")
            .about("💾 Persist the effective settings to the config file")
    )
    .arg(
        arg!(-i --interval <ms> "Polling interval in milliseconds")
        .default_value(DEFAULT_INTERVAL_MS)
        .required(false)
        .value_parser(value_parser!(u64).range(100..))
    )
    .arg(
        arg!(--sampler <sampler> "Utilization source driving the intensity")
        .default_value("memory")
        .required(false)
        .value_parser(value_parser!(SamplerKind))
    )
    .arg(
        arg!(--"store-dir" <dir> "Read and write records as files in this directory instead of the registry")
        .required(false)
        .value_parser(value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
        .global(true)
    )
    .arg(
        arg!(--"no-restore" "Keep the last applied intensity on shutdown")
        .action(ArgAction::SetTrue)
    )
    .arg(
        arg!(-v --verbose "Enable verbose logging")
        .action(ArgAction::SetTrue)
        .global(true)
    )
}
