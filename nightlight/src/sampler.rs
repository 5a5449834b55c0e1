// SPDX-License-Identifier: GPL-3.0-only
//! Host utilization readings that drive the filter intensity.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, VariantNames};
use sysinfo::System;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    AsRefStr,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SamplerKind {
    /// Physical memory in use
    #[default]
    Memory,
    /// Global CPU load
    Cpu,
}

impl std::fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl SamplerKind {
    #[must_use]
    pub fn build(self) -> Box<dyn UtilizationSampler> {
        match self {
            SamplerKind::Memory => Box::new(MemorySampler::new()),
            SamplerKind::Cpu => Box::new(CpuSampler::new()),
        }
    }
}

/// Source of a utilization percentage in `0..=100`.
pub trait UtilizationSampler: Send {
    fn name(&self) -> &'static str;

    fn sample(&mut self) -> u8;
}

impl<T: UtilizationSampler + ?Sized> UtilizationSampler for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn sample(&mut self) -> u8 {
        (**self).sample()
    }
}

/// Share of physical memory not reported free.
pub struct MemorySampler {
    system: System,
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampler {
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        Self { system }
    }
}

impl UtilizationSampler for MemorySampler {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn sample(&mut self) -> u8 {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        let used = total.saturating_sub(self.system.free_memory());
        ratio_percent(used, total)
    }
}

/// Global CPU usage across all cores.
pub struct CpuSampler {
    system: System,
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSampler {
    #[must_use]
    pub fn new() -> Self {
        // Usage is a delta, so prime the counters once
        let mut system = System::new();
        system.refresh_cpu_all();
        Self { system }
    }
}

impl UtilizationSampler for CpuSampler {
    fn name(&self) -> &'static str {
        "cpu"
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn sample(&mut self) -> u8 {
        self.system.refresh_cpu_all();
        let usage = self.system.global_cpu_usage();
        usage.round().clamp(0.0, 100.0) as u8
    }
}

/// `round(part / whole * 100)`, zero when `whole` is zero.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn ratio_percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let percent = (part as f64 / whole as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
