//! CPU frequency module: the average current scaling frequency.

use std::time::Duration;

use crate::bar::Output;
use crate::engine::{Engine, Provider};
use crate::error::Result;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Reads the current frequency of every CPU.
pub trait CpuFreqProvider: Send + Sync + 'static {
    fn cpu_frequency(&self) -> Result<CpuFreqInfo>;
}

/// One CPU as reported by the kernel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuFreqStat {
    /// e.g. `"cpu3"`
    pub name: String,
    /// Current scaling frequency in kHz, `None` when the CPU has no reading.
    pub scaling_current_frequency: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuFreqInfo {
    pub stats: Vec<CpuFreqStat>,
}

impl CpuFreqInfo {
    pub fn num_cpus(&self) -> usize {
        self.stats.len()
    }

    /// Frequency of `cpu` in Hz. Unknown CPUs and CPUs without a reading
    /// report 0.
    pub fn freq(&self, cpu: usize) -> f64 {
        self.stats
            .get(cpu)
            .and_then(|stat| stat.scaling_current_frequency)
            .map_or(0.0, |khz| khz as f64 * 1000.0)
    }

    /// Mean frequency in Hz over the CPUs that have a reading. `NaN` when
    /// none do.
    pub fn average_freq(&self) -> f64 {
        let (sum, count) = self
            .stats
            .iter()
            .filter_map(|stat| stat.scaling_current_frequency)
            .fold((0u64, 0usize), |(sum, count), khz| (sum + khz, count + 1));
        sum as f64 / count as f64 * 1000.0
    }
}

pub struct CpuFreqSource<P>(P);

impl<P: CpuFreqProvider> Provider for CpuFreqSource<P> {
    type Value = CpuFreqInfo;

    fn query(&self) -> Result<CpuFreqInfo> {
        self.0.cpu_frequency()
    }
}

pub type CpuFreq<P> = Engine<CpuFreqSource<P>>;

/// Average frequency in GHz with two decimals, e.g. `2.40GHz`.
pub fn default_format(info: &CpuFreqInfo) -> Output {
    Output::text(format!("{:.2}GHz", info.average_freq() / 1e9))
}

/// Build a CPU frequency module refreshing every 10 seconds.
pub fn new<P: CpuFreqProvider>(provider: P) -> CpuFreq<P> {
    let engine = Engine::new(CpuFreqSource(provider), default_format);
    engine.every(DEFAULT_INTERVAL);
    engine
}
