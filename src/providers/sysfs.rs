//! CPU frequencies from `/sys/devices/system/cpu/cpu*/cpufreq`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::modules::cpufreq::{CpuFreqInfo, CpuFreqProvider, CpuFreqStat};

pub struct Sysfs {
    root: PathBuf,
}

impl Sysfs {
    pub fn new() -> Self {
        Self::with_root("/sys")
    }

    /// Read from a sysfs mounted somewhere other than `/sys`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn cpu_dir(&self) -> PathBuf {
        self.root.join("devices/system/cpu")
    }
}

impl Default for Sysfs {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuFreqProvider for Sysfs {
    fn cpu_frequency(&self) -> Result<CpuFreqInfo> {
        let mut cpus: Vec<(usize, PathBuf)> = fs::read_dir(self.cpu_dir())?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let index = cpu_index(&entry.file_name().to_string_lossy())?;
                Some((index, entry.path()))
            })
            .collect();
        cpus.sort_by_key(|(index, _)| *index);

        let stats = cpus
            .into_iter()
            .map(|(index, path)| {
                Ok(CpuFreqStat {
                    name: format!("cpu{index}"),
                    scaling_current_frequency: read_khz(&path.join("cpufreq/scaling_cur_freq"))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CpuFreqInfo { stats })
    }
}

/// `cpu12` -> 12. Siblings like `cpufreq` or `cpuidle` are not CPUs.
fn cpu_index(name: &str) -> Option<usize> {
    name.strip_prefix("cpu")?.parse().ok()
}

/// A missing file means the CPU has no reading (offline, or no cpufreq
/// driver).
fn read_khz(path: &Path) -> Result<Option<u64>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| Error::Parse(format!("{}: {:?}", path.display(), raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A throwaway sysfs tree under the system temp dir.
    struct FakeSys(PathBuf);

    impl FakeSys {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!("pegel-sysfs-{}-{name}", std::process::id()));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(root.join("devices/system/cpu/cpufreq")).unwrap();
            fs::create_dir_all(root.join("devices/system/cpu/cpuidle")).unwrap();
            Self(root)
        }

        fn cpu(&self, index: usize, khz: Option<&str>) -> &Self {
            let dir = self.0.join(format!("devices/system/cpu/cpu{index}"));
            fs::create_dir_all(&dir).unwrap();
            if let Some(khz) = khz {
                fs::create_dir_all(dir.join("cpufreq")).unwrap();
                fs::write(dir.join("cpufreq/scaling_cur_freq"), format!("{khz}\n")).unwrap();
            }
            self
        }
    }

    impl Drop for FakeSys {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn reads_cpus_in_numeric_order() {
        let sys = FakeSys::new("order");
        sys.cpu(10, Some("800000"))
            .cpu(2, Some("1600000"))
            .cpu(0, None);

        let info = Sysfs::with_root(&sys.0).cpu_frequency().unwrap();
        let names: Vec<_> = info.stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["cpu0", "cpu2", "cpu10"]);
        assert_eq!(info.freq(0), 0.0);
        assert_eq!(info.freq(1), 1.6e9);
        assert_eq!(info.average_freq(), 1.2e9);
    }

    #[test]
    fn garbage_reading_is_malformed() {
        let sys = FakeSys::new("garbage");
        sys.cpu(0, Some("fast"));
        assert!(matches!(
            Sysfs::with_root(&sys.0).cpu_frequency(),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn missing_tree_is_io_error() {
        let err = Sysfs::with_root("/nonexistent/pegel").cpu_frequency().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
