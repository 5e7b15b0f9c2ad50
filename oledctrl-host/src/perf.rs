//! System performance screen
//!
//! Four bar graphs (CPU, memory, swap, disk) sized to the screen width.

use std::path::{Path, PathBuf};

use sysinfo::{Disks, System};

/// Character the bars are drawn with
pub const BAR_CHAR: char = '\u{7f}';

/// Usage fractions, each between 0 and 1
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerfStats {
    pub cpu: f32,
    pub mem: f32,
    pub swap: f32,
    /// Space used on the watched disk
    pub disk: f32,
}

fn ratio(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64).clamp(0.0, 1.0) as f32
}

pub struct PerfSampler {
    system: System,
    disks: Disks,
    mount: PathBuf,
}

impl PerfSampler {
    /// Sampler watching the disk mounted at `mount`
    pub fn new(mount: impl AsRef<Path>) -> Self {
        let mut system = System::new();
        // CPU usage is a delta; the first sample primes it
        system.refresh_cpu();
        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
            mount: mount.as_ref().to_path_buf(),
        }
    }

    pub fn sample(&mut self) -> PerfStats {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.disks.refresh();

        let cpu = (self.system.global_cpu_info().cpu_usage() / 100.0).clamp(0.0, 1.0);
        let sys = &self.system;
        let mem = ratio(
            sys.total_memory().saturating_sub(sys.available_memory()),
            sys.total_memory(),
        );
        let swap = ratio(sys.used_swap(), sys.total_swap());
        let disk = self
            .disks
            .list()
            .iter()
            .find(|d| d.mount_point() == self.mount.as_path())
            .map(|d| {
                ratio(
                    d.total_space().saturating_sub(d.available_space()),
                    d.total_space(),
                )
            })
            .unwrap_or(0.0);

        PerfStats {
            cpu,
            mem,
            swap,
            disk,
        }
    }
}

/// `label[#####     ]`, one column short of the screen width
fn bar(label: &str, fraction: f32, width: usize) -> String {
    let filled = ((width as f32 * fraction).round() as usize).min(width);
    let fill: String = std::iter::repeat(BAR_CHAR).take(filled).collect();
    format!("{label}[{fill:<width$}]")
}

/// Lines of the performance screen for a display `cols` wide
pub fn perf_lines(stats: &PerfStats, cols: u8) -> [String; 4] {
    let width = (cols as usize).saturating_sub(7);
    [
        bar("CPU%", stats.cpu, width),
        bar("Mem%", stats.mem, width),
        bar("Swap", stats.swap, width),
        bar("Disk", stats.disk, width),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(1, 4), 0.25);
        assert_eq!(ratio(5, 0), 0.0);
        assert_eq!(ratio(8, 4), 1.0);
    }

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar("CPU%", 0.5, 4), "CPU%[\u{7f}\u{7f}  ]");
        assert_eq!(bar("CPU%", 0.0, 4), "CPU%[    ]");
        assert_eq!(bar("CPU%", 1.0, 4), "CPU%[\u{7f}\u{7f}\u{7f}\u{7f}]");
    }

    #[test]
    fn test_lines_fit_screen() {
        let stats = PerfStats {
            cpu: 0.3,
            mem: 0.6,
            swap: 0.0,
            disk: 1.0,
        };
        let lines = perf_lines(&stats, 21);
        for line in &lines {
            assert_eq!(line.len(), 20);
        }
        assert!(lines[0].starts_with("CPU%["));
        assert_eq!(lines[2], format!("Swap[{}]", " ".repeat(14)));
        assert_eq!(lines[3], format!("Disk[{}]", "\u{7f}".repeat(14)));
    }

    #[test]
    fn test_narrow_screen_has_empty_bars() {
        let lines = perf_lines(&PerfStats::default(), 5);
        assert_eq!(lines[0], "CPU%[]");
    }
}
