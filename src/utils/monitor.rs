#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseSample {
    pub phase: String,
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

/// 每個 ETL 階段結束時記錄行程的資源用量
#[cfg(feature = "cli")]
pub struct PhaseMonitor {
    state: Option<Mutex<MonitorState>>,
    start_time: Instant,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
    samples: Vec<PhaseSample>,
}

#[cfg(feature = "cli")]
impl PhaseMonitor {
    pub fn new(enabled: bool) -> Self {
        let state = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => {
                    let mut system = System::new();
                    system.refresh_all();
                    Some(Mutex::new(MonitorState {
                        system,
                        pid,
                        peak_memory_mb: 0,
                        samples: Vec::new(),
                    }))
                }
                Err(e) => {
                    tracing::warn!("⚠️ Resource monitoring disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            state,
            start_time: Instant::now(),
        }
    }

    pub fn record(&self, phase: &str) -> Option<PhaseSample> {
        let mut state = self.state.as_ref()?.lock().ok()?;
        state.system.refresh_all();
        let (cpu_usage, memory_mb) = {
            let process = state.system.process(state.pid)?;
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };
        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);

        let sample = PhaseSample {
            phase: phase.to_string(),
            cpu_usage,
            memory_mb,
            peak_memory_mb: state.peak_memory_mb,
            elapsed: self.start_time.elapsed(),
        };
        tracing::info!(
            "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
            sample.phase,
            sample.cpu_usage,
            sample.memory_mb,
            sample.peak_memory_mb,
            sample.elapsed
        );
        state.samples.push(sample.clone());
        Some(sample)
    }

    pub fn samples(&self) -> Vec<PhaseSample> {
        self.state
            .as_ref()
            .and_then(|state| state.lock().ok().map(|s| s.samples.clone()))
            .unwrap_or_default()
    }

    pub fn log_final_stats(&self) {
        if let Some(state) = self.state.as_ref().and_then(|s| s.lock().ok()) {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB, Phases: {}",
                self.start_time.elapsed(),
                state.peak_memory_mb,
                state.samples.len()
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for PhaseMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct PhaseMonitor;

#[cfg(not(feature = "cli"))]
impl PhaseMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn record(&self, _phase: &str) -> Option<()> {
        None
    }

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let monitor = PhaseMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.record("extract").is_none());
        assert!(monitor.samples().is_empty());
    }

    #[test]
    fn test_enabled_monitor_tracks_peak() {
        let monitor = PhaseMonitor::new(true);
        if !monitor.is_enabled() {
            return;
        }
        monitor.record("extract");
        monitor.record("transform");
        let samples = monitor.samples();
        assert!(samples.len() <= 2);
        if samples.len() == 2 {
            assert!(samples[1].peak_memory_mb >= samples[0].memory_mb);
        }
    }
}
