use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct InvocationStats {
    pub invocation: u64,
    pub cold_start: bool,
    pub elapsed_time: Duration,
}

/// 追蹤每次呼叫的耗時與冷啟動
#[derive(Debug)]
pub struct InvocationMonitor {
    warm: AtomicBool,
    invocations: AtomicU64,
    enabled: bool,
}

#[derive(Debug)]
pub struct InvocationTimer {
    invocation: u64,
    cold_start: bool,
    start_time: Instant,
}

impl InvocationMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            warm: AtomicBool::new(false),
            invocations: AtomicU64::new(0),
            enabled,
        }
    }

    pub fn start(&self) -> InvocationTimer {
        let invocation = self.invocations.fetch_add(1, Ordering::Relaxed) + 1;
        let cold_start = !self.warm.swap(true, Ordering::AcqRel);

        InvocationTimer {
            invocation,
            cold_start,
            start_time: Instant::now(),
        }
    }

    pub fn finish(&self, timer: InvocationTimer, status: u16) -> InvocationStats {
        let stats = InvocationStats {
            invocation: timer.invocation,
            cold_start: timer.cold_start,
            elapsed_time: timer.start_time.elapsed(),
        };

        if self.enabled {
            tracing::info!(
                "📊 Invocation #{} - Status: {}, Time: {:?}, Cold start: {}",
                stats.invocation,
                status,
                stats.elapsed_time,
                stats.cold_start
            );
        }

        stats
    }

    pub fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }
}

impl Default for InvocationMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_invocation_is_cold() {
        let monitor = InvocationMonitor::new(false);

        let first = monitor.finish(monitor.start(), 200);
        let second = monitor.finish(monitor.start(), 200);

        assert!(first.cold_start);
        assert!(!second.cold_start);
        assert_eq!(second.invocation, 2);
        assert_eq!(monitor.invocation_count(), 2);
    }
}
