// rust/ttlc-otel/src/phase.rs
// Pipeline phase timing against a single configurable tick budget

use serde::Serialize;

use crate::cycle::{cycles_to_ticks, read_cycles};

/// Cycle count for one pipeline phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseMetrics {
    pub name: &'static str,
    pub cycles: u64,
    pub ticks: u64,
    /// Units processed (triples parsed, focus nodes checked, bytes
    /// written); per-unit cost is cycles / items
    pub items: u64,
}

/// Running timer for one phase. Stop it to get the metrics record.
pub struct PhaseTimer {
    name: &'static str,
    start: u64,
}

impl PhaseTimer {
    #[inline]
    pub fn start(name: &'static str) -> PhaseTimer {
        PhaseTimer {
            name,
            start: read_cycles(),
        }
    }

    #[inline]
    pub fn stop(self, cycles_per_tick: u64, items: u64) -> PhaseMetrics {
        let cycles = read_cycles().saturating_sub(self.start);
        PhaseMetrics {
            name: self.name,
            cycles,
            ticks: cycles_to_ticks(cycles, cycles_per_tick),
            items,
        }
    }
}

/// Per-compilation metrics: one record per phase plus the budget the
/// run was accounted against.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineMetrics {
    pub phases: Vec<PhaseMetrics>,
    pub tick_budget: u64,
}

impl PipelineMetrics {
    pub fn new(tick_budget: u64) -> PipelineMetrics {
        PipelineMetrics {
            phases: Vec::new(),
            tick_budget,
        }
    }

    pub fn record(&mut self, phase: PhaseMetrics) {
        self.phases.push(phase);
    }

    /// Phases whose average per-item tick cost exceeded the budget.
    /// Informational only.
    pub fn over_budget(&self) -> Vec<&PhaseMetrics> {
        self.phases
            .iter()
            .filter(|p| p.items > 0 && p.ticks / p.items > self.tick_budget)
            .collect()
    }

    pub fn total_cycles(&self) -> u64 {
        self.phases.iter().map(|p| p.cycles).sum()
    }
}
