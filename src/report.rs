//! Step reports, state snapshots and reporting sinks.
//!
//! The manager never prints. It hands out immutable `Snapshot`s and
//! `StepReport`s, and the driver routes them to a `ReportSink`: human-readable
//! text or one JSON object per step.

use std::fmt;
use std::io::Write;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use crate::deadlock::{EliminationMode, Resolution};
use crate::process::{ActionRecord, ProcessId};

/// Read-only view of one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    pub allocated: Vec<u32>,
    /// Resource types the process is waiting on
    pub pending: Vec<usize>,
}

/// Read-only view of the whole system after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub step: u64,
    pub available: Vec<u32>,
    pub processes: Vec<ProcessSnapshot>,
}

impl Snapshot {
    /// Units allocated across all processes, per resource type.
    pub fn allocated_totals(&self) -> Vec<u32> {
        let mut totals = vec![0; self.available.len()];
        for process in &self.processes {
            for (slot, units) in totals.iter_mut().zip(&process.allocated) {
                *slot += units;
            }
        }
        totals
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "System state:")?;
        write!(f, "Available resources:")?;
        for (r, units) in self.available.iter().enumerate() {
            write!(f, "  R{}: {}", r, units)?;
        }
        writeln!(f)?;
        writeln!(f, "Processes and allocated resources:")?;
        for process in &self.processes {
            let allocated: Vec<String> = process.allocated.iter().map(u32::to_string).collect();
            write!(f, "Process {}: {}", process.id, allocated.join(" "))?;
            if !process.pending.is_empty() {
                let pending: Vec<String> =
                    process.pending.iter().map(|r| format!("R{}", r)).collect();
                write!(f, "  (waiting on {})", pending.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Everything that happened during one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: u64,
    pub actions: Vec<ActionRecord>,
    pub deadlock_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

/// Receives post-step reports for display.
pub trait ReportSink {
    fn on_step(&mut self, report: &StepReport, snapshot: &Snapshot) -> Result<()>;
}

/// Human-readable step log, one block per step.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn on_step(&mut self, report: &StepReport, snapshot: &Snapshot) -> Result<()> {
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!(">>> Step {}", report.step));
        for record in &report.actions {
            lines.push(format!(
                "Process {} {} R{}: {}",
                record.process, record.choice.action, record.choice.resource, record.outcome
            ));
        }

        if report.deadlock_detected {
            lines.push("Deadlock detected. Resolving...".to_string());
            match &report.resolution {
                Some(resolution) => {
                    let verb = match resolution.mode {
                        EliminationMode::SoftReset => "eliminated",
                        EliminationMode::HardRemoval => "removed",
                    };
                    lines.push(format!(
                        "Process {} {} to free resources.",
                        resolution.victim, verb
                    ));
                }
                None => lines.push("No process holds resources; nothing reclaimed.".to_string()),
            }
        }

        writeln!(self.out, "{}", lines.join("\n")).context("Failed to write step report")?;
        writeln!(self.out, "{}", snapshot).context("Failed to write system state")?;
        Ok(())
    }
}

/// One JSON object per line: `{"report": ..., "snapshot": ...}`.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    report: &'a StepReport,
    snapshot: &'a Snapshot,
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn on_step(&mut self, report: &StepReport, snapshot: &Snapshot) -> Result<()> {
        let line = serde_json::to_string(&JsonLine { report, snapshot })
            .context("Failed to serialize step report to JSON")?;
        writeln!(self.out, "{}", line).context("Failed to write JSON step report")?;
        Ok(())
    }
}

/// Keeps every report in memory. Handy for tests and post-run summaries.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub steps: Vec<(StepReport, Snapshot)>,
}

impl ReportSink for CollectingSink {
    fn on_step(&mut self, report: &StepReport, snapshot: &Snapshot) -> Result<()> {
        self.steps.push((report.clone(), snapshot.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ActionOutcome, Choice};

    fn sample() -> (StepReport, Snapshot) {
        let report = StepReport {
            step: 1,
            actions: vec![
                ActionRecord {
                    process: 0,
                    choice: Choice::request(0),
                    outcome: ActionOutcome::Granted,
                },
                ActionRecord {
                    process: 1,
                    choice: Choice::request(0),
                    outcome: ActionOutcome::Waiting,
                },
            ],
            deadlock_detected: true,
            resolution: Some(Resolution {
                victim: 0,
                reclaimed: vec![1, 0],
                mode: EliminationMode::SoftReset,
            }),
        };
        let snapshot = Snapshot {
            step: 1,
            available: vec![1, 0],
            processes: vec![
                ProcessSnapshot {
                    id: 0,
                    allocated: vec![0, 0],
                    pending: vec![],
                },
                ProcessSnapshot {
                    id: 1,
                    allocated: vec![0, 0],
                    pending: vec![0],
                },
            ],
        };
        (report, snapshot)
    }

    #[test]
    fn test_text_sink_output() {
        let (report, snapshot) = sample();
        let mut sink = TextSink::new(Vec::new());
        sink.on_step(&report, &snapshot).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.starts_with(">>> Step 1\n"));
        assert!(text.contains("Process 1 request R0: waiting"));
        assert!(text.contains("Process 0 eliminated to free resources."));
        assert!(text.contains("Available resources:  R0: 1  R1: 0"));
        assert!(text.contains("Process 1: 0 0  (waiting on R0)"));
    }

    #[test]
    fn test_json_lines_sink_output() {
        let (report, snapshot) = sample();
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_step(&report, &snapshot).unwrap();
        sink.on_step(&report, &snapshot).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["report"]["resolution"]["victim"], 0);
        assert_eq!(value["report"]["resolution"]["mode"], "soft_reset");
        assert_eq!(value["report"]["actions"][1]["outcome"], "waiting");
        assert_eq!(value["snapshot"]["available"], serde_json::json!([1, 0]));
    }

    #[test]
    fn test_allocated_totals() {
        let (_, mut snapshot) = sample();
        snapshot.processes[0].allocated = vec![2, 1];
        snapshot.processes[1].allocated = vec![1, 0];
        assert_eq!(snapshot.allocated_totals(), vec![3, 1]);
    }
}
