//! Differential run-length marks.
//!
//! Every maximal run of equal slot values in a ring becomes one mark: an arc
//! spanning the run, or a dot for a run of one slot. Neighbouring runs always
//! differ in value, so a decoder only has to notice where one mark ends and
//! the next begins.

use crate::layout::rings::{Ring, ring_radius};

/// How runs meeting at 0° are handled in a full ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Merge the last run into the first across 0° when both hold the same
    /// value and the ring's slots close the full circle.
    #[default]
    Closed,
    /// Never merge across 0°.
    Open,
}

/// A maximal run of equal values, in slot units relative to the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// First slot of the run
    pub start: usize,
    /// Number of slots covered; may wrap past the slot count when merged
    pub len: usize,
    /// Bit value carried by every slot of the run
    pub value: bool,
}

/// Shape drawn for one run.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum Mark {
    /// Single-slot run
    Dot {
        /// Clockwise angle from 0° in degrees
        angle: f32,
        /// Bit value
        value: bool,
    },
    /// Multi-slot run drawn clockwise from `start` to `end`
    Arc {
        /// Start angle in degrees
        start: f32,
        /// End angle in degrees; may exceed 360 for runs wrapping past 0°
        end: f32,
        /// Bit value
        value: bool,
    },
}

/// Marks of one ring.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RingMarks {
    /// Ring number
    pub ring: usize,
    /// Drawing radius
    pub radius: f32,
    /// Marks in slot order
    pub marks: Vec<Mark>,
}

/// Split `values` into maximal runs.
pub fn runs(values: &[bool]) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::new();
    for (i, &value) in values.iter().enumerate() {
        match out.last_mut() {
            Some(run) if run.value == value => run.len += 1,
            _ => out.push(Run {
                start: i,
                len: 1,
                value,
            }),
        }
    }
    out
}

/// Compute the marks for `ring`.
pub fn ring_marks(ring: &Ring, policy: BoundaryPolicy) -> RingMarks {
    let d = ring.degrees_per_bit as f32;
    let offset = ring.first_slot();
    let closes_circle = ring.is_full() && 360 % ring.degrees_per_bit == 0;
    let mut runs = runs(&ring.slot_values());

    let wrap = policy == BoundaryPolicy::Closed && closes_circle;
    let marks = if wrap && runs.len() == 1 {
        vec![Mark::Arc {
            start: 0.0,
            end: 360.0,
            value: runs[0].value,
        }]
    } else {
        if wrap && runs.len() > 1 && runs[0].value == runs[runs.len() - 1].value {
            let first = runs.remove(0);
            if let Some(last) = runs.last_mut() {
                last.len += first.len;
            }
        }
        runs.iter()
            .map(|run| {
                let start = (offset + run.start) as f32 * d;
                if run.len == 1 {
                    Mark::Dot {
                        angle: start,
                        value: run.value,
                    }
                } else {
                    Mark::Arc {
                        start,
                        end: start + (run.len - 1) as f32 * d,
                        value: run.value,
                    }
                }
            })
            .collect()
    };

    RingMarks {
        ring: ring.number,
        radius: ring_radius(ring.number),
        marks,
    }
}
