//! Ring capacities and the partition of a bitstream into rings.
//!
//! Ring `r` (1-based) spends `degrees_per_bit(r)` degrees on every slot and
//! holds `360 / degrees_per_bit(r) - 1` data bits after its sentinel slot.

use crate::error::{FgcError, Result};
use crate::models::BitStream;

/// Distance between neighbouring rings, in drawing units.
pub const RING_PITCH: f32 = 3.0;
/// Stroke width of every arc and the diameter of every dot.
pub const STROKE_WIDTH: f32 = 2.0;
/// Radius of the filled center disc.
pub const CENTER_RADIUS: f32 = 4.0;
/// Radius of the orientation ring and of the orientation dot's position.
pub const ORIENTATION_RADIUS: f32 = 6.0;
/// Radius of a single dot mark.
pub const DOT_RADIUS: f32 = STROKE_WIDTH / 2.0;
/// Half-width of the gap in the orientation ring around 0°.
pub const ORIENTATION_GAP_DEG: f32 = 30.0;

/// Radius of data ring `number` (1-based).
pub fn ring_radius(number: usize) -> f32 {
    ORIENTATION_RADIUS + RING_PITCH * number as f32
}

/// Per-ring angular resolution.
///
/// Entries are degrees per slot for rings 1, 2, ...; rings past the end of
/// the list use `floor`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RingTable {
    /// Degrees per slot for the leading rings
    pub degrees: Vec<u32>,
    /// Degrees per slot once `degrees` is exhausted
    pub floor: u32,
}

impl Default for RingTable {
    fn default() -> Self {
        Self {
            degrees: vec![20, 20, 15, 12, 10, 9, 8, 6, 5],
            floor: 4,
        }
    }
}

impl RingTable {
    /// Build a validated table.
    pub fn new(degrees: Vec<u32>, floor: u32) -> Result<Self> {
        let table = Self { degrees, floor };
        table.validate()?;
        Ok(table)
    }

    /// Reject tables that would give empty or growing slots.
    pub fn validate(&self) -> Result<()> {
        let all = self.degrees.iter().chain(std::iter::once(&self.floor));
        for &d in all.clone() {
            if d == 0 || d > 180 {
                return Err(FgcError::Config(format!(
                    "degrees per bit must be within 1..=180, got {}",
                    d
                )));
            }
        }
        let values: Vec<u32> = all.copied().collect();
        if values.windows(2).any(|w| w[1] > w[0]) {
            return Err(FgcError::Config(
                "degrees per bit must not increase outward".to_string(),
            ));
        }
        Ok(())
    }

    /// Degrees per slot of ring `ring` (1-based).
    pub fn degrees_per_bit(&self, ring: usize) -> u32 {
        ring.checked_sub(1)
            .and_then(|i| self.degrees.get(i))
            .copied()
            .unwrap_or(self.floor)
    }

    /// Slot positions around ring `ring`, sentinel included.
    pub fn slot_count(&self, ring: usize) -> usize {
        (360 / self.degrees_per_bit(ring)) as usize
    }

    /// Data bits ring `ring` can hold.
    pub fn capacity(&self, ring: usize) -> usize {
        self.slot_count(ring) - 1
    }
}

/// Where the outer orientation marker sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum MarkerPlacement {
    /// Slot 0 of the last data ring; its sentinel and data shift by one slot.
    SameRing(usize),
    /// A lone dot at 0° in the ring after the last data ring.
    ExtraRing(usize),
}

impl MarkerPlacement {
    /// Ring number carrying the marker
    pub fn ring(&self) -> usize {
        match *self {
            MarkerPlacement::SameRing(r) | MarkerPlacement::ExtraRing(r) => r,
        }
    }
}

/// One data ring.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Ring {
    /// Ring number, 1-based from the center
    pub number: usize,
    /// Degrees per slot
    pub degrees_per_bit: u32,
    /// Data capacity
    pub capacity: usize,
    /// Data bits carried, sentinel excluded
    pub data: BitStream,
    /// Whether slot 0 holds the outer marker
    pub has_marker: bool,
}

impl Ring {
    /// Slot index of the sentinel.
    pub fn first_slot(&self) -> usize {
        usize::from(self.has_marker)
    }

    /// Sentinel followed by the data bits.
    pub fn slot_values(&self) -> BitStream {
        let mut values = Vec::with_capacity(self.data.len() + 1);
        values.push(false);
        values.extend_from_slice(&self.data);
        values
    }

    /// Whether sentinel and data occupy every slot of the ring.
    pub fn is_full(&self) -> bool {
        !self.has_marker && self.data.len() == self.capacity
    }
}

/// A bitstream split into rings, innermost first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RingLayout {
    /// Data rings
    pub rings: Vec<Ring>,
    /// Outer marker placement
    pub marker: MarkerPlacement,
}

impl RingLayout {
    /// Split `bits` into rings; no ring is created once the bits run out.
    pub fn partition(bits: &[bool], table: &RingTable) -> Self {
        let mut rings = Vec::new();
        let mut rest = bits;
        while !rest.is_empty() {
            let number = rings.len() + 1;
            let capacity = table.capacity(number);
            let take = capacity.min(rest.len());
            rings.push(Ring {
                number,
                degrees_per_bit: table.degrees_per_bit(number),
                capacity,
                data: rest[..take].to_vec(),
                has_marker: false,
            });
            rest = &rest[take..];
        }

        let marker = match rings.last_mut() {
            Some(last) if last.data.len() + 3 <= last.capacity => {
                last.has_marker = true;
                MarkerPlacement::SameRing(last.number)
            }
            Some(last) => MarkerPlacement::ExtraRing(last.number + 1),
            None => MarkerPlacement::ExtraRing(1),
        };

        Self { rings, marker }
    }

    /// Concatenate the data bits of every ring.
    pub fn flatten(&self) -> BitStream {
        self.rings.iter().flat_map(|r| r.data.iter().copied()).collect()
    }

    /// Number of rings drawn, the extra marker ring included.
    pub fn drawn_rings(&self) -> usize {
        self.marker.ring()
    }
}
