//! Bit recovery from located ring groups.
//!
//! Marks encode bits differentially: walking a ring slot by slot, staying on
//! the same shape repeats the previous bit and stepping onto a new shape
//! flips it. The walk starts on the sentinel slot, whose value is always 0.

use tracing::{debug, trace, warn};

use crate::layout::rings::{ORIENTATION_RADIUS, RingTable, ring_radius};
use crate::models::{BitStream, LocatedCode, PlacedShape, Point, RingGroup};

/// Sampler settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Largest distance, relative to the dot distance, at which a slot that
    /// falls outside every shape still snaps to the nearest one
    pub slot_tolerance_fraction: f32,
    /// Correct the angular origin with the outer marker's measured angle
    pub refine_with_outer_marker: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            slot_tolerance_fraction: 0.1,
            refine_with_outer_marker: true,
        }
    }
}

/// One probed slot.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SlotSample {
    /// Ring number, 1-based
    pub ring: usize,
    /// Slot index within the ring
    pub slot: usize,
    /// Probe position in image coordinates
    pub position: Point,
    /// Id of the shape the probe landed on
    pub container: Option<usize>,
    /// Emitted bit; `None` for the sentinel and for the probe that ended the ring
    pub bit: Option<bool>,
}

/// Where the outer marker was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    /// The last group is the marker alone; every other group carries data.
    ExtraRing,
    /// The marker occupies slot 0 of the last data ring.
    SameRing,
}

/// Reads bits off located ring groups.
#[derive(Debug, Clone, Default)]
pub struct BitSampler {
    config: SamplerConfig,
}

impl BitSampler {
    /// Create a sampler with custom settings
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Walk every data ring and concatenate the recovered bits.
    pub fn sample(&self, located: &LocatedCode, table: &RingTable) -> (BitStream, Vec<SlotSample>) {
        let data_groups = located.rings.get(2..).unwrap_or(&[]);
        let Some(last) = data_groups.last() else {
            return (Vec::new(), Vec::new());
        };

        let marker = if last.len() == 1 {
            Marker::ExtraRing
        } else {
            Marker::SameRing
        };
        let data_rings = match marker {
            Marker::ExtraRing => data_groups.len() - 1,
            Marker::SameRing => data_groups.len(),
        };
        let offset = if self.config.refine_with_outer_marker {
            self.marker_offset(last, marker, table.degrees_per_bit(data_groups.len()))
        } else {
            0.0
        };

        let mut bits = Vec::new();
        let mut samples = Vec::new();
        for (i, group) in data_groups[..data_rings].iter().enumerate() {
            let number = i + 1;
            let first_slot = usize::from(marker == Marker::SameRing && number == data_rings);
            self.walk_ring(
                located,
                group,
                number,
                first_slot,
                table,
                offset,
                &mut bits,
                &mut samples,
            );
        }

        debug!(bits = bits.len(), rings = data_rings, offset, "sampling");
        (bits, samples)
    }

    /// Angle of the outer marker when it sits within half a slot of 0°.
    fn marker_offset(&self, group: &RingGroup, marker: Marker, degrees_per_bit: u32) -> f32 {
        let half_slot = degrees_per_bit as f32 / 2.0;
        let deviation = |m: &PlacedShape| {
            if m.angle >= 180.0 {
                m.angle - 360.0
            } else {
                m.angle
            }
        };
        let candidate = match marker {
            Marker::ExtraRing => group.members.first(),
            Marker::SameRing => group
                .members
                .iter()
                .min_by(|a, b| deviation(a).abs().total_cmp(&deviation(b).abs())),
        };
        candidate
            .map(deviation)
            .filter(|d| d.abs() < half_slot)
            .unwrap_or(0.0)
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_ring(
        &self,
        located: &LocatedCode,
        group: &RingGroup,
        number: usize,
        first_slot: usize,
        table: &RingTable,
        offset: f32,
        bits: &mut BitStream,
        samples: &mut Vec<SlotSample>,
    ) {
        let center = located.center.center;
        let axis = located.orientation.axis;
        let scale = ring_radius(number) / ORIENTATION_RADIUS;
        let tolerance = self.config.slot_tolerance_fraction * located.orientation.distance;
        let d = table.degrees_per_bit(number) as f32;
        let last_slot = table.capacity(number);

        let probe = |slot: usize| {
            let v = axis.rotate(slot as f32 * d + offset).scale(scale);
            center.translate(v.x, v.y)
        };

        let position = probe(first_slot);
        let Some(mut previous) = find_container(group, &position, tolerance) else {
            warn!(ring = number, "sentinel slot not found, skipping ring");
            samples.push(SlotSample {
                ring: number,
                slot: first_slot,
                position,
                container: None,
                bit: None,
            });
            return;
        };
        samples.push(SlotSample {
            ring: number,
            slot: first_slot,
            position,
            container: Some(previous),
            bit: None,
        });

        let mut value = false;
        for slot in first_slot + 1..=last_slot {
            let position = probe(slot);
            let Some(container) = find_container(group, &position, tolerance) else {
                trace!(ring = number, slot, "ring ends");
                samples.push(SlotSample {
                    ring: number,
                    slot,
                    position,
                    container: None,
                    bit: None,
                });
                break;
            };
            if container != previous {
                value = !value;
                previous = container;
            }
            trace!(ring = number, slot, container, value, "slot");
            bits.push(value);
            samples.push(SlotSample {
                ring: number,
                slot,
                position,
                container: Some(container),
                bit: Some(value),
            });
        }
    }
}

/// Id of the smallest member containing `point`, else of the nearest member
/// within `tolerance`.
fn find_container(group: &RingGroup, point: &Point, tolerance: f32) -> Option<usize> {
    let inside = group
        .members
        .iter()
        .filter(|m| m.shape.contains(point))
        .min_by(|a, b| a.shape.area().total_cmp(&b.shape.area()));
    if let Some(m) = inside {
        return Some(m.shape.id);
    }

    group
        .members
        .iter()
        .map(|m| (m.shape.distance_to(point), m.shape.id))
        .filter(|(dist, _)| *dist <= tolerance)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateShape, CenterDescriptor, MinAreaRect, OrientationDescriptor};
    use crate::utils::geometry::{polar_to_cartesian, polygon_centroid};

    const UNIT: f32 = 10.0;

    fn origin() -> Point {
        Point::new(300.0, 300.0)
    }

    /// Thick arc around the origin covering `start..=end` degrees at `radius` units.
    fn mark(id: usize, radius: f32, start: f32, end: f32) -> PlacedShape {
        let c = origin();
        let r = radius * UNIT;
        let half = UNIT;
        let (start, end) = (start - 4.0, end + 4.0);
        let steps = 24;
        let mut contour = Vec::new();
        for i in 0..=steps {
            let a = start + (end - start) * i as f32 / steps as f32;
            contour.push(polar_to_cartesian(&c, r + half, a));
        }
        for i in (0..=steps).rev() {
            let a = start + (end - start) * i as f32 / steps as f32;
            contour.push(polar_to_cartesian(&c, r - half, a));
        }
        let centroid = polygon_centroid(&contour).unwrap();
        let mid = (start + end) / 2.0;
        PlacedShape {
            angle: mid.rem_euclid(360.0),
            outer_radius: r + half,
            shape: CandidateShape {
                id,
                centroid,
                sides: 10,
                rect: MinAreaRect {
                    center: centroid,
                    width: 2.0 * half,
                    height: (end - start).to_radians() * r,
                    angle: 0.0,
                },
                intensity: 0.0,
                perimeter: 0.0,
                polygon_area: 0.0,
                contour,
            },
        }
    }

    fn located(rings: Vec<RingGroup>) -> LocatedCode {
        let c = origin();
        let dot = mark(100, 6.0, 0.0, 0.0);
        let disc = mark(101, 2.0, 0.0, 360.0);
        let mut all = vec![
            RingGroup {
                members: vec![disc.clone()],
            },
            RingGroup {
                members: vec![dot.clone()],
            },
        ];
        all.extend(rings);
        let axis = Point::new(0.0, -6.0 * UNIT);
        LocatedCode {
            center: CenterDescriptor {
                center: c,
                center_shape: disc.shape.clone(),
                orientation_ring: disc.shape,
            },
            orientation: OrientationDescriptor {
                dot: dot.shape,
                distance: axis.norm(),
                axis,
            },
            retained: 0,
            rings: all,
        }
    }

    #[test]
    fn test_same_ring_marker() {
        // ring 1 at radius 9, 20° per bit: marker, sentinel run, then 1 0 0
        let ring = RingGroup {
            members: vec![
                mark(1, 9.0, 0.0, 0.0),
                mark(2, 9.0, 20.0, 20.0),
                mark(3, 9.0, 40.0, 40.0),
                mark(4, 9.0, 60.0, 80.0),
            ],
        };
        let code = located(vec![ring]);
        let (bits, samples) = BitSampler::default().sample(&code, &RingTable::default());
        assert_eq!(bits, vec![true, false, false]);
        assert_eq!(samples[0].slot, 1);
        assert_eq!(samples[0].bit, None);
        assert_eq!(samples.last().unwrap().container, None);
    }

    #[test]
    fn test_extra_ring_marker_with_rotation() {
        // full ring 1 turned 3° clockwise: sentinel run over slots 0..=2,
        // then a run to the end
        let ring1 = RingGroup {
            members: vec![mark(1, 9.0, 3.0, 43.0), mark(2, 9.0, 63.0, 343.0)],
        };
        let marker = RingGroup {
            members: vec![mark(3, 12.0, 3.0, 3.0)],
        };
        let code = located(vec![ring1, marker]);
        let (bits, _) = BitSampler::default().sample(&code, &RingTable::default());

        let mut expected = vec![false, false];
        expected.extend(vec![true; 15]);
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_marker_offset_within_half_slot() {
        let sampler = BitSampler::default();
        let mut m = mark(1, 12.0, 0.0, 0.0);
        m.angle = 356.0;
        let group = RingGroup { members: vec![m] };
        assert!((sampler.marker_offset(&group, Marker::ExtraRing, 20) + 4.0).abs() < 1e-4);
        assert_eq!(sampler.marker_offset(&group, Marker::ExtraRing, 4), 0.0);
    }

    #[test]
    fn test_no_data_rings() {
        let code = located(Vec::new());
        let (bits, samples) = BitSampler::default().sample(&code, &RingTable::default());
        assert!(bits.is_empty());
        assert!(samples.is_empty());
    }
}
