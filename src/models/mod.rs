/// Bitstreams and their text form
pub mod bits;
/// Located code geometry passed between stages
pub mod descriptor;
/// Binary ink mask
pub mod matrix;
/// Decode outcome, report and diagnostics
pub mod message;
/// Floating point positions and vectors
pub mod point;
/// Candidate shapes and their bounding rectangles
pub mod shape;

pub use bits::{BitStream, format_bits, parse_bits};
pub use descriptor::{CenterDescriptor, LocatedCode, OrientationDescriptor, PlacedShape, RingGroup};
pub use matrix::BitMatrix;
pub use message::{DecodeReport, DecodedMessage, Diagnostics};
pub use point::Point;
pub use shape::{CandidateShape, MinAreaRect};
