mod checksum;
mod codec;
mod field_codec;
mod layout;

pub use codec::{EncodedTelemetry, compress, decompress};
pub use field_codec::{FieldCodec, FieldTransform};
pub use layout::{IcdCatalog, IcdField, IcdLayout, IcdLayoutBuilder};

use crate::uav::TelemetryField;
use strum_macros::Display;

/// Failures while building, validating or persisting an ICD.
#[derive(Debug, Display, PartialEq, Clone)]
pub enum IcdError {
    Empty,
    MissingChecksum,
    DuplicateField(TelemetryField),
    NotContiguous(TelemetryField),
    InvalidWidth(TelemetryField),
    UnitMismatch(TelemetryField),
    InvalidRange(TelemetryField),
    Serialization(String),
    Io(String),
}

impl std::error::Error for IcdError {}

/// Failures while decoding a bitstream.
#[derive(Debug, Display, PartialEq, Eq, Clone)]
pub enum CodecError {
    LayoutMismatch { expected: u16, found: u16 },
    LengthMismatch { expected: usize, found: usize },
    ChecksumMismatch { computed: u64, stored: u64 },
    InvalidCode { field: TelemetryField, code: u64 },
    Truncated(usize),
}

impl std::error::Error for CodecError {}
