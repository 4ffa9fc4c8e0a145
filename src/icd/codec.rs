use super::checksum::{pack_lsb_first, payload_checksum};
use super::layout::IcdLayout;
use super::CodecError;
use crate::uav::{TelemetryField, TelemetrySnapshot};
use bitvec::{bitvec, order::Lsb0, vec::BitVec};

/// Bit-packed telemetry for one layout.
///
/// The fingerprint of the layout used for encoding travels with the bits, so
/// decoding against a layout with different field windows is rejected.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EncodedTelemetry {
    fingerprint: u16,
    bits: BitVec<u8, Lsb0>,
}

impl EncodedTelemetry {
    /// Header: fingerprint (u16 LE) followed by the bit length (u32 LE).
    const HEADER_LEN: usize = 6;

    pub fn fingerprint(&self) -> u16 { self.fingerprint }

    pub fn bits(&self) -> &BitVec<u8, Lsb0> { &self.bits }

    pub fn len(&self) -> usize { self.bits.len() }

    pub fn is_empty(&self) -> bool { self.bits.is_empty() }

    /// Reads `length` bits at `offset`, bit `i` of the result taken from `offset + i`.
    pub fn read(&self, offset: usize, length: usize) -> u64 {
        self.bits[offset..offset + length]
            .iter()
            .by_vals()
            .enumerate()
            .fold(0, |acc, (i, bit)| acc | (u64::from(bit) << i))
    }

    fn write(&mut self, offset: usize, length: usize, code: u64) {
        for i in 0..length {
            self.bits.set(offset + i, (code >> i) & 1 == 1);
        }
    }

    /// Datagram form: header, then the bits packed LSB first.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::HEADER_LEN + self.bits.len().div_ceil(8));
        bytes.extend_from_slice(&self.fingerprint.to_le_bytes());
        bytes.extend_from_slice(&(self.bits.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&pack_lsb_first(&self.bits));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(CodecError::Truncated(bytes.len()));
        }
        let fingerprint = u16::from_le_bytes([bytes[0], bytes[1]]);
        let bit_len = u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]) as usize;
        let payload = &bytes[Self::HEADER_LEN..];
        if payload.len() != bit_len.div_ceil(8) {
            return Err(CodecError::Truncated(bytes.len()));
        }
        let mut bits = BitVec::<u8, Lsb0>::from_slice(payload);
        bits.truncate(bit_len);
        Ok(Self { fingerprint, bits })
    }
}

/// Packs `snapshot` into the field windows of `layout`.
///
/// Fields missing from the snapshot are encoded as 0.0, fields missing from
/// the layout are dropped. The trailing checksum covers every bit before it.
pub fn compress(snapshot: &TelemetrySnapshot, layout: &IcdLayout) -> EncodedTelemetry {
    let mut encoded = EncodedTelemetry {
        fingerprint: layout.fingerprint(),
        bits: bitvec![u8, Lsb0; 0; layout.total_bits()],
    };
    for f in layout.fields() {
        if f.field() == TelemetryField::Checksum {
            continue;
        }
        let code = f.encode(snapshot.get(f.field()));
        encoded.write(f.offset() as usize, usize::from(f.length()), code);
    }
    if let Some(checksum) = layout.checksum_field() {
        let offset = checksum.offset() as usize;
        let crc = payload_checksum(&encoded.bits[..offset]);
        encoded.write(offset, usize::from(checksum.length()), u64::from(crc));
    }
    encoded
}

/// Reconstructs the fields present in `layout` from `encoded`.
pub fn decompress(encoded: &EncodedTelemetry, layout: &IcdLayout) -> Result<TelemetrySnapshot, CodecError> {
    let expected = layout.fingerprint();
    if encoded.fingerprint != expected {
        return Err(CodecError::LayoutMismatch {
            expected,
            found: encoded.fingerprint,
        });
    }
    if encoded.len() != layout.total_bits() {
        return Err(CodecError::LengthMismatch {
            expected: layout.total_bits(),
            found: encoded.len(),
        });
    }
    if let Some(checksum) = layout.checksum_field() {
        let offset = checksum.offset() as usize;
        let computed = u64::from(payload_checksum(&encoded.bits[..offset]));
        let stored = encoded.read(offset, usize::from(checksum.length()));
        if computed != stored {
            return Err(CodecError::ChecksumMismatch { computed, stored });
        }
    }

    let mut snapshot = TelemetrySnapshot::new();
    for f in layout.fields() {
        let code = encoded.read(f.offset() as usize, usize::from(f.length()));
        let value = f.decode(code).ok_or(CodecError::InvalidCode { field: f.field(), code })?;
        snapshot.set(f.field(), value);
    }
    Ok(snapshot)
}
