use bitvec::{order::Lsb0, slice::BitSlice};

/// CRC-16/MODBUS over `bytes`.
pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for byte in bytes {
        crc ^= u16::from(*byte);
        for _ in 0..8 {
            if crc & 1 == 0 {
                crc >>= 1;
            } else {
                crc = (crc >> 1) ^ 0xA001;
            }
        }
    }
    crc
}

/// Packs `bits` into bytes, bit `i` landing in bit `i % 8` of byte `i / 8`.
/// A trailing partial byte is zero padded.
pub fn pack_lsb_first(bits: &BitSlice<u8, Lsb0>) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| chunk.iter().by_vals().enumerate().fold(0u8, |acc, (i, bit)| acc | (u8::from(bit) << i)))
        .collect()
}

/// Checksum over the payload bits preceding the checksum field.
pub fn payload_checksum(payload: &BitSlice<u8, Lsb0>) -> u16 { crc16(&pack_lsb_first(payload)) }
