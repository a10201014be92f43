//! Field-level access to single-frame CAN payloads.
//!
//! NMEA 2000 flags a missing or unusable value by filling the field with ones
//! (`0xFF`, `0xFFFF`, `0x7FFF`, ...) and reserves the value just below as an
//! "out of range" marker. The reader maps both onto `None` so that the message
//! codecs only ever see presence-tagged values, and the writer emits the
//! all-ones pattern for `None`. Proprietary messages that have no such
//! convention use the `raw_*` accessors.
use crate::error::DecodeError;

/// Payload capacity of a classic CAN frame.
pub const FRAME_CAPACITY: usize = 8;

//==================================================================================FIELD_READER
/// Little-endian reader over a received payload. Length is checked once at
/// construction, so every accessor inside the declared layout is infallible.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    buffer: &'a [u8],
}

impl<'a> FieldReader<'a> {
    /// Wrap `buffer`, rejecting payloads shorter than `layout_len` bytes.
    pub fn new(buffer: &'a [u8], layout_len: usize) -> Result<Self, DecodeError> {
        if buffer.len() < layout_len {
            return Err(DecodeError::InvalidDataLength {
                expected: layout_len,
                actual: buffer.len(),
            });
        }
        Ok(Self { buffer })
    }

    fn le<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buffer[offset..offset + N]);
        bytes
    }

    pub fn raw_u8(&self, offset: usize) -> u8 {
        self.buffer[offset]
    }

    pub fn raw_i8(&self, offset: usize) -> i8 {
        self.buffer[offset] as i8
    }

    pub fn raw_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.le(offset))
    }

    pub fn raw_i16(&self, offset: usize) -> i16 {
        i16::from_le_bytes(self.le(offset))
    }

    pub fn raw_i32(&self, offset: usize) -> i32 {
        i32::from_le_bytes(self.le(offset))
    }

    /// `width` bits starting at bit `shift` of byte `offset`; all ones is unavailable.
    pub fn bits(&self, offset: usize, shift: u8, width: u8) -> Option<u8> {
        let mask = ((1u16 << width) - 1) as u8;
        let value = (self.buffer[offset] >> shift) & mask;
        (value != mask).then_some(value)
    }

    pub fn u8(&self, offset: usize) -> Option<u8> {
        let value = self.raw_u8(offset);
        (value < 0xFE).then_some(value)
    }

    pub fn u16(&self, offset: usize) -> Option<u16> {
        let value = self.raw_u16(offset);
        (value < 0xFFFE).then_some(value)
    }

    pub fn i16(&self, offset: usize) -> Option<i16> {
        let value = self.raw_i16(offset);
        (value < 0x7FFE).then_some(value)
    }

    pub fn u32(&self, offset: usize) -> Option<u32> {
        let value = u32::from_le_bytes(self.le(offset));
        (value < 0xFFFF_FFFE).then_some(value)
    }

    pub fn i32(&self, offset: usize) -> Option<i32> {
        let value = self.raw_i32(offset);
        (value < 0x7FFF_FFFE).then_some(value)
    }
}

//==================================================================================FIELD_WRITER
/// Little-endian writer building an outbound payload. Bytes that are never
/// written stay at `0xFF`, the NMEA 2000 padding/reserved value.
#[derive(Debug, Clone, Copy)]
pub struct FieldWriter {
    buffer: [u8; FRAME_CAPACITY],
}

impl Default for FieldWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldWriter {
    pub const fn new() -> Self {
        Self {
            buffer: [0xFF; FRAME_CAPACITY],
        }
    }

    pub fn raw_u8(&mut self, offset: usize, value: u8) -> &mut Self {
        self.buffer[offset] = value;
        self
    }

    pub fn raw_i8(&mut self, offset: usize, value: i8) -> &mut Self {
        self.buffer[offset] = value as u8;
        self
    }

    pub fn raw_u16(&mut self, offset: usize, value: u16) -> &mut Self {
        self.buffer[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn raw_i16(&mut self, offset: usize, value: i16) -> &mut Self {
        self.buffer[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn raw_i32(&mut self, offset: usize, value: i32) -> &mut Self {
        self.buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Write `width` bits at bit `shift` of byte `offset`, leaving the other
    /// bits of the byte untouched. `None` writes all ones.
    pub fn bits(&mut self, offset: usize, shift: u8, width: u8, value: Option<u8>) -> &mut Self {
        let mask = ((1u16 << width) - 1) as u8;
        let bits = value.unwrap_or(mask) & mask;
        self.buffer[offset] &= !(mask << shift);
        self.buffer[offset] |= bits << shift;
        self
    }

    pub fn u8(&mut self, offset: usize, value: Option<u8>) -> &mut Self {
        self.raw_u8(offset, value.unwrap_or(0xFF))
    }

    pub fn u16(&mut self, offset: usize, value: Option<u16>) -> &mut Self {
        self.raw_u16(offset, value.unwrap_or(0xFFFF))
    }

    pub fn i16(&mut self, offset: usize, value: Option<i16>) -> &mut Self {
        self.raw_i16(offset, value.unwrap_or(0x7FFF))
    }

    pub fn u32(&mut self, offset: usize, value: Option<u32>) -> &mut Self {
        let raw = value.unwrap_or(0xFFFF_FFFF);
        self.buffer[offset..offset + 4].copy_from_slice(&raw.to_le_bytes());
        self
    }

    pub fn i32(&mut self, offset: usize, value: Option<i32>) -> &mut Self {
        self.raw_i32(offset, value.unwrap_or(0x7FFF_FFFF))
    }

    /// Finished payload.
    pub fn finish(&self) -> [u8; FRAME_CAPACITY] {
        self.buffer
    }
}

//==================================================================================SCALING
/// Scale a raw integer to engineering units.
#[inline]
pub fn scaled<T: Into<f64>>(raw: T, resolution: f64) -> f32 {
    (raw.into() * resolution) as f32
}

/// Inverse of [`scaled`], rounding to the nearest raw step.
#[inline]
pub fn unscaled(value: f32, resolution: f64) -> f64 {
    let steps = value as f64 / resolution;
    if steps >= 0.0 {
        (steps + 0.5) as i64 as f64
    } else {
        (steps - 0.5) as i64 as f64
    }
}
