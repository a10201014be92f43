//! Per-field validity masks.
//!
//! Every decoder reports which of its fields carried a usable value as a
//! bitmask whose layout is fixed per message (bit `n` = `n`-th field in the
//! message's documented field order). The mask is computed from the decoded
//! `Option` fields, so nothing downstream reads raw bits to decide whether a
//! value is present; the mask only drives the availability evidence rules.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Validity(u16);

impl Validity {
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Build a mask from presence flags in field order.
    pub fn from_fields(present: &[bool]) -> Self {
        let bits = present
            .iter()
            .enumerate()
            .filter(|(_, present)| **present)
            .fold(0u16, |acc, (index, _)| acc | (1 << index));
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True when every bit of `required` is set.
    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}
