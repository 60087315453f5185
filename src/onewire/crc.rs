//! Dallas/Maxim 1-Wire CRC-8 (x^8 + x^5 + x^4 + 1, LSB first).

/// Running CRC-8 accumulator.
///
/// Reset it before a block read, feed every byte including the device's
/// trailing CRC byte, and the accumulator is zero iff the block is intact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc8(u8);

/// Reflected form of the 0x31 polynomial.
const POLY_REFLECTED: u8 = 0x8C;

impl Crc8 {
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Shift one byte through the register, bit-serially.
    pub fn update(&mut self, byte: u8) {
        let mut data = byte;
        for _ in 0..8 {
            let mix = (self.0 ^ data) & 0x01;
            self.0 >>= 1;
            if mix != 0 {
                self.0 ^= POLY_REFLECTED;
            }
            data >>= 1;
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// True when the bytes fed so far (data + CRC byte) check out.
    pub const fn is_valid(self) -> bool {
        self.0 == 0
    }

    /// CRC of a whole buffer.
    pub fn checksum(data: &[u8]) -> u8 {
        let mut crc = Self::new();
        for &b in data {
            crc.update(b);
        }
        crc.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_check_value() {
        // CRC-8/MAXIM-DOW check string.
        assert_eq!(Crc8::checksum(b"123456789"), 0xA1);
    }

    #[test]
    fn appending_crc_zeroes_accumulator() {
        let rom = [0x28, 0xFF, 0x4C, 0x61, 0x91, 0x16, 0x04];
        let crc = Crc8::checksum(&rom);
        let mut acc = Crc8::new();
        for &b in rom.iter().chain(core::iter::once(&crc)) {
            acc.update(b);
        }
        assert!(acc.is_valid());
    }

    #[test]
    fn all_zero_block_is_valid() {
        // A shorted-to-ground line reads as zeros; CRC alone cannot catch it.
        assert_eq!(Crc8::checksum(&[0u8; 9]), 0);
    }

    #[test]
    fn reset_clears_state() {
        let mut acc = Crc8::new();
        acc.update(0x55);
        assert!(!acc.is_valid());
        acc.reset();
        assert_eq!(acc, Crc8::default());
    }
}
