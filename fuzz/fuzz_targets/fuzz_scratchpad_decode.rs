//! Fuzz target: scratchpad decode and CRC verification
//!
//! Feeds arbitrary 9-byte blocks through the checksum and the decoder and
//! verifies:
//! - No panics on any input (including i16::MIN raw values)
//! - Streaming CRC validity agrees with the one-shot checksum
//! - Every raw value the sensor can produce decodes inside -55.0..=125.0
//! - Rounding stays within half a degree of the decoded value
//!
//! cargo fuzz run fuzz_scratchpad_decode

#![no_main]

use frostguard::onewire::Crc8;
use frostguard::sensors::Scratchpad;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(bytes) = <[u8; 9]>::try_from(data.get(..9).unwrap_or(&[])) else {
        return;
    };

    let mut crc = Crc8::new();
    for b in bytes {
        crc.update(b);
    }
    assert_eq!(crc.is_valid(), Crc8::checksum(&bytes[..8]) == bytes[8]);

    let pad = Scratchpad(bytes);
    let raw = pad.raw_temperature();
    let t = pad.temperature();
    if (-880..=2000).contains(&raw) {
        assert!(t.is_in_range(), "raw {raw:#06x} decoded to {t}");
    }

    let whole = t.round_to_degrees();
    assert!((i32::from(whole) * 10 - i32::from(t.tenths())).abs() <= 5);

    let _ = format!("{t} {} {}", pad.resolution_bits(), pad.alarm_high());
});
