//! Fuzz target: persisted configuration
//!
//! Loads the heater configuration from arbitrary store contents and
//! verifies:
//! - No panics for any byte image
//! - Defaults are written only when the period cell reads erased (0xFF)
//! - The loaded config serialises back to exactly the stored bytes
//! - Threshold conversion for the hysteresis never overflows
//!
//! cargo fuzz run fuzz_config_bytes

#![no_main]

use frostguard::app::ports::EepromPort;
use frostguard::config::{ADDR_READ_PERIOD, CONFIG_LEN, ERASED, HeaterConfig};
use frostguard::control::{decide, Thresholds};
use frostguard::error::StorageError;
use libfuzzer_sys::fuzz_target;

struct MemStore([u8; CONFIG_LEN]);

impl EepromPort for MemStore {
    fn read_byte(&self, addr: u8) -> Result<u8, StorageError> {
        self.0
            .get(addr as usize)
            .copied()
            .ok_or(StorageError::OutOfRange(addr))
    }

    fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), StorageError> {
        let cell = self
            .0
            .get_mut(addr as usize)
            .ok_or(StorageError::OutOfRange(addr))?;
        *cell = value;
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((image, rest)) = data.split_first_chunk::<CONFIG_LEN>() else {
        return;
    };
    let mut store = MemStore(*image);
    let erased = image[ADDR_READ_PERIOD as usize] == ERASED;

    let (cfg, first_boot) = HeaterConfig::load_or_init(&mut store).unwrap();
    assert_eq!(first_boot, erased);
    if first_boot {
        assert_eq!(cfg, HeaterConfig::default());
    } else {
        assert_eq!(cfg.to_bytes(), *image);
    }
    assert_eq!(store.0, cfg.to_bytes());

    let th = Thresholds::from(&cfg);
    for t in rest.iter().map(|b| i16::from(*b as i8)) {
        let _ = decide(t, &th);
    }
    let _ = cfg.warnings();
    let _ = cfg.failure_timeout_secs();
});
