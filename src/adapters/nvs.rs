//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`EepromPort`]: a small byte-addressed store laid over one
//! NVS namespace. Each address is its own `u8` key (`ee00`, `ee01`, ...)
//! so a single write touches a single entry. Cells that were never
//! written read back as `0xFF`, the same as an erased EEPROM.
//!
//! ESP-IDF NVS commits are atomic per `nvs_commit()`.

use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::EepromPort;
use crate::config::ERASED;
use crate::error::StorageError;

/// Number of addressable cells.
pub const CAPACITY: usize = 64;

#[cfg(target_os = "espidf")]
const NAMESPACE: &core::ffi::CStr = c"frostguard";

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    cells: [u8; CAPACITY],
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            cells: [ERASED; CAPACITY],
        })
    }

    fn check(addr: u8) -> Result<usize, StorageError> {
        let idx = addr as usize;
        if idx < CAPACITY {
            Ok(idx)
        } else {
            Err(StorageError::OutOfRange(addr))
        }
    }

    /// NUL-terminated key for `addr`: `ee` followed by two hex digits.
    #[cfg(target_os = "espidf")]
    fn key(addr: u8) -> [u8; 5] {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        [
            b'e',
            b'e',
            HEX[(addr >> 4) as usize],
            HEX[(addr & 0x0F) as usize],
            0,
        ]
    }

    /// Open the namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(NAMESPACE.as_ptr(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

impl EepromPort for NvsAdapter {
    #[cfg(target_os = "espidf")]
    fn read_byte(&self, addr: u8) -> Result<u8, StorageError> {
        Self::check(addr)?;
        let key = Self::key(addr);
        let result = Self::with_nvs_handle(false, |handle| {
            let mut value: u8 = ERASED;
            let ret = unsafe { nvs_get_u8(handle, key.as_ptr() as *const _, &mut value) };
            if ret == ESP_OK as i32 {
                Ok(value)
            } else if ret == ESP_ERR_NVS_NOT_FOUND as i32 {
                Ok(ERASED)
            } else {
                Err(ret)
            }
        });
        match result {
            Ok(v) => Ok(v),
            // A namespace that was never opened for writing does not exist yet.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => Ok(ERASED),
            Err(e) => {
                warn!("NVS: read of address {} failed ({})", addr, e);
                Err(StorageError::IoError)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), StorageError> {
        Self::check(addr)?;
        let key = Self::key(addr);
        Self::with_nvs_handle(true, |handle| {
            let ret = unsafe { nvs_set_u8(handle, key.as_ptr() as *const _, value) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|e| {
            warn!("NVS: write of address {} failed ({})", addr, e);
            StorageError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_byte(&self, addr: u8) -> Result<u8, StorageError> {
        Ok(self.cells[Self::check(addr)?])
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), StorageError> {
        self.cells[Self::check(addr)?] = value;
        Ok(())
    }
}
