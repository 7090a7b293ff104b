//! NVS-backed persistent settings adapter.
//!
//! Implements [`SettingsPort`] over the ESP-IDF NVS C API on target, and an
//! in-memory map on host (dev/test). Every value is stored as a postcard
//! blob under the `"fermbox"` namespace — uniform typing, and NVS commits
//! are atomic per `nvs_commit()`, so a power cut never leaves a torn value.
//!
//! Read policy per the port contract: any miss, decode failure, or backend
//! error yields the caller's default. The chamber must keep controlling
//! temperature with a dead flash chip.

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app::ports::SettingsPort;
use crate::error::SettingsError;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const NAMESPACE: &str = "fermbox";
const MAX_BLOB_SIZE: usize = 64;

pub struct NvsSettings {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsSettings {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, SettingsError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(SettingsError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(SettingsError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(SettingsError::IoError);
            }
            info!("NvsSettings: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsSettings: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    // ── Typed blob helpers ────────────────────────────────────

    fn read_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let len = self.read_blob(key, &mut buf)?;
        // Strict decode: a value of the wrong type must not half-parse into
        // a plausible number, so trailing bytes count as corruption.
        match postcard::take_from_bytes(&buf[..len]) {
            Ok((v, rest)) if rest.is_empty() => Some(v),
            _ => {
                warn!("NvsSettings: '{}' failed to decode, using default", key);
                None
            }
        }
    }

    fn write_value<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), SettingsError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let used = postcard::to_slice(value, &mut buf)
            .map_err(|_| SettingsError::IoError)?
            .len();
        self.write_blob(key, &buf[..used])
    }

    // ── Raw blob access ───────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, key: &str, buf: &mut [u8]) -> Option<usize> {
        let store = self.store.borrow();
        let data = store.get(key)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Some(len)
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&mut self, key: &str, data: &[u8]) -> Result<(), SettingsError> {
        self.store
            .borrow_mut()
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    /// Open the NVS namespace, run a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn key_buf(key: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let bytes = key.as_bytes();
        let len = bytes.len().min(15);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, key: &str, buf: &mut [u8]) -> Option<usize> {
        let result = Self::with_nvs_handle(false, |handle| {
            let kb = Self::key_buf(key);
            let mut size = buf.len();
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    kb.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(size)
        });
        result.ok()
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&mut self, key: &str, data: &[u8]) -> Result<(), SettingsError> {
        let result = Self::with_nvs_handle(true, |handle| {
            let kb = Self::key_buf(key);
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    kb.as_ptr() as *const _,
                    data.as_ptr() as *const _,
                    data.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsSettings: NVS write error {} for '{}'", e, key);
            if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                SettingsError::StorageFull
            } else {
                SettingsError::IoError
            }
        })
    }
}

/// Copy as many whole characters as fit the 32-byte bound.
fn bounded(s: &str) -> heapless::String<32> {
    let mut out = heapless::String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

impl SettingsPort for NvsSettings {
    fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.read_value(key).unwrap_or(default)
    }

    fn set_i32(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.write_value(key, &value)
    }

    fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.read_value(key).unwrap_or(default)
    }

    fn set_f32(&mut self, key: &str, value: f32) -> Result<(), SettingsError> {
        self.write_value(key, &value)
    }

    fn get_string(&self, key: &str, default: &str) -> heapless::String<32> {
        let value: Option<heapless::String<32>> = self.read_value(key);
        value.unwrap_or_else(|| bounded(default))
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.write_value(key, &bounded(value))
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn i32_round_trip() {
        let mut nvs = NvsSettings::new().unwrap();
        assert_eq!(nvs.get_i32("band_lo", -7), -7, "miss yields default");
        nvs.set_i32("band_lo", 24).unwrap();
        assert_eq!(nvs.get_i32("band_lo", -7), 24);
    }

    #[test]
    fn f32_round_trip() {
        let mut nvs = NvsSettings::new().unwrap();
        nvs.set_f32("cal_offset", -0.25).unwrap();
        assert_eq!(nvs.get_f32("cal_offset", 0.0), -0.25);
    }

    #[test]
    fn string_round_trip_and_bounding() {
        let mut nvs = NvsSettings::new().unwrap();
        assert_eq!(nvs.get_string("name", "chamber"), "chamber");

        nvs.set_string("name", "sourdough proofer").unwrap();
        assert_eq!(nvs.get_string("name", ""), "sourdough proofer");

        // Over-long values are truncated to the 32-byte bound, not errors.
        let long = "x".repeat(100);
        nvs.set_string("name", &long).unwrap();
        assert_eq!(nvs.get_string("name", "").len(), 32);
    }

    #[test]
    fn corrupt_blob_yields_default() {
        let mut nvs = NvsSettings::new().unwrap();
        nvs.set_string("band_lo", "not an i32 blob at all..").unwrap();
        assert_eq!(nvs.get_i32("band_lo", 42), 42);
    }

    #[test]
    fn keys_are_independent() {
        let mut nvs = NvsSettings::new().unwrap();
        nvs.set_i32("heat_lo", 20).unwrap();
        nvs.set_i32("heat_hi", 30).unwrap();
        assert_eq!(nvs.get_i32("heat_lo", 0), 20);
        assert_eq!(nvs.get_i32("heat_hi", 0), 30);
    }
}
