// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! Logging initialization for the xbind C FFI

use std::ffi::CStr;
use std::os::raw::c_char;

use super::XbindStatus;

/// Log level for xbind logging
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XbindLogLevel {
    XbindLogOff = 0,
    XbindLogError = 1,
    XbindLogWarn = 2,
    XbindLogInfo = 3,
    XbindLogDebug = 4,
    XbindLogTrace = 5,
}

impl From<XbindLogLevel> for log::LevelFilter {
    fn from(level: XbindLogLevel) -> Self {
        match level {
            XbindLogLevel::XbindLogOff => log::LevelFilter::Off,
            XbindLogLevel::XbindLogError => log::LevelFilter::Error,
            XbindLogLevel::XbindLogWarn => log::LevelFilter::Warn,
            XbindLogLevel::XbindLogInfo => log::LevelFilter::Info,
            XbindLogLevel::XbindLogDebug => log::LevelFilter::Debug,
            XbindLogLevel::XbindLogTrace => log::LevelFilter::Trace,
        }
    }
}

/// Initialize xbind logging with console output
///
/// # Safety
/// Must be called from a single thread during initialization.
///
/// # Returns
/// `XbindStatus::XbindOk` on success, `XbindStatus::XbindOperationFailed`
/// if already initialized
#[no_mangle]
pub unsafe extern "C" fn xbind_logging_init(level: XbindLogLevel) -> XbindStatus {
    let filter: log::LevelFilter = level.into();

    match env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp_millis()
        .try_init()
    {
        Ok(()) => XbindStatus::XbindOk,
        Err(_) => XbindStatus::XbindOperationFailed, // Already initialized
    }
}

/// Initialize xbind logging with environment variable override
///
/// Reads `RUST_LOG` if set, otherwise uses the provided level.
///
/// # Safety
/// Must be called from a single thread during initialization.
#[no_mangle]
pub unsafe extern "C" fn xbind_logging_init_env(default_level: XbindLogLevel) -> XbindStatus {
    let filter: log::LevelFilter = default_level.into();

    match env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(filter.to_string()),
    )
    .format_timestamp_millis()
    .try_init()
    {
        Ok(()) => XbindStatus::XbindOk,
        Err(_) => XbindStatus::XbindOperationFailed,
    }
}

/// Initialize xbind logging with a custom filter string
///
/// # Safety
/// - `filter` must be a valid null-terminated C string or NULL.
///
/// # Example (C)
/// ```c
/// xbind_logging_init_with_filter("xbind=debug");
/// ```
#[no_mangle]
pub unsafe extern "C" fn xbind_logging_init_with_filter(filter: *const c_char) -> XbindStatus {
    if filter.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }

    let Ok(filter_str) = CStr::from_ptr(filter).to_str() else {
        return XbindStatus::XbindInvalidArgument;
    };

    match env_logger::Builder::new()
        .parse_filters(filter_str)
        .format_timestamp_millis()
        .try_init()
    {
        Ok(()) => XbindStatus::XbindOk,
        Err(_) => XbindStatus::XbindOperationFailed,
    }
}
