// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! # xbind C FFI Bindings
//!
//! C-compatible surface over the xbind core: a host written in C (or any
//! language with a C FFI) consumes modules built in Rust with
//! [`xbind::ModuleBuilder`], calling functions, instantiating classes,
//! dispatching methods and properties on handles, and managing handle
//! lifetimes with retain/release.
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment. No function
//! panics across the boundary; failures come back as [`XbindStatus`] codes.

mod logging;

pub use logging::*;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use xbind::{Error, Handle, Module, Value, ValueKind};

/// Opaque handle to a Module
#[repr(C)]
pub struct XbindModule {
    _private: [u8; 0],
}

/// Opaque handle to a native-instance Handle
#[repr(C)]
pub struct XbindHandle {
    _private: [u8; 0],
}

/// Opaque handle to a dynamic Value
#[repr(C)]
pub struct XbindValue {
    _private: [u8; 0],
}

/// Status codes (C-compatible enum)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XbindStatus {
    /// Operation completed successfully
    XbindOk = 0,
    /// Invalid argument provided (null pointer, invalid value)
    XbindInvalidArgument = 1,
    /// Requested attribute, function, or class not found
    XbindNotFound = 2,
    /// Generic operation failure
    XbindOperationFailed = 3,
    /// Caller buffer too small for the requested string
    XbindBufferTooSmall = 4,

    // === Registration errors (10-19) ===
    /// Native type identity already registered
    XbindDuplicateType = 10,
    /// No descriptor registered for the identity
    XbindUnknownType = 11,

    // === Resolution errors (20-29) ===
    /// Runtime type has no registered descriptor or ancestor
    XbindUnresolvedType = 20,

    // === Dispatch errors (30-39) ===
    /// No overload accepts the supplied arguments
    XbindNoMatchingOverload = 30,
    /// Assignment to a read-only property
    XbindPropertyReadOnly = 31,
    /// Receiver or argument of the wrong concrete type
    XbindTypeMismatch = 32,

    // === Instance errors (40-49) ===
    /// Native instance was already released
    XbindInstanceReleased = 40,
}

/// Kind tag of an [`XbindValue`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XbindValueKind {
    XbindValueNull = 0,
    XbindValueBool = 1,
    XbindValueInt = 2,
    XbindValueFloat = 3,
    XbindValueStr = 4,
    XbindValueEnum = 5,
    XbindValueObject = 6,
}

fn status_from(err: &Error) -> XbindStatus {
    match err {
        Error::DuplicateType(_, _) => XbindStatus::XbindDuplicateType,
        Error::UnknownType(_) => XbindStatus::XbindUnknownType,
        Error::UnresolvedType(_) => XbindStatus::XbindUnresolvedType,
        Error::AttributeNotFound { .. } => XbindStatus::XbindNotFound,
        Error::NoMatchingOverload { .. } => XbindStatus::XbindNoMatchingOverload,
        Error::PropertyReadOnly { .. } => XbindStatus::XbindPropertyReadOnly,
        Error::InstanceReleased => XbindStatus::XbindInstanceReleased,
        Error::TypeMismatch { .. } => XbindStatus::XbindTypeMismatch,
    }
}

/// Copy `s` into a caller buffer with a null terminator, reporting the
/// required length through `out_len`.
unsafe fn write_string(
    s: &str,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> XbindStatus {
    if buf.is_null() || out_len.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    *out_len = s.len();
    if buf_len < s.len() + 1 {
        return XbindStatus::XbindBufferTooSmall;
    }
    ptr::copy_nonoverlapping(s.as_ptr(), buf.cast::<u8>(), s.len());
    *buf.add(s.len()) = 0;
    XbindStatus::XbindOk
}

unsafe fn cstr<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}

/// Clone the argument array into owned values. `None` on null entries.
unsafe fn collect_args(args: *const *const XbindValue, nargs: usize) -> Option<Vec<Value>> {
    if nargs == 0 {
        return Some(Vec::new());
    }
    if args.is_null() {
        return None;
    }
    let mut out = Vec::with_capacity(nargs);
    for i in 0..nargs {
        let arg = *args.add(i);
        if arg.is_null() {
            return None;
        }
        out.push((*arg.cast::<Value>()).clone());
    }
    Some(out)
}

unsafe fn value_out(value: Value, out: *mut *mut XbindValue) -> XbindStatus {
    if out.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    *out = Box::into_raw(Box::new(value)).cast::<XbindValue>();
    XbindStatus::XbindOk
}

// =============================================================================
// Module
// =============================================================================

/// Hand a built [`Module`] to the C side.
///
/// This is a Rust-side helper (not `extern "C"`): module authors build their
/// module with [`xbind::ModuleBuilder`] and export their own C constructor
/// returning the raw pointer. Release with [`xbind_module_destroy`].
pub fn module_into_raw(module: Module) -> *mut XbindModule {
    Box::into_raw(Box::new(module)).cast::<XbindModule>()
}

/// Destroy a Module
///
/// # Safety
/// - `module` must be a pointer from [`module_into_raw`] or NULL
#[no_mangle]
pub unsafe extern "C" fn xbind_module_destroy(module: *mut XbindModule) {
    if !module.is_null() {
        let _ = Box::from_raw(module.cast::<Module>());
    }
}

/// Get the module name
///
/// # Safety
/// - `module` must be a valid pointer
/// - `buf` must point to a buffer of at least `buf_len` bytes
/// - `out_len` must be a valid pointer
///
/// # Returns
/// `XbindStatus::XbindOk` on success, writes the name to `buf`
#[no_mangle]
pub unsafe extern "C" fn xbind_module_name(
    module: *const XbindModule,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> XbindStatus {
    if module.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let module = &*module.cast::<Module>();
    write_string(module.name(), buf, buf_len, out_len)
}

/// Get the module docstring
///
/// # Safety
/// Same contract as [`xbind_module_name`].
#[no_mangle]
pub unsafe extern "C" fn xbind_module_doc(
    module: *const XbindModule,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> XbindStatus {
    if module.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let module = &*module.cast::<Module>();
    write_string(module.doc(), buf, buf_len, out_len)
}

/// Read an exported module attribute
///
/// # Safety
/// - `module` must be a valid pointer
/// - `name` must be a valid null-terminated C string
/// - `out_value` must be a valid pointer; on success it receives a value that
///   must be released with [`xbind_value_destroy`]
#[no_mangle]
pub unsafe extern "C" fn xbind_module_attr(
    module: *const XbindModule,
    name: *const c_char,
    out_value: *mut *mut XbindValue,
) -> XbindStatus {
    if module.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let Some(name) = cstr(name) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let module = &*module.cast::<Module>();
    match module.attr(name) {
        Some(value) => value_out(value.clone(), out_value),
        None => XbindStatus::XbindNotFound,
    }
}

/// Call a module-level function
///
/// # Safety
/// - `module` must be a valid pointer
/// - `name` must be a valid null-terminated C string
/// - `args` must point to `nargs` valid value pointers (or be NULL when
///   `nargs` is 0)
/// - `out_value` must be a valid pointer; on success it receives a value that
///   must be released with [`xbind_value_destroy`]
#[no_mangle]
pub unsafe extern "C" fn xbind_module_call(
    module: *const XbindModule,
    name: *const c_char,
    args: *const *const XbindValue,
    nargs: usize,
    out_value: *mut *mut XbindValue,
) -> XbindStatus {
    if module.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let Some(name) = cstr(name) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let Some(args) = collect_args(args, nargs) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let module = &*module.cast::<Module>();
    match module.call(name, &args) {
        Ok(value) => value_out(value, out_value),
        Err(e) => {
            log::error!("[xbind-c] call '{}' failed: {}", name, e);
            status_from(&e)
        }
    }
}

/// Instantiate an exposed class
///
/// # Safety
/// - `module` must be a valid pointer
/// - `class_name` must be a valid null-terminated C string
/// - `args` must point to `nargs` valid value pointers (or be NULL when
///   `nargs` is 0)
/// - `out_handle` must be a valid pointer; on success it receives a handle
///   that must be released with [`xbind_handle_release`] and freed with
///   [`xbind_handle_destroy`]
#[no_mangle]
pub unsafe extern "C" fn xbind_module_instantiate(
    module: *const XbindModule,
    class_name: *const c_char,
    args: *const *const XbindValue,
    nargs: usize,
    out_handle: *mut *mut XbindHandle,
) -> XbindStatus {
    if module.is_null() || out_handle.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let Some(class_name) = cstr(class_name) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let Some(args) = collect_args(args, nargs) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let module = &*module.cast::<Module>();
    match module.instantiate(class_name, &args) {
        Ok(handle) => {
            *out_handle = Box::into_raw(Box::new(handle)).cast::<XbindHandle>();
            XbindStatus::XbindOk
        }
        Err(e) => {
            log::error!("[xbind-c] instantiate '{}' failed: {}", class_name, e);
            status_from(&e)
        }
    }
}

/// Value of `<Class>.<Enum>.<Variant>`
///
/// # Safety
/// - `module` must be a valid pointer
/// - `class_name`, `enum_name`, `variant` must be valid null-terminated
///   C strings
/// - `out_value` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn xbind_module_enum_value(
    module: *const XbindModule,
    class_name: *const c_char,
    enum_name: *const c_char,
    variant: *const c_char,
    out_value: *mut *mut XbindValue,
) -> XbindStatus {
    if module.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let (Some(class_name), Some(enum_name), Some(variant)) =
        (cstr(class_name), cstr(enum_name), cstr(variant))
    else {
        return XbindStatus::XbindInvalidArgument;
    };
    let module = &*module.cast::<Module>();
    match module.enum_value(class_name, enum_name, variant) {
        Ok(value) => value_out(value, out_value),
        Err(e) => status_from(&e),
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Exposed type name of the handle (what the host sees)
///
/// # Safety
/// - `handle` must be a valid pointer
/// - `buf` must point to a buffer of at least `buf_len` bytes
/// - `out_len` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn xbind_handle_type_name(
    handle: *const XbindHandle,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> XbindStatus {
    if handle.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let handle = &*handle.cast::<Handle>();
    write_string(handle.type_name(), buf, buf_len, out_len)
}

/// Invoke a method on a handle
///
/// # Safety
/// - `handle` must be a valid pointer
/// - `name` must be a valid null-terminated C string
/// - `args` must point to `nargs` valid value pointers (or be NULL when
///   `nargs` is 0)
/// - `out_value` must be a valid pointer; on success it receives a value
///   that must be released with [`xbind_value_destroy`]
#[no_mangle]
pub unsafe extern "C" fn xbind_handle_call(
    handle: *const XbindHandle,
    name: *const c_char,
    args: *const *const XbindValue,
    nargs: usize,
    out_value: *mut *mut XbindValue,
) -> XbindStatus {
    if handle.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let Some(name) = cstr(name) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let Some(args) = collect_args(args, nargs) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let handle = &*handle.cast::<Handle>();
    match handle.call(name, &args) {
        Ok(value) => value_out(value, out_value),
        Err(e) => {
            log::error!("[xbind-c] method '{}' failed: {}", name, e);
            status_from(&e)
        }
    }
}

/// Read a property
///
/// # Safety
/// Same contract as [`xbind_handle_call`] without arguments.
#[no_mangle]
pub unsafe extern "C" fn xbind_handle_get(
    handle: *const XbindHandle,
    name: *const c_char,
    out_value: *mut *mut XbindValue,
) -> XbindStatus {
    if handle.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let Some(name) = cstr(name) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let handle = &*handle.cast::<Handle>();
    match handle.get(name) {
        Ok(value) => value_out(value, out_value),
        Err(e) => status_from(&e),
    }
}

/// Write a property
///
/// # Safety
/// - `handle` must be a valid pointer
/// - `name` must be a valid null-terminated C string
/// - `value` must be a valid pointer; it is copied, the caller keeps
///   ownership
#[no_mangle]
pub unsafe extern "C" fn xbind_handle_set(
    handle: *const XbindHandle,
    name: *const c_char,
    value: *const XbindValue,
) -> XbindStatus {
    if handle.is_null() || value.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    let Some(name) = cstr(name) else {
        return XbindStatus::XbindInvalidArgument;
    };
    let handle = &*handle.cast::<Handle>();
    let value = (*value.cast::<Value>()).clone();
    match handle.set(name, value) {
        Ok(()) => XbindStatus::XbindOk,
        Err(e) => status_from(&e),
    }
}

/// Increment the host-side reference count
///
/// # Safety
/// - `handle` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn xbind_handle_retain(handle: *const XbindHandle) -> XbindStatus {
    if handle.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    (*handle.cast::<Handle>()).retain();
    XbindStatus::XbindOk
}

/// Decrement the host-side reference count
///
/// At zero, an Owned handle drops the native instance exactly once.
/// Releasing past zero is a no-op.
///
/// # Safety
/// - `handle` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn xbind_handle_release(handle: *const XbindHandle) -> XbindStatus {
    if handle.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    (*handle.cast::<Handle>()).release();
    XbindStatus::XbindOk
}

/// Whether the native instance behind the handle has been released
///
/// # Safety
/// - `handle` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn xbind_handle_is_released(handle: *const XbindHandle) -> bool {
    if handle.is_null() {
        return true;
    }
    (*handle.cast::<Handle>()).is_released()
}

/// Free the handle wrapper
///
/// Does not touch the host-side reference count; pair each adoption with a
/// [`xbind_handle_release`] before destroying the wrapper.
///
/// # Safety
/// - `handle` must be a valid pointer or NULL
#[no_mangle]
pub unsafe extern "C" fn xbind_handle_destroy(handle: *mut XbindHandle) {
    if !handle.is_null() {
        let _ = Box::from_raw(handle.cast::<Handle>());
    }
}

// =============================================================================
// Value
// =============================================================================

/// Create a null value. Release with [`xbind_value_destroy`].
#[no_mangle]
pub extern "C" fn xbind_value_null() -> *mut XbindValue {
    Box::into_raw(Box::new(Value::Null)).cast::<XbindValue>()
}

/// Create a bool value. Release with [`xbind_value_destroy`].
#[no_mangle]
pub extern "C" fn xbind_value_bool(v: bool) -> *mut XbindValue {
    Box::into_raw(Box::new(Value::Bool(v))).cast::<XbindValue>()
}

/// Create an integer value. Release with [`xbind_value_destroy`].
#[no_mangle]
pub extern "C" fn xbind_value_int(v: i64) -> *mut XbindValue {
    Box::into_raw(Box::new(Value::Int(v))).cast::<XbindValue>()
}

/// Create a float value. Release with [`xbind_value_destroy`].
#[no_mangle]
pub extern "C" fn xbind_value_float(v: f64) -> *mut XbindValue {
    Box::into_raw(Box::new(Value::Float(v))).cast::<XbindValue>()
}

/// Create a string value. Release with [`xbind_value_destroy`].
///
/// # Safety
/// - `s` must be a valid null-terminated C string (UTF-8)
///
/// # Returns
/// Value handle, or NULL if `s` is NULL or not valid UTF-8
#[no_mangle]
pub unsafe extern "C" fn xbind_value_string(s: *const c_char) -> *mut XbindValue {
    let Some(s) = cstr(s) else {
        return ptr::null_mut();
    };
    Box::into_raw(Box::new(Value::Str(s.to_string()))).cast::<XbindValue>()
}

/// Kind tag of a value
///
/// # Safety
/// - `value` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn xbind_value_kind(value: *const XbindValue) -> XbindValueKind {
    if value.is_null() {
        return XbindValueKind::XbindValueNull;
    }
    match (*value.cast::<Value>()).kind() {
        ValueKind::Null => XbindValueKind::XbindValueNull,
        ValueKind::Bool => XbindValueKind::XbindValueBool,
        ValueKind::Int => XbindValueKind::XbindValueInt,
        ValueKind::Float => XbindValueKind::XbindValueFloat,
        ValueKind::Str => XbindValueKind::XbindValueStr,
        ValueKind::Enum => XbindValueKind::XbindValueEnum,
        ValueKind::Object => XbindValueKind::XbindValueObject,
    }
}

/// Extract a bool
///
/// # Safety
/// - `value` and `out` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn xbind_value_as_bool(
    value: *const XbindValue,
    out: *mut bool,
) -> XbindStatus {
    if value.is_null() || out.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    match (*value.cast::<Value>()).as_bool() {
        Some(v) => {
            *out = v;
            XbindStatus::XbindOk
        }
        None => XbindStatus::XbindTypeMismatch,
    }
}

/// Extract an integer
///
/// # Safety
/// - `value` and `out` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn xbind_value_as_int(
    value: *const XbindValue,
    out: *mut i64,
) -> XbindStatus {
    if value.is_null() || out.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    match (*value.cast::<Value>()).as_int() {
        Some(v) => {
            *out = v;
            XbindStatus::XbindOk
        }
        None => XbindStatus::XbindTypeMismatch,
    }
}

/// Extract a float
///
/// # Safety
/// - `value` and `out` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn xbind_value_as_float(
    value: *const XbindValue,
    out: *mut f64,
) -> XbindStatus {
    if value.is_null() || out.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    match (*value.cast::<Value>()).as_float() {
        Some(v) => {
            *out = v;
            XbindStatus::XbindOk
        }
        None => XbindStatus::XbindTypeMismatch,
    }
}

/// Extract a string into a caller buffer
///
/// # Safety
/// - `value` must be a valid pointer
/// - `buf` must point to a buffer of at least `buf_len` bytes
/// - `out_len` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn xbind_value_as_string(
    value: *const XbindValue,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> XbindStatus {
    if value.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    match (*value.cast::<Value>()).as_str() {
        Some(s) => write_string(s, buf, buf_len, out_len),
        None => XbindStatus::XbindTypeMismatch,
    }
}

/// Extract an object handle
///
/// The returned wrapper shares the same underlying handle state (the host
/// refcount is not incremented; call [`xbind_handle_retain`] if the object
/// should outlive the value). Free the wrapper with
/// [`xbind_handle_destroy`].
///
/// # Safety
/// - `value` and `out_handle` must be valid pointers
#[no_mangle]
pub unsafe extern "C" fn xbind_value_as_object(
    value: *const XbindValue,
    out_handle: *mut *mut XbindHandle,
) -> XbindStatus {
    if value.is_null() || out_handle.is_null() {
        return XbindStatus::XbindInvalidArgument;
    }
    match (*value.cast::<Value>()).as_object() {
        Some(handle) => {
            *out_handle = Box::into_raw(Box::new(handle.clone())).cast::<XbindHandle>();
            XbindStatus::XbindOk
        }
        None => XbindStatus::XbindTypeMismatch,
    }
}

/// Destroy a value
///
/// # Safety
/// - `value` must be a valid pointer or NULL
#[no_mangle]
pub unsafe extern "C" fn xbind_value_destroy(value: *mut XbindValue) {
    if !value.is_null() {
        let _ = Box::from_raw(value.cast::<Value>());
    }
}
