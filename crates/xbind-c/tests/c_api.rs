// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 xbind contributors

//! Exercises the C ABI surface the way a C host would: everything goes
//! through the `extern "C"` entry points, with raw pointers and caller
//! buffers.

use std::any::Any;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use xbind::{
    receiver_mut, receiver_ref, Exposed, Module, Param, TypeDescriptorBuilder, TypeId, Value,
    ValueKind,
};
use xbind_c::*;

struct Greeter {
    greeting: String,
}

impl Exposed for Greeter {
    fn runtime_type_id(&self) -> TypeId {
        TypeId::from_type_name("demo.Greeter")
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn demo_module() -> *mut XbindModule {
    let module = Module::builder("demo")
        .doc("A demo module.")
        .attr("version", Value::Int(1))
        .function(
            "add",
            "Add two integers.",
            vec![
                Param::new("i", ValueKind::Int),
                Param::new("j", ValueKind::Int),
            ],
            |args| {
                Ok(Value::Int(
                    args[0].as_int().unwrap_or(0) + args[1].as_int().unwrap_or(0),
                ))
            },
        )
        .class(
            TypeDescriptorBuilder::new("demo.Greeter", "Greeter")
                .constructor(
                    vec![Param::with_default(
                        "greeting",
                        ValueKind::Str,
                        Value::Str("hello".to_string()),
                    )],
                    |args| {
                        Ok(Box::new(Greeter {
                            greeting: args[0].as_str().unwrap_or_default().to_string(),
                        }) as Box<dyn Exposed>)
                    },
                )
                .method(
                    "greet",
                    "Greet a name.",
                    vec![Param::new("name", ValueKind::Str)],
                    |recv, args| {
                        let greeter = receiver_ref::<Greeter>(recv, "demo.Greeter")?;
                        Ok(Value::Str(format!(
                            "{}, {}!",
                            greeter.greeting,
                            args[0].as_str().unwrap_or_default()
                        )))
                    },
                )
                .property(
                    "greeting",
                    "Current greeting.",
                    |recv| {
                        let greeter = receiver_ref::<Greeter>(recv, "demo.Greeter")?;
                        Ok(Value::Str(greeter.greeting.clone()))
                    },
                    |recv, value| {
                        let greeter = receiver_mut::<Greeter>(recv, "demo.Greeter")?;
                        greeter.greeting = value.as_str().unwrap_or_default().to_string();
                        Ok(())
                    },
                )
                .build(),
        )
        .unwrap()
        .build();

    module_into_raw(module)
}

unsafe fn read_string(value: *const XbindValue) -> String {
    let mut buf = [0 as c_char; 256];
    let mut len = 0usize;
    let status = xbind_value_as_string(value, buf.as_mut_ptr(), buf.len(), &mut len);
    assert_eq!(status, XbindStatus::XbindOk);
    let bytes: Vec<u8> = buf[..len].iter().map(|&c| c as u8).collect();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_module_name_and_buffer_too_small() {
    unsafe {
        let module = demo_module();

        let mut buf = [0 as c_char; 64];
        let mut len = 0usize;
        let status = xbind_module_name(module, buf.as_mut_ptr(), buf.len(), &mut len);
        assert_eq!(status, XbindStatus::XbindOk);
        assert_eq!(len, 4);

        // A 4-byte buffer has no room for the terminator.
        let mut small = [0 as c_char; 4];
        let status = xbind_module_name(module, small.as_mut_ptr(), small.len(), &mut len);
        assert_eq!(status, XbindStatus::XbindBufferTooSmall);
        assert_eq!(len, 4);

        xbind_module_destroy(module);
    }
}

#[test]
fn test_function_call_through_ffi() {
    unsafe {
        let module = demo_module();
        let name = CString::new("add").unwrap();

        let a = xbind_value_int(2);
        let b = xbind_value_int(3);
        let args = [a as *const XbindValue, b as *const XbindValue];
        let mut out: *mut XbindValue = ptr::null_mut();

        let status = xbind_module_call(module, name.as_ptr(), args.as_ptr(), 2, &mut out);
        assert_eq!(status, XbindStatus::XbindOk);

        let mut sum = 0i64;
        assert_eq!(xbind_value_as_int(out, &mut sum), XbindStatus::XbindOk);
        assert_eq!(sum, 5);

        xbind_value_destroy(out);
        xbind_value_destroy(a);
        xbind_value_destroy(b);
        xbind_module_destroy(module);
    }
}

#[test]
fn test_unknown_function_is_not_found() {
    unsafe {
        let module = demo_module();
        let name = CString::new("missing").unwrap();
        let mut out: *mut XbindValue = ptr::null_mut();

        let status = xbind_module_call(module, name.as_ptr(), ptr::null(), 0, &mut out);
        assert_eq!(status, XbindStatus::XbindNotFound);
        assert!(out.is_null());

        xbind_module_destroy(module);
    }
}

#[test]
fn test_instantiate_and_dispatch() {
    unsafe {
        let module = demo_module();
        let class = CString::new("Greeter").unwrap();

        // Constructor default fills the omitted greeting.
        let mut handle: *mut XbindHandle = ptr::null_mut();
        let status = xbind_module_instantiate(module, class.as_ptr(), ptr::null(), 0, &mut handle);
        assert_eq!(status, XbindStatus::XbindOk);

        let mut buf = [0 as c_char; 64];
        let mut len = 0usize;
        assert_eq!(
            xbind_handle_type_name(handle, buf.as_mut_ptr(), buf.len(), &mut len),
            XbindStatus::XbindOk
        );
        assert_eq!(len, 7); // "Greeter"

        // Method call.
        let greet = CString::new("greet").unwrap();
        let world = CString::new("World").unwrap();
        let arg = xbind_value_string(world.as_ptr());
        let args = [arg as *const XbindValue];
        let mut out: *mut XbindValue = ptr::null_mut();
        let status = xbind_handle_call(handle, greet.as_ptr(), args.as_ptr(), 1, &mut out);
        assert_eq!(status, XbindStatus::XbindOk);
        assert_eq!(read_string(out), "hello, World!");
        xbind_value_destroy(out);
        xbind_value_destroy(arg);

        // Property write then read.
        let prop = CString::new("greeting").unwrap();
        let hi = CString::new("hi").unwrap();
        let new_value = xbind_value_string(hi.as_ptr());
        assert_eq!(
            xbind_handle_set(handle, prop.as_ptr(), new_value),
            XbindStatus::XbindOk
        );
        xbind_value_destroy(new_value);

        let mut got: *mut XbindValue = ptr::null_mut();
        assert_eq!(
            xbind_handle_get(handle, prop.as_ptr(), &mut got),
            XbindStatus::XbindOk
        );
        assert_eq!(read_string(got), "hi");
        xbind_value_destroy(got);

        // Unknown attribute.
        let bark = CString::new("bark").unwrap();
        let mut out: *mut XbindValue = ptr::null_mut();
        assert_eq!(
            xbind_handle_call(handle, bark.as_ptr(), ptr::null(), 0, &mut out),
            XbindStatus::XbindNotFound
        );

        xbind_handle_release(handle);
        xbind_handle_destroy(handle);
        xbind_module_destroy(module);
    }
}

#[test]
fn test_release_is_idempotent_through_ffi() {
    unsafe {
        let module = demo_module();
        let class = CString::new("Greeter").unwrap();

        let mut handle: *mut XbindHandle = ptr::null_mut();
        assert_eq!(
            xbind_module_instantiate(module, class.as_ptr(), ptr::null(), 0, &mut handle),
            XbindStatus::XbindOk
        );

        assert!(!xbind_handle_is_released(handle));
        assert_eq!(xbind_handle_release(handle), XbindStatus::XbindOk);
        assert!(xbind_handle_is_released(handle));
        // Double release is a no-op, not a crash or error.
        assert_eq!(xbind_handle_release(handle), XbindStatus::XbindOk);

        // Use after release surfaces as a status code.
        let greet = CString::new("greet").unwrap();
        let mut out: *mut XbindValue = ptr::null_mut();
        assert_eq!(
            xbind_handle_call(handle, greet.as_ptr(), ptr::null(), 0, &mut out),
            XbindStatus::XbindInstanceReleased
        );

        xbind_handle_destroy(handle);
        xbind_module_destroy(module);
    }
}

#[test]
fn test_null_safety() {
    unsafe {
        // Destroy of NULL is a no-op.
        xbind_module_destroy(ptr::null_mut());
        xbind_handle_destroy(ptr::null_mut());
        xbind_value_destroy(ptr::null_mut());

        let mut out: *mut XbindValue = ptr::null_mut();
        assert_eq!(
            xbind_module_call(ptr::null(), ptr::null(), ptr::null(), 0, &mut out),
            XbindStatus::XbindInvalidArgument
        );
        assert_eq!(
            xbind_handle_release(ptr::null()),
            XbindStatus::XbindInvalidArgument
        );
    }
}

#[test]
fn test_value_kind_and_mismatch() {
    unsafe {
        let v = xbind_value_int(7);
        assert_eq!(xbind_value_kind(v), XbindValueKind::XbindValueInt);

        let mut b = false;
        assert_eq!(
            xbind_value_as_bool(v, &mut b),
            XbindStatus::XbindTypeMismatch
        );
        xbind_value_destroy(v);
    }
}

#[test]
fn test_module_attr() {
    unsafe {
        let module = demo_module();
        let name = CString::new("version").unwrap();
        let mut out: *mut XbindValue = ptr::null_mut();
        assert_eq!(
            xbind_module_attr(module, name.as_ptr(), &mut out),
            XbindStatus::XbindOk
        );
        let mut v = 0i64;
        assert_eq!(xbind_value_as_int(out, &mut v), XbindStatus::XbindOk);
        assert_eq!(v, 1);
        xbind_value_destroy(out);
        xbind_module_destroy(module);
    }
}
