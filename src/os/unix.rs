// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use super::Handle;
use std::ffi::{self, c_int};
use std::ptr;

// None of these consult `dlerror`. Its state is thread-local at best and process-wide on
// some libcs, and failures are reported to callers as null/false anyway.

#[inline]
pub(crate) unsafe fn dylib_open(name: &ffi::CStr, flags: c_int) -> Handle {
	libc::dlopen(name.as_ptr(), flags)
}

#[inline]
pub(crate) unsafe fn dylib_this() -> Handle {
	libc::dlopen(ptr::null(), libc::RTLD_NOW)
}

#[inline]
pub(crate) unsafe fn dylib_close(handle: Handle) -> bool {
	libc::dlclose(handle) == 0
}

#[inline]
pub(crate) unsafe fn dylib_symbol(handle: Handle, name: &ffi::CStr) -> *mut ffi::c_void {
	libc::dlsym(handle, name.as_ptr())
}

// `RTLD_NOLOAD` still bumps the reference count when it succeeds, so it is dropped again
// before returning.
pub(crate) unsafe fn dylib_is_loaded(name: &ffi::CStr) -> bool {
	let handle = libc::dlopen(name.as_ptr(), libc::RTLD_LAZY | libc::RTLD_NOLOAD);
	if handle.is_null() {
		false
	} else {
		let _ = libc::dlclose(handle);
		true
	}
}

/// The loader rejects a request without a binding mode, so `RTLD_NOW` is implied.
#[inline]
pub(crate) const fn native_flags(flags: c_int) -> c_int {
	if flags & (libc::RTLD_LAZY | libc::RTLD_NOW) == 0 {
		flags | libc::RTLD_NOW
	} else {
		flags
	}
}

pub(crate) const DEFAULT_FLAGS: c_int = libc::RTLD_NOW | libc::RTLD_LOCAL;
