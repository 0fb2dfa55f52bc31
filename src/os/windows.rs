// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use std::os::windows::ffi::OsStrExt;
use std::{ffi, ptr};

use super::Handle;

pub(crate) mod c;

pub(crate) fn to_wide(path: &ffi::OsStr) -> Vec<u16> {
	path.encode_wide().chain(std::iter::once(0u16)).collect()
}

#[inline]
pub(crate) unsafe fn dylib_open(path: &ffi::OsStr, flags: u32) -> Handle {
	let wide_str: Vec<u16> = to_wide(path);
	c::LoadLibraryExW(wide_str.as_ptr(), ptr::null_mut(), flags)
}

#[inline]
pub(crate) unsafe fn dylib_this() -> Handle {
	c::GetModuleHandleW(ptr::null())
}

#[inline]
pub(crate) unsafe fn dylib_close(handle: Handle) -> bool {
	c::FreeLibrary(handle) != 0
}

#[inline]
pub(crate) unsafe fn dylib_symbol(handle: Handle, name: &ffi::CStr) -> *mut ffi::c_void {
	c::GetProcAddress(handle, name.as_ptr())
}

pub(crate) unsafe fn dylib_is_loaded(path: &ffi::OsStr) -> bool {
	let wide_str: Vec<u16> = to_wide(path);
	let mut handle = ptr::null_mut();
	c::GetModuleHandleExW(
		c::GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
		wide_str.as_ptr(),
		&mut handle,
	) != 0
}

pub(crate) const DEFAULT_FLAGS: u32 = 0;
