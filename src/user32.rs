// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

//! Message boxes through thunks into `user32.dll`.

use std::ffi::{self, CStr, OsStr};
use std::ptr;

use crate::os::imp::to_wide;
use crate::{thunk, DialogResult, LibLock, MessageBoxStyle};

/// Handle of an owner window (`HWND`). Only ever handed back to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Window(ptr::NonNull<ffi::c_void>);

impl Window {
	/// # Safety
	/// `hwnd` must be null or a window handle.
	#[inline]
	pub unsafe fn from_raw(hwnd: *mut ffi::c_void) -> Option<Self> {
		ptr::NonNull::new(hwnd).map(Self)
	}

	#[inline]
	pub const fn as_raw(self) -> *mut ffi::c_void {
		self.0.as_ptr()
	}
}

pub static USER32: LibLock = LibLock::new(&["user32.dll"]);

// `Option<Window>` has the layout of a nullable `HWND`.
#[thunk(library = USER32, naked)]
extern "system" {
	pub fn MessageBoxA(
		owner: Option<Window>,
		text: *const ffi::c_char,
		caption: *const ffi::c_char,
		style: MessageBoxStyle,
	) -> i32;
	pub fn MessageBoxW(
		owner: Option<Window>,
		text: *const u16,
		caption: *const u16,
		style: MessageBoxStyle,
	) -> i32;
}

/// Shows a modal message box and waits for it to be dismissed.
///
/// Returns the button that closed it, or `None` if `user32.dll` is unavailable or the
/// dialog could not be created. Text stops at the first NUL.
pub fn msg_box(
	owner: Option<Window>,
	text: &str,
	caption: &str,
	style: MessageBoxStyle,
) -> Option<DialogResult> {
	USER32.proc_address("MessageBoxW")?;
	let text = to_wide(OsStr::new(text));
	let caption = to_wide(OsStr::new(caption));
	let code = unsafe { MessageBoxW(owner, text.as_ptr(), caption.as_ptr(), style) };
	DialogResult::try_from(code).ok()
}

/// [`msg_box`] with text in the active code page.
pub fn msg_box_ansi(
	owner: Option<Window>,
	text: &CStr,
	caption: &CStr,
	style: MessageBoxStyle,
) -> Option<DialogResult> {
	USER32.proc_address("MessageBoxA")?;
	let code = unsafe { MessageBoxA(owner, text.as_ptr(), caption.as_ptr(), style) };
	DialogResult::try_from(code).ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::mem;

	#[test]
	fn test_window_is_nullable_hwnd() {
		assert_eq!(mem::size_of::<Option<Window>>(), mem::size_of::<*mut ffi::c_void>());
		assert!(unsafe { Window::from_raw(ptr::null_mut()) }.is_none());
	}

	#[test]
	fn test_user32_exports_message_boxes() {
		assert!(USER32.proc_address("MessageBoxA").is_some());
		assert!(USER32.proc_address("MessageBoxW").is_some());
	}
}
