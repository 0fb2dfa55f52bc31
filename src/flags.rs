// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

//! Combinable option words passed straight through to the OS.
//!
//! Every type here is a closed set of named bits over `u32` combined with `|`. Nothing
//! checks whether a combination makes sense to the receiving API (two button sets, a
//! data-file mapping with search-path flags, ...); the OS decides what it accepts.

use bitflags::bitflags;

#[cfg(windows)]
bitflags! {
	/// Loader options for [`Module::load_with`](crate::Module::load_with).
	///
	/// These are the `dwFlags` values of `LoadLibraryExW`.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
	#[repr(transparent)]
	pub struct LoadFlags: u32 {
		/// Map the module without running its entry point or resolving its imports.
		const DONT_RESOLVE_DLL_REFERENCES = 0x00000001;
		/// Map the file as data only. Nothing in it may be executed.
		const LOAD_LIBRARY_AS_DATAFILE = 0x00000002;
		const LOAD_WITH_ALTERED_SEARCH_PATH = 0x00000008;
		const LOAD_IGNORE_CODE_AUTHZ_LEVEL = 0x00000010;
		const LOAD_LIBRARY_AS_IMAGE_RESOURCE = 0x00000020;
		const LOAD_LIBRARY_AS_DATAFILE_EXCLUSIVE = 0x00000040;
		const LOAD_LIBRARY_REQUIRE_SIGNED_TARGET = 0x00000080;
		const LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR = 0x00000100;
		const LOAD_LIBRARY_SEARCH_APPLICATION_DIR = 0x00000200;
		const LOAD_LIBRARY_SEARCH_USER_DIRS = 0x00000400;
		const LOAD_LIBRARY_SEARCH_SYSTEM32 = 0x00000800;
		/// Application dir, system32 and user dirs.
		const LOAD_LIBRARY_SEARCH_DEFAULT_DIRS = 0x00001000;
	}
}

#[cfg(unix)]
bitflags! {
	/// Loader options for [`Module::load_with`](crate::Module::load_with).
	///
	/// These are the `mode` bits of `dlopen`. When neither `LAZY` nor `NOW` is given,
	/// `NOW` is implied.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
	#[repr(transparent)]
	pub struct LoadFlags: u32 {
		/// Resolve function references on first call instead of at load time.
		const LAZY = libc::RTLD_LAZY as u32;
		const NOW = libc::RTLD_NOW as u32;
		/// Make the module's symbols available to modules loaded afterwards.
		const GLOBAL = libc::RTLD_GLOBAL as u32;
		// zero on linux, so it never shows up in `iter_names` there.
		const LOCAL = libc::RTLD_LOCAL as u32;
		/// Only succeed if the module is already resident.
		const NOLOAD = libc::RTLD_NOLOAD as u32;
		/// Never unmap the module, even when its reference count drops to zero.
		const NODELETE = libc::RTLD_NODELETE as u32;
	}
}

bitflags! {
	/// Style word of the message box dialog (`uType` of `MessageBoxW`).
	///
	/// Button sets and icons are small integers rather than single bits, so OR-ing two
	/// of them produces a different member of the set. That is the Win32 contract and it
	/// is not second-guessed here.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
	#[repr(transparent)]
	pub struct MessageBoxStyle: u32 {
		const OK = 0x00000000;
		const OKCANCEL = 0x00000001;
		const ABORTRETRYIGNORE = 0x00000002;
		const YESNOCANCEL = 0x00000003;
		const YESNO = 0x00000004;
		const RETRYCANCEL = 0x00000005;
		const CANCELTRYCONTINUE = 0x00000006;

		const ICONHAND = 0x00000010;
		const ICONQUESTION = 0x00000020;
		const ICONEXCLAMATION = 0x00000030;
		const ICONASTERISK = 0x00000040;

		const DEFBUTTON2 = 0x00000100;
		const DEFBUTTON3 = 0x00000200;
		const DEFBUTTON4 = 0x00000300;

		const SYSTEMMODAL = 0x00001000;
		const TASKMODAL = 0x00002000;

		const SETFOREGROUND = 0x00010000;
		const TOPMOST = 0x00040000;
		const RIGHT = 0x00080000;
	}
}

impl MessageBoxStyle {
	pub const ICONERROR: Self = Self::ICONHAND;
	pub const ICONWARNING: Self = Self::ICONEXCLAMATION;
	pub const ICONINFORMATION: Self = Self::ICONASTERISK;
}

/// Button the user dismissed a dialog with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DialogResult {
	OK = 1,
	CANCEL = 2,
	ABORT = 3,
	RETRY = 4,
	IGNORE = 5,
	YES = 6,
	NO = 7,
	TRYAGAIN = 10,
	CONTINUE = 11,
}

impl TryFrom<i32> for DialogResult {
	/// The raw code, which is `0` when the dialog could not be created.
	type Error = i32;

	fn try_from(value: i32) -> Result<Self, Self::Error> {
		Ok(match value {
			1 => Self::OK,
			2 => Self::CANCEL,
			3 => Self::ABORT,
			4 => Self::RETRY,
			5 => Self::IGNORE,
			6 => Self::YES,
			7 => Self::NO,
			10 => Self::TRYAGAIN,
			11 => Self::CONTINUE,
			other => return Err(other),
		})
	}
}

impl From<DialogResult> for i32 {
	#[inline]
	fn from(value: DialogResult) -> Self {
		value as i32
	}
}
