// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use std::{ffi, fmt, mem, ptr};

// Post-monomorphization check that `U` can stand in for a raw address.
pub(crate) trait AssertSize<T, U> {
	const ASSERT_SIZE: () = assert!(mem::size_of::<T>() == mem::size_of::<U>());
}

/// Address of an exported symbol, as returned by [`Module::proc_address`](crate::Module::proc_address).
///
/// The address stays meaningful only while the module it came from is loaded.
#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Symbol(ptr::NonNull<ffi::c_void>);

// plain address, nothing is reachable through it without `unsafe`.
unsafe impl Send for Symbol {}
unsafe impl Sync for Symbol {}

impl<F: Copy> AssertSize<*mut ffi::c_void, F> for Symbol {}

impl Symbol {
	#[inline]
	pub(crate) fn new(addr: *mut ffi::c_void) -> Option<Self> {
		ptr::NonNull::new(addr).map(Self)
	}

	/// Casts to a pointer of another type.
	#[inline]
	pub const fn cast<T>(self) -> *mut T {
		self.0.as_ptr().cast()
	}

	#[inline]
	pub const fn as_ptr(self) -> *mut ffi::c_void {
		self.0.as_ptr()
	}

	/// Reinterprets the address as a function pointer (or any other pointer-sized `Copy` type).
	///
	/// # Safety
	/// `F` must match the signature and calling convention of the exported function, and
	/// the module must stay loaded for as long as the result is called.
	#[inline]
	pub unsafe fn to_fn<F: Copy>(self) -> F {
		#[allow(clippy::let_unit_value)]
		let _ = <Self as AssertSize<*mut ffi::c_void, F>>::ASSERT_SIZE;
		mem::transmute_copy(&self.0)
	}
}

impl fmt::Debug for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Symbol").field(&self.0.as_ptr()).finish()
	}
}

impl fmt::Pointer for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Pointer::fmt(&self.0, f)
	}
}
