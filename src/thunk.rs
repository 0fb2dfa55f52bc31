// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

use std::marker::PhantomData;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::error::ResolveError;
use crate::sym::AssertSize;
use crate::sync::LibLock;

#[derive(Debug, Clone, Copy)]
enum Source {
	// slot was filled in at link time.
	Fixed,
	Library(&'static LibLock<'static>),
}

/// One resolved function-pointer slot.
///
/// `F` is the function pointer type being forwarded to. Calls read the slot exactly once;
/// the slot is written at most once, when it is resolved, and never changes afterwards.
///
/// Usually generated by [`thunk`](crate::thunk), but it works without the macro too.
///
/// There is no locking. If [`resolve`](Thunk::resolve) runs on several threads at once,
/// each does its own lookup and the first to publish wins; all of them return the
/// published pointer.
///
/// The slot is the first field so that tail-jump entry points can address it directly.
#[repr(C)]
pub struct Thunk<F> {
	slot: AtomicPtr<()>,
	init: *mut (),
	name: &'static str,
	source: Source,
	_marker: PhantomData<F>,
}

// `init` is only compared against, never dereferenced.
unsafe impl<F> Sync for Thunk<F> {}
unsafe impl<F> Send for Thunk<F> {}

impl<F: Copy> AssertSize<*mut (), F> for Thunk<F> {}

impl<F: Copy> Thunk<F> {
	/// A slot bound at link time. `target` is `F` cast to a raw pointer, e.g.
	/// `libc::abs as unsafe extern "C" fn(c_int) -> c_int as *mut ()`.
	///
	/// It is resolved from the start and never looked up.
	pub const fn fixed(target: *mut ()) -> Self {
		Self {
			slot: AtomicPtr::new(target),
			init: ptr::null_mut(),
			name: "",
			source: Source::Fixed,
			_marker: PhantomData,
		}
	}

	/// A slot that starts out pointing at `init`, a function of type `F` that resolves
	/// the thunk and forwards the call.
	///
	/// The first call therefore does the one lookup, and every later call goes straight
	/// to `name` in `library`.
	pub const fn lazy(init: *mut (), name: &'static str, library: &'static LibLock<'static>) -> Self {
		Self {
			slot: AtomicPtr::new(init),
			init,
			name,
			source: Source::Library(library),
			_marker: PhantomData,
		}
	}

	/// A slot that stays empty until [`resolve`](Thunk::resolve) is called.
	pub const fn explicit(name: &'static str, library: &'static LibLock<'static>) -> Self {
		Self::lazy(ptr::null_mut(), name, library)
	}

	/// Reads the slot.
	///
	/// # Safety
	/// For a thunk made with [`explicit`](Thunk::explicit), [`resolve`](Thunk::resolve)
	/// must have succeeded before this call, and that must happen-before it on this thread.
	#[inline(always)]
	pub unsafe fn get(&self) -> F {
		#[allow(clippy::let_unit_value)]
		let _ = <Self as AssertSize<*mut (), F>>::ASSERT_SIZE;
		let addr = self.slot.load(Ordering::Acquire);
		debug_assert!(!addr.is_null(), "thunk `{}` called before it was resolved", self.name);
		mem::transmute_copy(&addr)
	}

	/// Looks the target up if that has not happened yet and publishes it in the slot.
	///
	/// # Errors
	/// The library could not be loaded, or does not export the symbol. The slot keeps its
	/// initial value in both cases.
	pub fn resolve(&self) -> Result<F, ResolveError> {
		let current = self.slot.load(Ordering::Acquire);
		let library = match self.source {
			Source::Library(library) if self.is_unresolved(current) => library,
			_ => return Ok(unsafe { self.get() }),
		};
		let module = library
			.module()
			.ok_or(ResolveError::LibraryUnavailable(self.name))?;
		let symbol = module
			.proc_address(self.name)
			.ok_or(ResolveError::SymbolNotFound(self.name))?;
		// a racing thread may have published first; either way the slot now holds the target.
		let _ = self.slot.compare_exchange(
			current,
			symbol.cast(),
			Ordering::AcqRel,
			Ordering::Acquire,
		);
		Ok(unsafe { self.get() })
	}

	/// Returns `true` once the slot holds the real target.
	#[inline]
	pub fn is_resolved(&self) -> bool {
		!self.is_unresolved(self.slot.load(Ordering::Acquire))
	}

	/// The symbol this thunk forwards to. Empty for link-time bound thunks.
	#[inline]
	pub const fn name(&self) -> &'static str {
		self.name
	}

	#[inline]
	fn is_unresolved(&self, addr: *mut ()) -> bool {
		addr.is_null() || addr == self.init
	}
}

impl<F> std::fmt::Debug for Thunk<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Thunk")
			.field("name", &self.name)
			.field("slot", &self.slot.load(Ordering::Relaxed))
			.field("source", &self.source)
			.finish()
	}
}

#[cfg(all(test, unix))]
mod tests {
	use super::*;
	use std::ffi::{c_char, c_int};

	type AbsFn = unsafe extern "C" fn(c_int) -> c_int;

	static THIS: LibLock = LibLock::new(&[]);

	#[test]
	fn test_fixed_is_resolved() {
		static ABS: Thunk<AbsFn> = Thunk::fixed(libc::abs as AbsFn as *mut ());
		assert!(ABS.is_resolved());
		assert_eq!(ABS.name(), "");
		let f = ABS.resolve().unwrap();
		assert_eq!(unsafe { f(-9) }, 9);
		assert_eq!(unsafe { ABS.get()(-4) }, 4);
	}

	#[test]
	fn test_explicit_resolves_once() {
		static ATOI: Thunk<unsafe extern "C" fn(*const c_char) -> c_int> =
			Thunk::explicit("atoi", &THIS);
		assert!(!ATOI.is_resolved());
		let first = ATOI.resolve().unwrap();
		assert!(ATOI.is_resolved());
		let second = ATOI.resolve().unwrap();
		assert_eq!(first as usize, second as usize);
		assert_eq!(unsafe { ATOI.get()(b"42\0".as_ptr().cast()) }, 42);
	}

	#[test]
	fn test_missing_symbol_leaves_slot_empty() {
		static MISSING: Thunk<AbsFn> = Thunk::explicit("modlink_missing_symbol", &THIS);
		assert_eq!(
			MISSING.resolve().unwrap_err(),
			ResolveError::SymbolNotFound("modlink_missing_symbol")
		);
		assert!(!MISSING.is_resolved());
	}

	#[test]
	fn test_missing_library() {
		static NOWHERE: LibLock = LibLock::new(&["modlink-no-such-library"]);
		static ABS: Thunk<AbsFn> = Thunk::explicit("abs", &NOWHERE);
		assert_eq!(ABS.resolve().unwrap_err(), ResolveError::LibraryUnavailable("abs"));
	}
}
