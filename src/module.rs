// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use std::ffi::{self, OsStr};
use std::ptr;

use crate::flags::LoadFlags;
use crate::os::imp;
use crate::sym::{AssertSize, Symbol};

/// An open shared library, represented by the OS loader's own handle.
///
/// `Module` is the raw handle and nothing else: it is pointer-sized, `Copy`, and
/// [`as_raw`](Module::as_raw) hands back the exact bits the loader returned. Ownership of
/// the loader's reference is conceptual. Whoever called [`load`](Module::load) must call
/// [`free`](Module::free) exactly once, and no copy may be used afterwards.
///
/// Every operation reports failure as `None`/`false` and never panics.
///
/// # Examples
///
/// ```no_run
/// use modlink::Module;
///
/// if let Some(lib) = Module::load("libm.so.6") {
///     let cos = lib.proc_address("cos");
///     assert!(cos.is_some());
///     unsafe { lib.free() };
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Module(ptr::NonNull<ffi::c_void>);

// The handle is an immutable token; the loader state behind it is the OS's to synchronize.
unsafe impl Send for Module {}
unsafe impl Sync for Module {}

impl<F: Copy> AssertSize<*mut ffi::c_void, F> for Module {}

#[cfg(unix)]
fn native_name(name: &OsStr) -> Option<ffi::CString> {
	use std::os::unix::ffi::OsStrExt;
	ffi::CString::new(name.as_bytes()).ok()
}

#[cfg(windows)]
fn native_name(name: &OsStr) -> Option<&OsStr> {
	use std::os::windows::ffi::OsStrExt;
	if name.encode_wide().any(|c| c == 0) {
		None
	} else {
		Some(name)
	}
}

impl Module {
	/// Asks the loader to map `name` with the platform's default options.
	///
	/// Returns `None` if the module cannot be found or mapped.
	#[inline]
	pub fn load<P: AsRef<OsStr>>(name: P) -> Option<Self> {
		Self::open_native(name.as_ref(), imp::DEFAULT_FLAGS)
	}

	/// Like [`load`](Module::load), with explicit loader options.
	///
	/// # Unix Platform
	///
	/// If neither [`LoadFlags::LAZY`] nor [`LoadFlags::NOW`] is set, `NOW` is implied.
	#[inline]
	pub fn load_with<P: AsRef<OsStr>>(name: P, flags: LoadFlags) -> Option<Self> {
		#[cfg(unix)]
		let flags = imp::native_flags(flags.bits() as ffi::c_int);
		#[cfg(windows)]
		let flags = flags.bits();
		Self::open_native(name.as_ref(), flags)
	}

	#[cfg(unix)]
	fn open_native(name: &OsStr, flags: ffi::c_int) -> Option<Self> {
		let c_str = native_name(name)?;
		unsafe { Self::from_raw(imp::dylib_open(&c_str, flags)) }
	}

	#[cfg(windows)]
	fn open_native(name: &OsStr, flags: u32) -> Option<Self> {
		let name = native_name(name)?;
		unsafe { Self::from_raw(imp::dylib_open(name, flags)) }
	}

	/// Handle to the running executable image.
	///
	/// Lookups through it see the symbols of the program and, on unix, of every module
	/// loaded with global visibility. It was not obtained through [`load`](Module::load)
	/// and must not be passed to [`free`](Module::free).
	///
	/// `None` only if the loader refuses a handle for the main image.
	#[inline]
	pub fn this() -> Option<Self> {
		unsafe { Self::from_raw(imp::dylib_this()) }
	}

	/// Returns `true` if `name` is already mapped into the process.
	///
	/// Reference counts are left as they were.
	pub fn is_loaded<P: AsRef<OsStr>>(name: P) -> bool {
		match native_name(name.as_ref()) {
			#[cfg(unix)]
			Some(c_str) => unsafe { imp::dylib_is_loaded(&c_str) },
			#[cfg(windows)]
			Some(name) => unsafe { imp::dylib_is_loaded(name) },
			None => false,
		}
	}

	/// Drops the caller's reference to the module, unmapping it once no reference remains.
	///
	/// Returns `true` on success.
	///
	/// # Safety
	/// Every copy of this handle is dangling afterwards, as is every [`Symbol`] and function
	/// pointer obtained through it. Freeing twice, or freeing [`Module::this`], is undefined.
	#[inline]
	pub unsafe fn free(self) -> bool {
		imp::dylib_close(self.0.as_ptr())
	}

	/// Looks up an exported symbol. `None` if the module does not export `name`.
	pub fn proc_address(self, name: &str) -> Option<Symbol> {
		let c_str = ffi::CString::new(name).ok()?;
		Symbol::new(unsafe { imp::dylib_symbol(self.0.as_ptr(), &c_str) })
	}

	/// Looks up an exported function and returns it as `F`.
	///
	/// `F` must be pointer-sized, which is checked at compile time.
	///
	/// # Safety
	/// `F` must describe the real signature and calling convention of the export.
	///
	/// # Examples
	///
	/// ```no_run
	/// use modlink::Module;
	/// use std::ffi::c_int;
	///
	/// let libc = Module::load("libc.so.6").unwrap();
	/// let abs: unsafe extern "C" fn(c_int) -> c_int = unsafe { libc.proc("abs") }.unwrap();
	/// assert_eq!(unsafe { abs(-3) }, 3);
	/// ```
	#[inline]
	pub unsafe fn proc<F: Copy>(self, name: &str) -> Option<F> {
		#[allow(clippy::let_unit_value)]
		let _ = <Self as AssertSize<*mut ffi::c_void, F>>::ASSERT_SIZE;
		self.proc_address(name).map(|sym| unsafe { sym.to_fn() })
	}

	/// Wraps a handle obtained from the OS loader. `None` if `handle` is null.
	///
	/// # Safety
	/// `handle` must be null or a live handle of the platform loader.
	#[inline]
	pub unsafe fn from_raw(handle: *mut ffi::c_void) -> Option<Self> {
		ptr::NonNull::new(handle).map(Self)
	}

	/// The loader's handle, bit for bit.
	#[inline]
	pub const fn as_raw(self) -> *mut ffi::c_void {
		self.0.as_ptr()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::os::Handle;
	use std::mem;

	#[test]
	fn test_module_is_handle_sized() {
		assert_eq!(mem::size_of::<Module>(), mem::size_of::<Handle>());
		assert_eq!(mem::size_of::<Option<Module>>(), mem::size_of::<Handle>());
	}

	#[test]
	fn test_this_is_a_real_handle() {
		let this = Module::this().unwrap();
		assert!(!this.as_raw().is_null());
		assert_eq!(Module::this(), Some(this));
	}

	#[test]
	fn test_interior_nul_is_a_failed_load() {
		assert!(Module::load("foo\0bar").is_none());
		assert!(!Module::is_loaded("foo\0bar"));
		assert!(Module::this().unwrap().proc_address("ab\0s").is_none());
	}
}
