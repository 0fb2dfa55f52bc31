#![cfg(unix)]

use modlink::*;
use std::ffi::{c_char, c_int, c_long};

static THIS: LibLock = LibLock::new(&[]);

#[thunk(library = THIS)]
extern "C" {
	fn atoi(s: *const c_char) -> c_int;
}

#[thunk(library = THIS, naked)]
extern "C" {
	fn labs(n: c_long) -> c_long;
}

#[thunk(target = libc::abs)]
extern "C" {
	#[doc = "bound at link time"]
	fn fixed_abs(n: c_int) -> c_int;
}

#[test]
fn test_this_sees_libc() {
	let this = Module::this().unwrap();
	assert_eq!(Some(this), Module::this());
	let atoi = this.proc_address("atoi").unwrap();
	assert_eq!(atoi.cast::<()>(), libc::atoi as *mut ());
}

#[test]
fn test_proc_calls_through() {
	let abs: unsafe extern "C" fn(c_int) -> c_int = unsafe { Module::this().unwrap().proc("abs") }.unwrap();
	assert_eq!(unsafe { abs(-12) }, 12);
}

#[test]
fn test_thunk_macro() {
	assert_eq!(unsafe { atoi(b"  -31\0".as_ptr().cast()) }, -31);
	// second call goes through the published slot.
	assert_eq!(unsafe { atoi(b"8\0".as_ptr().cast()) }, 8);
	assert_eq!(unsafe { labs(-7) }, 7);
	assert_eq!(unsafe { labs(-7) }, 7);
	assert_eq!(unsafe { fixed_abs(-3) }, 3);
}

#[test]
fn test_thunk_matches_direct_pointer() {
	type AtoiFn = unsafe extern "C" fn(*const c_char) -> c_int;
	static ATOI: Thunk<AtoiFn> = Thunk::explicit("atoi", &THIS);
	let thunked = ATOI.resolve().unwrap();
	let direct: AtoiFn = unsafe { THIS.proc_address("atoi").unwrap().to_fn() };
	assert_eq!(thunked as usize, direct as usize);
	assert_eq!(ATOI.name(), "atoi");
}

#[test]
fn test_noload() {
	// the test binary itself links libc, so the soname is resident.
	#[cfg(target_os = "linux")]
	const RESIDENT: &str = "libc.so.6";
	#[cfg(not(target_os = "linux"))]
	const RESIDENT: &str = "/usr/lib/libSystem.B.dylib";

	let lib = Module::load_with(RESIDENT, LoadFlags::NOLOAD | LoadFlags::LAZY).unwrap();
	assert!(unsafe { lib.free() });
	assert!(Module::load_with("modlink-no-such-library", LoadFlags::NOLOAD).is_none());
}

#[test]
fn test_load_flags_reach_dlopen() {
	assert_eq!(LoadFlags::GLOBAL.bits(), libc::RTLD_GLOBAL as u32);
	assert_eq!(
		(LoadFlags::LAZY | LoadFlags::NODELETE).bits(),
		(libc::RTLD_LAZY | libc::RTLD_NODELETE) as u32
	);
}
