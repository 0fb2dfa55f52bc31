mod unix;
mod windows;

use modlink::*;

// A module every test process already has mapped, and one of its exports.
#[cfg(target_os = "linux")]
const SYSTEM_LIB: &str = "libc.so.6";
#[cfg(target_os = "macos")]
const SYSTEM_LIB: &str = "/usr/lib/libSystem.B.dylib";
#[cfg(windows)]
const SYSTEM_LIB: &str = "kernel32.dll";

#[cfg(unix)]
const SYSTEM_FN: &str = "atoi";
#[cfg(windows)]
const SYSTEM_FN: &str = "GetCurrentProcessId";

#[test]
fn test_missing_library() {
	assert!(Module::load("modlink-no-such-library").is_none());
	assert!(Module::load_with("modlink-no-such-library", LoadFlags::empty()).is_none());
	assert!(!Module::is_loaded("modlink-no-such-library"));
}

#[test]
fn test_missing_symbol() {
	let lib = Module::load(SYSTEM_LIB).unwrap();
	assert!(lib.proc_address("modlink_no_such_symbol").is_none());
	assert!(unsafe { lib.proc::<unsafe extern "C" fn()>("modlink_no_such_symbol") }.is_none());
	assert!(unsafe { lib.free() });
}

// Installed with the system but never mapped by a test binary, and unloadable again.
// Dylibs in the macOS shared cache are never unmapped, so there is no macOS list.
#[cfg(target_os = "linux")]
const UNMAPPED_LIBS: &[&str] = &["libBrokenLocale.so.1", "libanl.so.1", "libresolv.so.2"];
#[cfg(windows)]
const UNMAPPED_LIBS: &[&str] = &["cabinet.dll", "mscms.dll", "winmm.dll"];

#[cfg(any(target_os = "linux", windows))]
#[test]
fn test_load_free_keeps_refcount() {
	let name = UNMAPPED_LIBS
		.iter()
		.copied()
		.find(|name| !Module::is_loaded(name))
		.expect("every candidate library is already mapped");

	let lib = Module::load(name).unwrap();
	assert!(Module::is_loaded(name));
	assert!(unsafe { lib.free() });
	assert!(!Module::is_loaded(name));

	// two loads need two frees.
	let first = Module::load(name).unwrap();
	let second = Module::load(name).unwrap();
	assert!(unsafe { second.free() });
	assert!(Module::is_loaded(name));
	assert!(unsafe { first.free() });
	assert!(!Module::is_loaded(name));
}

#[test]
fn test_double_load_same_symbol() {
	let a = Module::load(SYSTEM_LIB).unwrap();
	let b = Module::load(SYSTEM_LIB).unwrap();
	assert_eq!(a, b);
	assert_eq!(a.proc_address(SYSTEM_FN), b.proc_address(SYSTEM_FN));
	unsafe {
		assert!(b.free());
		assert!(a.free());
	}
}

#[test]
fn test_raw_handle_round_trip() {
	let lib = Module::load(SYSTEM_LIB).unwrap();
	let raw = lib.as_raw();
	assert!(!raw.is_null());
	assert_eq!(unsafe { Module::from_raw(raw) }, Some(lib));
	assert!(unsafe { Module::from_raw(std::ptr::null_mut()) }.is_none());
	assert!(unsafe { lib.free() });
}

#[test]
fn test_liblock_fallback_order() {
	static LIB: LibLock = LibLock::new(&["modlink-no-such-library", SYSTEM_LIB]);
	assert_eq!(LIB.names().len(), 2);
	let module = LIB.module().unwrap();
	assert_eq!(LIB.get(), Some(module));
	assert_eq!(
		LIB.proc_address(SYSTEM_FN),
		Module::load(SYSTEM_LIB).and_then(|m| m.proc_address(SYSTEM_FN))
	);
}
