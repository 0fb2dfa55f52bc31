#![cfg(windows)]

use modlink::*;

static KERNEL32: LibLock = LibLock::new(&["kernel32.dll"]);

#[thunk(library = KERNEL32)]
extern "system" {
	fn SetLastError(_: u32);
	fn GetLastError() -> u32;
}

#[thunk(library = KERNEL32, naked)]
extern "system" {
	fn GetCurrentProcessId() -> u32;
}

#[test]
fn test_thunk_macro() {
	unsafe {
		// resolve first, the lookup itself may touch the last-error value.
		let _ = GetLastError();
		SetLastError(53);
		assert_eq!(GetLastError(), 53);
	}
	assert_eq!(unsafe { GetCurrentProcessId() }, std::process::id());
	assert_eq!(unsafe { GetCurrentProcessId() }, std::process::id());
}

#[test]
fn test_link_name() {
	#[thunk(library = KERNEL32, link_name = "GetCurrentThreadId")]
	extern "system" {
		fn thread_id() -> u32;
	}

	let first = unsafe { thread_id() };
	assert_eq!(first, unsafe { thread_id() });
	assert_ne!(first, 0);
}

#[test]
fn test_sym_addr() {
	let lib = Module::load("kernel32.dll").unwrap();
	let sym = lib.proc_address("SetLastError").unwrap();
	assert_eq!(Some(sym), KERNEL32.proc_address("SetLastError"));
	assert!(unsafe { lib.free() });
}

#[test]
fn test_load_from_system32() {
	let lib = Module::load_with("kernel32.dll", LoadFlags::LOAD_LIBRARY_SEARCH_SYSTEM32).unwrap();
	assert!(lib.proc_address("GetLastError").is_some());
	assert!(unsafe { lib.free() });
}

#[test]
fn test_user32_thunks_resolve() {
	use modlink::user32::USER32;
	let lib = USER32.module().unwrap();
	assert!(Module::is_loaded("user32.dll"));
	assert!(lib.proc_address("MessageBoxW").is_some());
}
