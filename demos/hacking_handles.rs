//! Loads a system library by name, calls one export through a plain function pointer and
//! frees the library again. `Module` is the loader's handle itself, nothing wraps it.

use modlink::Module;
use std::ffi::c_char;

#[cfg(target_pointer_width = "64")]
const MESSAGE: &[u8] = b"Hello 64-bit world from Rust!\0";
#[cfg(not(target_pointer_width = "64"))]
const MESSAGE: &[u8] = b"Hello 32-bit world from Rust!\0";

#[cfg(windows)]
fn main() {
	type MsgBoxA =
		unsafe extern "system" fn(*mut std::ffi::c_void, *const c_char, *const c_char, u32) -> i32;

	if let Some(lib) = Module::load("user32.dll") {
		println!("user32.dll handle = {:p}", lib.as_raw());
		if let Some(msgbox) = unsafe { lib.proc::<MsgBoxA>("MessageBoxA") } {
			unsafe { msgbox(std::ptr::null_mut(), MESSAGE.as_ptr().cast(), b"Ok!\0".as_ptr().cast(), 0) };
		}
		unsafe { lib.free() };
	}
}

#[cfg(unix)]
fn main() {
	type Puts = unsafe extern "C" fn(*const c_char) -> std::ffi::c_int;

	#[cfg(target_os = "macos")]
	const LIBC: &str = "/usr/lib/libSystem.B.dylib";
	#[cfg(not(target_os = "macos"))]
	const LIBC: &str = "libc.so.6";

	if let Some(lib) = Module::load(LIBC) {
		println!("{LIBC} handle = {:p}", lib.as_raw());
		if let Some(puts) = unsafe { lib.proc::<Puts>("puts") } {
			unsafe { puts(MESSAGE.as_ptr().cast()) };
		}
		unsafe { lib.free() };
	}
}
