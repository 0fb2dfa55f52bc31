#[no_mangle]
pub extern "C" fn alias_cdylib_target(n: i32) -> i32 {
	n + 100
}
