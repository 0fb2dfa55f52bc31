//! Call overhead of a thunk against a direct call and a hand-resolved pointer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use modlink::*;

#[cfg(unix)]
mod target {
	use super::*;
	use std::ffi::c_int;

	pub type TargetFn = unsafe extern "C" fn(c_int) -> c_int;
	pub const NAME: &str = "abs";
	pub static LIB: LibLock = LibLock::new(&[]);
	pub const DIRECT: TargetFn = libc::abs;

	#[thunk(library = LIB)]
	extern "C" {
		pub fn abs(n: c_int) -> c_int;
	}

	#[thunk(library = LIB, link_name = "abs", naked)]
	extern "C" {
		pub fn abs_jmp(n: c_int) -> c_int;
	}

	pub unsafe fn call(f: TargetFn) -> c_int {
		f(black_box(-5))
	}
	pub unsafe fn thunked() -> c_int {
		abs(black_box(-5))
	}
	pub unsafe fn jumped() -> c_int {
		abs_jmp(black_box(-5))
	}
}

#[cfg(windows)]
mod target {
	use super::*;

	pub type TargetFn = unsafe extern "system" fn() -> u32;
	pub const NAME: &str = "GetCurrentThreadId";
	pub static LIB: LibLock = LibLock::new(&["kernel32.dll"]);

	#[link(name = "kernel32")]
	extern "system" {
		fn GetCurrentThreadId() -> u32;
	}
	pub const DIRECT: TargetFn = GetCurrentThreadId;

	#[thunk(library = LIB, link_name = "GetCurrentThreadId")]
	extern "system" {
		fn thread_id() -> u32;
	}

	#[thunk(library = LIB, link_name = "GetCurrentThreadId", naked)]
	extern "system" {
		fn thread_id_jmp() -> u32;
	}

	pub unsafe fn call(f: TargetFn) -> u32 {
		f()
	}
	pub unsafe fn thunked() -> u32 {
		thread_id()
	}
	pub unsafe fn jumped() -> u32 {
		thread_id_jmp()
	}
}

fn bench_direct(c: &mut Criterion) {
	let f = black_box(target::DIRECT);
	c.bench_function("direct", |b| {
		b.iter(|| black_box(unsafe { target::call(f) }));
	});
}

fn bench_resolved_pointer(c: &mut Criterion) {
	let f: target::TargetFn = unsafe { target::LIB.module().unwrap().proc(target::NAME) }.unwrap();
	c.bench_function("resolved_pointer", |b| {
		b.iter(|| black_box(unsafe { target::call(f) }));
	});
}

fn bench_thunk(c: &mut Criterion) {
	c.bench_function("thunk", |b| {
		b.iter(|| black_box(unsafe { target::thunked() }));
	});
}

fn bench_thunk_tail_jump(c: &mut Criterion) {
	let name = if naked::TAIL_JUMP { "thunk_tail_jump" } else { "thunk_tail_jump_fallback" };
	c.bench_function(name, |b| {
		b.iter(|| black_box(unsafe { target::jumped() }));
	});
}

criterion_group!(
	benches,
	bench_direct,
	bench_resolved_pointer,
	bench_thunk,
	bench_thunk_tail_jump
);
criterion_main!(benches);
