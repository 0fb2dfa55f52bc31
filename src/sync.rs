// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

use std::sync;

use crate::{Module, Symbol};

/// A library that is loaded on first use and kept for the rest of the process.
///
/// This is what [`thunk`](crate::thunk) attributes resolve through.
#[derive(Debug)]
pub struct LibLock<'a> {
	libs: &'a [&'a str],
	// `None` once every candidate failed. The attempt is never repeated.
	hlib: sync::OnceLock<Option<Module>>,
}

impl<'a> LibLock<'a> {
	/// Constructs a new `LibLock`.
	///
	/// This function accepts a slice of paths the LibLock will attempt to load from
	/// by priority (where `0..n`, index `0` is highest, and `n` is lowest), but only the first
	/// library successfully loaded will be used. The reason is to provide fallback
	/// mechanism in case the shared library is in a seperate directory or may have a variety
	/// of names.
	///
	/// If `libs` is empty then lookups go through [`Module::this`].
	///
	/// # Examples
	///
	/// ```rust
	/// # use modlink::*;
	/// static KERNEL32: LibLock = LibLock::new(&["kernel32.dll"]);
	/// ```
	#[inline]
	pub const fn new(libs: &'a [&'a str]) -> Self {
		Self {
			libs,
			hlib: sync::OnceLock::new(),
		}
	}

	/// Returns the loaded module, loading it if this is the first call.
	///
	/// May block if another thread is currently loading the library.
	pub fn module(&self) -> Option<Module> {
		*self.hlib.get_or_init(|| {
			if self.libs.is_empty() {
				Module::this()
			} else {
				self.libs.iter().find_map(Module::load)
			}
		})
	}

	/// Looks up `name` in the library, loading it first if needed.
	#[inline]
	pub fn proc_address(&self, name: &str) -> Option<Symbol> {
		self.module()?.proc_address(name)
	}

	/// Candidate names, highest priority first.
	#[inline]
	pub fn names(&self) -> &'a [&'a str] {
		self.libs
	}

	/// The module if it has already been loaded. Never blocks and never loads.
	#[inline]
	pub fn get(&self) -> Option<Module> {
		self.hlib.get().copied().flatten()
	}
}
