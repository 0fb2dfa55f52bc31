// Copyright (c) 2022 Jonathan "Razordor" Alan Thomason
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Library handles that are the OS handle, function thunks that cost one indirect jump,
//! and export alias tables that add forwarding entry points to a compiled artifact.
//!
//! ```no_run
//! use modlink::*;
//! use std::ffi::{c_char, c_int};
//!
//! static LIBC: LibLock = LibLock::new(&["libc.so.6"]);
//!
//! #[thunk(library = LIBC)]
//! extern "C" {
//!     fn atoi(s: *const c_char) -> c_int;
//! }
//!
//! assert_eq!(unsafe { atoi(b"17\0".as_ptr().cast()) }, 17);
//! ```

extern crate self as modlink;

pub mod error;
pub mod export;
pub mod flags;
pub mod naked;
mod module;
mod os;
mod sym;
pub mod sync;
mod thunk;
#[cfg(windows)]
pub mod user32;

pub use error::{AliasError, ResolveError};
pub use flags::{DialogResult, LoadFlags, MessageBoxStyle};
pub use module::Module;
pub use sym::Symbol;
pub use sync::LibLock;
pub use thunk::Thunk;

/// Generates call sites that forward to a dynamically resolved function.
///
/// Applied to an `extern` block, every function declared inside becomes an `unsafe`
/// function with the same name, signature and ABI whose body reads one [`Thunk`] slot and
/// forwards to it. The slot is filled exactly once.
///
/// # Arguments
///
/// - `library = PATH`: a `static` [`LibLock`]. The symbol is looked up on first call.
/// - `target = PATH`: a function known at link time. No lookup ever happens.
/// - `link_name = "name"`: symbol to look up, if it differs from the Rust name.
/// - `naked`: emit a tail-jump entry point where the platform supports it
///   (see [`naked`](crate::naked)).
///
/// Exactly one of `library` and `target` must be given.
///
/// # Panics
///
/// The first call panics if the library cannot be loaded or lacks the symbol. Inside an
/// `extern "C"` or `extern "system"` function that aborts the process. Use
/// [`Thunk::explicit`] to handle the failure instead.
///
/// # Examples
///
/// ```no_run
/// use modlink::*;
/// use std::ffi::c_int;
///
/// static LIBC: LibLock = LibLock::new(&["libc.so.6"]);
///
/// #[thunk(library = LIBC, link_name = "abs")]
/// extern "C" {
///     fn absolute(n: c_int) -> c_int;
/// }
/// ```
pub use modlink_macro::thunk;
