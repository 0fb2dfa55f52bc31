// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason
use thiserror::Error;

use crate::export::Config;

/// Why a [`Thunk`](crate::Thunk) could not be pointed at its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
	/// None of the library's candidate names could be loaded.
	#[error("no library could be loaded to resolve `{0}`")]
	LibraryUnavailable(&'static str),
	/// The library is loaded but does not export the symbol.
	#[error("function `{0}` not found")]
	SymbolNotFound(&'static str),
}

/// Structural problems in an [`AliasTable`](crate::export::AliasTable).
///
/// These are caught while the build script renders the table. A decorated name that is
/// well-formed but not what a consumer expects is not detectable here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
	#[error("`{0}` is not a valid symbol name")]
	InvalidName(String),
	#[error("export `{export}` is declared more than once for {config}")]
	DuplicateExport { export: String, config: Config },
	#[error("export `{0}` aliases itself")]
	SelfAlias(String),
	#[error("{config} cannot forward `{export}` into another module")]
	ForwardUnsupported { export: String, config: Config },
	#[error("{config} cannot export the linker alias `{export}` from a cdylib")]
	ExportUnsupported { export: String, config: Config },
	#[error("`{0}` is not a compiler major version")]
	InvalidCompilerVersion(String),
	#[error("build environment variable `{0}` is not set")]
	MissingEnv(&'static str),
	#[error("no export alias rules for target `{0}`")]
	UnsupportedTarget(String),
}
