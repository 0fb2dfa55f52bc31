// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

//! Extra entry points that forward straight into other symbols.
//!
//! An [`AliasTable`] is a versioned list of `(export, target)` pairs, kept in a build
//! script. For each build [`Config`] it decorates the names the way that configuration's
//! linker expects and renders them into linker arguments, so the finished artifact
//! exports the alias names with the target's address. No function body runs on an
//! aliased path.
//!
//! ```no_run
//! // build.rs
//! use modlink::export::{AliasTable, Signature};
//!
//! fn main() {
//!     AliasTable::new(1)
//!         .alias(Signature::stdcall("ShowMessage", 16), Signature::stdcall("show_message", 16))
//!         .forward(Signature::stdcall("MessageBoxA", 16), "user32.dll", "MessageBoxA")
//!         .emit()
//!         .unwrap();
//! }
//! ```
//!
//! Aliases inside the module being compiled can also be made without a build script, see
//! [`export_alias!`](crate::export_alias).
//!
//! The arguments are passed to `cdylib` links only, since a shared library is the one
//! artifact a consumer imports from. Two configurations can publish aliases there:
//!
//! - COFF with MSVC, through `/EXPORT:`, which `link.exe` merges with rustc's own export
//!   list;
//! - Mach-O, through `-alias` plus `-exported_symbol`, which `ld64` adds to rustc's
//!   exported-symbols list.
//!
//! On ELF rustc links every `cdylib` with an anonymous version script ending in `local: *`,
//! and the linker refuses a second one, so a linker-made alias can never become dynamic.
//! MinGW is in the same position because rustc's `.def` file decides its exports. Both
//! report [`AliasError::ExportUnsupported`] instead of linking a library without the alias.

use std::collections::HashSet;
use std::{env, fmt};

use crate::error::AliasError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectFormat {
	Coff,
	Elf,
	MachO,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arch {
	X86,
	X86_64,
	Aarch64,
	Other { pointer_width: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Toolchain {
	Msvc,
	Gnu,
	Apple,
}

/// One build configuration. Decoration and linker syntax are functions of this and
/// nothing else.
///
/// `compiler_version` is the major version of the compiler whose mangling the pinned names
/// follow (`_MSC_VER` for MSVC, e.g. `1900`). Generic entries ignore it; pinned entries
/// that name one apply only to builds with that version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
	pub format: ObjectFormat,
	pub arch: Arch,
	pub toolchain: Toolchain,
	pub compiler_version: Option<u32>,
}

/// Build-script variable carrying [`Config::compiler_version`].
pub const COMPILER_VERSION_ENV: &str = "MODLINK_COMPILER_VERSION";

impl Config {
	#[inline]
	pub const fn new(format: ObjectFormat, arch: Arch, toolchain: Toolchain) -> Self {
		Self {
			format,
			arch,
			toolchain,
			compiler_version: None,
		}
	}

	#[inline]
	pub const fn with_compiler_version(mut self, major: u32) -> Self {
		self.compiler_version = Some(major);
		self
	}

	/// Whether entries pinned to `self` apply to a build for `build`.
	///
	/// A pin without a compiler version covers every version. A pin with one never
	/// covers a build whose version is unknown.
	pub fn covers(&self, build: &Config) -> bool {
		self.format == build.format
			&& self.arch == build.arch
			&& self.toolchain == build.toolchain
			&& match self.compiler_version {
				None => true,
				version => version == build.compiler_version,
			}
	}

	/// Builds a configuration from the parts of a target triple, named the way cargo names
	/// them (`target_os`, `target_arch`, `target_env`, `target_pointer_width`).
	///
	/// # Errors
	/// [`AliasError::UnsupportedTarget`] for targets without export aliasing rules, such as
	/// wasm.
	pub fn from_target(
		os: &str,
		arch: &str,
		target_env: &str,
		pointer_width: u8,
	) -> Result<Self, AliasError> {
		let unsupported = || AliasError::UnsupportedTarget(format!("{arch}-{os}-{target_env}"));
		let arch = match arch {
			"x86" => Arch::X86,
			"x86_64" => Arch::X86_64,
			"aarch64" => Arch::Aarch64,
			"wasm32" | "wasm64" => return Err(unsupported()),
			_ => Arch::Other { pointer_width },
		};
		let (format, toolchain) = match (os, target_env) {
			("windows", "msvc") | ("uefi", _) => (ObjectFormat::Coff, Toolchain::Msvc),
			("windows", "gnu" | "gnullvm") => (ObjectFormat::Coff, Toolchain::Gnu),
			("windows", _) => return Err(unsupported()),
			("macos" | "ios" | "tvos" | "watchos" | "visionos", _) => {
				(ObjectFormat::MachO, Toolchain::Apple)
			}
			_ => (ObjectFormat::Elf, Toolchain::Gnu),
		};
		Ok(Self::new(format, arch, toolchain))
	}

	/// The configuration being compiled for, read from the variables cargo hands to build
	/// scripts. The compiler version comes from `MODLINK_COMPILER_VERSION` when it is set,
	/// e.g. through `[env]` in `.cargo/config.toml`.
	pub fn from_env() -> Result<Self, AliasError> {
		fn var(key: &'static str) -> Result<String, AliasError> {
			env::var(key).map_err(|_| AliasError::MissingEnv(key))
		}
		let width = var("CARGO_CFG_TARGET_POINTER_WIDTH")?;
		let pointer_width = width
			.parse()
			.map_err(|_| AliasError::UnsupportedTarget(format!("pointer width {width}")))?;
		// cargo leaves `target_env` unset on targets that have none.
		let target_env = env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();
		let config = Self::from_target(
			&var("CARGO_CFG_TARGET_OS")?,
			&var("CARGO_CFG_TARGET_ARCH")?,
			&target_env,
			pointer_width,
		)?;
		match env::var(COMPILER_VERSION_ENV) {
			Ok(version) => version
				.trim()
				.parse()
				.map(|major| config.with_compiler_version(major))
				.map_err(|_| AliasError::InvalidCompilerVersion(version)),
			Err(_) => Ok(config),
		}
	}

	/// The configuration this code was compiled for.
	pub fn host() -> Result<Self, AliasError> {
		let target_env = if cfg!(target_env = "msvc") {
			"msvc"
		} else if cfg!(target_env = "gnu") {
			"gnu"
		} else {
			""
		};
		Self::from_target(env::consts::OS, env::consts::ARCH, target_env, usize::BITS as u8)
	}

	pub const fn pointer_width(&self) -> u8 {
		match self.arch {
			Arch::X86 => 32,
			Arch::X86_64 | Arch::Aarch64 => 64,
			Arch::Other { pointer_width } => pointer_width,
		}
	}

	/// The symbol name `sig` has in object files of this configuration.
	pub fn decorate(&self, sig: &Signature) -> String {
		let Signature {
			name,
			conv,
			arg_bytes,
		} = sig;
		match (self.format, conv) {
			(ObjectFormat::Coff, CallConv::Vectorcall) => format!("{name}@@{arg_bytes}"),
			// only 32-bit x86 encodes the calling convention in the name.
			(ObjectFormat::Coff, _) if self.arch != Arch::X86 => name.clone(),
			(ObjectFormat::Coff, CallConv::C) => format!("_{name}"),
			(ObjectFormat::Coff, CallConv::Stdcall) => format!("_{name}@{arg_bytes}"),
			(ObjectFormat::Coff, CallConv::Fastcall) => format!("@{name}@{arg_bytes}"),
			(ObjectFormat::MachO, _) => format!("_{name}"),
			(ObjectFormat::Elf, _) => name.clone(),
		}
	}

	#[inline]
	pub fn supports_forwarding(&self) -> bool {
		self.format == ObjectFormat::Coff && self.toolchain == Toolchain::Msvc
	}

	/// Whether a linker-made alias can end up in the dynamic export table of a `cdylib`.
	#[inline]
	pub fn supports_export(&self) -> bool {
		matches!(
			(self.format, self.toolchain),
			(ObjectFormat::Coff, Toolchain::Msvc) | (ObjectFormat::MachO, Toolchain::Apple)
		)
	}
}

impl fmt::Display for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.arch {
			Arch::X86 => f.write_str("x86")?,
			Arch::X86_64 => f.write_str("x86_64")?,
			Arch::Aarch64 => f.write_str("aarch64")?,
			Arch::Other { pointer_width } => write!(f, "other{pointer_width}")?,
		}
		f.write_str(match self.format {
			ObjectFormat::Coff => "-coff",
			ObjectFormat::Elf => "-elf",
			ObjectFormat::MachO => "-macho",
		})?;
		f.write_str(match self.toolchain {
			Toolchain::Msvc => "-msvc",
			Toolchain::Gnu => "-gnu",
			Toolchain::Apple => "-apple",
		})?;
		match self.compiler_version {
			Some(version) => write!(f, "-{version}"),
			None => Ok(()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallConv {
	#[default]
	C,
	Stdcall,
	Fastcall,
	Vectorcall,
}

/// An undecorated function name plus what decoration needs to know about it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
	pub name: String,
	pub conv: CallConv,
	/// Size of the argument list on the stack. Ignored for `C`.
	pub arg_bytes: u32,
}

impl Signature {
	pub fn c(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			conv: CallConv::C,
			arg_bytes: 0,
		}
	}

	/// Win32 API functions (`WINAPI`) are stdcall.
	pub fn stdcall(name: impl Into<String>, arg_bytes: u32) -> Self {
		Self {
			name: name.into(),
			conv: CallConv::Stdcall,
			arg_bytes,
		}
	}

	pub fn fastcall(name: impl Into<String>, arg_bytes: u32) -> Self {
		Self {
			name: name.into(),
			conv: CallConv::Fastcall,
			arg_bytes,
		}
	}

	pub fn vectorcall(name: impl Into<String>, arg_bytes: u32) -> Self {
		Self {
			name: name.into(),
			conv: CallConv::Vectorcall,
			arg_bytes,
		}
	}
}

impl From<&str> for Signature {
	#[inline]
	fn from(name: &str) -> Self {
		Self::c(name)
	}
}

/// What an alias resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
	/// A symbol of the artifact being linked, decorated.
	Symbol(String),
	/// `module.export`, bound by the loader when a consumer loads the artifact.
	Forward { module: String, export: String },
}

/// One decorated export name and its target, for a single configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportAlias {
	pub export: String,
	pub target: Target,
}

impl ExportAlias {
	/// The linker argument that publishes this alias from a `cdylib`.
	pub fn link_arg(&self, config: &Config) -> Result<String, AliasError> {
		let export = &self.export;
		if !config.supports_export() {
			return Err(AliasError::ExportUnsupported {
				export: export.clone(),
				config: *config,
			});
		}
		match (&self.target, config.format) {
			(Target::Forward { module, export: name }, ObjectFormat::Coff) => {
				Ok(format!("/EXPORT:{export}={module}.{name}"))
			}
			(Target::Forward { .. }, _) => Err(AliasError::ForwardUnsupported {
				export: export.clone(),
				config: *config,
			}),
			(Target::Symbol(target), ObjectFormat::Coff) => Ok(format!("/EXPORT:{export}={target}")),
			// `-alias` alone makes a global symbol that the exported-symbols list then hides.
			(Target::Symbol(target), _) => {
				Ok(format!("-Wl,-alias,{target},{export},-exported_symbol,{export}"))
			}
		}
	}
}

#[derive(Debug, Clone)]
enum Entry {
	Alias { export: Signature, target: Signature },
	Forward { export: Signature, module: String, name: String },
	// already decorated, only for `config`.
	Pinned { config: Config, alias: ExportAlias },
}

/// The artifact's exported-alias ABI.
///
/// Entries are rendered in the order they were added, so the output for a given
/// configuration and revision is the same on every build. Bump the revision whenever an
/// entry is removed or retargeted.
#[derive(Debug, Clone)]
pub struct AliasTable {
	revision: u32,
	entries: Vec<Entry>,
}

impl AliasTable {
	pub fn new(revision: u32) -> Self {
		Self {
			revision,
			entries: Vec::new(),
		}
	}

	#[inline]
	pub fn revision(&self) -> u32 {
		self.revision
	}

	/// Exports `export` as another name for `target`, a symbol of the same artifact.
	pub fn alias(mut self, export: impl Into<Signature>, target: impl Into<Signature>) -> Self {
		self.entries.push(Entry::Alias {
			export: export.into(),
			target: target.into(),
		});
		self
	}

	/// Exports `export` as a forwarder to `name` in `module`, which the loader resolves
	/// when a consumer imports it. A trailing `.dll` on `module` is dropped.
	pub fn forward(
		mut self,
		export: impl Into<Signature>,
		module: impl Into<String>,
		name: impl Into<String>,
	) -> Self {
		self.entries.push(Entry::Forward {
			export: export.into(),
			module: module.into(),
			name: name.into(),
		});
		self
	}

	/// An entry written out by hand for the builds `config` [covers](Config::covers).
	/// Other configurations skip it.
	pub fn pin(mut self, config: Config, alias: ExportAlias) -> Self {
		self.entries.push(Entry::Pinned { config, alias });
		self
	}

	/// Decorates and checks every entry that applies to `config`.
	///
	/// # Errors
	/// - [`AliasError::InvalidName`]: a name is empty or has characters linkers split on.
	/// - [`AliasError::SelfAlias`]: an export that would point at itself.
	/// - [`AliasError::DuplicateExport`]: two entries decorate to the same export name.
	/// - [`AliasError::ForwardUnsupported`]: a forward outside COFF with MSVC.
	pub fn resolve(&self, config: &Config) -> Result<Vec<ExportAlias>, AliasError> {
		let mut seen = HashSet::new();
		let mut aliases = Vec::with_capacity(self.entries.len());
		for entry in &self.entries {
			let alias = match entry {
				Entry::Alias { export, target } => ExportAlias {
					export: config.decorate(export),
					target: Target::Symbol(config.decorate(target)),
				},
				Entry::Forward {
					export,
					module,
					name,
				} => {
					let export = config.decorate(export);
					if !config.supports_forwarding() {
						return Err(AliasError::ForwardUnsupported {
							export,
							config: *config,
						});
					}
					ExportAlias {
						export,
						target: Target::Forward {
							module: strip_dll(module).to_owned(),
							export: name.clone(),
						},
					}
				}
				Entry::Pinned { config: pinned, alias } if pinned.covers(config) => alias.clone(),
				Entry::Pinned { .. } => continue,
			};
			check(&alias, config)?;
			if !seen.insert(alias.export.clone()) {
				return Err(AliasError::DuplicateExport {
					export: alias.export,
					config: *config,
				});
			}
			aliases.push(alias);
		}
		Ok(aliases)
	}

	/// `cdylib` linker arguments for `config`, one per alias.
	///
	/// # Errors
	/// Everything [`resolve`](AliasTable::resolve) reports, and
	/// [`AliasError::ExportUnsupported`] when `config` cannot export a linker-made alias.
	pub fn link_args(&self, config: &Config) -> Result<Vec<String>, AliasError> {
		self.resolve(config)?
			.iter()
			.map(|alias| alias.link_arg(config))
			.collect()
	}

	/// Prints the table for the target being built as `cargo:` lines. Call from a build
	/// script.
	///
	/// The revision is exposed to the crate as `MODLINK_EXPORT_REVISION`.
	pub fn emit(&self) -> Result<(), AliasError> {
		println!("cargo:rerun-if-env-changed={COMPILER_VERSION_ENV}");
		let config = Config::from_env()?;
		for arg in self.link_args(&config)? {
			println!("cargo:rustc-cdylib-link-arg={arg}");
		}
		println!("cargo:rustc-env=MODLINK_EXPORT_REVISION={}", self.revision);
		Ok(())
	}
}

fn strip_dll(module: &str) -> &str {
	match module.len().checked_sub(4) {
		Some(i) if module.is_char_boundary(i) && module[i..].eq_ignore_ascii_case(".dll") => &module[..i],
		_ => module,
	}
}

fn check_name(name: &str) -> Result<(), AliasError> {
	let bad = |c: char| c == '=' || c == ',' || c == '\0' || c.is_whitespace();
	if name.is_empty() || name.contains(bad) {
		Err(AliasError::InvalidName(name.to_owned()))
	} else {
		Ok(())
	}
}

fn check(alias: &ExportAlias, config: &Config) -> Result<(), AliasError> {
	check_name(&alias.export)?;
	match &alias.target {
		Target::Symbol(target) => {
			check_name(target)?;
			if *target == alias.export {
				return Err(AliasError::SelfAlias(alias.export.clone()));
			}
		}
		Target::Forward { module, export } => {
			if !config.supports_forwarding() {
				return Err(AliasError::ForwardUnsupported {
					export: alias.export.clone(),
					config: *config,
				});
			}
			check_name(module)?;
			check_name(export)?;
		}
	}
	Ok(())
}

/// Adds `alias` as another global name for the function `target`, in the object being
/// compiled.
///
/// The alias is a symbol-table entry with the target's address, so calling it runs the
/// target directly. `target` must be a function with a stable symbol, typically
/// `#[no_mangle] extern "C"`, defined in the same module as the invocation so that both
/// end up in one object file.
///
/// ```no_run
/// #[no_mangle]
/// pub extern "C" fn add_one(n: i32) -> i32 {
///     n + 1
/// }
///
/// modlink::export_alias!(increment => add_one);
///
/// extern "C" {
///     fn increment(n: i32) -> i32;
/// }
///
/// fn main() {
///     assert_eq!(unsafe { increment(1) }, 2);
/// }
/// ```
#[macro_export]
macro_rules! export_alias {
	($($alias:ident => $target:path),+ $(,)?) => {$(
		// apple and 32-bit windows prefix C symbols with an underscore.
		#[cfg(any(target_vendor = "apple", all(windows, target_arch = "x86")))]
		::core::arch::global_asm!(
			concat!(".globl _", stringify!($alias), "\n.set _", stringify!($alias), ", {0}"),
			sym $target,
		);
		#[cfg(not(any(target_vendor = "apple", all(windows, target_arch = "x86"))))]
		::core::arch::global_asm!(
			concat!(".globl ", stringify!($alias), "\n.set ", stringify!($alias), ", {0}"),
			sym $target,
		);
	)+};
}
