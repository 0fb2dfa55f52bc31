// Copyright (c) 2023 Jonathan "Razordor" Alan Thomason

//! Entry points that jump through a [`Thunk`](crate::Thunk) slot.
//!
//! With the `naked` feature on x86_64 (and x86 windows) the entry point is a naked
//! function made of a single indirect `jmp`. It sets up no frame and touches no register,
//! so the target returns straight to the original caller. Everywhere else it is an
//! ordinary function that loads the slot and calls it, which the optimizer usually folds
//! into the same jump. Both behave identically.
//!
//! The slot is addressed as the first word of the thunk static, hence `#[repr(C)]` on
//! [`Thunk`](crate::Thunk).

#[cfg(all(feature = "naked", target_arch = "x86_64"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __tail_jump {
	(
		$(#[$attr:meta])*
		$vis:vis unsafe extern $abi:tt fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)?
		=> $slot:path
	) => {
		$(#[$attr])*
		#[unsafe(naked)]
		$vis unsafe extern $abi fn $name($($arg: $ty),*) $(-> $ret)? {
			::core::arch::naked_asm!("jmp qword ptr [rip + {slot}]", slot = sym $slot)
		}
	};
}

#[cfg(all(feature = "naked", target_arch = "x86", windows))]
#[doc(hidden)]
#[macro_export]
macro_rules! __tail_jump {
	(
		$(#[$attr:meta])*
		$vis:vis unsafe extern $abi:tt fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)?
		=> $slot:path
	) => {
		$(#[$attr])*
		#[unsafe(naked)]
		$vis unsafe extern $abi fn $name($($arg: $ty),*) $(-> $ret)? {
			::core::arch::naked_asm!("jmp dword ptr [{slot}]", slot = sym $slot)
		}
	};
}

#[cfg(not(all(
	feature = "naked",
	any(target_arch = "x86_64", all(target_arch = "x86", windows))
)))]
#[doc(hidden)]
#[macro_export]
macro_rules! __tail_jump {
	(
		$(#[$attr:meta])*
		$vis:vis unsafe extern $abi:tt fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)?
		=> $slot:path
	) => {
		$(#[$attr])*
		#[inline]
		$vis unsafe extern $abi fn $name($($arg: $ty),*) $(-> $ret)? {
			unsafe { $slot.get()($($arg),*) }
		}
	};
}

/// `true` when [`thunk`](crate::thunk) entry points marked `naked` compile to a bare jump.
pub const TAIL_JUMP: bool = cfg!(all(
	feature = "naked",
	any(target_arch = "x86_64", all(target_arch = "x86", windows))
));
