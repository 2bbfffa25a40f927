// src/common/log.rs

//! Crate-internal logging macros.
//!
//! With the `defmt` or `log` feature the macros forward to that framework;
//! otherwise they type-check their arguments and emit nothing. A `warn`
//! macro cannot be re-exported next to the `#[warn]` attribute, so that level
//! is spelled `warning!`. Stick to `{}`, `{:?}` and `{:#x}` in format strings
//! so all three expansions accept them.

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[cfg(feature = "defmt")]
macro_rules! trace { ($($arg:tt)*) => { ::defmt::trace!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! debug { ($($arg:tt)*) => { ::defmt::debug!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! info { ($($arg:tt)*) => { ::defmt::info!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! warning { ($($arg:tt)*) => { ::defmt::warn!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! error { ($($arg:tt)*) => { ::defmt::error!($($arg)*) }; }

#[cfg(feature = "log")]
macro_rules! trace { ($($arg:tt)*) => { ::log::trace!($($arg)*) }; }
#[cfg(feature = "log")]
macro_rules! debug { ($($arg:tt)*) => { ::log::debug!($($arg)*) }; }
#[cfg(feature = "log")]
macro_rules! info { ($($arg:tt)*) => { ::log::info!($($arg)*) }; }
#[cfg(feature = "log")]
macro_rules! warning { ($($arg:tt)*) => { ::log::warn!($($arg)*) }; }
#[cfg(feature = "log")]
macro_rules! error { ($($arg:tt)*) => { ::log::error!($($arg)*) }; }

// No backend: keep the arguments type-checked but never evaluated.
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! trace { ($($arg:tt)*) => {{ if false { let _ = ::core::format_args!($($arg)*); } }}; }
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! debug { ($($arg:tt)*) => {{ if false { let _ = ::core::format_args!($($arg)*); } }}; }
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! info { ($($arg:tt)*) => {{ if false { let _ = ::core::format_args!($($arg)*); } }}; }
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! warning { ($($arg:tt)*) => {{ if false { let _ = ::core::format_args!($($arg)*); } }}; }
#[cfg(not(any(feature = "defmt", feature = "log")))]
macro_rules! error { ($($arg:tt)*) => {{ if false { let _ = ::core::format_args!($($arg)*); } }}; }

pub(crate) use {debug, error, info, trace, warning};
