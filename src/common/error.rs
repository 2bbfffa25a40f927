// src/common/error.rs

use core::fmt::Debug;

/// Errors produced by the TMP006 register driver.
///
/// The driver never retries; a transport failure is handed back exactly as
/// the transport reported it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Tmp006Error<E = ()>
where
    E: Debug,
{
    /// Address-select pin combination outside the 8-entry address table.
    #[error("Invalid argument")]
    InvalidArgument,

    /// Underlying bus error from the transport implementation.
    #[error("Transport error: {0:?}")]
    Transport(E),
}

impl<E: Debug> Tmp006Error<E> {
    /// Returns the transport error, if this is one.
    pub fn transport(&self) -> Option<&E> {
        match self {
            Tmp006Error::Transport(e) => Some(e),
            Tmp006Error::InvalidArgument => None,
        }
    }
}
