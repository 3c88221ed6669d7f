/*
 * SPDX-License-Identifier: MIT
 */

//! Common types shared by every primitive and backend.
//!
//! This covers the status codes returned across the primitive boundary, the
//! timeout convention, and normalized thread priorities.

use core::fmt;

// =============================================================================
// Timeouts
// =============================================================================

/// A timeout in milliseconds.
///
/// [`WAIT_FOREVER`] blocks with no deadline and [`NO_WAIT`] performs a single
/// non-blocking check. Every other value is a relative deadline.
pub type Timeout = u32;

/// Block until the awaited condition holds.
pub const WAIT_FOREVER: Timeout = 0xFFFF_FFFF;

/// Check once and return immediately.
pub const NO_WAIT: Timeout = 0;

/// Event flag word
pub type EventBits = u32;

// =============================================================================
// Status codes
// =============================================================================

/// Status returned by every primitive operation.
///
/// The numeric values follow the usual `osStatus_t` layout so they can be
/// handed to C code unchanged.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OsStatus {
    /// The operation succeeded
    Ok = 0,
    /// Unspecified failure, including precondition violations
    Error = -1,
    /// The deadline elapsed before the awaited condition held
    Timeout = -2,
    /// The backing allocation failed
    NoMemory = -3,
    /// Reserved for lookup-style operations
    NotFound = -4,
    /// The instance is already in the requested state
    Busy = -5,
    /// The backend is not initialized
    NotReady = -6,
}

impl OsStatus {
    /// Returns `true` for [`OsStatus::Ok`].
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, OsStatus::Ok)
    }

    /// Returns `true` for every status other than [`OsStatus::Ok`].
    #[inline]
    pub const fn is_err(self) -> bool {
        !self.is_ok()
    }

    /// Returns the raw status code.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Converts a raw status code back into a status, if it is one we know.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(OsStatus::Ok),
            -1 => Some(OsStatus::Error),
            -2 => Some(OsStatus::Timeout),
            -3 => Some(OsStatus::NoMemory),
            -4 => Some(OsStatus::NotFound),
            -5 => Some(OsStatus::Busy),
            -6 => Some(OsStatus::NotReady),
            _ => None,
        }
    }

    /// Converts into a `Result` so callers can use `?`.
    ///
    /// ```
    /// use osal::{OsError, OsStatus};
    ///
    /// assert_eq!(OsStatus::Ok.into_result(), Ok(()));
    /// assert_eq!(OsStatus::Busy.into_result(), Err(OsError::Busy));
    /// ```
    pub const fn into_result(self) -> Result<(), OsError> {
        match self {
            OsStatus::Ok => Ok(()),
            OsStatus::Error => Err(OsError::Error),
            OsStatus::Timeout => Err(OsError::Timeout),
            OsStatus::NoMemory => Err(OsError::NoMemory),
            OsStatus::NotFound => Err(OsError::NotFound),
            OsStatus::Busy => Err(OsError::Busy),
            OsStatus::NotReady => Err(OsError::NotReady),
        }
    }
}

impl fmt::Display for OsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.into_result() {
            Ok(()) => f.write_str("ok"),
            Err(e) => fmt::Display::fmt(&e, f),
        }
    }
}

impl From<OsError> for OsStatus {
    fn from(e: OsError) -> Self {
        match e {
            OsError::Error => OsStatus::Error,
            OsError::Timeout => OsStatus::Timeout,
            OsError::NoMemory => OsStatus::NoMemory,
            OsError::NotFound => OsStatus::NotFound,
            OsError::Busy => OsStatus::Busy,
            OsError::NotReady => OsStatus::NotReady,
        }
    }
}

impl From<Result<(), OsError>> for OsStatus {
    fn from(r: Result<(), OsError>) -> Self {
        match r {
            Ok(()) => OsStatus::Ok,
            Err(e) => e.into(),
        }
    }
}

/// The failing half of [`OsStatus`], used by operations that produce a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum OsError {
    #[error("operation failed")]
    Error,
    #[error("timed out")]
    Timeout,
    #[error("out of memory")]
    NoMemory,
    #[error("not found")]
    NotFound,
    #[error("resource busy")]
    Busy,
    #[error("not ready")]
    NotReady,
}

/// Result alias for value-producing operations.
pub type OsResult<T> = Result<T, OsError>;

// =============================================================================
// Priorities
// =============================================================================

/// Normalized thread priority levels on a 0..=100 scale.
///
/// Backends map these onto their native range with [`map_priority`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThreadPriority {
    Idle = 0,
    Low = 10,
    BelowNormal = 25,
    #[default]
    Normal = 50,
    AboveNormal = 60,
    High = 75,
    Realtime = 99,
}

impl ThreadPriority {
    /// Returns the normalized value (0..=100).
    #[inline]
    pub const fn normalized(self) -> i32 {
        self as i32
    }
}

/// Maps a normalized priority onto a native range `[min, max]`.
///
/// `normalized` is clamped to 0..=100 before mapping. The result moves
/// monotonically from `min` to `max`, whichever way round the backend orders
/// its range.
///
/// ```
/// use osal::types::map_priority;
///
/// assert_eq!(map_priority(50, 0, 31), 15);
/// assert_eq!(map_priority(150, 1, 99), 99);
/// assert_eq!(map_priority(-3, 1, 99), 1);
/// ```
pub const fn map_priority(normalized: i32, min: i32, max: i32) -> i32 {
    let n = if normalized < 0 {
        0
    } else if normalized > 100 {
        100
    } else {
        normalized
    };
    // Widen so that extreme native ranges cannot overflow.
    let span = max as i64 - min as i64;
    (min as i64 + (n as i64 * span) / 100) as i32
}

// =============================================================================
// Tick conversion
// =============================================================================

/// Convert milliseconds to ticks at [`TICK_RATE_HZ`](crate::config::TICK_RATE_HZ).
///
/// [`WAIT_FOREVER`] is preserved.
#[inline(always)]
pub const fn ms_to_ticks(ms: Timeout) -> u32 {
    if ms == WAIT_FOREVER {
        return WAIT_FOREVER;
    }
    ((ms as u64 * crate::config::TICK_RATE_HZ as u64) / 1000u64) as u32
}

/// Convert ticks to milliseconds
#[inline(always)]
pub const fn ticks_to_ms(ticks: u32) -> Timeout {
    ((ticks as u64 * 1000u64) / crate::config::TICK_RATE_HZ as u64) as Timeout
}
