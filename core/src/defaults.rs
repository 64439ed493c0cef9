//! Library-wide timing defaults.

use std::time::Duration;

/// Tick period of the engine's timer loop.
pub const TIMER_PERIOD: Duration = Duration::from_millis(100);

/// Polling period used when a request does not specify one.
pub const DEFAULT_POLLING_PERIOD: Duration = Duration::from_millis(100);

/// Negative timeout used by the shorthand constructors.
pub const DEFAULT_NEGATIVE_TIMEOUT: Duration = Duration::from_secs(20);

/// Positive timeout used by the shorthand constructors: confirm immediately
/// once the condition holds.
pub const DEFAULT_POSITIVE_TIMEOUT: Duration = Duration::ZERO;

/// Positive timeout used when an action text is shown: gives the user a
/// short window to reject after the condition turns true.
pub const POSITIVE_TIMEOUT_WITH_ACTION: Duration = Duration::from_secs(2);
