// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Time primitives: second-resolution timestamps and clocks.
//!
//! Sample timestamps are whole seconds since the Unix epoch. The epoch is
//! also the lower bound of the key space: the codec rejects anything
//! earlier.
//!
//! # Example
//!
//! ```
//! use minutestore::time::{Clock, ManualClock, Timestamp};
//!
//! let clock = ManualClock::new(Timestamp::from_minutes(12));
//! assert_eq!(clock.now().as_secs(), 720);
//! ```

mod clock;
mod timestamp;

pub use clock::{now_unix_secs, Clock, ManualClock, SystemClock};
pub use timestamp::Timestamp;
