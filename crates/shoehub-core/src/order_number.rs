//! # Order Numbers
//!
//! Human-readable, year-scoped order identifiers: `SH-2026-000042`.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   SH - 2026 - 000042                                                   │
//! │   ──   ────   ──────                                                   │
//! │   │     │       └── sequence, 6 digits, zero-padded, starts at 1       │
//! │   │     └────────── calendar year the order was created in            │
//! │   └──────────────── fixed shop prefix                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequence restarts at 1 each year only because the prefix changes.
//! Fixed-width padding makes string order equal numeric order, so "greatest
//! order number with this prefix" can be found with a plain string sort.
//! The width is therefore a hard limit: see [`MAX_ORDER_SEQUENCE`].
//!
//! Everything here is pure; the year is always passed in. Atomic allocation
//! against the database lives in `shoehub-db`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Shop prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "SH";

/// Width of the zero-padded sequence.
pub const ORDER_SEQUENCE_WIDTH: usize = 6;

/// Largest sequence that fits the padding width.
pub const MAX_ORDER_SEQUENCE: u32 = 999_999;

/// A parsed order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderNumber {
    year: i32,
    sequence: u32,
}

impl OrderNumber {
    /// Builds an order number, refusing sequences outside `1..=MAX_ORDER_SEQUENCE`.
    pub fn new(year: i32, sequence: u32) -> CoreResult<Self> {
        if sequence > MAX_ORDER_SEQUENCE {
            return Err(CoreError::OrderNumberExhausted {
                year,
                max: MAX_ORDER_SEQUENCE,
            });
        }
        if sequence == 0 || !(0..=9999).contains(&year) {
            return Err(CoreError::InvalidOrderNumber(format!(
                "{}-{:04}-{:06}",
                ORDER_NUMBER_PREFIX, year, sequence
            )));
        }
        Ok(OrderNumber { year, sequence })
    }

    /// The first number of a year: `SH-<year>-000001`.
    pub fn first(year: i32) -> CoreResult<Self> {
        OrderNumber::new(year, 1)
    }

    /// The number that follows `last` in `year`.
    ///
    /// `last` is the greatest existing number for the year (if any). A
    /// `last` from a different year is ignored and the sequence restarts.
    ///
    /// ```rust
    /// use shoehub_core::order_number::OrderNumber;
    ///
    /// let last: OrderNumber = "SH-2026-000041".parse().unwrap();
    /// let next = OrderNumber::next_after(Some(&last), 2026).unwrap();
    /// assert_eq!(next.to_string(), "SH-2026-000042");
    ///
    /// let fresh = OrderNumber::next_after(Some(&last), 2027).unwrap();
    /// assert_eq!(fresh.to_string(), "SH-2027-000001");
    /// ```
    pub fn next_after(last: Option<&OrderNumber>, year: i32) -> CoreResult<Self> {
        match last {
            Some(last) if last.year == year => last.next(),
            _ => OrderNumber::first(year),
        }
    }

    /// The following number in the same year.
    pub fn next(&self) -> CoreResult<Self> {
        OrderNumber::new(self.year, self.sequence + 1)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The `SH-YYYY-` prefix shared by every number of `year`.
    pub fn year_prefix(year: i32) -> String {
        format!("{}-{:04}-", ORDER_NUMBER_PREFIX, year)
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            OrderNumber::year_prefix(self.year),
            self.sequence,
            width = ORDER_SEQUENCE_WIDTH
        )
    }
}

impl FromStr for OrderNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidOrderNumber(s.to_string());

        let mut parts = s.split('-');
        let (prefix, year, sequence) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(p), Some(y), Some(n), None) => (p, y, n),
            _ => return Err(invalid()),
        };

        if prefix != ORDER_NUMBER_PREFIX
            || year.len() != 4
            || sequence.len() != ORDER_SEQUENCE_WIDTH
            || !year.chars().all(|c| c.is_ascii_digit())
            || !sequence.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let sequence: u32 = sequence.parse().map_err(|_| invalid())?;
        OrderNumber::new(year, sequence).map_err(|_| invalid())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
