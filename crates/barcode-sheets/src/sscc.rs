//! Serial Shipping Container Codes

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Number of digits in an SSCC
pub const SSCC_LEN: usize = 18;

/// An 18-digit shipment identifier.
///
/// Only ASCII digits are accepted. The GS1 check digit is not enforced; use
/// [`Sscc::check_digit_valid`] to inspect it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sscc(String);

impl Sscc {
    /// Pull an identifier out of a raw cell value.
    ///
    /// Surrounding whitespace is ignored. Anything that is not exactly 18
    /// digits after trimming yields `None`.
    pub fn extract(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if is_sscc(trimmed) {
            Some(Sscc(trimmed.to_string()))
        } else {
            None
        }
    }

    /// The 18 digits
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the last digit matches the GS1 mod-10 check digit of the first 17
    pub fn check_digit_valid(&self) -> bool {
        let digits: Vec<u32> = self.0.bytes().map(|b| u32::from(b - b'0')).collect();
        let (body, check) = digits.split_at(SSCC_LEN - 1);
        // Weights alternate 3,1,3,... starting from the rightmost body digit
        let sum: u32 = body
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
            .sum();
        (10 - sum % 10) % 10 == check[0]
    }
}

/// Exactly 18 ASCII digits, no trimming
pub(crate) fn is_sscc(s: &str) -> bool {
    s.len() == SSCC_LEN && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for Sscc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sscc::extract(s).ok_or_else(|| Error::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Display for Sscc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sscc {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
