//! Validated payment form fields.
//!
//! Each newtype can only be built through its `parse` function, so a value of
//! that type is proof the field passed checkout validation.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while validating payment fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentFieldError {
    /// Card expiry is not `MM/YY` with a month from 01 to 12.
    #[error("Invalid expiry date format (MM/YY).")]
    InvalidExpiry,
    /// CVV is not 3 or 4 digits.
    #[error("Invalid CVV format (3 or 4 digits).")]
    InvalidCvv,
    /// Phone number is not a Kenyan mobile number in international format.
    #[error(
        "Invalid M-Pesa phone number format. Must be 2547XXXXXXXX, 25410XXXXXXX, or 25411XXXXXXX (12 digits)."
    )]
    InvalidMpesaPhone,
}

/// Card expiry month and two-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardExpiry {
    month: u8,
    year: u8,
}

impl CardExpiry {
    /// Parse `MM/YY`. The slash may be omitted (`MMYY`), as card forms often
    /// strip it while the user types.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentFieldError::InvalidExpiry`] for anything else.
    ///
    /// ```
    /// use mangaverse_core::CardExpiry;
    ///
    /// assert!(CardExpiry::parse("09/26").is_ok());
    /// assert!(CardExpiry::parse("13/25").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, PaymentFieldError> {
        let bytes = input.as_bytes();
        let (mm, yy) = match bytes {
            [m1, m2, b'/', y1, y2] | [m1, m2, y1, y2] => ([*m1, *m2], [*y1, *y2]),
            _ => return Err(PaymentFieldError::InvalidExpiry),
        };
        let month = two_digits(mm).ok_or(PaymentFieldError::InvalidExpiry)?;
        let year = two_digits(yy).ok_or(PaymentFieldError::InvalidExpiry)?;
        if !(1..=12).contains(&month) {
            return Err(PaymentFieldError::InvalidExpiry);
        }
        Ok(Self { month, year })
    }

    /// Month, 1 to 12.
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Two-digit year.
    #[must_use]
    pub const fn year(&self) -> u8 {
        self.year
    }
}

fn two_digits(pair: [u8; 2]) -> Option<u8> {
    let [tens, ones] = pair;
    if tens.is_ascii_digit() && ones.is_ascii_digit() {
        Some((tens - b'0') * 10 + (ones - b'0'))
    } else {
        None
    }
}

impl fmt::Display for CardExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year)
    }
}

impl Serialize for CardExpiry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CardExpiry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Card verification value, 3 or 4 digits.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cvv(String);

impl Cvv {
    /// Parse a CVV.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentFieldError::InvalidCvv`] unless the input is 3-4 ASCII digits.
    pub fn parse(input: &str) -> Result<Self, PaymentFieldError> {
        let valid = (3..=4).contains(&input.len()) && input.bytes().all(|b| b.is_ascii_digit());
        if valid {
            Ok(Self(input.to_owned()))
        } else {
            Err(PaymentFieldError::InvalidCvv)
        }
    }

    /// The digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Cvv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cvv([REDACTED])")
    }
}

/// Card fields collected by the credit card form.
///
/// `Debug` masks the card number and CVV so they never reach the logs.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    #[serde(rename = "expiryDate")]
    pub expiry: CardExpiry,
    pub cvv: Cvv,
}

impl CardDetails {
    /// Last four characters of the card number, for display.
    #[must_use]
    pub fn last_four(&self) -> &str {
        let start = self
            .card_number
            .char_indices()
            .rev()
            .nth(3)
            .map_or(0, |(idx, _)| idx);
        self.card_number.get(start..).unwrap_or_default()
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &format_args!("**** {}", self.last_four()))
            .field("expiry", &self.expiry)
            .field("cvv", &self.cvv)
            .finish()
    }
}

/// Kenyan mobile number in international format, as required by M-Pesa.
///
/// `254` followed by a `7`, `10` or `11` subscriber prefix, 12 digits in total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MpesaPhone(String);

impl MpesaPhone {
    /// Total digit count of a valid number.
    pub const LENGTH: usize = 12;

    /// Parse an M-Pesa phone number.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentFieldError::InvalidMpesaPhone`] if the number is not
    /// 12 digits of the form `2547…`, `25410…` or `25411…`.
    ///
    /// ```
    /// use mangaverse_core::MpesaPhone;
    ///
    /// assert!(MpesaPhone::parse("254712345678").is_ok());
    /// assert!(MpesaPhone::parse("254712345").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, PaymentFieldError> {
        let all_digits = input.bytes().all(|b| b.is_ascii_digit());
        let subscriber = input.strip_prefix("254").unwrap_or_default();
        let known_prefix = ["7", "10", "11"]
            .iter()
            .any(|prefix| subscriber.starts_with(prefix));

        if all_digits && input.len() == Self::LENGTH && known_prefix {
            Ok(Self(input.to_owned()))
        } else {
            Err(PaymentFieldError::InvalidMpesaPhone)
        }
    }

    /// The digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MpesaPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
