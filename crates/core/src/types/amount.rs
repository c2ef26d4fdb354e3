//! Non-negative money amounts with fixed precision.
//!
//! Survey amounts are stored as `NUMERIC(12, 2)`: at most 12 significant
//! digits, at most 2 of them after the decimal point, never negative.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reasons an input cannot become an [`Amount`].
///
/// The display strings are shown verbatim next to form fields.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// Not a decimal number.
    #[error("Enter a number.")]
    Invalid,
    /// Below zero.
    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,
    /// Too many significant digits.
    #[error("Ensure that there are no more than {max} digits in total.")]
    TooManyDigits {
        /// Maximum total digits.
        max: u32,
    },
    /// Too many digits after the decimal point.
    #[error("Ensure that there are no more than {max} decimal places.")]
    TooManyDecimalPlaces {
        /// Maximum fractional digits.
        max: u32,
    },
    /// Too many digits before the decimal point.
    #[error("Ensure that there are no more than {max} digits before the decimal point.")]
    TooManyWholeDigits {
        /// Maximum integer digits.
        max: u32,
    },
}

/// A validated, non-negative amount of money.
///
/// ```
/// use finmate_core::{Amount, AmountError};
///
/// assert_eq!(Amount::parse("50000").unwrap().to_string(), "50000");
/// assert_eq!(Amount::parse("-1"), Err(AmountError::Negative));
/// assert_eq!(Amount::parse("1.005"), Err(AmountError::TooManyDecimalPlaces { max: 2 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Maximum number of significant digits.
    pub const MAX_DIGITS: u32 = 12;

    /// Maximum number of digits after the decimal point.
    pub const DECIMAL_PLACES: u32 = 2;

    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse user input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Invalid`] for anything that is not a plain
    /// decimal literal, otherwise the first precision or sign violation.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let input = input.trim();
        if input.is_empty() || input.contains('_') {
            return Err(AmountError::Invalid);
        }
        let value = Decimal::from_str(input).map_err(|_| AmountError::Invalid)?;
        Self::new(value)
    }

    /// Validate an already-decoded decimal.
    ///
    /// # Errors
    ///
    /// Returns the first sign or precision violation.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative);
        }

        let decimals = value.scale();
        let significant = u32::try_from(value.mantissa().unsigned_abs().to_string().len())
            .unwrap_or(u32::MAX);
        // "0.05" has one significant digit but still occupies two places
        let digits = significant.max(decimals);
        let whole_digits = digits - decimals;

        if digits > Self::MAX_DIGITS {
            return Err(AmountError::TooManyDigits {
                max: Self::MAX_DIGITS,
            });
        }
        if decimals > Self::DECIMAL_PLACES {
            return Err(AmountError::TooManyDecimalPlaces {
                max: Self::DECIMAL_PLACES,
            });
        }
        if whole_digits > Self::MAX_DIGITS - Self::DECIMAL_PLACES {
            return Err(AmountError::TooManyWholeDigits {
                max: Self::MAX_DIGITS - Self::DECIMAL_PLACES,
            });
        }

        Ok(Self(value))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Amount {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Amount {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let value = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(value)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Amount {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
