//! Input validation errors shared by products, sales, and chat.

use thiserror::Error;

use crate::types::Rupiah;

/// Most units of one product on a single sale or cart line.
pub const MAX_QUANTITY: u32 = 100_000;

/// A user-submitted value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty after trimming.
    #[error("{0} is required")]
    Required(&'static str),

    /// A text field exceeded its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum allowed characters.
        max: usize,
    },

    /// A numeric field was negative.
    #[error("{0} cannot be negative")]
    Negative(&'static str),

    /// A quantity was zero.
    #[error("{0} must be at least 1")]
    ZeroQuantity(&'static str),

    /// A list that must contain entries was empty.
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// An amount is above what can be stored.
    #[error("{0} is too large")]
    TooLarge(&'static str),

    /// An amount has more than two decimal places.
    #[error("{0} can have at most two decimal places")]
    TooPrecise(&'static str),

    /// A quantity is above [`MAX_QUANTITY`].
    #[error("{field} must be at most {max}")]
    QuantityTooLarge {
        /// Field name.
        field: &'static str,
        /// Maximum allowed quantity.
        max: u32,
    },

    /// A field the caller may not set on this operation.
    #[error("{0} cannot be set here")]
    NotAllowed(&'static str),
}

/// Trim a required text field and check its length.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for blank input and
/// [`ValidationError::TooLong`] when the trimmed value is longer than `max`.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional text field, mapping blank input to `None`.
///
/// # Errors
///
/// Returns [`ValidationError::TooLong`] when the trimmed value is longer than `max`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) if trimmed.chars().count() > max => {
            Err(ValidationError::TooLong { field, max })
        }
        Some(trimmed) => Ok(Some(trimmed.to_owned())),
    }
}

/// Check that a rupiah amount can be stored.
///
/// # Errors
///
/// Returns [`ValidationError::Negative`], [`ValidationError::TooLarge`], or
/// [`ValidationError::TooPrecise`].
pub fn amount(field: &'static str, value: Rupiah) -> Result<Rupiah, ValidationError> {
    if value.is_negative() {
        return Err(ValidationError::Negative(field));
    }
    if value > Rupiah::MAX {
        return Err(ValidationError::TooLarge(field));
    }
    if !value.is_storable() {
        return Err(ValidationError::TooPrecise(field));
    }
    Ok(value)
}

/// Check a line quantity is between 1 and [`MAX_QUANTITY`].
///
/// # Errors
///
/// Returns [`ValidationError::ZeroQuantity`] or
/// [`ValidationError::QuantityTooLarge`].
pub const fn quantity(field: &'static str, value: u32) -> Result<u32, ValidationError> {
    if value == 0 {
        return Err(ValidationError::ZeroQuantity(field));
    }
    if value > MAX_QUANTITY {
        return Err(ValidationError::QuantityTooLarge {
            field,
            max: MAX_QUANTITY,
        });
    }
    Ok(value)
}
