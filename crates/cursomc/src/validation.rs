//! Input validation.
//!
//! Validation is pure and collects every failing field instead of stopping at
//! the first one. Callers turn a non-empty [`ValidationErrors`] into a 422.

use serde::Serialize;
use thiserror::Error;

/// One failing field and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMessage {
    pub field_name: String,
    pub message: String,
}

/// Accumulated field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed for {} field(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldMessage>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field_name: &str, message: impl Into<String>) {
        self.errors.push(FieldMessage {
            field_name: field_name.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_field(&self, field_name: &str) -> bool {
        self.errors.iter().any(|e| e.field_name == field_name)
    }

    pub fn into_errors(self) -> Vec<FieldMessage> {
        self.errors
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Record `message` when `value` is blank.
    pub fn require(&mut self, field_name: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field_name, message);
        }
    }

    /// Record a message when `value` is blank or its length is outside `min..=max`.
    pub fn length(&mut self, field_name: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len == 0 {
            self.add(field_name, "Required field");
        } else if !(min..=max).contains(&len) {
            self.add(
                field_name,
                format!("Length must be between {min} and {max} characters"),
            );
        }
    }
}

/// Basic email validation.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Digits of a document number, accepting `.`, `-` and `/` as separators.
fn document_digits(document: &str) -> Option<Vec<u32>> {
    let mut digits = Vec::with_capacity(document.len());
    for c in document.chars() {
        match c {
            '0'..='9' => digits.push(c.to_digit(10)?),
            '.' | '-' | '/' => {}
            _ => return None,
        }
    }
    Some(digits)
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Validate a CPF (individual taxpayer number) including both check digits.
pub fn is_valid_cpf(document: &str) -> bool {
    let Some(digits) = document_digits(document) else {
        return false;
    };
    if digits.len() != 11 || all_same(&digits) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        (sum * 10 % 11) % 10
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// Validate a CNPJ (company taxpayer number) including both check digits.
pub fn is_valid_cnpj(document: &str) -> bool {
    const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let Some(digits) = document_digits(document) else {
        return false;
    };
    if digits.len() != 14 || all_same(&digits) {
        return false;
    }

    let check = |weights: &[u32]| -> u32 {
        let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
        match sum % 11 {
            r if r < 2 => 0,
            r => 11 - r,
        }
    };

    check(&FIRST_WEIGHTS) == digits[12] && check(&SECOND_WEIGHTS) == digits[13]
}
