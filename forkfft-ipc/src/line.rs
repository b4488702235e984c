//! Sample Decoder and Encoder
//!
//! Checks run in a fixed order: blank line, token count, alphabetic
//! characters, numeric shape. The first failing check decides the error.

use crate::IMAGINARY_UNIT;
use forkfft_core::{ComplexSample, WIRE_DIGITS};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static FLOAT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)$").expect("float token pattern is valid")
});

/// Reasons a line cannot be turned into a sample
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("blank or malformed input line {0:?}")]
    MalformedLine(String),

    #[error("too many floating point numbers in line {line:?} (found {count})")]
    TooManyValues { line: String, count: usize },

    #[error("illegal character {ch:?} in line {line:?}")]
    InvalidCharacter { ch: char, line: String },
}

fn strip_unit(token: &str) -> &str {
    match token.strip_suffix(IMAGINARY_UNIT) {
        Some(rest) => rest.strip_suffix('*').unwrap_or(rest),
        None => token,
    }
}

fn parse_component(token: &str, line: &str) -> Result<f64, DecodeError> {
    let number = strip_unit(token);
    if !FLOAT_TOKEN.is_match(number) {
        return Err(DecodeError::MalformedLine(line.to_string()));
    }
    number
        .parse()
        .map_err(|_| DecodeError::MalformedLine(line.to_string()))
}

/// Decode one line (with or without its trailing newline) into a sample.
///
/// A missing imaginary part decodes as zero.
pub fn decode_line(line: &str) -> Result<ComplexSample, DecodeError> {
    let trimmed = line.trim_end_matches(['\n', '\r']);
    if trimmed.trim().is_empty() {
        return Err(DecodeError::MalformedLine(trimmed.to_string()));
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() > 2 {
        return Err(DecodeError::TooManyValues {
            line: trimmed.to_string(),
            count: tokens.len(),
        });
    }

    if let Some(ch) = trimmed
        .chars()
        .find(|c| c.is_alphabetic() && *c != IMAGINARY_UNIT)
    {
        return Err(DecodeError::InvalidCharacter {
            ch,
            line: trimmed.to_string(),
        });
    }

    let re = parse_component(tokens[0], trimmed)?;
    let im = match tokens.get(1) {
        Some(token) => parse_component(token, trimmed)?,
        None => 0.0,
    };
    Ok(ComplexSample::new(re, im))
}

/// Encode a sample for another node, without a trailing newline.
pub fn encode_line(sample: ComplexSample) -> String {
    format!(
        "{:.*} {:.*}*{}",
        WIRE_DIGITS, sample.re, WIRE_DIGITS, sample.im, IMAGINARY_UNIT
    )
}
