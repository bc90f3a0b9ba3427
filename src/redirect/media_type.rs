//! `Content-Type` media type parsing.

use std::collections::HashSet;

use thiserror::Error;

/// Why a `Content-Type` value could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaTypeError {
    /// Nothing before the first `;`.
    #[error("no media type")]
    Empty,
    /// The type or subtype is not a token.
    #[error("invalid media type {0:?}")]
    InvalidType(String),
    /// A parameter is not `name=value` with a token name.
    #[error("invalid media parameter {0:?}")]
    InvalidParameter(String),
    /// The same parameter name appears twice.
    #[error("duplicate parameter name {0:?}")]
    DuplicateParameter(String),
}

/// Parses a `Content-Type` value and returns its lowercased media type.
///
/// Accepts `type/subtype` or a bare token, followed by any number of
/// `; name=value` parameters whose values are tokens or quoted strings.
/// Parameters are validated but not returned.
pub fn parse_media_type(value: &str) -> Result<String, MediaTypeError> {
    let (media_type, mut rest) = match value.split_once(';') {
        Some((media_type, rest)) => (media_type, Some(rest)),
        None => (value, None),
    };
    let media_type = media_type.trim().to_ascii_lowercase();
    check_media_type(&media_type)?;

    let mut seen = HashSet::new();
    while let Some(params) = rest {
        let params = params.trim_start_matches([' ', '\t']);
        if params.is_empty() {
            break;
        }
        let (name, after) = consume_parameter(params)?;
        if !seen.insert(name.clone()) {
            return Err(MediaTypeError::DuplicateParameter(name));
        }
        let after = after.trim_start_matches([' ', '\t']);
        rest = match after.strip_prefix(';') {
            Some(next) => Some(next),
            None if after.is_empty() => None,
            None => return Err(MediaTypeError::InvalidParameter(after.to_string())),
        };
    }

    Ok(media_type)
}

fn check_media_type(media_type: &str) -> Result<(), MediaTypeError> {
    if media_type.is_empty() {
        return Err(MediaTypeError::Empty);
    }
    let valid = match media_type.split_once('/') {
        Some((kind, subtype)) => is_token(kind) && is_token(subtype),
        None => is_token(media_type),
    };
    if valid {
        Ok(())
    } else {
        Err(MediaTypeError::InvalidType(media_type.to_string()))
    }
}

/// Consumes `name=value` from the front of `input`, returning the lowercased
/// name and the unconsumed remainder.
fn consume_parameter(input: &str) -> Result<(String, &str), MediaTypeError> {
    let invalid = || MediaTypeError::InvalidParameter(input.to_string());

    let name_len = token_len(input);
    if name_len == 0 {
        return Err(invalid());
    }
    let (name, rest) = input.split_at(name_len);
    let rest = rest
        .trim_start_matches([' ', '\t'])
        .strip_prefix('=')
        .ok_or_else(invalid)?
        .trim_start_matches([' ', '\t']);

    let rest = if let Some(quoted) = rest.strip_prefix('"') {
        skip_quoted_string(quoted).ok_or_else(invalid)?
    } else {
        let value_len = token_len(rest);
        if value_len == 0 {
            return Err(invalid());
        }
        &rest[value_len..]
    };

    Ok((name.to_ascii_lowercase(), rest))
}

/// Skips the body of a quoted string (opening quote already consumed).
fn skip_quoted_string(input: &str) -> Option<&str> {
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some(&input[i + 1..]),
            '\\' => {
                chars.next()?;
            }
            _ => {}
        }
    }
    None
}

fn token_len(input: &str) -> usize {
    input
        .bytes()
        .take_while(|&b| is_token_byte(b))
        .count()
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_byte)
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?=".contains(&b)
}
