// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowspec-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowspec and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Random opaque tokens used to name model nodes.
//!
//! A token is 64 characters of the URL-safe base64 alphabet (`A-Z a-z 0-9 - _`), drawn from
//! the operating system CSPRNG. There is no registry: two calls are independent, and collision
//! resistance comes only from the 384 random bits behind each token.

use std::fmt;
use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;

/// Length of a generated token, excluding any prefix.
pub const TOKEN_LEN: usize = 64;

// 48 bytes encode to exactly 64 base64 characters, so no padding is ever produced.
const TOKEN_BYTES: usize = TOKEN_LEN / 4 * 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    InvalidPrefix { prefix: String },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrefix { prefix } => write!(
                f,
                "invalid token prefix {prefix:?} (expected letters, digits, '_' or '-')"
            ),
        }
    }
}

impl std::error::Error for TokenError {}

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // A trailing '-' is covered by the class; it reads as a separator (`AUTO-xxxx`).
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static prefix pattern"))
}

pub fn validate_token_prefix(prefix: &str) -> Result<(), TokenError> {
    if prefix_pattern().is_match(prefix) {
        Ok(())
    } else {
        Err(TokenError::InvalidPrefix {
            prefix: prefix.to_owned(),
        })
    }
}

/// Returns a new token, `prefix` + 64 URL-safe characters.
pub fn generate_token(prefix: Option<&str>) -> Result<String, TokenError> {
    if let Some(prefix) = prefix {
        validate_token_prefix(prefix)?;
    }

    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let encoded = URL_SAFE_NO_PAD.encode(bytes);

    let prefix = prefix.unwrap_or("");
    let mut token = String::with_capacity(prefix.len() + TOKEN_LEN);
    token.push_str(prefix);
    token.push_str(&encoded);
    Ok(token)
}

pub fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{generate_token, is_token_char, TokenError, TOKEN_LEN};

    #[test]
    fn unprefixed_token_is_64_url_safe_chars() {
        for _ in 0..32 {
            let token = generate_token(None).expect("token");
            assert_eq!(token.len(), TOKEN_LEN);
            assert!(token.chars().all(is_token_char), "unexpected char in {token}");
        }
    }

    #[test]
    fn prefixed_token_keeps_prefix() {
        let token = generate_token(Some("AUTO-")).expect("token");
        assert_eq!(token.len(), TOKEN_LEN + 5);
        assert!(token.starts_with("AUTO-"));
        assert!(token["AUTO-".len()..].chars().all(is_token_char));
    }

    #[test]
    fn prefix_with_space_is_rejected() {
        let err = generate_token(Some("bad prefix")).unwrap_err();
        assert_eq!(
            err,
            TokenError::InvalidPrefix {
                prefix: "bad prefix".to_owned()
            }
        );
        assert!(err.to_string().contains("\"bad prefix\""));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        assert!(generate_token(Some("")).is_err());
    }

    #[test]
    fn repeated_calls_are_independent() {
        let tokens: BTreeSet<String> =
            (0..64).map(|_| generate_token(None).expect("token")).collect();
        assert_eq!(tokens.len(), 64);
    }
}
