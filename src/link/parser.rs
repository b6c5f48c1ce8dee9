//! Command tokeniser.
//!
//! Splits authenticated command text on spaces into at most
//! [`MAX_TOKENS`] borrowed tokens: the mnemonic followed by its arguments.

use crate::error::ParseError;

/// Mnemonic plus up to nine arguments.
pub const MAX_TOKENS: usize = 10;

pub type Tokens<'a> = heapless::Vec<&'a str, MAX_TOKENS>;

/// Split `command` on runs of spaces.
pub fn tokenize(command: &str) -> Result<Tokens<'_>, ParseError> {
    let mut tokens = Tokens::new();
    for token in command.split(' ').filter(|t| !t.is_empty()) {
        tokens.push(token).map_err(|_| ParseError::TooManyTokens)?;
    }
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(tokens)
}
