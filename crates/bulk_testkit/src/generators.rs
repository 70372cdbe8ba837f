//! Property-based test generators using proptest.
//!
//! Provides strategies for command streams that respect the default
//! sentinels: ordinary commands never collide with `{`, `}` or `EOF`, and
//! balanced streams never close a block that was not opened.

use bulk_core::{DEFAULT_CLOSE, DEFAULT_OPEN};
use proptest::prelude::*;

/// One element of a generated stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An ordinary command.
    Command(String),
    /// An open delimiter.
    Open,
    /// A close delimiter.
    Close,
}

impl Token {
    /// Renders the token as an input line using the default sentinels.
    pub fn to_line(&self) -> String {
        match self {
            Self::Command(text) => text.clone(),
            Self::Open => DEFAULT_OPEN.to_string(),
            Self::Close => DEFAULT_CLOSE.to_string(),
        }
    }
}

/// Strategy for generating ordinary commands.
pub fn command_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9 _=-]{0,15}").expect("Invalid regex")
}

/// Strategy for generating streams of ordinary commands only.
pub fn static_stream_strategy(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(command_strategy(), 0..max_len)
}

/// Strategy for generating token streams with balanced delimiters.
///
/// Close tokens that would underflow are dropped and every open block is
/// closed at the end.
pub fn balanced_stream_strategy(max_len: usize) -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(raw_token_strategy(), 0..max_len).prop_map(balance)
}

/// Strategy for generating token streams that may leave blocks open.
///
/// Never emits a stray close.
pub fn open_ended_stream_strategy(max_len: usize) -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(raw_token_strategy(), 0..max_len).prop_map(|tokens| {
        let mut depth = 0usize;
        tokens
            .into_iter()
            .filter(|token| match token {
                Token::Open => {
                    depth += 1;
                    true
                }
                Token::Close if depth == 0 => false,
                Token::Close => {
                    depth -= 1;
                    true
                }
                Token::Command(_) => true,
            })
            .collect()
    })
}

/// Renders tokens as input lines.
pub fn to_lines(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(Token::to_line).collect()
}

fn raw_token_strategy() -> impl Strategy<Value = Token> {
    prop_oneof![
        6 => command_strategy().prop_map(Token::Command),
        1 => Just(Token::Open),
        1 => Just(Token::Close),
    ]
}

fn balance(tokens: Vec<Token>) -> Vec<Token> {
    let mut depth = 0usize;
    let mut balanced = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Open => depth += 1,
            Token::Close if depth == 0 => continue,
            Token::Close => depth -= 1,
            Token::Command(_) => {}
        }
        balanced.push(token);
    }
    balanced.extend(std::iter::repeat(Token::Close).take(depth));
    balanced
}

/// Case count for the cheap generator self-checks.
pub const QUICK_CASES: u32 = 32;

/// Case count for properties that drive whole sessions.
pub const SESSION_CASES: u32 = 256;

/// Proptest settings for stream properties running `cases` cases.
///
/// Generated streams shrink one token at a time, so the shrink budget grows
/// with the case count.
#[must_use]
pub fn stream_config(cases: u32) -> ProptestConfig {
    ProptestConfig {
        cases,
        max_shrink_iters: cases.saturating_mul(4),
        ..ProptestConfig::default()
    }
}
