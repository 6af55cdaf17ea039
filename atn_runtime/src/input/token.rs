//! Tokens

use crate::atn::{DEFAULT_CHANNEL, EOF};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: i32,
    pub channel: i32,

    /// Character range `start..stop` in the source
    pub start: usize,
    pub stop: usize,

    pub text: String,

    /// 1-based line and 0-based column of the first character
    pub line: usize,
    pub column: usize,

    /// Position in the token stream
    pub index: usize,
}

impl Token {
    pub fn new(token_type: i32, text: &str) -> Self {
        Self {
            token_type,
            channel: DEFAULT_CHANNEL,
            start: 0,
            stop: 0,
            text: text.to_string(),
            line: 1,
            column: 0,
            index: 0,
        }
    }

    pub fn eof(position: usize, line: usize, column: usize) -> Self {
        Self {
            token_type: EOF,
            channel: DEFAULT_CHANNEL,
            start: position,
            stop: position,
            text: "<EOF>".to_string(),
            line,
            column,
            index: 0,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == EOF
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .text
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        write!(
            f,
            "[@{},{}:{}='{}',<{}>",
            self.index,
            self.start,
            self.stop.saturating_sub(1),
            text,
            self.token_type
        )?;
        if self.channel != DEFAULT_CHANNEL {
            write!(f, ",channel={}", self.channel)?;
        }
        write!(f, ",{}:{}]", self.line, self.column)
    }
}
