//! Buffered token stream

use super::{CharStream, IntStream, Token, TokenStream};
use crate::atn::{DEFAULT_CHANNEL, EOF};
use crate::lexer::{Lexer, LexerResult};
use crate::recognizer::Recognizer;

/// Fully buffered token stream that presents one channel to the parser.
/// Indexes are absolute positions in the buffer; the cursor always rests on
/// a token of the selected channel or on EOF.
#[derive(Debug, Clone)]
pub struct CommonTokenStream {
    tokens: Vec<Token>,
    index: usize,
    channel: i32,
    name: String,
}

impl CommonTokenStream {
    /// Stream over `tokens`; an EOF token is appended when missing
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_channel(tokens, DEFAULT_CHANNEL)
    }

    pub fn with_channel(mut tokens: Vec<Token>, channel: i32) -> Self {
        if !tokens.last().map(Token::is_eof).unwrap_or(false) {
            let position = tokens.last().map(|t| t.stop).unwrap_or(0);
            tokens.push(Token::eof(position, 1, 0));
        }
        for (i, token) in tokens.iter_mut().enumerate() {
            token.index = i;
        }
        let mut stream = Self {
            tokens,
            index: 0,
            channel,
            name: "<tokens>".to_string(),
        };
        stream.index = stream.next_on_channel(0);
        stream
    }

    /// Stream of bare token types on the default channel
    pub fn from_types(types: &[i32]) -> Self {
        let tokens = types
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let mut token = Token::new(t, &t.to_string());
                token.start = i;
                token.stop = i + 1;
                token.column = i;
                token
            })
            .collect();
        Self::new(tokens)
    }

    /// Run `lexer` to the end of its input and buffer every token
    pub fn from_lexer<I: CharStream, R: Recognizer>(lexer: &mut Lexer<I, R>) -> LexerResult<Self> {
        let mut stream = Self::new(lexer.all_tokens()?);
        stream.name = lexer.source_name().to_string();
        Ok(stream)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn on_channel(&self, token: &Token) -> bool {
        token.channel == self.channel || token.token_type == EOF
    }

    /// First index at or after `i` holding a token on the channel
    fn next_on_channel(&self, mut i: usize) -> usize {
        let last = self.tokens.len().saturating_sub(1);
        while i < last && !self.on_channel(&self.tokens[i]) {
            i += 1;
        }
        i.min(last)
    }

    /// Last index at or before `i` holding a token on the channel
    fn previous_on_channel(&self, i: usize) -> Option<usize> {
        (0..=i).rev().find(|&j| self.on_channel(&self.tokens[j]))
    }
}

impl IntStream for CommonTokenStream {
    fn consume(&mut self) {
        if self.la(1) == EOF {
            return;
        }
        self.index = self.next_on_channel(self.index + 1);
    }

    fn la(&self, i: isize) -> i32 {
        match i {
            0 => 0,
            i if i > 0 => {
                let mut j = self.index;
                for _ in 1..i {
                    if self.tokens[j].is_eof() {
                        break;
                    }
                    j = self.next_on_channel(j + 1);
                }
                self.tokens[j].token_type
            }
            i => {
                let mut j = self.index;
                for _ in 0..i.unsigned_abs() {
                    match j.checked_sub(1).and_then(|k| self.previous_on_channel(k)) {
                        Some(k) => j = k,
                        None => return EOF,
                    }
                }
                self.tokens[j].token_type
            }
        }
    }

    fn index(&self) -> usize {
        self.index
    }

    fn seek(&mut self, index: usize) {
        self.index = self.next_on_channel(index);
    }

    fn size(&self) -> usize {
        self.tokens.len()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

impl TokenStream for CommonTokenStream {
    fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }
}
