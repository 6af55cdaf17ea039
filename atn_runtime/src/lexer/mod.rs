//! Lexer driver
//!
//! [`Lexer`] turns a character stream into tokens by repeatedly asking the
//! [`LexerAtnSimulator`] for the longest match in the current mode, running
//! the matched rule's actions, and emitting, skipping or extending the
//! token as those actions decide.

pub mod error;

pub use error::{LexerError, LexerResult};

use crate::action::LexerControl;
use crate::atn::{DEFAULT_CHANNEL, DEFAULT_MODE, EOF};
use crate::config::compile_time::lexer::MAX_MODE_STACK_DEPTH;
use crate::config::LexerPreferences;
use crate::dfa::PredictionCache;
use crate::input::{CharStream, Token};
use crate::logging::codes;
use crate::recognizer::{DefaultRecognizer, Recognizer};
use crate::simulator::LexerAtnSimulator;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::sync::Arc;

/// Token type set by `skip`: the match is dropped and lexing restarts
pub const SKIP: i32 = -3;

/// Token type set by `more`: the match is kept as the prefix of the next one
pub const MORE: i32 = -2;

// ============================================================================
// METRICS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LexerMetrics {
    pub tokens: usize,
    pub skipped: usize,
    pub off_channel: usize,
    pub errors: usize,
    pub longest_token: usize,
}

impl LexerMetrics {
    fn record_token(&mut self, token: &Token) {
        self.tokens += 1;
        if token.channel != DEFAULT_CHANNEL {
            self.off_channel += 1;
        }
        self.longest_token = self.longest_token.max(token.stop - token.start);
    }
}

// ============================================================================
// LEXER
// ============================================================================

pub struct Lexer<I: CharStream, R: Recognizer = DefaultRecognizer> {
    input: I,
    recognizer: R,
    interpreter: LexerAtnSimulator,

    mode: usize,
    mode_stack: Vec<usize>,

    // State of the token being built
    token_start: usize,
    token_line: usize,
    token_column: usize,
    token_type: Option<i32>,
    channel: i32,
    hit_eof: bool,

    emitted: usize,
    metrics: LexerMetrics,
}

impl<I: CharStream> Lexer<I, DefaultRecognizer> {
    pub fn new(input: I, cache: Arc<PredictionCache>) -> Self {
        Self::with_recognizer(input, cache, DefaultRecognizer)
    }
}

impl<I: CharStream, R: Recognizer> Lexer<I, R> {
    pub fn with_recognizer(input: I, cache: Arc<PredictionCache>, recognizer: R) -> Self {
        Self::build(input, LexerAtnSimulator::new(cache), recognizer)
    }

    pub fn with_preferences(
        input: I,
        cache: Arc<PredictionCache>,
        recognizer: R,
        preferences: LexerPreferences,
    ) -> Self {
        Self::build(
            input,
            LexerAtnSimulator::with_preferences(cache, preferences),
            recognizer,
        )
    }

    fn build(input: I, interpreter: LexerAtnSimulator, recognizer: R) -> Self {
        let token_start = input.index();
        Self {
            input,
            recognizer,
            interpreter,
            mode: DEFAULT_MODE,
            mode_stack: Vec::new(),
            token_start,
            token_line: 1,
            token_column: 0,
            token_type: None,
            channel: DEFAULT_CHANNEL,
            hit_eof: false,
            emitted: 0,
            metrics: LexerMetrics::default(),
        }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut R {
        &mut self.recognizer
    }

    pub fn interpreter(&self) -> &LexerAtnSimulator {
        &self.interpreter
    }

    pub fn source_name(&self) -> &str {
        self.input.source_name()
    }

    pub fn mode(&self) -> usize {
        self.mode
    }

    pub fn mode_stack(&self) -> &[usize] {
        &self.mode_stack
    }

    pub fn line(&self) -> usize {
        self.interpreter.line()
    }

    pub fn column(&self) -> usize {
        self.interpreter.column()
    }

    pub fn metrics(&self) -> &LexerMetrics {
        &self.metrics
    }

    /// Rewind to the start of the input in the default mode
    pub fn reset(&mut self) {
        self.input.seek(0);
        self.interpreter.reset();
        self.mode = DEFAULT_MODE;
        self.mode_stack.clear();
        self.token_type = None;
        self.channel = DEFAULT_CHANNEL;
        self.hit_eof = false;
        self.emitted = 0;
        self.metrics = LexerMetrics::default();
    }

    /// Next token on any channel; EOF once the input is exhausted, and on
    /// every call after that
    pub fn next_token(&mut self) -> LexerResult<Token> {
        'token: loop {
            // nullable rules never match at end of input
            if self.hit_eof || self.input.la(1) == EOF {
                self.hit_eof = true;
                return Ok(self.emit_eof());
            }

            self.channel = DEFAULT_CHANNEL;
            self.token_start = self.input.index();
            self.token_line = self.interpreter.line();
            self.token_column = self.interpreter.column();

            loop {
                self.token_type = None;
                let matched =
                    self.interpreter
                        .match_token(&mut self.input, self.mode, &mut self.recognizer)?;
                if let Some(executor) = &matched.executor {
                    executor.execute(self, matched.start)?;
                }

                let token_type = self.token_type.unwrap_or(matched.token_type);
                match token_type {
                    SKIP => {
                        self.metrics.skipped += 1;
                        continue 'token;
                    }
                    MORE => continue,
                    EOF => return Ok(self.emit_eof()),
                    _ => return Ok(self.emit(token_type)),
                }
            }
        }
    }

    /// Skip the character that stopped the last match
    pub fn recover(&mut self) {
        if self.input.la(1) != EOF {
            self.interpreter.consume(&mut self.input);
        }
    }

    /// Every remaining token up to and including EOF, stopping at the first
    /// error
    pub fn all_tokens(&mut self) -> LexerResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        self.log_complete(&tokens);
        Ok(tokens)
    }

    /// Every remaining token, skipping unrecognizable characters. Errors
    /// that recovery cannot get past end the run early.
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<LexerError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        loop {
            match self.next_token() {
                Ok(token) => {
                    let done = token.is_eof();
                    tokens.push(token);
                    if done {
                        break;
                    }
                }
                Err(error) => {
                    self.metrics.errors += 1;
                    log_error!(error.error_code(), "Lexing error",
                        "source" => self.source_name(),
                        "line" => self.token_line,
                        "column" => self.token_column,
                        "error" => &error
                    );
                    let recoverable = error.is_recoverable();
                    errors.push(error);
                    if !recoverable {
                        break;
                    }
                    self.recover();
                }
            }
        }
        self.log_complete(&tokens);
        (tokens, errors)
    }

    fn log_complete(&self, tokens: &[Token]) {
        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Tokenization completed",
            "source" => self.source_name(),
            "token_count" => tokens.len(),
            "skipped" => self.metrics.skipped,
            "off_channel" => self.metrics.off_channel,
            "errors" => self.metrics.errors,
            "longest_token" => self.metrics.longest_token
        );
    }

    fn emit(&mut self, token_type: i32) -> Token {
        let stop = self.input.index();
        let token = Token {
            token_type,
            channel: self.channel,
            start: self.token_start,
            stop,
            text: self.input.text(self.token_start, stop),
            line: self.token_line,
            column: self.token_column,
            index: self.emitted,
        };
        self.emitted += 1;
        self.metrics.record_token(&token);
        if self.interpreter.preferences().log_tokens {
            log_debug!("Token emitted", "token" => &token, "mode" => self.mode);
        }
        token
    }

    fn emit_eof(&mut self) -> Token {
        let mut token = Token::eof(
            self.input.index(),
            self.interpreter.line(),
            self.interpreter.column(),
        );
        token.index = self.emitted;
        token
    }

    fn check_mode(&self, mode: usize) -> LexerResult<()> {
        if mode >= self.interpreter.atn().mode_to_start_state.len() {
            return Err(LexerError::UnknownMode { mode });
        }
        Ok(())
    }
}

impl<I: CharStream, R: Recognizer> LexerControl for Lexer<I, R> {
    fn set_type(&mut self, token_type: i32) {
        self.token_type = Some(token_type);
    }

    fn set_channel(&mut self, channel: i32) {
        self.channel = channel;
    }

    fn set_mode(&mut self, mode: usize) -> LexerResult<()> {
        self.check_mode(mode)?;
        self.mode = mode;
        Ok(())
    }

    fn push_mode(&mut self, mode: usize) -> LexerResult<()> {
        self.check_mode(mode)?;
        if self.mode_stack.len() >= MAX_MODE_STACK_DEPTH {
            return Err(LexerError::ModeStackOverflow {
                depth: MAX_MODE_STACK_DEPTH,
            });
        }
        self.mode_stack.push(self.mode);
        self.mode = mode;
        Ok(())
    }

    fn pop_mode(&mut self) -> LexerResult<usize> {
        let mode = self.mode_stack.pop().ok_or(LexerError::EmptyModeStack)?;
        self.mode = mode;
        Ok(mode)
    }

    fn skip(&mut self) {
        self.token_type = Some(SKIP);
    }

    fn more(&mut self) {
        self.token_type = Some(MORE);
    }

    fn custom_action(&mut self, rule_index: usize, action_index: usize) {
        let position = self.input.index();
        self.recognizer.action(rule_index, action_index, position);
    }

    fn index(&self) -> usize {
        self.input.index()
    }

    fn seek(&mut self, index: usize) {
        self.input.seek(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::LexerAction;
    use crate::atn::builder::{AtnBuilder, Element};
    use crate::atn::HIDDEN_CHANNEL;
    use crate::fixtures::{self, keyword_lexer_tokens as tok};
    use crate::input::InputStream;
    use crate::recognizer::tests::ScriptedRecognizer;
    use assert_matches::assert_matches;

    fn lexer(text: &str) -> Lexer<InputStream> {
        let cache = Arc::new(PredictionCache::new(Arc::new(fixtures::keyword_lexer())));
        Lexer::new(InputStream::new(text), cache)
    }

    fn summary(tokens: &[Token]) -> Vec<(i32, &str)> {
        tokens
            .iter()
            .map(|t| (t.token_type, t.text.as_str()))
            .collect()
    }

    #[test]
    fn test_tokens_with_modes_and_skips() {
        let mut lexer = lexer("if \"a b\" x 42");
        let tokens = lexer.all_tokens().unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                (tok::IF, "if"),
                (tok::QUOTE, "\""),
                (tok::TEXT, "a b"),
                (tok::END_QUOTE, "\""),
                (tok::ID, "x"),
                (tok::INT, "42"),
                (EOF, "<EOF>"),
            ]
        );
        assert_eq!(lexer.mode(), DEFAULT_MODE);
        assert!(lexer.mode_stack().is_empty());
        assert_eq!(lexer.metrics().skipped, 3);
        assert_eq!(tokens[4].index, 4);
    }

    #[test]
    fn test_positions() {
        let mut lexer = lexer("if\n  abc");
        let tokens = lexer.all_tokens().unwrap();
        let abc = &tokens[1];
        assert_eq!((abc.start, abc.stop), (5, 8));
        assert_eq!((abc.line, abc.column), (2, 2));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 5));
    }

    #[test]
    fn test_hidden_channel() {
        let mut lexer = lexer("x // note\ny");
        let tokens = lexer.all_tokens().unwrap();
        assert_eq!(tokens[1].token_type, tok::COMMENT);
        assert_eq!(tokens[1].channel, HIDDEN_CHANNEL);
        assert_eq!(tokens[1].text, "// note");
        assert_eq!(lexer.metrics().off_channel, 1);
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = lexer("");
        assert!(lexer.next_token().unwrap().is_eof());
        assert!(lexer.next_token().unwrap().is_eof());
    }

    #[test]
    fn test_nullable_rule_yields_only_eof_at_end() {
        // A : 'a'* ;
        let atn = AtnBuilder::lexer("Nullable")
            .vocabulary(&["A"])
            .token_rule("A", 1, Element::star(Element::ch('a')))
            .build()
            .unwrap();
        let cache = Arc::new(PredictionCache::new(Arc::new(atn)));

        let mut lexer = Lexer::new(InputStream::new(""), cache.clone());
        assert_eq!(summary(&lexer.all_tokens().unwrap()), vec![(EOF, "<EOF>")]);

        let mut lexer = Lexer::new(InputStream::new("aa"), cache);
        let expected = vec![(1, "aa"), (EOF, "<EOF>")];
        assert_eq!(summary(&lexer.all_tokens().unwrap()), expected);
        lexer.reset();
        assert_eq!(summary(&lexer.all_tokens().unwrap()), expected);
    }

    #[test]
    fn test_errors_and_recovery() {
        let mut lexer = lexer("a # b");
        assert_matches!(
            lexer.all_tokens(),
            Err(LexerError::NoViableAlternative {
                offending_index: 2,
                ..
            })
        );

        lexer.reset();
        let (tokens, errors) = lexer.tokenize();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            summary(&tokens),
            vec![(tok::ID, "a"), (tok::ID, "b"), (EOF, "<EOF>")]
        );
        assert_eq!(lexer.metrics().errors, 1);
    }

    #[test]
    fn test_more_extends_the_next_token() {
        // one token for "<" + ">" via more
        let atn = AtnBuilder::lexer("More")
            .token_rule(
                "OPEN",
                1,
                Element::seq(vec![Element::ch('<'), Element::command(LexerAction::More)]),
            )
            .token_rule("CLOSE", 2, Element::ch('>'))
            .build()
            .unwrap();
        let cache = Arc::new(PredictionCache::new(Arc::new(atn)));
        let mut lexer = Lexer::new(InputStream::new("<>"), cache);
        let token = lexer.next_token().unwrap();
        assert_eq!((token.token_type, token.text.as_str()), (2, "<>"));
    }

    #[test]
    fn test_custom_actions_reach_the_recognizer() {
        let atn = AtnBuilder::lexer("Actions")
            .token_rule(
                "A",
                1,
                Element::seq(vec![Element::ch('a'), Element::action(7), Element::ch('b')]),
            )
            .build()
            .unwrap();
        let cache = Arc::new(PredictionCache::new(Arc::new(atn)));
        let mut lexer = Lexer::with_recognizer(
            InputStream::new("abab"),
            cache,
            ScriptedRecognizer::default(),
        );
        lexer.all_tokens().unwrap();
        // each action runs with the input where it appeared in the rule
        assert_eq!(lexer.recognizer().actions, vec![(0, 7, 1), (0, 7, 3)]);
    }

    #[test]
    fn test_mode_stack_errors() {
        let mut lexer = lexer("");
        assert_eq!(lexer.pop_mode(), Err(LexerError::EmptyModeStack));
        assert_eq!(lexer.push_mode(5), Err(LexerError::UnknownMode { mode: 5 }));

        for _ in 0..MAX_MODE_STACK_DEPTH {
            lexer.push_mode(tok::STRING_MODE).unwrap();
        }
        assert_eq!(
            lexer.push_mode(DEFAULT_MODE),
            Err(LexerError::ModeStackOverflow {
                depth: MAX_MODE_STACK_DEPTH
            })
        );
        assert_eq!(lexer.pop_mode(), Ok(tok::STRING_MODE));
    }

    #[test]
    fn test_token_stream_from_lexer() {
        use crate::input::{CommonTokenStream, IntStream};

        let mut lexer = lexer("x // c\ny");
        let stream = CommonTokenStream::from_lexer(&mut lexer).unwrap();
        // the comment is buffered but hidden from lookahead
        assert_eq!(stream.size(), 4);
        assert_eq!(stream.la(1), tok::ID);
        assert_eq!(stream.la(2), tok::ID);
        assert_eq!(stream.la(3), EOF);
        assert_eq!(stream.source_name(), "<string>");
    }
}
