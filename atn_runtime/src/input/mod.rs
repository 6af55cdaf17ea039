//! Input streams
//!
//! Simulators read symbols through [`IntStream`]: characters for lexers,
//! token types for parsers. Streams are seekable; prediction always leaves
//! the cursor where it found it.

pub mod char_stream;
pub mod token;
pub mod token_stream;

pub use char_stream::InputStream;
pub use token::Token;
pub use token_stream::CommonTokenStream;

pub trait IntStream {
    fn consume(&mut self);

    /// Symbol at offset `i` from the cursor: `la(1)` is the current symbol,
    /// `la(-1)` the previous one. EOF past either end.
    fn la(&self, i: isize) -> i32;

    fn index(&self) -> usize;
    fn seek(&mut self, index: usize);
    fn size(&self) -> usize;

    fn source_name(&self) -> &str {
        "<unknown>"
    }
}

pub trait CharStream: IntStream {
    /// Text of `start..stop` (exclusive), clamped to the input
    fn text(&self, start: usize, stop: usize) -> String;
}

pub trait TokenStream: IntStream {
    /// Token at absolute index `index`, including off-channel tokens
    fn get(&self, index: usize) -> Option<&Token>;

    /// Current on-channel token
    fn current(&self) -> Option<&Token> {
        self.get(self.index())
    }
}
