//! In-memory character stream

use super::{CharStream, IntStream};
use crate::atn::EOF;

/// Character stream over a string, indexed by code point
#[derive(Debug, Clone)]
pub struct InputStream {
    data: Vec<char>,
    index: usize,
    name: String,
}

impl InputStream {
    pub fn new(text: &str) -> Self {
        Self::with_name(text, "<string>")
    }

    pub fn with_name(text: &str, name: &str) -> Self {
        Self {
            data: text.chars().collect(),
            index: 0,
            name: name.to_string(),
        }
    }
}

impl IntStream for InputStream {
    fn consume(&mut self) {
        if self.index < self.data.len() {
            self.index += 1;
        }
    }

    fn la(&self, i: isize) -> i32 {
        let position = match i {
            0 => return 0,
            i if i > 0 => self.index as isize + i - 1,
            i => self.index as isize + i,
        };
        if position < 0 {
            return EOF;
        }
        self.data
            .get(position as usize)
            .map(|&c| c as i32)
            .unwrap_or(EOF)
    }

    fn index(&self) -> usize {
        self.index
    }

    fn seek(&mut self, index: usize) {
        self.index = index.min(self.data.len());
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

impl CharStream for InputStream {
    fn text(&self, start: usize, stop: usize) -> String {
        let stop = stop.min(self.data.len());
        if start >= stop {
            return String::new();
        }
        self.data[start..stop].iter().collect()
    }
}
