// Internal modules
#[macro_use]
pub mod logging;
pub mod action;
pub mod atn;
pub mod config;
pub mod configs;
pub mod context;
pub mod dfa;
pub mod input;
pub mod interpreter;
pub mod lexer;
pub mod listener;
pub mod recognizer;
pub mod semantic;
pub mod simulator;
pub mod utils;

#[cfg(test)]
mod fixtures;

// Re-export key types for library consumers
pub use atn::{Atn, AtnBuilder, AtnError, AtnResult, Element};
pub use config::{LexerPreferences, PredictionPreferences, RuntimeConfig};
pub use dfa::PredictionCache;
pub use input::{CommonTokenStream, InputStream, Token};
pub use interpreter::{InterpreterError, ParseTrace, ParserInterpreter};
pub use lexer::{Lexer, LexerError};
pub use listener::{DiagnosticListener, PredictionListener, RecordingListener};
pub use recognizer::{DefaultRecognizer, Recognizer};
pub use simulator::{LexerAtnSimulator, ParserAtnSimulator, PredictionError};
