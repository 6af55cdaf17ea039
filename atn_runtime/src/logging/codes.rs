//! Consolidated error codes and classification system
//!
//! Single source of truth for all codes emitted by the runtime, their metadata,
//! and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning, and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Placeholders for events logged without a registry code
pub const UNCODED_WARNING: Code = Code::new("W000");
pub const UNCODED_INFO: Code = Code::new("I000");
pub const UNCODED_DEBUG: Code = Code::new("D000");

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Configuration error codes
pub mod config {
    use super::Code;

    pub const INVALID_CONFIG: Code = Code::new("E005");
    pub const CONFIG_IO_ERROR: Code = Code::new("E006");
    pub const LIMIT_OUT_OF_RANGE: Code = Code::new("E007");
}

/// Automaton construction and validation codes
pub mod atn {
    use super::Code;

    pub const INVALID_STATE_REFERENCE: Code = Code::new("E020");
    pub const INVALID_RULE_REFERENCE: Code = Code::new("E021");
    pub const INVALID_DECISION: Code = Code::new("E022");
    pub const MALFORMED_STATE: Code = Code::new("E023");
    pub const INVALID_LEXER_ACTION: Code = Code::new("E024");
    pub const SERIALIZATION_ERROR: Code = Code::new("E025");
    pub const UNSUPPORTED_TRANSITION: Code = Code::new("E026");
}

/// Adaptive prediction codes
pub mod prediction {
    use super::Code;

    pub const NO_VIABLE_ALTERNATIVE: Code = Code::new("E040");
    pub const RESOURCE_EXHAUSTED: Code = Code::new("E041");
    pub const UNKNOWN_DECISION: Code = Code::new("E042");
    pub const LEFT_RECURSION_DETECTED: Code = Code::new("W043");
    pub const AMBIGUITY: Code = Code::new("W044");
    pub const ATTEMPTING_FULL_CONTEXT: Code = Code::new("W045");
    pub const CONTEXT_SENSITIVITY: Code = Code::new("W046");
    pub const DFA_STATE_LIMIT: Code = Code::new("W047");
    pub const ARENA_RENEWED: Code = Code::new("W048");
}

/// Lexer codes
pub mod lexer {
    use super::Code;

    pub const TOKEN_RECOGNITION_ERROR: Code = Code::new("E060");
    pub const EMPTY_MODE_STACK: Code = Code::new("E061");
    pub const MODE_STACK_OVERFLOW: Code = Code::new("E062");
    pub const UNKNOWN_MODE: Code = Code::new("E063");
    pub const TOKEN_TOO_LONG: Code = Code::new("E064");
}

/// Parser interpreter codes
pub mod interpreter {
    use super::Code;

    pub const MISMATCHED_INPUT: Code = Code::new("E080");
    pub const FAILED_PREDICATE: Code = Code::new("E081");
    pub const CALL_STACK_OVERFLOW: Code = Code::new("E082");
    pub const UNKNOWN_RULE: Code = Code::new("E083");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const ATN_CONSTRUCTION_COMPLETE: Code = Code::new("I020");
    pub const ATN_LOADED: Code = Code::new("I021");
    pub const FULL_CONTEXT_RESOLVED: Code = Code::new("I040");
    pub const DFA_CLEARED: Code = Code::new("I041");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I060");
    pub const PARSE_COMPLETE: Code = Code::new("I080");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal runtime error",
                "File a bug report with the grammar and input that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Runtime initialization failure",
                "Check logging and configuration setup",
            ),
            // Configuration
            ErrorMetadata::new(
                "E005",
                "Configuration",
                Severity::Medium,
                true,
                false,
                "Runtime configuration could not be parsed",
                "Fix the TOML syntax or key types in the configuration file",
            ),
            ErrorMetadata::new(
                "E006",
                "Configuration",
                Severity::Medium,
                true,
                false,
                "Runtime configuration file could not be read",
                "Check the configuration path and permissions",
            ),
            ErrorMetadata::new(
                "E007",
                "Configuration",
                Severity::Medium,
                true,
                false,
                "Runtime limit outside the compile-time ceiling",
                "Lower the setting or rebuild with a larger profile ceiling",
            ),
            // ATN
            ErrorMetadata::new(
                "E020",
                "Automaton",
                Severity::High,
                false,
                true,
                "Transition or table refers to a state that does not exist",
                "Regenerate the automaton from the grammar",
            ),
            ErrorMetadata::new(
                "E021",
                "Automaton",
                Severity::High,
                false,
                true,
                "Reference to an undefined rule",
                "Define the rule before referencing it",
            ),
            ErrorMetadata::new(
                "E022",
                "Automaton",
                Severity::High,
                false,
                true,
                "Decision table is inconsistent with decision states",
                "Regenerate the automaton from the grammar",
            ),
            ErrorMetadata::new(
                "E023",
                "Automaton",
                Severity::High,
                false,
                true,
                "State shape violates automaton invariants",
                "Regenerate the automaton from the grammar",
            ),
            ErrorMetadata::new(
                "E024",
                "Automaton",
                Severity::High,
                false,
                true,
                "Action transition refers to an unknown lexer action",
                "Register the lexer action before referencing it",
            ),
            ErrorMetadata::new(
                "E025",
                "Automaton",
                Severity::Medium,
                true,
                false,
                "Automaton could not be serialized or deserialized",
                "Check the serialized automaton document",
            ),
            ErrorMetadata::new(
                "E026",
                "Automaton",
                Severity::High,
                false,
                true,
                "Transition kind not supported by this simulator",
                "Remove precedence predicates from lexer rules",
            ),
            // Prediction
            ErrorMetadata::new(
                "E040",
                "Prediction",
                Severity::Medium,
                true,
                false,
                "No alternative can continue from the current input symbol",
                "Report a syntax error and let the driver recover",
            ),
            ErrorMetadata::new(
                "E041",
                "Prediction",
                Severity::High,
                true,
                false,
                "Prediction exceeded a configured resource ceiling",
                "Fail the current decision or raise the ceiling",
            ),
            ErrorMetadata::new(
                "E042",
                "Prediction",
                Severity::High,
                false,
                true,
                "Decision number outside the automaton decision table",
                "Check the decision number passed by the driver",
            ),
            ErrorMetadata::new(
                "W043",
                "Prediction",
                Severity::Low,
                true,
                false,
                "Closure path re-entered rules without consuming input",
                "Eliminate left recursion before building the automaton",
            ),
            ErrorMetadata::new(
                "W044",
                "Prediction",
                Severity::Low,
                true,
                false,
                "Several alternatives match the same input; lowest alternative chosen",
                "Reorder or refactor the ambiguous alternatives",
            ),
            ErrorMetadata::new(
                "W045",
                "Prediction",
                Severity::Low,
                true,
                false,
                "SLL conflict; retrying with full-context prediction",
                "No action required",
            ),
            ErrorMetadata::new(
                "W046",
                "Prediction",
                Severity::Low,
                true,
                false,
                "Decision required full context to resolve",
                "No action required",
            ),
            ErrorMetadata::new(
                "W047",
                "Prediction",
                Severity::Low,
                true,
                false,
                "Decision DFA reached its state ceiling; new states are not cached",
                "Raise max_dfa_states_per_decision",
            ),
            ErrorMetadata::new(
                "W048",
                "Prediction",
                Severity::Low,
                true,
                false,
                "Context arena reached its node ceiling; the prediction cache was renewed",
                "Raise max_arena_nodes",
            ),
            // Lexer
            ErrorMetadata::new(
                "E060",
                "Lexer",
                Severity::Medium,
                true,
                false,
                "No token rule matches the input at this position",
                "Skip the offending character and continue",
            ),
            ErrorMetadata::new(
                "E061",
                "Lexer",
                Severity::High,
                false,
                false,
                "popMode executed with an empty mode stack",
                "Balance pushMode and popMode commands",
            ),
            ErrorMetadata::new(
                "E062",
                "Lexer",
                Severity::High,
                false,
                false,
                "Mode stack exceeded its ceiling",
                "Balance pushMode and popMode commands",
            ),
            ErrorMetadata::new(
                "E063",
                "Lexer",
                Severity::High,
                false,
                true,
                "Lexer mode does not exist",
                "Check mode numbers in lexer commands",
            ),
            ErrorMetadata::new(
                "E064",
                "Lexer",
                Severity::Medium,
                true,
                false,
                "Token exceeded the maximum token length",
                "Raise max_token_length or fix the token rule",
            ),
            // Interpreter
            ErrorMetadata::new(
                "E080",
                "Interpreter",
                Severity::Medium,
                true,
                false,
                "Input token does not match the expected symbol",
                "Report a syntax error",
            ),
            ErrorMetadata::new(
                "E081",
                "Interpreter",
                Severity::Medium,
                true,
                false,
                "Semantic predicate failed while matching",
                "Report a syntax error",
            ),
            ErrorMetadata::new(
                "E082",
                "Interpreter",
                Severity::High,
                true,
                false,
                "Rule invocation depth exceeded the call stack ceiling",
                "Reduce nesting in the input or raise the ceiling",
            ),
            ErrorMetadata::new(
                "E083",
                "Interpreter",
                Severity::High,
                false,
                true,
                "Start rule does not exist",
                "Check the rule index passed to the interpreter",
            ),
        ];

        entries.into_iter().map(|meta| (meta.code, meta)).collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.recoverable)
        .unwrap_or(false)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|m| m.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|m| m.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_constant_has_metadata() {
        let all = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            config::INVALID_CONFIG,
            config::CONFIG_IO_ERROR,
            config::LIMIT_OUT_OF_RANGE,
            atn::INVALID_STATE_REFERENCE,
            atn::INVALID_RULE_REFERENCE,
            atn::INVALID_DECISION,
            atn::MALFORMED_STATE,
            atn::INVALID_LEXER_ACTION,
            atn::SERIALIZATION_ERROR,
            atn::UNSUPPORTED_TRANSITION,
            prediction::NO_VIABLE_ALTERNATIVE,
            prediction::RESOURCE_EXHAUSTED,
            prediction::UNKNOWN_DECISION,
            prediction::LEFT_RECURSION_DETECTED,
            prediction::AMBIGUITY,
            prediction::ATTEMPTING_FULL_CONTEXT,
            prediction::CONTEXT_SENSITIVITY,
            prediction::DFA_STATE_LIMIT,
            prediction::ARENA_RENEWED,
            lexer::TOKEN_RECOGNITION_ERROR,
            lexer::EMPTY_MODE_STACK,
            lexer::MODE_STACK_OVERFLOW,
            lexer::UNKNOWN_MODE,
            lexer::TOKEN_TOO_LONG,
            interpreter::MISMATCHED_INPUT,
            interpreter::FAILED_PREDICATE,
            interpreter::CALL_STACK_OVERFLOW,
            interpreter::UNKNOWN_RULE,
        ];

        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E040"), "Prediction");
        assert!(is_recoverable("E040"));
        assert!(!requires_halt("E040"));
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("ERR001"));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(get_category("X999"), "Unknown");
        assert!(!is_recoverable("X999"));
    }
}
