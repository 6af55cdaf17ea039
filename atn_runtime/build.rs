// build.rs - TOML-driven compile-time ceilings for the prediction runtime
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    prediction: PredictionLimits,
    context: ContextLimits,
    lexer: LexerLimits,
    interpreter: InterpreterLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct PredictionLimits {
    max_lookahead_symbols: usize,
    max_configs_per_set: usize,
    max_dfa_states_per_decision: usize,
    lexer_dfa_max_edge: i32,
}

#[derive(serde::Deserialize)]
struct ContextLimits {
    max_context_depth: usize,
    max_arena_nodes: usize,
}

#[derive(serde::Deserialize)]
struct LexerLimits {
    max_token_length: usize,
    max_mode_stack_depth: usize,
}

#[derive(serde::Deserialize)]
struct InterpreterLimits {
    max_call_stack_depth: usize,
    max_trace_events: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_recorded_diagnostics: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ATN_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ATN_CONFIG_DIR");

    let profile = env::var("ATN_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ATN_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of atn_runtime directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_LOOKAHEAD: usize = 100_000_000;
    const ABSOLUTE_MAX_CONFIGS: usize = 10_000_000;
    const ABSOLUTE_MAX_CONTEXT_DEPTH: usize = 100_000;

    if config.prediction.max_lookahead_symbols == 0
        || config.prediction.max_lookahead_symbols > ABSOLUTE_MAX_LOOKAHEAD
    {
        panic!("LIMITS: max_lookahead_symbols must be in 1..={}", ABSOLUTE_MAX_LOOKAHEAD);
    }

    if config.prediction.max_configs_per_set == 0
        || config.prediction.max_configs_per_set > ABSOLUTE_MAX_CONFIGS
    {
        panic!("LIMITS: max_configs_per_set must be in 1..={}", ABSOLUTE_MAX_CONFIGS);
    }

    if config.context.max_context_depth == 0
        || config.context.max_context_depth > ABSOLUTE_MAX_CONTEXT_DEPTH
    {
        panic!("LIMITS: max_context_depth must be in 1..={}", ABSOLUTE_MAX_CONTEXT_DEPTH);
    }

    if !(0..=0xFFFF).contains(&config.prediction.lexer_dfa_max_edge) {
        panic!("LIMITS: lexer_dfa_max_edge must be in 0..=65535");
    }

    if config.lexer.max_mode_stack_depth == 0 {
        panic!("LIMITS: max_mode_stack_depth must be at least 1");
    }

    if profile == "production" && config.prediction.max_dfa_states_per_decision > 1_000_000 {
        panic!("PRODUCTION: max_dfa_states_per_decision too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod prediction {{
        pub const MAX_LOOKAHEAD_SYMBOLS: usize = {};
        pub const MAX_CONFIGS_PER_SET: usize = {};
        pub const MAX_DFA_STATES_PER_DECISION: usize = {};
        pub const LEXER_DFA_MAX_EDGE: i32 = {};
    }}

    pub mod context {{
        pub const MAX_CONTEXT_DEPTH: usize = {};
        pub const MAX_ARENA_NODES: usize = {};
    }}

    pub mod lexer {{
        pub const MAX_TOKEN_LENGTH: usize = {};
        pub const MAX_MODE_STACK_DEPTH: usize = {};
    }}

    pub mod interpreter {{
        pub const MAX_CALL_STACK_DEPTH: usize = {};
        pub const MAX_TRACE_EVENTS: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_RECORDED_DIAGNOSTICS: usize = {};
    }}
}}
"#,
        profile,
        // Prediction
        config.prediction.max_lookahead_symbols,
        config.prediction.max_configs_per_set,
        config.prediction.max_dfa_states_per_decision,
        config.prediction.lexer_dfa_max_edge,
        // Context
        config.context.max_context_depth,
        config.context.max_arena_nodes,
        // Lexer
        config.lexer.max_token_length,
        config.lexer.max_mode_stack_depth,
        // Interpreter
        config.interpreter.max_call_stack_depth,
        config.interpreter.max_trace_events,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_recorded_diagnostics,
    );

    fs::write(output_path, constants_code).unwrap();
}
