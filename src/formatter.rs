//! Sandboxed formatter scripts.
//!
//! A formatter maps one string (a domain or a whole query) to its
//! engine-specific form. Formatters are Rhai scripts written in one of two
//! shapes:
//!
//! ```text
//! fn format(domain) { "site:" + domain }     // declaration
//! |domain| "site:" + domain                   // expression (closure)
//! ```
//!
//! Scripts have no I/O, cannot load modules, and run under operation, call
//! depth and size limits, so a runaway script fails instead of hanging the
//! caller.

use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Dynamic, Engine, FnPtr, Scope, AST};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Preferred function name when a script declares several candidates.
const PREFERRED_FUNCTION: &str = "format";

/// Execution limits applied to every formatter script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterLimits {
    /// Maximum number of operations per evaluation.
    pub max_operations: u64,
    /// Maximum function call depth.
    pub max_call_levels: usize,
    /// Maximum length of any string value.
    pub max_string_size: usize,
    /// Maximum length of any array value.
    pub max_array_size: usize,
}

impl Default for FormatterLimits {
    fn default() -> Self {
        Self {
            max_operations: 100_000,
            max_call_levels: 32,
            max_string_size: 65_536,
            max_array_size: 4_096,
        }
    }
}

/// Errors raised while compiling or running a formatter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatterError {
    /// The source does not parse.
    #[error("syntax error: {0}")]
    Parse(String),

    /// The script raised an error or exceeded a limit.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Neither a one-argument function nor a closure was found.
    #[error("source does not define a one-argument function")]
    NotAFunction,

    /// Several one-argument functions were declared and none is named `format`.
    #[error("ambiguous formatter, candidates: {0}")]
    Ambiguous(String),

    /// The function returned something other than a string.
    #[error("formatter returned {0}, expected a string")]
    NonStringResult(String),
}

/// Compiles and runs formatter scripts.
pub struct FormatterEvaluator {
    engine: Engine,
}

impl FormatterEvaluator {
    /// Creates an evaluator with default limits.
    pub fn new() -> Self {
        Self::with_limits(&FormatterLimits::default())
    }

    /// Creates an evaluator with the given limits.
    pub fn with_limits(limits: &FormatterLimits) -> Self {
        let mut engine = Engine::new();
        engine
            .set_max_operations(limits.max_operations)
            .set_max_call_levels(limits.max_call_levels)
            .set_max_string_size(limits.max_string_size)
            .set_max_array_size(limits.max_array_size)
            .set_max_expr_depths(64, 32)
            .set_max_modules(0);
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.disable_symbol("eval");
        engine.on_print(|_| {});
        engine.on_debug(|_, _, _| {});

        Self { engine }
    }

    /// Runs `source` on `input`.
    ///
    /// Any failure, and any falsy result (unit, `false`, `0`, empty string),
    /// yields `input` unchanged.
    pub fn evaluate(&self, source: &str, input: &str) -> String {
        match self.run(source, input) {
            Ok(Some(output)) => output,
            Ok(None) => input.to_string(),
            Err(e) => {
                warn!("Formatter failed on '{}', using input unchanged: {}", input, e);
                input.to_string()
            }
        }
    }

    /// Runs `source` on `input`, reporting failures as `"Error: ..."`.
    ///
    /// Meant for authoring formatters, where seeing the error matters more
    /// than a usable result.
    pub fn evaluate_for_test(&self, source: &str, input: &str) -> String {
        match self.run(source, input) {
            Ok(Some(output)) => output,
            Ok(None) => input.to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }

    /// Checks that `source` compiles.
    pub fn check(&self, source: &str) -> Result<(), FormatterError> {
        self.compile(source).map(|_| ())
    }

    fn compile(&self, source: &str) -> Result<AST, FormatterError> {
        self.engine
            .compile(source)
            .map_err(|e| FormatterError::Parse(e.to_string()))
    }

    fn run(&self, source: &str, input: &str) -> Result<Option<String>, FormatterError> {
        let ast = self.compile(source)?;
        let args = (input.to_string(),);

        let value = match declared_function(&ast)? {
            Some(name) => {
                debug!("Calling formatter function '{}'", name);
                self.engine
                    .call_fn::<Dynamic>(&mut Scope::new(), &ast, &name, args)
            }
            None => {
                let value = self
                    .engine
                    .eval_ast::<Dynamic>(&ast)
                    .map_err(|e| FormatterError::Runtime(e.to_string()))?;
                if !value.is::<FnPtr>() {
                    return Err(FormatterError::NotAFunction);
                }
                value.cast::<FnPtr>().call::<Dynamic>(&self.engine, &ast, args)
            }
        }
        .map_err(|e| FormatterError::Runtime(e.to_string()))?;

        into_output(value)
    }
}

impl Default for FormatterEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds the named one-argument function a declaration-form script defines.
///
/// Anonymous closures compile to functions with generated, non-identifier
/// names and are ignored here.
fn declared_function(ast: &AST) -> Result<Option<String>, FormatterError> {
    let candidates: Vec<String> = ast
        .iter_functions()
        .filter(|f| f.params.len() == 1 && is_identifier(f.name))
        .map(|f| f.name.to_string())
        .collect();

    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.into_iter().next()),
        _ if candidates.iter().any(|n| n == PREFERRED_FUNCTION) => {
            Ok(Some(PREFERRED_FUNCTION.to_string()))
        }
        _ => {
            let mut names = candidates;
            names.sort();
            Err(FormatterError::Ambiguous(names.join(", ")))
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Maps a script result to an output string; `None` means "falsy".
fn into_output(value: Dynamic) -> Result<Option<String>, FormatterError> {
    if value.is_unit() {
        return Ok(None);
    }
    if let Ok(flag) = value.as_bool() {
        return if flag {
            Err(FormatterError::NonStringResult("bool".to_string()))
        } else {
            Ok(None)
        };
    }
    if let Ok(number) = value.as_int() {
        return if number == 0 {
            Ok(None)
        } else {
            Err(FormatterError::NonStringResult("integer".to_string()))
        };
    }
    if value.is_string() {
        let output = value
            .into_string()
            .map_err(|t| FormatterError::NonStringResult(t.to_string()))?;
        return Ok(if output.is_empty() { None } else { Some(output) });
    }
    Err(FormatterError::NonStringResult(value.type_name().to_string()))
}
