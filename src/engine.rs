use crate::value::Value;
use minijinja::{Environment, UndefinedBehavior};
use std::collections::BTreeMap;
use thiserror::Error;

/// Named values visible to a scripted placeholder.
pub type Bindings = BTreeMap<String, Value>;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct EvalError(pub String);

/// Evaluates the expression of a scripted placeholder.
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<Value, EvalError>;
}

/// ScriptEngine evaluates minijinja expressions against placeholder bindings.
#[derive(Debug, Clone, Default)]
pub struct ScriptEngine {
    globals: BTreeMap<String, Value>,
}

impl ScriptEngine {
    /// Creates a new ScriptEngine with the built-in filters registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a global value visible to every expression. Bindings with the
    /// same name shadow it.
    pub fn add_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.globals.insert(name.into(), value.into());
    }

    fn environment<'source>(&self) -> Environment<'source> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        env.add_filter("camelcase", crate::filters::camelcase);
        env.add_filter("pascalcase", crate::filters::pascalcase);
        env.add_filter("snakecase", crate::filters::snakecase);
        env.add_filter("kebabcase", crate::filters::kebabcase);
        env.add_filter("screamingsnakecase", crate::filters::screamingsnakecase);
        env.add_filter("repeat", crate::filters::repeat);

        for (name, value) in &self.globals {
            env.add_global(name.clone(), minijinja::Value::from_serialize(value));
        }
        env
    }
}

impl ExpressionEvaluator for ScriptEngine {
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<Value, EvalError> {
        let env = self.environment();
        let compiled = env
            .compile_expression(expression)
            .map_err(|e| EvalError(e.to_string()))?;
        let result = compiled
            .eval(bindings)
            .map_err(|e| EvalError(e.to_string()))?;
        if result.is_undefined() {
            return Err(EvalError(format!("'{}' is undefined", expression.trim())));
        }
        let json = serde_json::to_value(&result).map_err(|e| EvalError(e.to_string()))?;
        Ok(Value::from(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> Bindings {
        Bindings::from([
            ("name".to_string(), Value::from("solid snake")),
            ("hours".to_string(), Value::Float(5.0)),
            ("rate".to_string(), Value::Int(10)),
        ])
    }

    #[test]
    fn test_evaluate_arithmetic() {
        let engine = ScriptEngine::new();
        let result = engine.evaluate("hours * rate", &bindings()).unwrap();
        assert_eq!(result, Value::Float(50.0));
    }

    #[test]
    fn test_evaluate_with_filters() {
        let engine = ScriptEngine::new();
        let result = engine.evaluate("name | pascalcase", &bindings()).unwrap();
        assert_eq!(result, "SolidSnake".into());
        let result = engine.evaluate("'-' | repeat(3)", &bindings()).unwrap();
        assert_eq!(result, "---".into());
    }

    #[test]
    fn test_evaluate_with_globals() {
        let mut engine = ScriptEngine::new();
        engine.add_global("company", "ACME");
        let result = engine.evaluate("company ~ ' / ' ~ name", &bindings()).unwrap();
        assert_eq!(result, "ACME / solid snake".into());
    }

    #[test]
    fn test_evaluate_undefined_variable() {
        let engine = ScriptEngine::new();
        assert!(engine.evaluate("missing", &bindings()).is_err());
    }

    #[test]
    fn test_evaluate_syntax_error() {
        let engine = ScriptEngine::new();
        assert!(engine.evaluate("hours *", &bindings()).is_err());
    }
}
