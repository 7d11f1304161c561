//! Runtime value model for the tree-walking evaluator.

use std::rc::Rc;

use crate::interpreter::builtins::Builtin;
use crate::interpreter::environment::Env;
use crate::parser::ast::{Compound, Identifier};

/// A user-defined function together with the environment captured at its
/// point of definition. Multiple values may share one environment.
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: Compound,
    pub environment: Env,
}

/// Tagged runtime value. Errors are ordinary values; the evaluator never
/// unwinds. `ReturnValue` is the internal wrapper that carries `return`
/// through nested compounds until a function boundary strips it.
#[derive(Debug, Clone)]
pub enum Object {
    Null,
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<Object>),
    Hash {
        keys: Vec<Object>,
        values: Vec<Object>,
    },
    Function(Rc<Function>),
    Builtin(Builtin),
    ReturnValue(Box<Object>),
    Error(String),
}

impl Object {
    /// Classification name as it appears in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Hash { .. } => "hash",
            Self::Function(_) => "function",
            Self::Builtin(_) => "builtin",
            Self::ReturnValue(_) => "return value",
            Self::Error(_) => "error",
        }
    }

    pub fn truthiness(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Integer(value) => *value != 0,
            Self::Boolean(value) => *value,
            Self::String(value) => !value.is_empty(),
            Self::Array(_) | Self::Hash { .. } => true,
            Self::Function(_) | Self::Builtin(_) => true,
            Self::ReturnValue(inner) => inner.truthiness(),
            Self::Error(_) => true,
        }
    }

    /// Human-readable rendering, as echoed by the REPL.
    pub fn inspect(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Boolean(value) => value.to_string(),
            Self::String(value) => format!("\"{value}\""),
            Self::Array(items) => {
                let rendered = items
                    .iter()
                    .map(Object::inspect)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{rendered}]")
            }
            Self::Hash { keys, values } => {
                let rendered = keys
                    .iter()
                    .zip(values)
                    .map(|(key, value)| format!("{}: {}", key.inspect(), value.inspect()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{rendered}}}")
            }
            Self::Function(function) => {
                let parameters = function
                    .parameters
                    .iter()
                    .map(|parameter| parameter.name.clone())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("fn ({parameters})")
            }
            Self::Builtin(_) => "fn (...)".to_string(),
            Self::ReturnValue(inner) => format!("return {}", inner.inspect()),
            Self::Error(message) => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_renders_each_variant() {
        assert_eq!(Object::Null.inspect(), "null");
        assert_eq!(Object::Integer(-3).inspect(), "-3");
        assert_eq!(Object::Boolean(true).inspect(), "true");
        assert_eq!(Object::String("hi".to_string()).inspect(), "\"hi\"");
        assert_eq!(
            Object::Array(vec![Object::Integer(1), Object::Boolean(false)]).inspect(),
            "[1, false]"
        );
        assert_eq!(
            Object::Hash {
                keys: vec![Object::String("a".to_string()), Object::Integer(2)],
                values: vec![Object::Integer(1), Object::Boolean(true)],
            }
            .inspect(),
            "{\"a\": 1, 2: true}"
        );
        assert_eq!(Object::Builtin(Builtin::Len).inspect(), "fn (...)");
        assert_eq!(
            Object::ReturnValue(Box::new(Object::Integer(2))).inspect(),
            "return 2"
        );
        assert_eq!(Object::Error("boom".to_string()).inspect(), "boom");
    }

    #[test]
    fn truthiness_follows_the_value_model() {
        assert!(!Object::Null.truthiness());
        assert!(!Object::Integer(0).truthiness());
        assert!(Object::Integer(-1).truthiness());
        assert!(!Object::Boolean(false).truthiness());
        assert!(!Object::String(String::new()).truthiness());
        assert!(Object::String("x".to_string()).truthiness());
        assert!(Object::Array(Vec::new()).truthiness());
        assert!(
            Object::Hash {
                keys: Vec::new(),
                values: Vec::new(),
            }
            .truthiness()
        );
        assert!(Object::Error("boom".to_string()).truthiness());
        assert!(!Object::ReturnValue(Box::new(Object::Null)).truthiness());
        assert!(Object::ReturnValue(Box::new(Object::Integer(1))).truthiness());
    }

    #[test]
    fn type_names_match_diagnostic_vocabulary() {
        assert_eq!(Object::Null.type_name(), "null");
        assert_eq!(Object::Integer(1).type_name(), "integer");
        assert_eq!(Object::Boolean(true).type_name(), "boolean");
        assert_eq!(Object::String(String::new()).type_name(), "string");
        assert_eq!(Object::Array(Vec::new()).type_name(), "array");
        assert_eq!(
            Object::Hash {
                keys: Vec::new(),
                values: Vec::new(),
            }
            .type_name(),
            "hash"
        );
        assert_eq!(Object::Builtin(Builtin::Len).type_name(), "builtin");
        assert_eq!(
            Object::ReturnValue(Box::new(Object::Null)).type_name(),
            "return value"
        );
        assert_eq!(Object::Error(String::new()).type_name(), "error");
    }
}
