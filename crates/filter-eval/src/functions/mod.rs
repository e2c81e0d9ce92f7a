pub mod string;

use crate::error::{EvalError, Result};
use filter_model::Value;
use std::collections::HashMap;

/// Type alias for function implementations
pub type FunctionImpl = fn(&[Value]) -> Result<Value>;

/// Functions callable from FUNCTION predicates.
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionImpl>,
}

impl FunctionRegistry {
    /// Create a new function registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register("lower", string::eval_lower);
        registry.register("upper", string::eval_upper);
        registry.register("concat", string::eval_concat);
        registry.register("length", string::eval_length);

        registry
    }

    pub fn register(&mut self, name: &str, func: FunctionImpl) {
        self.functions.insert(name.to_lowercase(), func);
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let func = self
            .functions
            .get(&name.to_lowercase())
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;

        func(args)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_builtin_functions() {
        let registry = FunctionRegistry::new();
        for name in ["lower", "upper", "concat", "length"] {
            assert!(registry.has_function(name));
        }
        assert_eq!(registry.function_names().len(), 4);
    }

    #[test]
    fn test_registry_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert!(registry.has_function("Lower"));
        assert!(registry.has_function("UPPER"));
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::new();
        let result = registry.call("soundex", &[]);
        assert!(matches!(result, Err(EvalError::UnknownFunction(_))));
    }

    #[test]
    fn test_custom_function_registration() {
        fn first(args: &[Value]) -> Result<Value> {
            Ok(args.first().cloned().unwrap_or(Value::Null))
        }

        let mut registry = FunctionRegistry::new();
        registry.register("first", first);
        let result = registry.call("FIRST", &[Value::Int(7)]).unwrap();
        assert_eq!(result, Value::Int(7));
    }
}
