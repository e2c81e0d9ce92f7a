use crate::error::{EvalError, Result};
use filter_model::Value;

fn single_string<'a>(function: &str, args: &'a [Value]) -> Result<&'a str> {
    match args {
        [Value::String(s)] => Ok(s),
        [other] => Err(EvalError::InvalidFunctionArgs {
            function: function.to_string(),
            message: format!("Expected string, got {}", other.type_name()),
        }),
        _ => Err(EvalError::InvalidFunctionArgs {
            function: function.to_string(),
            message: format!("Expected 1 argument, got {}", args.len()),
        }),
    }
}

/// Convert string to lowercase
pub fn eval_lower(args: &[Value]) -> Result<Value> {
    single_string("lower", args).map(|s| Value::String(s.to_lowercase()))
}

/// Convert string to uppercase
pub fn eval_upper(args: &[Value]) -> Result<Value> {
    single_string("upper", args).map(|s| Value::String(s.to_uppercase()))
}

/// Number of characters in a string
pub fn eval_length(args: &[Value]) -> Result<Value> {
    single_string("length", args).map(|s| Value::Long(s.chars().count() as i64))
}

/// Concatenate multiple values into a string
pub fn eval_concat(args: &[Value]) -> Result<Value> {
    let concatenated = args
        .iter()
        .map(|arg| match arg {
            Value::String(s) => s.clone(),
            Value::Short(i) => i.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Long(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Double(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.to_rfc3339(),
            Value::DateRange(r) => r.to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).to_string(),
            Value::Object(v) => v.to_string(),
            Value::Null => "NULL".to_string(),
        })
        .collect::<Vec<_>>()
        .join("");
    Ok(Value::String(concatenated))
}
