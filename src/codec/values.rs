use chrono::NaiveDate;
use serde_json::{Value, json};

use super::{Object, Structured, index_path, key_path, type_name};
use crate::ast::names::is_column_reference;
use crate::ast::{Argument, ConditionValue, DATE_FORMAT, Expression, Literal, parse_timestamp};
use crate::error::{RuleError, RuleResult};

const TIMESTAMP_WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn tagged(tag: &str, text: String) -> Value {
    json!({ tag: text })
}

impl Structured for Literal {
    fn to_structured(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => json!(b),
            Literal::Int(n) => json!(n),
            Literal::Float(n) => json!(n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Date(d) => tagged("date", d.format(DATE_FORMAT).to_string()),
            Literal::Timestamp(ts) => tagged("timestamp", ts.format(TIMESTAMP_WIRE_FORMAT).to_string()),
        }
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        match value {
            Value::Null => Ok(Literal::Null),
            Value::Bool(b) => Ok(Literal::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Literal::Int)
                .or_else(|| n.as_f64().map(Literal::Float))
                .ok_or_else(|| RuleError::deserialization(path, format!("unsupported number {}", n))),
            Value::String(s) => Ok(Literal::String(s.clone())),
            Value::Object(_) => decode_tagged(value, path),
            Value::Array(_) => Err(RuleError::deserialization(path, "expected a literal, got array")),
        }
    }
}

fn decode_tagged(value: &Value, path: &str) -> RuleResult<Literal> {
    let object = Object::new(value, path, &["date", "timestamp", "string"])?;
    let mut present = ["date", "timestamp", "string"].into_iter().filter(|k| object.get(k).is_some());
    let (Some(tag), None) = (present.next(), present.next()) else {
        return Err(RuleError::deserialization(
            path,
            "tagged literal must have exactly one of 'date', 'timestamp' or 'string'",
        ));
    };

    let text = object.string(tag)?;
    let invalid = |expected: &str| {
        RuleError::deserialization(
            key_path(path, tag),
            format!("invalid {} '{}', expected {}", tag, text, expected),
        )
    };
    match tag {
        "date" => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Literal::Date)
            .map_err(|_| invalid("YYYY-MM-DD")),
        "timestamp" => parse_timestamp(text)
            .map(Literal::Timestamp)
            .ok_or_else(|| invalid("YYYY-MM-DDTHH:MM:SS with an optional offset")),
        _ => Ok(Literal::String(text.to_string())),
    }
}

/// Plain strings that look like column references decode as columns.
impl Structured for Argument {
    fn to_structured(&self) -> Value {
        match self {
            Argument::Column(col) => Value::String(col.clone()),
            Argument::Literal(Literal::String(s)) if is_column_reference(s) => tagged("string", s.clone()),
            Argument::Literal(lit) => lit.to_structured(),
            Argument::Expression(expr) => expr.to_structured(),
        }
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        match value {
            Value::String(s) if is_column_reference(s) => Ok(Argument::Column(s.clone())),
            Value::Object(map) if map.contains_key("function") => {
                Expression::decode(value, path).map(Argument::Expression)
            }
            _ => Literal::decode(value, path).map(Argument::Literal),
        }
    }
}

impl Structured for Expression {
    fn to_structured(&self) -> Value {
        let args: Vec<Value> = self.args().iter().map(Structured::to_structured).collect();
        json!({ "function": self.function(), "args": args })
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["function", "args"])?;
        let function = object.string("function")?;
        let args_path = object.path("args");
        let args = object
            .list("args")?
            .iter()
            .enumerate()
            .map(|(i, arg)| Argument::decode(arg, &index_path(&args_path, i)))
            .collect::<RuleResult<Vec<_>>>()?;
        Expression::new(function, args)
    }
}

impl Structured for ConditionValue {
    fn to_structured(&self) -> Value {
        match self {
            ConditionValue::Null => Value::Null,
            ConditionValue::Scalar(lit) => lit.to_structured(),
            ConditionValue::List(items) => Value::Array(items.iter().map(Structured::to_structured).collect()),
            ConditionValue::Expression(expr) => expr.to_structured(),
        }
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let item_path = index_path(path, i);
                    match item {
                        Value::Array(_) => Err(RuleError::deserialization(item_path, "nested lists are not allowed")),
                        Value::Object(map) if map.contains_key("function") => Err(RuleError::deserialization(
                            item_path,
                            format!("list elements must be literals, got {}", type_name(item)),
                        )),
                        _ => Literal::decode(item, &item_path),
                    }
                })
                .collect::<RuleResult<Vec<_>>>()
                .map(ConditionValue::List),
            Value::Object(map) if map.contains_key("function") => {
                Expression::decode(value, path).map(ConditionValue::Expression)
            }
            _ => Literal::decode(value, path).map(ConditionValue::from),
        }
    }
}
