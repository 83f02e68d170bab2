use serde_json::{Value, json};

use super::{Object, Structured, decode_list, type_name};
use crate::ast::{Expression, JoinClause, JoinKind, SelectClause, SelectExpr, SelectField, TableReference};
use crate::error::{RuleError, RuleResult};

impl Structured for TableReference {
    fn to_structured(&self) -> Value {
        json!({ "name": self.name(), "alias": self.alias() })
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["name", "alias"])?;
        TableReference::new(object.string("name")?, object.opt_string("alias")?)
    }
}

impl Structured for JoinClause {
    fn to_structured(&self) -> Value {
        json!({
            "type": self.kind().as_str(),
            "table": self.table(),
            "alias": self.alias(),
            "on": self.predicate(),
            "use_as": self.uses_alias_keyword(),
        })
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["type", "table", "alias", "on", "use_as"])?;
        let kind_name = object.string("type")?;
        let kind = JoinKind::parse(kind_name).ok_or_else(|| {
            RuleError::deserialization(object.path("type"), format!("unknown join type '{}'", kind_name))
        })?;
        let join = JoinClause::new(
            kind,
            object.string("table")?,
            object.opt_string("alias")?,
            object.string("on")?,
        )?;
        Ok(join.with_alias_keyword(object.opt_bool("use_as")?.unwrap_or(true)))
    }
}

impl Structured for SelectField {
    fn to_structured(&self) -> Value {
        let expression = match self.expression() {
            SelectExpr::Raw(raw) => Value::String(raw.clone()),
            SelectExpr::Expression(expr) => expr.to_structured(),
        };
        json!({ "expression": expression, "alias": self.alias() })
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["expression", "alias"])?;
        let raw = object.required("expression")?;
        let expression = match raw {
            Value::String(s) => SelectExpr::Raw(s.clone()),
            Value::Object(_) => SelectExpr::Expression(Expression::decode(raw, &object.path("expression"))?),
            other => {
                return Err(RuleError::deserialization(
                    object.path("expression"),
                    format!("expected a string or an expression object, got {}", type_name(other)),
                ));
            }
        };
        SelectField::new(expression, object.opt_string("alias")?)
    }
}

impl Structured for SelectClause {
    fn to_structured(&self) -> Value {
        let fields: Vec<Value> = self.fields().iter().map(Structured::to_structured).collect();
        json!({ "fields": fields })
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["fields"])?;
        let fields = decode_list(object.list("fields")?, &object.path("fields"))?;
        SelectClause::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::ToSql;

    #[test]
    fn test_join_defaults_and_errors() {
        let join = JoinClause::from_structured(&json!({
            "type": "LEFT", "table": "orders", "alias": "o", "on": "o.user_id = u.id"
        }))
        .unwrap();
        assert!(join.uses_alias_keyword());
        assert_eq!(join.to_sql(), "LEFT JOIN orders AS o ON o.user_id = u.id");

        let err = JoinClause::from_structured(&json!({
            "type": "CROSS", "table": "orders", "on": "1 = 1"
        }))
        .unwrap_err();
        assert_eq!(err, RuleError::deserialization("$.type", "unknown join type 'CROSS'"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TableReference::from_structured(&json!({"name": "users", "schema": "public"})).unwrap_err();
        assert_eq!(err, RuleError::deserialization("$", "unknown key 'schema'"));
    }

    #[test]
    fn test_select_field_forms() {
        let raw = SelectField::from_structured(&json!({"expression": "u.id", "alias": "user_id"})).unwrap();
        assert_eq!(raw.to_sql(), "u.id AS user_id");

        let call = SelectField::from_structured(&json!({
            "expression": {"function": "SUM", "args": ["o.amount"]},
            "alias": null
        }))
        .unwrap();
        assert_eq!(call.to_sql(), "SUM(o.amount)");

        let err = SelectField::from_structured(&json!({"expression": 42})).unwrap_err();
        assert_eq!(err.kind(), "DESERIALIZATION_ERROR");
    }

    #[test]
    fn test_field_errors_carry_index() {
        let err = SelectClause::from_structured(&json!({"fields": [{"expression": "a"}, {"alias": "b"}]}))
            .unwrap_err();
        assert_eq!(
            err,
            RuleError::deserialization("$.fields[1]", "missing required key 'expression'")
        );
    }
}
