use serde_json::{Value, json};

use super::{Object, Structured, decode_list, type_name};
use crate::ast::{
    BooleanGroup, ComparisonOperator, Condition, ConditionValue, ConditionsClause, Expression, Field,
    LogicalOp, Predicate,
};
use crate::error::{RuleError, RuleResult};

impl Structured for Condition {
    fn to_structured(&self) -> Value {
        let field = match self.field() {
            Field::Column(name) => Value::String(name.clone()),
            Field::Expression(expr) => expr.to_structured(),
        };
        json!({
            "field": field,
            "operator": self.operator().sql_symbol(),
            "value": self.value().to_structured(),
        })
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["field", "operator", "value"])?;

        let raw_field = object.required("field")?;
        let field = match raw_field {
            Value::String(s) => Field::Column(s.clone()),
            Value::Object(_) => Field::Expression(Expression::decode(raw_field, &object.path("field"))?),
            other => {
                return Err(RuleError::deserialization(
                    object.path("field"),
                    format!("expected a string or an expression object, got {}", type_name(other)),
                ));
            }
        };

        let symbol = object.string("operator")?;
        let operator = ComparisonOperator::from_symbol(symbol).ok_or_else(|| {
            RuleError::deserialization(object.path("operator"), format!("unknown operator '{}'", symbol))
        })?;

        let condition_value = match object.get("value") {
            Some(v) => ConditionValue::decode(v, &object.path("value"))?,
            None => ConditionValue::Null,
        };

        Condition::new(field, operator, condition_value)
    }
}

impl Structured for BooleanGroup {
    fn to_structured(&self) -> Value {
        let conditions: Vec<Value> = self.members().iter().map(Structured::to_structured).collect();
        json!({
            "logical_operator": self.connective().as_str(),
            "conditions": conditions,
        })
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["logical_operator", "conditions"])?;
        let connective = match object.opt_string("logical_operator")? {
            Some(name) => Some(LogicalOp::parse(name).ok_or_else(|| {
                RuleError::deserialization(
                    object.path("logical_operator"),
                    format!("unknown logical operator '{}'", name),
                )
            })?),
            None => None,
        };
        let members = decode_list(object.list("conditions")?, &object.path("conditions"))?;
        BooleanGroup::new(members, connective)
    }
}

/// Members carrying an `operator` key are conditions; anything else is a group.
impl Structured for Predicate {
    fn to_structured(&self) -> Value {
        match self {
            Predicate::Condition(c) => c.to_structured(),
            Predicate::Group(g) => g.to_structured(),
        }
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        match value {
            Value::Object(map) if map.contains_key("operator") => Condition::decode(value, path).map(Predicate::Condition),
            Value::Object(_) => BooleanGroup::decode(value, path).map(Predicate::Group),
            other => Err(RuleError::deserialization(
                path,
                format!("expected a condition or group object, got {}", type_name(other)),
            )),
        }
    }
}

impl Structured for ConditionsClause {
    fn to_structured(&self) -> Value {
        let members: Vec<Value> = self.members().iter().map(Structured::to_structured).collect();
        json!({ "where": members })
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["where"])?;
        let members = decode_list(object.opt_list("where")?, &object.path("where"))?;
        Ok(ConditionsClause::new(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::ToSql;

    #[test]
    fn test_condition_decode() {
        let c = Condition::from_structured(&json!({
            "field": "t.status", "operator": "in", "value": ["ACTIVE", "PENDING"]
        }))
        .unwrap();
        assert_eq!(c.to_sql(), "t.status IN ('ACTIVE', 'PENDING')");
        assert_eq!(
            c.to_structured(),
            json!({"field": "t.status", "operator": "IN", "value": ["ACTIVE", "PENDING"]})
        );
    }

    #[test]
    fn test_missing_value_is_null() {
        let c = Condition::from_structured(&json!({"field": "deleted_at", "operator": "IS NULL"})).unwrap();
        assert_eq!(c.to_sql(), "deleted_at IS NULL");
    }

    #[test]
    fn test_arity_is_structural() {
        let err = Condition::from_structured(&json!({"field": "a", "operator": "IN", "value": 1})).unwrap_err();
        assert_eq!(err.kind(), "STRUCTURAL_ERROR");
    }

    #[test]
    fn test_nested_error_path() {
        let err = ConditionsClause::from_structured(&json!({
            "where": [
                {"field": "a", "operator": "=", "value": 1},
                {"logical_operator": "OR", "conditions": [
                    {"field": "b", "operator": "=", "value": 2},
                    {"field": "c", "operator": "~", "value": 3}
                ]}
            ]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            RuleError::deserialization("$.where[1].conditions[1].operator", "unknown operator '~'")
        );
    }

    #[test]
    fn test_group_decode_and_render() {
        let g = BooleanGroup::from_structured(&json!({
            "logical_operator": "OR",
            "conditions": [
                {"logical_operator": "AND", "conditions": [
                    {"field": "age", "operator": ">", "value": 18},
                    {"field": "age", "operator": "<", "value": 65}
                ]},
                {"field": "role", "operator": "=", "value": "admin"}
            ]
        }))
        .unwrap();
        assert_eq!(g.to_sql(), "(age > 18 AND age < 65) OR role = 'admin'");
    }

    #[test]
    fn test_non_object_member() {
        let err = ConditionsClause::from_structured(&json!({"where": ["a = 1"]})).unwrap_err();
        assert_eq!(
            err,
            RuleError::deserialization("$.where[0]", "expected a condition or group object, got string")
        );
    }
}
