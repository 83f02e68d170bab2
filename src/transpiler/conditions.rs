//! Condition and boolean group rendering.
//!
//! Parenthesization is inferred from the tree: a member is wrapped only when
//! it is a group rendering more than one member. Top-level WHERE members are
//! AND-joined under the same rule.

use super::{ParamContext, ToSql};
use crate::ast::{
    BooleanGroup, ComparisonOperator, Condition, ConditionValue, ConditionsClause, Predicate,
};

impl ToSql for ConditionValue {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        match self {
            ConditionValue::Null => "NULL".to_string(),
            ConditionValue::Scalar(lit) => params.literal_sql(lit),
            ConditionValue::List(items) => {
                let items: Vec<String> = items.iter().map(|l| params.literal_sql(l)).collect();
                format!("({})", items.join(", "))
            }
            ConditionValue::Expression(expr) => expr.to_sql_with(params),
        }
    }
}

impl ToSql for Condition {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        let field = self.field().to_sql_with(params);
        let op = self.operator();
        match op {
            ComparisonOperator::IsNull | ComparisonOperator::IsNotNull => {
                format!("{} {}", field, op.sql_symbol())
            }
            ComparisonOperator::Between => match self.value().literals() {
                [low, high] => format!(
                    "{} BETWEEN {} AND {}",
                    field,
                    params.literal_sql(low),
                    params.literal_sql(high)
                ),
                // Unreachable through Condition::new
                _ => format!("{} BETWEEN {}", field, self.value().to_sql_with(params)),
            },
            _ => format!("{} {} {}", field, op.sql_symbol(), self.value().to_sql_with(params)),
        }
    }
}

fn member_sql(member: &Predicate, params: &mut ParamContext<'_>) -> String {
    let sql = member.to_sql_with(params);
    if member.needs_parentheses() {
        format!("({})", sql)
    } else {
        sql
    }
}

impl ToSql for Predicate {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        match self {
            Predicate::Condition(c) => c.to_sql_with(params),
            Predicate::Group(g) => g.to_sql_with(params),
        }
    }
}

impl ToSql for BooleanGroup {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        match self.members() {
            [only] => only.to_sql_with(params),
            members => {
                let joiner = format!(" {} ", self.connective());
                let parts: Vec<String> = members.iter().map(|m| member_sql(m, params)).collect();
                parts.join(&joiner)
            }
        }
    }
}

/// Renders `WHERE …`, or the empty string when there are no members.
/// Members are parenthesized only when there is more than one.
impl ToSql for ConditionsClause {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        match self.members() {
            [] => return String::new(),
            // A lone member is never wrapped, even a multi-member group
            [only] => return format!("WHERE {}", only.to_sql_with(params)),
            _ => {}
        }
        let parts: Vec<String> = self.members().iter().map(|m| member_sql(m, params)).collect();
        format!("WHERE {}", parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Argument, Expression, Literal, LogicalOp};
    use ComparisonOperator::*;

    fn cond(field: &str, op: ComparisonOperator, value: impl Into<ConditionValue>) -> Predicate {
        Condition::new(field, op, value).unwrap().into()
    }

    #[test]
    fn test_condition_shapes() {
        let render = |p: Predicate| p.to_sql();
        assert_eq!(render(cond("deleted_at", IsNull, ConditionValue::Null)), "deleted_at IS NULL");
        assert_eq!(
            render(cond("status", In, vec![Literal::from("A"), Literal::from("B")])),
            "status IN ('A', 'B')"
        );
        assert_eq!(
            render(cond("age", Between, vec![Literal::from(18), Literal::from(65)])),
            "age BETWEEN 18 AND 65"
        );
        assert_eq!(render(cond("name", NotLike, "%test%")), "name NOT LIKE '%test%'");
        assert_eq!(render(cond("active", Equal, true)), "active = TRUE");
    }

    #[test]
    fn test_expression_value() {
        let month = Expression::new(
            "DATE_TRUNC",
            vec![Literal::from("month").into(), Argument::column("t.day")],
        )
        .unwrap();
        assert_eq!(
            cond("t.created_at", GreaterEqual, month).to_sql(),
            "t.created_at >= DATE_TRUNC('month', t.day)"
        );
    }

    #[test]
    fn test_nested_group_parenthesization() {
        let range = BooleanGroup::all(vec![
            cond("age", GreaterThan, 18),
            cond("age", LessThan, 65),
        ])
        .unwrap();
        let outer = BooleanGroup::new(
            vec![range.into(), cond("role", Equal, "admin")],
            Some(LogicalOp::Or),
        )
        .unwrap();
        assert_eq!(outer.to_sql(), "(age > 18 AND age < 65) OR role = 'admin'");
    }

    #[test]
    fn test_single_member_group_is_bare() {
        let group = BooleanGroup::new(vec![cond("a", Equal, 1)], None).unwrap();
        assert_eq!(group.to_sql(), "a = 1");
    }

    #[test]
    fn test_single_member_wrapper_keeps_precedence() {
        let either = BooleanGroup::any(vec![cond("a", Equal, 1), cond("b", Equal, 2)]).unwrap();
        let wrapper = BooleanGroup::new(vec![either.into()], None).unwrap();
        let clause = ConditionsClause::new(vec![wrapper.into(), cond("c", Equal, 3)]);
        assert_eq!(clause.to_sql(), "WHERE (a = 1 OR b = 2) AND c = 3");
    }

    #[test]
    fn test_conditions_clause() {
        assert_eq!(ConditionsClause::default().to_sql(), "");
        assert_eq!(
            ConditionsClause::new(vec![cond("a", Equal, 1)]).to_sql(),
            "WHERE a = 1"
        );
        assert_eq!(
            ConditionsClause::new(vec![cond("a", Equal, 1), cond("b", NotEqual, 2)]).to_sql(),
            "WHERE a = 1 AND b != 2"
        );
    }
}
