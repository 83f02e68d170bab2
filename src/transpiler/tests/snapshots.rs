//! Whole-statement compiler output.

use pretty_assertions::assert_eq;

use crate::ast::*;
use crate::settings::{ClauseSeparator, CompilerSettings};
use crate::transpiler::{Compiler, Parameters, compile};

fn no_params() -> Parameters {
    Parameters::new()
}

fn users_orders() -> RuleConfiguration {
    let select = SelectClause::new(vec![
        SelectField::new("u.id", Some("user_id")).unwrap(),
        SelectField::new(Expression::call("COUNT", "o.id").unwrap(), Some("order_count")).unwrap(),
        SelectField::new(Expression::call("SUM", "o.amount").unwrap(), Some("total_amount")).unwrap(),
    ])
    .unwrap();

    RuleConfiguration::new(select, TableReference::new("users", Some("u")).unwrap())
        .with_join(JoinClause::new(JoinKind::Left, "orders", Some("o"), "o.user_id = u.id").unwrap())
        .with_where(Condition::new("u.status", ComparisonOperator::Equal, "active").unwrap())
        .with_group_by(["u.id"])
        .with_having(
            Condition::new(
                Expression::call("COUNT", "o.id").unwrap(),
                ComparisonOperator::GreaterThan,
                0,
            )
            .unwrap(),
        )
        .with_order_by(["total_amount DESC"])
}

#[test]
fn test_minimal_select() {
    let config = RuleConfiguration::new(
        SelectClause::columns(["id"]).unwrap(),
        TableReference::new("users", None).unwrap(),
    );
    assert_eq!(compile(&config, &no_params()).unwrap(), "SELECT id FROM users");
}

#[test]
fn test_complete_statement() {
    assert_eq!(
        compile(&users_orders(), &no_params()).unwrap(),
        "SELECT u.id AS user_id, COUNT(o.id) AS order_count, SUM(o.amount) AS total_amount \
         FROM users u \
         LEFT JOIN orders AS o ON o.user_id = u.id \
         WHERE u.status = 'active' \
         GROUP BY u.id \
         HAVING COUNT(o.id) > 0 \
         ORDER BY total_amount DESC"
    );
}

#[test]
fn test_newline_separator() {
    let compiler = Compiler::new(CompilerSettings {
        clause_separator: ClauseSeparator::Newline,
        ..CompilerSettings::default()
    });
    let sql = compiler.compile(&users_orders(), &no_params()).unwrap();
    assert_eq!(sql.lines().count(), 7);
    assert_eq!(sql.lines().nth(2), Some("LEFT JOIN orders AS o ON o.user_id = u.id"));
}

#[test]
fn test_multiple_having_conditions() {
    let select = SelectClause::new(vec![
        SelectField::new("category", None).unwrap(),
        SelectField::new(Expression::call("COUNT", "*").unwrap(), Some("count")).unwrap(),
        SelectField::new(Expression::call("AVG", "price").unwrap(), Some("avg_price")).unwrap(),
    ])
    .unwrap();
    let config = RuleConfiguration::new(select, TableReference::new("products", None).unwrap())
        .with_group_by(["category"])
        .with_having(
            Condition::new(Expression::call("COUNT", "*").unwrap(), ComparisonOperator::GreaterThan, 10)
                .unwrap(),
        )
        .with_having(
            Condition::new(Expression::call("AVG", "price").unwrap(), ComparisonOperator::LessThan, 100.0)
                .unwrap(),
        );

    assert_eq!(
        compile(&config, &no_params()).unwrap(),
        "SELECT category, COUNT(*) AS count, AVG(price) AS avg_price FROM products \
         GROUP BY category HAVING COUNT(*) > 10 AND AVG(price) < 100.0"
    );
}

#[test]
fn test_nested_where_groups() {
    let adults = BooleanGroup::all(vec![
        Condition::new("age", ComparisonOperator::GreaterThan, 18).unwrap().into(),
        Condition::new("age", ComparisonOperator::LessThan, 65).unwrap().into(),
    ])
    .unwrap();
    let audience = BooleanGroup::any(vec![
        adults.into(),
        Condition::new("role", ComparisonOperator::Equal, "admin").unwrap().into(),
    ])
    .unwrap();

    let config = RuleConfiguration::new(
        SelectClause::columns(["id"]).unwrap(),
        TableReference::new("users", None).unwrap(),
    )
    .with_where(audience)
    .with_where(Condition::new("deleted_at", ComparisonOperator::IsNull, ConditionValue::Null).unwrap());

    assert_eq!(
        compile(&config, &no_params()).unwrap(),
        "SELECT id FROM users WHERE ((age > 18 AND age < 65) OR role = 'admin') AND deleted_at IS NULL"
    );
}

#[test]
fn test_lone_where_group_is_not_wrapped() {
    let either = BooleanGroup::any(vec![
        Condition::new("a", ComparisonOperator::Equal, 1).unwrap().into(),
        Condition::new("b", ComparisonOperator::Equal, 2).unwrap().into(),
    ])
    .unwrap();
    let config = RuleConfiguration::new(
        SelectClause::columns(["id"]).unwrap(),
        TableReference::new("users", None).unwrap(),
    )
    .with_where(either);

    assert_eq!(
        compile(&config, &no_params()).unwrap(),
        "SELECT id FROM users WHERE a = 1 OR b = 2"
    );
}

#[test]
fn test_escaping_and_literals() {
    let config = RuleConfiguration::new(
        SelectClause::columns(["c.id"]).unwrap(),
        TableReference::new("customers", Some("c")).unwrap(),
    )
    .with_where(Condition::new("c.last_name", ComparisonOperator::Equal, "O'Connor").unwrap())
    .with_where(Condition::new("c.balance", ComparisonOperator::GreaterEqual, 500.0).unwrap())
    .with_where(Condition::new("c.vip", ComparisonOperator::Equal, false).unwrap());

    assert_eq!(
        compile(&config, &no_params()).unwrap(),
        "SELECT c.id FROM customers c WHERE c.last_name = 'O''Connor' AND c.balance >= 500.0 AND c.vip = FALSE"
    );
}

#[test]
fn test_compile_validates_first() {
    let config = RuleConfiguration::new(
        SelectClause::columns(["id"]).unwrap(),
        TableReference::new("users", None).unwrap(),
    )
    .with_order_by([""]);
    let err = compile(&config, &no_params()).unwrap_err();
    assert_eq!(err.kind(), "STRUCTURAL_ERROR");
}
