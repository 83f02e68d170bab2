//! Function calls, arguments and field rendering.

use super::{ParamContext, ToSql};
use crate::ast::{Argument, Expression, Field, SelectExpr};

impl ToSql for Argument {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        match self {
            Argument::Literal(lit) => params.literal_sql(lit),
            Argument::Column(col) => col.clone(),
            Argument::Expression(expr) => expr.to_sql_with(params),
        }
    }
}

impl ToSql for Expression {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        let function = self.function().to_uppercase();
        let args: Vec<String> = self.args().iter().map(|a| a.to_sql_with(params)).collect();
        match function.as_str() {
            "COUNT_DISTINCT" => format!("COUNT(DISTINCT {})", args.join(", ")),
            _ => format!("{}({})", function, args.join(", ")),
        }
    }
}

impl ToSql for Field {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        match self {
            Field::Column(name) => name.clone(),
            Field::Expression(expr) => expr.to_sql_with(params),
        }
    }
}

impl ToSql for SelectExpr {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        match self {
            SelectExpr::Raw(raw) => raw.clone(),
            SelectExpr::Expression(expr) => expr.to_sql_with(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    #[test]
    fn test_function_call() {
        let e = Expression::call("sum", "t.amount").unwrap();
        assert_eq!(e.to_sql(), "SUM(t.amount)");
    }

    #[test]
    fn test_nested_call_with_literal() {
        let inner = Expression::call("AVG", "t.amount").unwrap();
        let e = Expression::new("ROUND", vec![inner.into(), Argument::literal(2)]).unwrap();
        assert_eq!(e.to_sql(), "ROUND(AVG(t.amount), 2)");
    }

    #[test]
    fn test_count_distinct() {
        let e = Expression::call("COUNT_DISTINCT", "t.msisdn").unwrap();
        assert_eq!(e.to_sql(), "COUNT(DISTINCT t.msisdn)");
    }

    #[test]
    fn test_string_argument_is_quoted() {
        let e = Expression::new(
            "COALESCE",
            vec![Argument::column("u.nickname"), Literal::from("n/a").into()],
        )
        .unwrap();
        assert_eq!(e.to_sql(), "COALESCE(u.nickname, 'n/a')");
    }
}
