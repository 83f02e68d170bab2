//! FROM, JOIN and SELECT list rendering.

use super::{ParamContext, ToSql};
use crate::ast::{JoinClause, SelectClause, SelectField, TableReference};

impl ToSql for TableReference {
    fn to_sql_with(&self, _params: &mut ParamContext<'_>) -> String {
        match self.alias() {
            Some(alias) => format!("{} {}", self.name(), alias),
            None => self.name().to_string(),
        }
    }
}

impl ToSql for JoinClause {
    fn to_sql_with(&self, _params: &mut ParamContext<'_>) -> String {
        let table = match (self.alias(), self.uses_alias_keyword()) {
            (Some(alias), true) => format!("{} AS {}", self.table(), alias),
            (Some(alias), false) => format!("{} {}", self.table(), alias),
            (None, _) => self.table().to_string(),
        };
        format!("{} JOIN {} ON {}", self.kind(), table, self.predicate())
    }
}

impl ToSql for SelectField {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        let expr = self.expression().to_sql_with(params);
        match self.alias() {
            Some(alias) => format!("{} AS {}", expr, alias),
            None => expr,
        }
    }
}

impl ToSql for SelectClause {
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String {
        let fields: Vec<String> = self.fields().iter().map(|f| f.to_sql_with(params)).collect();
        format!("SELECT {}", fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, JoinKind};

    #[test]
    fn test_table_reference() {
        assert_eq!(TableReference::new("users", None).unwrap().to_sql(), "users");
        assert_eq!(TableReference::new("users", Some("u")).unwrap().to_sql(), "users u");
    }

    #[test]
    fn test_join_kinds() {
        let join = JoinClause::new(JoinKind::Full, "offers", Some("o"), "o.id = t.offer_id").unwrap();
        assert_eq!(join.to_sql(), "FULL JOIN offers AS o ON o.id = t.offer_id");

        let bare = join.with_alias_keyword(false);
        assert_eq!(bare.to_sql(), "FULL JOIN offers o ON o.id = t.offer_id");

        let no_alias = JoinClause::new(JoinKind::Inner, "offers", None, "offers.id = t.offer_id").unwrap();
        assert_eq!(no_alias.to_sql(), "INNER JOIN offers ON offers.id = t.offer_id");
    }

    #[test]
    fn test_select_clause() {
        let clause = SelectClause::new(vec![
            SelectField::new("u.id", Some("user_id")).unwrap(),
            SelectField::new(Expression::call("COUNT", "o.id").unwrap(), Some("order_count")).unwrap(),
            SelectField::new("u.email", None).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            clause.to_sql(),
            "SELECT u.id AS user_id, COUNT(o.id) AS order_count, u.email"
        );
    }
}
