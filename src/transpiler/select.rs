//! Whole-statement assembly.

use super::{ParamContext, ToSql};
use crate::ast::RuleConfiguration;

/// Render every non-empty clause of `config`, in statement order.
pub(crate) fn render_clauses(config: &RuleConfiguration, params: &mut ParamContext<'_>) -> Vec<String> {
    let mut clauses = vec![
        config.select().to_sql_with(params),
        format!("FROM {}", config.from_table().to_sql_with(params)),
    ];

    for join in config.joins() {
        clauses.push(join.to_sql_with(params));
    }

    let where_sql = config.conditions().to_sql_with(params);
    if !where_sql.is_empty() {
        clauses.push(where_sql);
    }

    if !config.group_by().is_empty() {
        clauses.push(format!("GROUP BY {}", config.group_by().join(", ")));
    }

    if !config.having().is_empty() {
        let having: Vec<String> = config.having().iter().map(|c| c.to_sql_with(params)).collect();
        clauses.push(format!("HAVING {}", having.join(" AND ")));
    }

    if !config.order_by().is_empty() {
        clauses.push(format!("ORDER BY {}", config.order_by().join(", ")));
    }

    clauses
}
