use super::expr::Expression;
use super::names::check_alias;
use crate::error::{RuleError, RuleResult};

/// A projected expression: raw SQL text or a structured function call.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectExpr {
    Raw(String),
    Expression(Expression),
}

impl From<&str> for SelectExpr {
    fn from(s: &str) -> Self {
        SelectExpr::Raw(s.to_string())
    }
}

impl From<String> for SelectExpr {
    fn from(s: String) -> Self {
        SelectExpr::Raw(s)
    }
}

impl From<Expression> for SelectExpr {
    fn from(e: Expression) -> Self {
        SelectExpr::Expression(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectField {
    expression: SelectExpr,
    alias: Option<String>,
}

impl SelectField {
    pub fn new(expression: impl Into<SelectExpr>, alias: Option<&str>) -> RuleResult<Self> {
        let expression = expression.into();
        if let SelectExpr::Raw(raw) = &expression
            && raw.trim().is_empty()
        {
            return Err(RuleError::structural("SelectField expression cannot be empty"));
        }
        check_alias(alias)?;
        Ok(Self {
            expression,
            alias: alias.map(str::to_string),
        })
    }

    pub fn expression(&self) -> &SelectExpr {
        &self.expression
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// Ordered, non-empty list of projected fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    fields: Vec<SelectField>,
}

impl SelectClause {
    pub fn new(fields: Vec<SelectField>) -> RuleResult<Self> {
        if fields.is_empty() {
            return Err(RuleError::structural("SelectClause must have at least one field"));
        }
        Ok(Self { fields })
    }

    /// Plain column list, e.g. `SelectClause::columns(["id", "email"])`.
    pub fn columns<'a>(names: impl IntoIterator<Item = &'a str>) -> RuleResult<Self> {
        let fields = names
            .into_iter()
            .map(|n| SelectField::new(n, None))
            .collect::<RuleResult<Vec<_>>>()?;
        Self::new(fields)
    }

    pub fn fields(&self) -> &[SelectField] {
        &self.fields
    }
}
