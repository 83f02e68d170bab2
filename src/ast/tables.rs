use super::names::{check_alias, check_table_name};
use super::operators::JoinKind;
use crate::error::{RuleError, RuleResult};

/// The FROM table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReference {
    name: String,
    alias: Option<String>,
}

impl TableReference {
    pub fn new(name: impl Into<String>, alias: Option<&str>) -> RuleResult<Self> {
        let name = name.into();
        check_table_name(&name)?;
        check_alias(alias)?;
        Ok(Self {
            name,
            alias: alias.map(str::to_string),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// A JOIN clause. The predicate is raw SQL (`o.user_id = u.id`).
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    kind: JoinKind,
    table: String,
    alias: Option<String>,
    predicate: String,
    /// Render `AS` between table and alias.
    use_as: bool,
}

impl JoinClause {
    pub fn new(
        kind: JoinKind,
        table: impl Into<String>,
        alias: Option<&str>,
        predicate: impl Into<String>,
    ) -> RuleResult<Self> {
        let table = table.into();
        let predicate = predicate.into();
        check_table_name(&table)?;
        check_alias(alias)?;
        if predicate.trim().is_empty() {
            return Err(RuleError::structural("JoinClause requires a valid ON condition"));
        }
        Ok(Self {
            kind,
            table,
            alias: alias.map(str::to_string),
            predicate,
            use_as: true,
        })
    }

    /// Toggle the `AS` keyword before the alias.
    pub fn with_alias_keyword(mut self, use_as: bool) -> Self {
        self.use_as = use_as;
        self
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn uses_alias_keyword(&self) -> bool {
        self.use_as
    }
}
