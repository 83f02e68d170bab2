//! # rulesql
//!
//! Business rules stored as structured configuration, compiled to SQL.
//!
//! A [`RuleConfiguration`](ast::RuleConfiguration) is a typed SELECT: fields,
//! a source table, joins, nested boolean conditions, grouping, HAVING and
//! ordering. It round-trips through JSON, validates its own invariants, and
//! renders to one SQL statement with `{{name}}` parameters substituted.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use rulesql::prelude::*;
//!
//! let config = rulesql::codec::from_json(r#"{
//!     "select": {"fields": [{"expression": "id"}]},
//!     "from_table": {"name": "users"}
//! }"#)?;
//!
//! let sql = rulesql::compile(&config, &Parameters::new())?;
//! // => "SELECT id FROM users"
//! ```
//!
//! Rules themselves ([`RuleEntity`](rule::RuleEntity)) carry a profile,
//! a balance, declared tables and a lifecycle status. Every mutation returns
//! the new entity plus the [`Notification`](rule::Notification) describing it.

pub mod ast;
pub mod codec;
pub mod error;
pub mod rule;
pub mod settings;
pub mod syntax;
pub mod transpiler;
pub mod validator;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::codec::Structured;
    pub use crate::error::*;
    pub use crate::rule::*;
    pub use crate::settings::{ClauseSeparator, CompilerSettings};
    pub use crate::syntax::{SyntaxReport, validate_syntax};
    pub use crate::transpiler::{CompiledQuery, Compiler, Parameters, ToSql};
}

/// Compile a configuration to SQL with default settings.
///
/// # Example
///
/// ```
/// use rulesql::ast::{RuleConfiguration, SelectClause, TableReference};
/// use rulesql::transpiler::Parameters;
///
/// let config = RuleConfiguration::new(
///     SelectClause::columns(["id"]).unwrap(),
///     TableReference::new("users", None).unwrap(),
/// );
/// assert_eq!(rulesql::compile(&config, &Parameters::new()).unwrap(), "SELECT id FROM users");
/// ```
pub fn compile(
    config: &ast::RuleConfiguration,
    params: &transpiler::Parameters,
) -> error::RuleResult<String> {
    transpiler::compile(config, params)
}
