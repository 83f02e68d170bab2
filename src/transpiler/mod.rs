//! SQL compiler for rule configurations.
//!
//! Renders a validated [`RuleConfiguration`] into a single ANSI-style SELECT
//! statement. Clauses are emitted in fixed order and separated according to
//! [`CompilerSettings::clause_separator`]:
//!
//! ```text
//! SELECT … FROM … [JOIN …]* [WHERE …] [GROUP BY …] [HAVING …] [ORDER BY …]
//! ```
//!
//! `{{name}}` placeholders in condition values are replaced by the bound
//! literal (or the declared default). Unbound placeholders are emitted
//! verbatim so a statement can be bound in a second phase.

pub mod clauses;
pub mod conditions;
pub mod expr;
pub mod select;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use crate::ast::{Literal, ParameterDefinition, RuleConfiguration};
use crate::error::RuleResult;
use crate::settings::CompilerSettings;

/// Parameter bindings, keyed by placeholder name.
pub type Parameters = BTreeMap<String, Literal>;

/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Render with no parameter bindings.
    fn to_sql(&self) -> String {
        self.to_sql_with(&mut ParamContext::default())
    }

    /// Render, substituting placeholders from `params`.
    fn to_sql_with(&self, params: &mut ParamContext<'_>) -> String;
}

/// Placeholder resolution state for one compile.
#[derive(Debug, Default)]
pub struct ParamContext<'a> {
    bindings: Option<&'a Parameters>,
    declarations: Option<&'a BTreeMap<String, ParameterDefinition>>,
    /// Placeholders left in the output, first-seen order.
    pub unresolved: Vec<String>,
}

impl<'a> ParamContext<'a> {
    pub fn new(
        bindings: &'a Parameters,
        declarations: &'a BTreeMap<String, ParameterDefinition>,
    ) -> Self {
        Self {
            bindings: Some(bindings),
            declarations: Some(declarations),
            unresolved: Vec::new(),
        }
    }

    /// Render a literal, resolving it first if it is a placeholder.
    pub fn literal_sql(&mut self, literal: &Literal) -> String {
        let Some(name) = literal.placeholder() else {
            return literal.to_string();
        };
        if let Some(bound) = self.resolve(name) {
            return bound.to_string();
        }
        if !self.unresolved.iter().any(|n| n == name) {
            self.unresolved.push(name.to_string());
        }
        format!("{{{{{}}}}}", name)
    }

    fn resolve(&self, name: &str) -> Option<&'a Literal> {
        self.bindings
            .and_then(|b| b.get(name))
            .or_else(|| {
                self.declarations
                    .and_then(|d| d.get(name))
                    .and_then(|def| def.default.as_ref())
            })
    }
}

/// Result of a compile, with the placeholders that stayed unbound.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub unresolved: Vec<String>,
}

impl CompiledQuery {
    pub fn is_fully_bound(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Configuration compiler. Always validates before rendering.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    settings: CompilerSettings,
}

impl Compiler {
    pub fn new(settings: CompilerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Compile to SQL text.
    pub fn compile(&self, config: &RuleConfiguration, params: &Parameters) -> RuleResult<String> {
        self.compile_detailed(config, params).map(|q| q.sql)
    }

    /// Compile and report unresolved placeholders.
    pub fn compile_detailed(
        &self,
        config: &RuleConfiguration,
        params: &Parameters,
    ) -> RuleResult<CompiledQuery> {
        config.validate()?;

        let mut ctx = ParamContext::new(params, config.parameters());
        let sql = select::render_clauses(config, &mut ctx).join(self.settings.clause_separator.as_str());

        tracing::debug!(
            tables = config.get_table_names().len(),
            unresolved = ctx.unresolved.len(),
            "Compiled rule configuration"
        );
        if !ctx.unresolved.is_empty() {
            tracing::warn!("Unresolved placeholders: {}", ctx.unresolved.join(", "));
        }

        Ok(CompiledQuery {
            sql,
            unresolved: ctx.unresolved,
        })
    }
}

/// Compile with default settings.
pub fn compile(config: &RuleConfiguration, params: &Parameters) -> RuleResult<String> {
    Compiler::default().compile(config, params)
}
