use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::conditions::{Condition, ConditionsClause, Predicate};
use super::select::SelectClause;
use super::tables::{JoinClause, TableReference};
use super::values::{DATE_FORMAT, Literal, parse_timestamp};
use crate::error::{RuleError, RuleResult};

/// Declared type of a rule parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Integer,
    Float,
    Date,
    DateTime,
    Boolean,
    Enum,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::Float => "float",
            ParameterType::Date => "date",
            ParameterType::DateTime => "datetime",
            ParameterType::Boolean => "boolean",
            ParameterType::Enum => "enum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ParameterType::String),
            "integer" => Some(ParameterType::Integer),
            "float" => Some(ParameterType::Float),
            "date" => Some(ParameterType::Date),
            "datetime" => Some(ParameterType::DateTime),
            "boolean" => Some(ParameterType::Boolean),
            "enum" => Some(ParameterType::Enum),
            _ => None,
        }
    }

    /// Convert a raw textual binding (CLI `--param k=v`) into a typed literal.
    pub fn parse_value(&self, name: &str, raw: &str) -> RuleResult<Literal> {
        let invalid = || {
            RuleError::structural(format!(
                "Parameter '{}' expects a {} value, got '{}'",
                name,
                self.as_str(),
                raw
            ))
        };
        match self {
            ParameterType::String | ParameterType::Enum => Ok(Literal::String(raw.to_string())),
            ParameterType::Integer => raw.parse::<i64>().map(Literal::Int).map_err(|_| invalid()),
            ParameterType::Float => raw.parse::<f64>().map(Literal::Float).map_err(|_| invalid()),
            ParameterType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" => Ok(Literal::Bool(true)),
                "false" => Ok(Literal::Bool(false)),
                _ => Err(invalid()),
            },
            ParameterType::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(Literal::Date)
                .map_err(|_| invalid()),
            ParameterType::DateTime => parse_timestamp(raw).map(Literal::Timestamp).ok_or_else(invalid),
        }
    }
}

/// Declaration of a `{{name}}` parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    pub kind: ParameterType,
    pub required: bool,
    pub default: Option<Literal>,
    pub description: Option<String>,
    /// Allowed values for `enum` parameters.
    pub values: Option<Vec<String>>,
}

impl ParameterDefinition {
    /// Typed binding for this declaration. Enum values must be one of `values`.
    pub fn bind(&self, name: &str, raw: &str) -> RuleResult<Literal> {
        if let Some(allowed) = &self.values
            && !allowed.iter().any(|v| v == raw)
        {
            return Err(RuleError::structural(format!(
                "Parameter '{}' must be one of: {}",
                name,
                allowed.join(", ")
            )));
        }
        self.kind.parse_value(name, raw)
    }

    pub fn required(kind: ParameterType) -> Self {
        Self {
            kind,
            required: true,
            default: None,
            description: None,
            values: None,
        }
    }

    pub fn optional(kind: ParameterType, default: Option<Literal>) -> Self {
        Self {
            kind,
            required: false,
            default,
            description: None,
            values: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A complete, compilable rule query.
///
/// Built with [`RuleConfiguration::new`] plus the consuming `with_*` methods, then
/// checked with [`RuleConfiguration::validate`]. The compiler validates before
/// rendering, so an invalid configuration never produces SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfiguration {
    pub(crate) select: SelectClause,
    pub(crate) from: TableReference,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) conditions: ConditionsClause,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Vec<Condition>,
    pub(crate) order_by: Vec<String>,
    pub(crate) parameters: BTreeMap<String, ParameterDefinition>,
}

impl RuleConfiguration {
    pub fn new(select: SelectClause, from: TableReference) -> Self {
        Self {
            select,
            from,
            joins: Vec::new(),
            conditions: ConditionsClause::default(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_join(mut self, join: JoinClause) -> Self {
        self.joins.push(join);
        self
    }

    pub fn with_joins(mut self, joins: impl IntoIterator<Item = JoinClause>) -> Self {
        self.joins.extend(joins);
        self
    }

    /// Replace the WHERE clause.
    pub fn with_conditions(mut self, conditions: ConditionsClause) -> Self {
        self.conditions = conditions;
        self
    }

    /// Append a top-level WHERE member.
    pub fn with_where(mut self, predicate: impl Into<Predicate>) -> Self {
        let mut members = self.conditions.members().to_vec();
        members.push(predicate.into());
        self.conditions = ConditionsClause::new(members);
        self
    }

    pub fn with_group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn with_having(mut self, condition: Condition) -> Self {
        self.having.push(condition);
        self
    }

    pub fn with_order_by<S: Into<String>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.order_by.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, def: ParameterDefinition) -> Self {
        self.parameters.insert(name.into(), def);
        self
    }

    pub fn select(&self) -> &SelectClause {
        &self.select
    }

    pub fn from_table(&self) -> &TableReference {
        &self.from
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn conditions(&self) -> &ConditionsClause {
        &self.conditions
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn having(&self) -> &[Condition] {
        &self.having
    }

    pub fn order_by(&self) -> &[String] {
        &self.order_by
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParameterDefinition> {
        &self.parameters
    }

    /// Structural and referential checks. See [`crate::validator`].
    pub fn validate(&self) -> RuleResult<()> {
        crate::validator::validate_configuration(self)
    }

    /// Deduplicated union of the FROM table and every joined table, first-seen order.
    pub fn get_table_names(&self) -> Vec<String> {
        let mut tables: Vec<String> = Vec::with_capacity(1 + self.joins.len());
        let names = std::iter::once(self.from.name()).chain(self.joins.iter().map(|j| j.table()));
        for name in names {
            if !tables.iter().any(|t| t == name) {
                tables.push(name.to_string());
            }
        }
        tables
    }

    /// Every `{{name}}` referenced in WHERE or HAVING, deduplicated, first-seen order.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let conditions = self.conditions.conditions().into_iter().chain(self.having.iter());
        for cond in conditions {
            for name in cond.placeholders() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Names of declared parameters marked required.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(_, def)| def.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Required parameters that have neither a binding nor a declared default.
    pub fn missing_parameters(&self, bindings: &BTreeMap<String, Literal>) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(name, def)| {
                def.required && def.default.is_none() && !bindings.contains_key(name.as_str())
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
