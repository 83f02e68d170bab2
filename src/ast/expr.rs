use super::names::{is_column_reference, is_dotted_identifier, is_identifier};
use super::values::Literal;
use crate::error::{RuleError, RuleResult};

/// Aggregate functions (standard SQL plus the common statistical ones).
pub const AGGREGATE_FUNCTIONS: &[&str] = &[
    "SUM",
    "AVG",
    "MIN",
    "MAX",
    "COUNT",
    "COUNT_DISTINCT",
    "STDDEV",
    "STDDEV_POP",
    "STDDEV_SAMP",
    "VARIANCE",
    "VAR_POP",
    "VAR_SAMP",
    "MEDIAN",
    "MODE",
    "PERCENTILE_CONT",
    "PERCENTILE_DISC",
];

/// An argument of a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Literal(Literal),
    /// Column reference, emitted verbatim (`t.amount`, `*`, `o.*`).
    Column(String),
    Expression(Expression),
}

impl Argument {
    pub fn column(name: impl Into<String>) -> Self {
        Argument::Column(name.into())
    }

    pub fn literal(value: impl Into<Literal>) -> Self {
        Argument::Literal(value.into())
    }
}

impl From<Expression> for Argument {
    fn from(e: Expression) -> Self {
        Argument::Expression(e)
    }
}

impl From<Literal> for Argument {
    fn from(l: Literal) -> Self {
        Argument::Literal(l)
    }
}

/// A scalar or aggregate function call, e.g. `SUM(t.amount)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    function: String,
    args: Vec<Argument>,
}

impl Expression {
    /// Build a function call. Fails on an empty/invalid function name, no
    /// arguments, or a malformed column reference.
    pub fn new(function: impl Into<String>, args: Vec<Argument>) -> RuleResult<Self> {
        let function = function.into();
        if function.trim().is_empty() {
            return Err(RuleError::structural("Function name cannot be empty"));
        }
        if !is_identifier(&function) {
            return Err(RuleError::structural(format!("Invalid function name: {}", function)));
        }
        if args.is_empty() {
            return Err(RuleError::structural(format!(
                "Expression {} must have at least one argument",
                function
            )));
        }
        for arg in &args {
            if let Argument::Column(col) = arg
                && !is_column_reference(col)
            {
                return Err(RuleError::structural(format!("Invalid column reference: {}", col)));
            }
        }
        Ok(Self { function, args })
    }

    /// Shorthand for a single-column call like `COUNT(o.id)`.
    pub fn call(function: &str, column: &str) -> RuleResult<Self> {
        Self::new(function, vec![Argument::column(column)])
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    pub fn is_aggregate(&self) -> bool {
        let upper = self.function.to_uppercase();
        AGGREGATE_FUNCTIONS.contains(&upper.as_str())
    }

    /// `{{name}}` placeholders among the literal arguments, nested calls included.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for arg in &self.args {
            match arg {
                Argument::Literal(lit) => names.extend(lit.placeholder()),
                Argument::Expression(e) => names.extend(e.placeholders()),
                Argument::Column(_) => {}
            }
        }
        names
    }

    /// True if this call or any nested call is an aggregate.
    pub fn contains_aggregate(&self) -> bool {
        self.is_aggregate()
            || self.args.iter().any(|a| match a {
                Argument::Expression(e) => e.contains_aggregate(),
                _ => false,
            })
    }
}

/// Left-hand side of a condition: a column name or a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Column(String),
    Expression(Expression),
}

impl Field {
    pub(crate) fn check(&self) -> RuleResult<()> {
        match self {
            Field::Column(name) if !is_dotted_identifier(name) => {
                Err(RuleError::structural(format!("Invalid field name: {}", name)))
            }
            _ => Ok(()),
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::Column(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Field::Column(s)
    }
}

impl From<Expression> for Field {
    fn from(e: Expression) -> Self {
        Field::Expression(e)
    }
}
