/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    In,
    NotIn,
    Like,
    NotLike,
    Between,
    IsNull,
    IsNotNull,
}

/// What a condition's value slot must contain for a given operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueArity {
    /// No value (IS NULL, IS NOT NULL).
    None,
    /// One scalar or expression.
    Scalar,
    /// Non-empty list (IN, NOT IN).
    List,
    /// Exactly two bounds of the same kind (BETWEEN).
    Pair,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 13] = [
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterEqual,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessEqual,
        ComparisonOperator::In,
        ComparisonOperator::NotIn,
        ComparisonOperator::Like,
        ComparisonOperator::NotLike,
        ComparisonOperator::Between,
        ComparisonOperator::IsNull,
        ComparisonOperator::IsNotNull,
    ];

    /// SQL text of the operator, also its wire form.
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::In => "IN",
            ComparisonOperator::NotIn => "NOT IN",
            ComparisonOperator::Like => "LIKE",
            ComparisonOperator::NotLike => "NOT LIKE",
            ComparisonOperator::Between => "BETWEEN",
            ComparisonOperator::IsNull => "IS NULL",
            ComparisonOperator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Parse the wire form. Keywords are case-insensitive; `<>` is accepted for `!=`.
    pub fn from_symbol(s: &str) -> Option<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        if normalized == "<>" {
            return Some(ComparisonOperator::NotEqual);
        }
        Self::ALL
            .into_iter()
            .find(|op| op.sql_symbol() == normalized)
    }

    pub fn arity(&self) -> ValueArity {
        match self {
            ComparisonOperator::IsNull | ComparisonOperator::IsNotNull => ValueArity::None,
            ComparisonOperator::In | ComparisonOperator::NotIn => ValueArity::List,
            ComparisonOperator::Between => ValueArity::Pair,
            _ => ValueArity::Scalar,
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_symbol())
    }
}

/// Logical connective between conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Some(LogicalOp::And),
            "OR" => Some(LogicalOp::Or),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INNER" => Some(JoinKind::Inner),
            "LEFT" => Some(JoinKind::Left),
            "RIGHT" => Some(JoinKind::Right),
            "FULL" => Some(JoinKind::Full),
            _ => None,
        }
    }
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
