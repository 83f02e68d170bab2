use super::expr::{Expression, Field};
use super::operators::{ComparisonOperator, LogicalOp, ValueArity};
use super::values::Literal;
use crate::error::{RuleError, RuleResult};

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// Absent value (JSON `null` or missing key).
    Null,
    Scalar(Literal),
    List(Vec<Literal>),
    Expression(Expression),
}

impl ConditionValue {
    /// Literals carried by this value, in order.
    pub fn literals(&self) -> &[Literal] {
        match self {
            ConditionValue::Scalar(l) => std::slice::from_ref(l),
            ConditionValue::List(items) => items,
            ConditionValue::Null | ConditionValue::Expression(_) => &[],
        }
    }
}

impl From<Literal> for ConditionValue {
    fn from(l: Literal) -> Self {
        match l {
            Literal::Null => ConditionValue::Null,
            other => ConditionValue::Scalar(other),
        }
    }
}

impl From<Vec<Literal>> for ConditionValue {
    fn from(items: Vec<Literal>) -> Self {
        ConditionValue::List(items)
    }
}

impl From<Expression> for ConditionValue {
    fn from(e: Expression) -> Self {
        ConditionValue::Expression(e)
    }
}

impl From<bool> for ConditionValue {
    fn from(b: bool) -> Self {
        ConditionValue::Scalar(Literal::Bool(b))
    }
}

impl From<i32> for ConditionValue {
    fn from(n: i32) -> Self {
        ConditionValue::Scalar(Literal::Int(n as i64))
    }
}

impl From<i64> for ConditionValue {
    fn from(n: i64) -> Self {
        ConditionValue::Scalar(Literal::Int(n))
    }
}

impl From<f64> for ConditionValue {
    fn from(n: f64) -> Self {
        ConditionValue::Scalar(Literal::Float(n))
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        ConditionValue::Scalar(Literal::from(s))
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        ConditionValue::Scalar(Literal::String(s))
    }
}

/// `field operator value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: Field,
    operator: ComparisonOperator,
    value: ConditionValue,
}

impl Condition {
    /// Build a condition, enforcing the operator's value arity.
    pub fn new(
        field: impl Into<Field>,
        operator: ComparisonOperator,
        value: impl Into<ConditionValue>,
    ) -> RuleResult<Self> {
        let field = field.into();
        field.check()?;
        let value = match value.into() {
            ConditionValue::Scalar(Literal::Null) => ConditionValue::Null,
            v => v,
        };
        check_arity(operator, &value)?;
        Ok(Self {
            field,
            operator,
            value,
        })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn value(&self) -> &ConditionValue {
        &self.value
    }

    /// Parameter names referenced through `{{name}}` placeholders, field
    /// expression first, then the value.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = match &self.field {
            Field::Expression(expr) => expr.placeholders(),
            Field::Column(_) => Vec::new(),
        };
        match &self.value {
            ConditionValue::Expression(expr) => names.extend(expr.placeholders()),
            other => names.extend(other.literals().iter().filter_map(Literal::placeholder)),
        }
        names
    }
}

fn check_arity(operator: ComparisonOperator, value: &ConditionValue) -> RuleResult<()> {
    match (operator.arity(), value) {
        (ValueArity::None, ConditionValue::Null) => Ok(()),
        (ValueArity::None, _) => Err(RuleError::structural(format!(
            "{} cannot have a value",
            operator
        ))),
        (ValueArity::List, ConditionValue::List(items)) if !items.is_empty() => Ok(()),
        (ValueArity::List, _) => Err(RuleError::structural(format!(
            "{} requires a non-empty list",
            operator
        ))),
        (ValueArity::Pair, ConditionValue::List(items)) if items.len() == 2 => {
            let (low, high) = (&items[0], &items[1]);
            if low.kind() != high.kind() {
                return Err(RuleError::structural(format!(
                    "BETWEEN values must have the same type (got {} and {})",
                    low.kind(),
                    high.kind()
                )));
            }
            if matches!(low, Literal::Null) {
                return Err(RuleError::structural("BETWEEN bounds cannot be NULL"));
            }
            Ok(())
        }
        (ValueArity::Pair, _) => Err(RuleError::structural("BETWEEN requires exactly 2 values")),
        (ValueArity::Scalar, ConditionValue::List(_)) => Err(RuleError::structural(format!(
            "{} does not accept a list value",
            operator
        ))),
        (ValueArity::Scalar, _) => Ok(()),
    }
}

/// A member of a boolean group or of the top-level WHERE list.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    Group(BooleanGroup),
}

impl Predicate {
    /// Multi-member groups are parenthesized when nested. A single-member
    /// group is transparent, so it inherits the need of its only member.
    pub fn needs_parentheses(&self) -> bool {
        match self {
            Predicate::Condition(_) => false,
            Predicate::Group(g) => match g.members() {
                [only] => only.needs_parentheses(),
                _ => true,
            },
        }
    }

    /// Every condition in this predicate, depth first.
    pub fn conditions(&self) -> Vec<&Condition> {
        match self {
            Predicate::Condition(c) => vec![c],
            Predicate::Group(g) => g.members.iter().flat_map(Predicate::conditions).collect(),
        }
    }
}

impl From<Condition> for Predicate {
    fn from(c: Condition) -> Self {
        Predicate::Condition(c)
    }
}

impl From<BooleanGroup> for Predicate {
    fn from(g: BooleanGroup) -> Self {
        Predicate::Group(g)
    }
}

/// Connective-joined list of conditions and nested groups.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanGroup {
    members: Vec<Predicate>,
    connective: LogicalOp,
}

impl BooleanGroup {
    /// The connective may be omitted only for a single member.
    pub fn new(members: Vec<Predicate>, connective: Option<LogicalOp>) -> RuleResult<Self> {
        if members.is_empty() {
            return Err(RuleError::structural(
                "BooleanGroup must have at least one condition",
            ));
        }
        let connective = match connective {
            Some(op) => op,
            None if members.len() == 1 => LogicalOp::default(),
            None => {
                return Err(RuleError::structural(
                    "Logical operator required for multiple conditions",
                ));
            }
        };
        Ok(Self {
            members,
            connective,
        })
    }

    pub fn all(members: Vec<Predicate>) -> RuleResult<Self> {
        Self::new(members, Some(LogicalOp::And))
    }

    pub fn any(members: Vec<Predicate>) -> RuleResult<Self> {
        Self::new(members, Some(LogicalOp::Or))
    }

    pub fn members(&self) -> &[Predicate] {
        &self.members
    }

    pub fn connective(&self) -> LogicalOp {
        self.connective
    }
}

/// Top-level WHERE container. Members are AND-joined; empty means no WHERE.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionsClause {
    members: Vec<Predicate>,
}

impl ConditionsClause {
    pub fn new(members: Vec<Predicate>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Predicate] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn conditions(&self) -> Vec<&Condition> {
        self.members.iter().flat_map(Predicate::conditions).collect()
    }
}
