//! Structural and referential validation of a [`RuleConfiguration`].
//!
//! Node-level invariants (alias format, operator arity...) are enforced by the
//! constructors. This pass covers what only the whole configuration can see:
//! clause emptiness, alias uniqueness, aggregates in WHERE and placeholders that
//! reference undeclared parameters.

use strsim::levenshtein;

use crate::ast::{Field, RuleConfiguration};
use crate::error::{RuleError, RuleResult};

/// Validate a configuration before it may be compiled.
pub fn validate_configuration(config: &RuleConfiguration) -> RuleResult<()> {
    check_structure(config)?;
    check_aliases(config)?;
    check_parameters(config)?;
    Ok(())
}

fn check_structure(config: &RuleConfiguration) -> RuleResult<()> {
    if config.select().fields().is_empty() {
        return Err(RuleError::structural("RuleConfiguration must have at least one select field"));
    }
    if config.from_table().name().trim().is_empty() {
        return Err(RuleError::structural("RuleConfiguration must specify a main table"));
    }
    if config.group_by().iter().any(|g| g.trim().is_empty()) {
        return Err(RuleError::structural("GROUP BY entries cannot be empty"));
    }
    if config.order_by().iter().any(|o| o.trim().is_empty()) {
        return Err(RuleError::structural("ORDER BY entries cannot be empty"));
    }
    for cond in config.conditions().conditions() {
        if let Field::Expression(expr) = cond.field()
            && expr.contains_aggregate()
        {
            return Err(RuleError::structural(format!(
                "Aggregate function {} is not allowed in WHERE; use HAVING",
                expr.function()
            )));
        }
    }
    Ok(())
}

/// FROM and JOIN aliases share one namespace.
fn check_aliases(config: &RuleConfiguration) -> RuleResult<()> {
    let aliases = std::iter::once(config.from_table().alias())
        .chain(config.joins().iter().map(|j| j.alias()))
        .flatten();

    let mut seen: Vec<&str> = Vec::new();
    for alias in aliases {
        if seen.contains(&alias) {
            return Err(RuleError::referential(format!("Alias '{}' is declared more than once", alias)));
        }
        seen.push(alias);
    }
    Ok(())
}

/// With no declarations, placeholders are free-form and left to compile-time binding.
fn check_parameters(config: &RuleConfiguration) -> RuleResult<()> {
    let declared = config.parameters();
    if declared.is_empty() {
        return Ok(());
    }
    for name in config.placeholders() {
        if !declared.contains_key(&name) {
            let suggestion = did_you_mean(&name, declared.keys());
            return Err(RuleError::referential_with(
                format!("Parameter '{}' is referenced but not declared", name),
                suggestion,
            ));
        }
    }
    Ok(())
}

/// Closest declared name to `name`, if any is within the edit budget.
///
/// Short names get no budget at all, so `id` never suggests `ip`.
pub fn did_you_mean<S: AsRef<str>>(
    name: &str,
    declared: impl IntoIterator<Item = S>,
) -> Option<String> {
    let budget = match name.chars().count() {
        n if n <= 2 => 0,
        n if n <= 5 => 2,
        _ => 3,
    };
    declared
        .into_iter()
        .map(|d| (levenshtein(name, d.as_ref()), d.as_ref().to_string()))
        .filter(|(distance, _)| *distance <= budget)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}
