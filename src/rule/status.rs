//! Rule lifecycle states and the transition table.
//!
//! ```text
//! DRAFT ──▶ TO_VALIDATE ──▶ IN_PRODUCTION ──▶ ARCHIVED
//!   ▲            │
//!   └────────────┘
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleStatus {
    Draft,
    ToValidate,
    InProduction,
    Archived,
}

/// Legal successors of each state. Anything not listed is rejected.
const TRANSITIONS: &[(RuleStatus, &[RuleStatus])] = &[
    (RuleStatus::Draft, &[RuleStatus::ToValidate]),
    (RuleStatus::ToValidate, &[RuleStatus::InProduction, RuleStatus::Draft]),
    (RuleStatus::InProduction, &[RuleStatus::Archived]),
    (RuleStatus::Archived, &[]),
];

impl RuleStatus {
    pub const ALL: [RuleStatus; 4] = [
        RuleStatus::Draft,
        RuleStatus::ToValidate,
        RuleStatus::InProduction,
        RuleStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Draft => "DRAFT",
            RuleStatus::ToValidate => "TO_VALIDATE",
            RuleStatus::InProduction => "IN_PRODUCTION",
            RuleStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn successors(&self) -> &'static [RuleStatus] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, to)| *to)
            .unwrap_or(&[])
    }

    /// Targeting the current state is allowed (and is a no-op for the entity).
    pub fn can_transition_to(&self, target: RuleStatus) -> bool {
        *self == target || self.successors().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
