//! Lifecycle notifications.
//!
//! Every committed change to a [`RuleEntity`](super::RuleEntity) yields one
//! notification as a return value. Callers that want to batch them (audit
//! log, outbox) collect them in a [`NotificationLog`] and drain it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "rule.created")]
    Created,
    #[serde(rename = "rule.name_updated")]
    NameUpdated,
    #[serde(rename = "rule.profile_type_updated")]
    ProfileTypeUpdated,
    #[serde(rename = "rule.balance_type_updated")]
    BalanceTypeUpdated,
    #[serde(rename = "rule.configuration_updated")]
    ConfigurationUpdated,
    #[serde(rename = "rule.tables_updated")]
    TablesUpdated,
    #[serde(rename = "rule.sql_generated")]
    SqlGenerated,
    #[serde(rename = "rule.production_started")]
    ProductionStarted,
    #[serde(rename = "rule.to_validate_started")]
    ToValidateStarted,
    #[serde(rename = "rule.draft_started")]
    DraftStarted,
    #[serde(rename = "rule.archived")]
    Archived,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Created => "rule.created",
            EventType::NameUpdated => "rule.name_updated",
            EventType::ProfileTypeUpdated => "rule.profile_type_updated",
            EventType::BalanceTypeUpdated => "rule.balance_type_updated",
            EventType::ConfigurationUpdated => "rule.configuration_updated",
            EventType::TablesUpdated => "rule.tables_updated",
            EventType::SqlGenerated => "rule.sql_generated",
            EventType::ProductionStarted => "rule.production_started",
            EventType::ToValidateStarted => "rule.to_validate_started",
            EventType::DraftStarted => "rule.draft_started",
            EventType::Archived => "rule.archived",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed change, for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub event_type: EventType,
    pub entity_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub payload: Value,
}

impl Notification {
    pub fn new(event_type: EventType, entity_id: Uuid, occurred_at: DateTime<Utc>, payload: Value) -> Self {
        Self {
            event_type,
            entity_id,
            occurred_at,
            payload,
        }
    }
}

/// Caller-owned buffer of notifications.
#[derive(Debug, Default)]
pub struct NotificationLog {
    pending: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    /// Keep the entity from a mutation result and log its notification, if any.
    ///
    /// ```ignore
    /// let rule = log.record(rule.rename("Monthly top-up")?);
    /// ```
    pub fn record<T>(&mut self, (value, notification): (T, Option<Notification>)) -> T {
        self.pending.extend(notification);
        value
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Hand over everything logged so far, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
