//! The rule aggregate.
//!
//! A [`RuleEntity`] owns a [`RuleConfiguration`] plus its business context.
//! Mutations never touch `self`: each one builds a candidate, validates it in
//! full, and returns the new entity with the notification describing the
//! change. A failed mutation leaves the caller holding the unchanged entity.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use super::classification::{BalanceType, ProfileType};
use super::notification::{EventType, Notification};
use super::status::RuleStatus;
use crate::ast::RuleConfiguration;
use crate::codec::Structured;
use crate::error::{RuleError, RuleResult};
use crate::transpiler::{Compiler, Parameters};

/// Outcome of a mutation: the next entity and, if anything changed, its notification.
pub type Mutation = RuleResult<(RuleEntity, Option<Notification>)>;

/// Input for [`RuleEntity::create`].
#[derive(Debug, Clone)]
pub struct NewRule {
    pub name: String,
    pub profile: ProfileType,
    pub balance: BalanceType,
    pub tables: Vec<String>,
    pub section_id: Uuid,
    pub configuration: RuleConfiguration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleEntity {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    profile: ProfileType,
    balance: BalanceType,
    declared_tables: BTreeSet<String>,
    section_id: Uuid,
    configuration: RuleConfiguration,
    status: RuleStatus,
}

impl RuleEntity {
    /// Create a validated rule in `DRAFT`.
    pub fn create(new: NewRule) -> RuleResult<(Self, Notification)> {
        let now = Utc::now();
        let entity = Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: new.name,
            profile: new.profile,
            balance: new.balance,
            declared_tables: new.tables.into_iter().collect(),
            section_id: new.section_id,
            configuration: new.configuration,
            status: RuleStatus::Draft,
        };
        entity.validate()?;

        tracing::debug!(rule_id = %entity.id, name = %entity.name, "Rule created");
        let notification = Notification::new(
            EventType::Created,
            entity.id,
            now,
            json!({
                "name": entity.name,
                "profile_type": entity.profile,
                "balance_type": entity.balance,
                "section_id": entity.section_id,
                "status": entity.status,
            }),
        );
        Ok((entity, notification))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> ProfileType {
        self.profile
    }

    pub fn balance(&self) -> BalanceType {
        self.balance
    }

    pub fn declared_tables(&self) -> &BTreeSet<String> {
        &self.declared_tables
    }

    pub fn section_id(&self) -> Uuid {
        self.section_id
    }

    pub fn configuration(&self) -> &RuleConfiguration {
        &self.configuration
    }

    pub fn status(&self) -> RuleStatus {
        self.status
    }

    /// Full validation. Business invariants are checked before the
    /// configuration, so they are reported whatever its state.
    pub fn validate(&self) -> RuleResult<()> {
        if self.name.trim().is_empty() {
            return Err(RuleError::invariant("A rule must have a name"));
        }
        if self.section_id.is_nil() {
            return Err(RuleError::invariant("A rule must be associated with a section"));
        }
        if self.profile == ProfileType::Prepaid && self.balance != BalanceType::MainBalance {
            return Err(RuleError::invariant("Prepaid profile can only have main balance"));
        }
        if self.declared_tables.is_empty() {
            return Err(RuleError::invariant("A rule must specify at least one database table"));
        }
        for table in self.configuration.get_table_names() {
            if !self.declared_tables.contains(&table) {
                return Err(RuleError::invariant(format!(
                    "Table '{}' used in configuration but not listed in declared tables",
                    table
                )));
            }
        }
        self.configuration.validate()
    }

    pub fn rename(&self, name: impl Into<String>) -> Mutation {
        let name = name.into();
        if name == self.name {
            return Ok((self.clone(), None));
        }
        let payload = json!({ "old_name": self.name, "new_name": name });
        let mut next = self.clone();
        next.name = name;
        self.commit(next, EventType::NameUpdated, payload)
    }

    pub fn change_profile(&self, profile: ProfileType) -> Mutation {
        if profile == self.profile {
            return Ok((self.clone(), None));
        }
        let payload = json!({ "old_profile_type": self.profile, "new_profile_type": profile });
        let mut next = self.clone();
        next.profile = profile;
        self.commit(next, EventType::ProfileTypeUpdated, payload)
    }

    pub fn change_balance(&self, balance: BalanceType) -> Mutation {
        if balance == self.balance {
            return Ok((self.clone(), None));
        }
        let payload = json!({ "old_balance_type": self.balance, "new_balance_type": balance });
        let mut next = self.clone();
        next.balance = balance;
        self.commit(next, EventType::BalanceTypeUpdated, payload)
    }

    /// Wholesale replacement. Always notifies, even for an identical configuration.
    pub fn replace_configuration(&self, configuration: RuleConfiguration) -> Mutation {
        let mut next = self.clone();
        next.configuration = configuration;
        let payload = json!({ "rule_name": self.name });
        self.commit(next, EventType::ConfigurationUpdated, payload)
    }

    pub fn replace_tables<S: Into<String>>(&self, tables: impl IntoIterator<Item = S>) -> Mutation {
        let tables: BTreeSet<String> = tables.into_iter().map(Into::into).collect();
        if tables == self.declared_tables {
            return Ok((self.clone(), None));
        }
        let payload = json!({ "old_tables": self.declared_tables, "new_tables": tables });
        let mut next = self.clone();
        next.declared_tables = tables;
        self.commit(next, EventType::TablesUpdated, payload)
    }

    /// Move to `target` following the lifecycle table.
    pub fn transition(&self, target: RuleStatus) -> Mutation {
        if target == self.status {
            return Ok((self.clone(), None));
        }
        if !self.status.can_transition_to(target) {
            return Err(RuleError::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }

        let event = match target {
            RuleStatus::Draft => EventType::DraftStarted,
            RuleStatus::ToValidate => EventType::ToValidateStarted,
            RuleStatus::InProduction => EventType::ProductionStarted,
            RuleStatus::Archived => EventType::Archived,
        };
        let payload = json!({
            "rule_name": self.name,
            "from_status": self.status,
            "to_status": target,
        });
        let mut next = self.clone();
        next.status = target;
        self.commit(next, event, payload)
    }

    pub fn move_to_validation(&self) -> Mutation {
        self.transition(RuleStatus::ToValidate)
    }

    pub fn move_to_production(&self) -> Mutation {
        self.transition(RuleStatus::InProduction)
    }

    pub fn move_to_draft(&self) -> Mutation {
        self.transition(RuleStatus::Draft)
    }

    pub fn archive(&self) -> Mutation {
        self.transition(RuleStatus::Archived)
    }

    /// Compile the configuration with default settings.
    pub fn compile(&self, params: &Parameters) -> RuleResult<(String, Notification)> {
        self.compile_with(&Compiler::default(), params)
    }

    /// Compile and record it: every generated statement yields a
    /// `rule.sql_generated` notification. The entity itself is not modified.
    pub fn compile_with(
        &self,
        compiler: &Compiler,
        params: &Parameters,
    ) -> RuleResult<(String, Notification)> {
        self.validate()?;
        let sql = compiler.compile(&self.configuration, params)?;
        let notification = Notification::new(
            EventType::SqlGenerated,
            self.id,
            Utc::now(),
            json!({ "rule_name": self.name, "parameters_count": params.len() }),
        );
        Ok((sql, notification))
    }

    pub fn required_parameters(&self) -> Vec<&str> {
        self.configuration.required_parameters()
    }

    fn commit(&self, mut next: RuleEntity, event: EventType, payload: Value) -> Mutation {
        next.validate()?;
        let now = Utc::now();
        next.updated_at = now;
        tracing::debug!(rule_id = %next.id, event = %event, "Rule mutation committed");
        let notification = Notification::new(event, next.id, now, payload);
        Ok((next, Some(notification)))
    }

    /// Flat, serializable form for the persistence layer.
    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            name: self.name.clone(),
            profile_type: self.profile,
            balance_type: self.balance,
            database_tables: self.declared_tables.iter().cloned().collect(),
            section_id: self.section_id,
            configuration: self.configuration.to_structured(),
            status: self.status,
        }
    }

    /// Rebuild from a stored record. The result is fully validated.
    pub fn from_record(record: RuleRecord) -> RuleResult<Self> {
        let configuration = RuleConfiguration::from_structured(&record.configuration)?;
        let entity = Self {
            id: record.id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            name: record.name,
            profile: record.profile_type,
            balance: record.balance_type,
            declared_tables: record.database_tables.into_iter().collect(),
            section_id: record.section_id,
            configuration,
            status: record.status,
        };
        entity.validate()?;
        Ok(entity)
    }
}

/// Stored representation of a rule. `configuration` is the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub profile_type: ProfileType,
    pub balance_type: BalanceType,
    pub database_tables: Vec<String>,
    pub section_id: Uuid,
    pub configuration: Value,
    pub status: RuleStatus,
}
