use pretty_assertions::assert_eq;
use rulesql::codec::from_json;
use rulesql::prelude::*;
use serde_json::json;
use uuid::Uuid;

const OFFER_USAGE: &str = include_str!("fixtures/offer_usage.json");

fn new_rule(tables: &[&str]) -> NewRule {
    NewRule {
        name: "Offer usage".to_string(),
        profile: ProfileType::Prepaid,
        balance: BalanceType::MainBalance,
        tables: tables.iter().map(|t| t.to_string()).collect(),
        section_id: Uuid::new_v4(),
        configuration: from_json(OFFER_USAGE).unwrap(),
    }
}

fn rule_in(status: RuleStatus) -> RuleEntity {
    let (mut rule, _) = RuleEntity::create(new_rule(&["transactions", "offers"])).unwrap();
    let path: &[RuleStatus] = match status {
        RuleStatus::Draft => &[],
        RuleStatus::ToValidate => &[RuleStatus::ToValidate],
        RuleStatus::InProduction => &[RuleStatus::ToValidate, RuleStatus::InProduction],
        RuleStatus::Archived => &[RuleStatus::ToValidate, RuleStatus::InProduction, RuleStatus::Archived],
    };
    for step in path {
        rule = rule.transition(*step).unwrap().0;
    }
    assert_eq!(rule.status(), status);
    rule
}

#[test]
fn test_transition_matrix() {
    use RuleStatus::*;
    let allowed = [
        (Draft, ToValidate),
        (ToValidate, InProduction),
        (ToValidate, Draft),
        (InProduction, Archived),
    ];

    for from in RuleStatus::ALL {
        for to in RuleStatus::ALL {
            let rule = rule_in(from);
            let result = rule.transition(to);

            if from == to {
                let (same, notification) = result.unwrap();
                assert!(notification.is_none(), "{} -> {} should be a no-op", from, to);
                assert_eq!(same, rule);
            } else if allowed.contains(&(from, to)) {
                let (next, notification) = result.unwrap();
                let notification = notification.unwrap();
                assert_eq!(next.status(), to);
                assert_eq!(notification.entity_id, rule.id());
                assert_eq!(notification.payload["from_status"], json!(from.as_str()));
                assert_eq!(notification.payload["to_status"], json!(to.as_str()));
            } else {
                assert_eq!(
                    result.unwrap_err(),
                    RuleError::InvalidTransition {
                        from: from.to_string(),
                        to: to.to_string(),
                    }
                );
            }
        }
    }
}

#[test]
fn test_transition_events() {
    let draft = rule_in(RuleStatus::Draft);
    let (to_validate, n) = draft.move_to_validation().unwrap();
    assert_eq!(n.unwrap().event_type, EventType::ToValidateStarted);

    let (back, n) = to_validate.move_to_draft().unwrap();
    assert_eq!(n.unwrap().event_type, EventType::DraftStarted);
    assert_eq!(back.status(), RuleStatus::Draft);

    let (production, n) = to_validate.move_to_production().unwrap();
    assert_eq!(n.unwrap().event_type, EventType::ProductionStarted);

    let (archived, n) = production.archive().unwrap();
    assert_eq!(n.unwrap().event_type, EventType::Archived);
    assert!(archived.status().is_terminal());
}

#[test]
fn test_prepaid_requires_main_balance() {
    let mut input = new_rule(&["transactions", "offers"]);
    input.balance = BalanceType::Cred;
    let err = RuleEntity::create(input).unwrap_err();
    assert_eq!(err, RuleError::invariant("Prepaid profile can only have main balance"));

    let (rule, _) = RuleEntity::create(new_rule(&["transactions", "offers"])).unwrap();
    assert!(rule.change_balance(BalanceType::Cred).is_err());

    let (hybrid, _) = rule.change_profile(ProfileType::Hybrid).unwrap();
    let (cred, n) = hybrid.change_balance(BalanceType::Cred).unwrap();
    assert_eq!(cred.balance(), BalanceType::Cred);
    assert_eq!(
        n.unwrap().payload,
        json!({"old_balance_type": "MAIN_BALANCE", "new_balance_type": "CRED"})
    );
}

#[test]
fn test_declared_tables_cover_configuration() {
    let err = RuleEntity::create(new_rule(&["transactions"])).unwrap_err();
    assert_eq!(
        err,
        RuleError::invariant("Table 'offers' used in configuration but not listed in declared tables")
    );

    let (rule, _) = RuleEntity::create(new_rule(&["transactions", "offers"])).unwrap();
    let err = rule.replace_tables(["transactions"]).unwrap_err();
    assert!(err.to_string().contains("'offers'"));

    let (wider, n) = rule.replace_tables(["transactions", "offers", "customers"]).unwrap();
    assert_eq!(wider.declared_tables().len(), 3);
    assert_eq!(n.unwrap().event_type, EventType::TablesUpdated);
}

#[test]
fn test_configuration_replacement_always_notifies() {
    let (rule, _) = RuleEntity::create(new_rule(&["transactions", "offers"])).unwrap();
    let (same, n) = rule.replace_configuration(rule.configuration().clone()).unwrap();
    assert_eq!(same.configuration(), rule.configuration());
    let n = n.unwrap();
    assert_eq!(n.event_type, EventType::ConfigurationUpdated);
    assert_eq!(n.payload, json!({"rule_name": "Offer usage"}));
}

#[test]
fn test_invalid_configuration_rejected() {
    let (rule, _) = RuleEntity::create(new_rule(&["transactions", "offers"])).unwrap();
    let broken = from_json(OFFER_USAGE)
        .unwrap()
        .with_where(Condition::new("t.msisdn", ComparisonOperator::Equal, "{{msisdn}}").unwrap());
    let err = rule.replace_configuration(broken).unwrap_err();
    assert_eq!(err.kind(), "REFERENTIAL_ERROR");
}

#[test]
fn test_notification_log_collects_in_order() {
    let mut log = NotificationLog::new();
    let (rule, created) = RuleEntity::create(new_rule(&["transactions", "offers"])).unwrap();
    log.push(created);

    let rule = log.record(rule.rename("Offer usage v2").unwrap());
    let rule = log.record(rule.rename("Offer usage v2").unwrap());
    let rule = log.record(rule.move_to_validation().unwrap());
    assert_eq!(rule.status(), RuleStatus::ToValidate);

    let events: Vec<EventType> = log.drain().into_iter().map(|n| n.event_type).collect();
    assert_eq!(
        events,
        vec![EventType::Created, EventType::NameUpdated, EventType::ToValidateStarted]
    );
    assert!(log.is_empty());
}

#[test]
fn test_compile_from_entity() {
    let (rule, _) = RuleEntity::create(new_rule(&["transactions", "offers"])).unwrap();
    assert_eq!(rule.required_parameters(), vec!["start_date"]);

    let mut params = Parameters::new();
    params.insert("start_date".to_string(), Literal::String("2024-01-01".to_string()));
    let (sql, generated) = rule.compile(&params).unwrap();
    assert!(sql.contains("t.created_at >= '2024-01-01'"));
    assert_eq!(generated.event_type, EventType::SqlGenerated);
    assert_eq!(generated.entity_id, rule.id());
    assert_eq!(
        generated.payload,
        json!({"rule_name": "Offer usage", "parameters_count": 1})
    );

    let mut log = NotificationLog::new();
    let sql_again = log.record(rule.compile(&params).map(|(sql, n)| (sql, Some(n))).unwrap());
    assert_eq!(sql_again, sql);
    assert_eq!(log.pending()[0].payload["parameters_count"], json!(1));
}

#[test]
fn test_prepaid_invariant_reported_before_configuration_errors() {
    let clashing_alias = RuleConfiguration::new(
        SelectClause::columns(["t.id"]).unwrap(),
        TableReference::new("transactions", Some("t")).unwrap(),
    )
    .with_join(JoinClause::new(JoinKind::Inner, "offers", Some("t"), "t.id = t.offer_id").unwrap());
    assert_eq!(clashing_alias.validate().unwrap_err().kind(), "REFERENTIAL_ERROR");

    let mut input = new_rule(&["transactions", "offers"]);
    input.balance = BalanceType::Cred;
    input.configuration = clashing_alias;
    let err = RuleEntity::create(input).unwrap_err();
    assert_eq!(err, RuleError::invariant("Prepaid profile can only have main balance"));
}

#[test]
fn test_same_state_transition_keeps_timestamp() {
    let archived = rule_in(RuleStatus::Archived);
    let (same, notification) = archived.archive().unwrap();
    assert!(notification.is_none());
    assert_eq!(same.status(), RuleStatus::Archived);
    assert_eq!(same.updated_at(), archived.updated_at());
}
