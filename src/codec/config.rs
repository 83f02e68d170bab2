use serde_json::{Map, Value, json};

use super::{Object, Structured, decode_list, key_path, string_list, type_name};
use crate::ast::{
    Condition, ConditionsClause, JoinClause, Literal, ParameterDefinition, ParameterType, RuleConfiguration,
    SelectClause, TableReference,
};
use crate::error::{RuleError, RuleResult};

const CONFIG_KEYS: &[&str] = &[
    "select",
    "from_table",
    "joins",
    "conditions",
    "group_by",
    "having",
    "order_by",
    "parameters",
];

impl Structured for ParameterDefinition {
    fn to_structured(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), json!(self.kind.as_str()));
        map.insert("required".into(), json!(self.required));
        if let Some(default) = &self.default {
            map.insert("default".into(), default.to_structured());
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), json!(description));
        }
        if let Some(values) = &self.values {
            map.insert("values".into(), json!(values));
        }
        Value::Object(map)
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, &["type", "required", "default", "description", "values"])?;
        let kind_name = object.string("type")?;
        let kind = ParameterType::parse(kind_name).ok_or_else(|| {
            RuleError::deserialization(object.path("type"), format!("unknown parameter type '{}'", kind_name))
        })?;

        let default = match object.get("default") {
            None => None,
            Some(raw) => {
                let default_path = object.path("default");
                match Literal::decode(raw, &default_path)? {
                    // Plain strings for typed parameters are parsed by type
                    Literal::String(s) if !matches!(kind, ParameterType::String | ParameterType::Enum) => {
                        Some(kind.parse_value("default", &s).map_err(|_| {
                            RuleError::deserialization(
                                &default_path,
                                format!("expected a {} value, got '{}'", kind.as_str(), s),
                            )
                        })?)
                    }
                    lit => Some(lit),
                }
            }
        };

        let values = match object.get("values") {
            None => None,
            Some(_) => Some(string_list(object.list("values")?, &object.path("values"))?),
        };

        Ok(ParameterDefinition {
            kind,
            required: object.opt_bool("required")?.unwrap_or(false),
            default,
            description: object.opt_string("description")?.map(str::to_string),
            values,
        })
    }
}

impl Structured for RuleConfiguration {
    fn to_structured(&self) -> Value {
        let joins: Vec<Value> = self.joins().iter().map(Structured::to_structured).collect();
        let having: Vec<Value> = self.having().iter().map(Structured::to_structured).collect();

        let mut map = Map::new();
        map.insert("select".into(), self.select().to_structured());
        map.insert("from_table".into(), self.from_table().to_structured());
        map.insert("joins".into(), Value::Array(joins));
        map.insert("conditions".into(), self.conditions().to_structured());
        map.insert("group_by".into(), json!(self.group_by()));
        map.insert("having".into(), Value::Array(having));
        map.insert("order_by".into(), json!(self.order_by()));
        if !self.parameters().is_empty() {
            let params: Map<String, Value> = self
                .parameters()
                .iter()
                .map(|(name, def)| (name.clone(), def.to_structured()))
                .collect();
            map.insert("parameters".into(), Value::Object(params));
        }
        Value::Object(map)
    }

    fn decode(value: &Value, path: &str) -> RuleResult<Self> {
        let object = Object::new(value, path, CONFIG_KEYS)?;

        let select = SelectClause::decode(object.required("select")?, &object.path("select"))?;
        let from = TableReference::decode(object.required("from_table")?, &object.path("from_table"))?;
        let joins: Vec<JoinClause> = decode_list(object.opt_list("joins")?, &object.path("joins"))?;
        let conditions = match object.get("conditions") {
            Some(raw) => ConditionsClause::decode(raw, &object.path("conditions"))?,
            None => ConditionsClause::default(),
        };
        let group_by = string_list(object.opt_list("group_by")?, &object.path("group_by"))?;
        let order_by = string_list(object.opt_list("order_by")?, &object.path("order_by"))?;
        let having: Vec<Condition> = decode_list(object.opt_list("having")?, &object.path("having"))?;

        let mut config = RuleConfiguration::new(select, from)
            .with_joins(joins)
            .with_conditions(conditions)
            .with_group_by(group_by)
            .with_order_by(order_by);
        for condition in having {
            config = config.with_having(condition);
        }

        if let Some(raw) = object.get("parameters") {
            let params_path = object.path("parameters");
            let declared = raw.as_object().ok_or_else(|| {
                RuleError::deserialization(
                    params_path.as_str(),
                    format!("expected an object, got {}", type_name(raw)),
                )
            })?;
            for (name, def) in declared {
                let def = ParameterDefinition::decode(def, &key_path(&params_path, name))?;
                config = config.with_parameter(name.clone(), def);
            }
        }

        Ok(config)
    }
}
