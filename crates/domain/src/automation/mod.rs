//! Automation rules: power a plug on or off when a trigger fires.
//!
//! Rules are evaluated by the backend. This module owns the record shapes
//! exchanged with it, the [`Trigger`] value codec and the [`RuleDraft`]
//! form state used to build new rules.

mod day;
mod draft;
mod trigger;

pub use day::DayCode;
pub use draft::RuleDraft;
pub use trigger::{CarbonLevel, Comparison, Trigger, TriggerError, USAGE_WINDOW_MINUTES};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::{HardwareName, RuleId};

/// What the rule does to its plug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    PowerOn,
    PowerOff,
}

impl RuleAction {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PowerOn => "Turn On",
            Self::PowerOff => "Turn Off",
        }
    }
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of condition that fires a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    Schedule,
    Price,
    Usage,
    Carbon,
}

impl TriggerType {
    pub const ALL: [Self; 4] = [Self::Schedule, Self::Price, Self::Usage, Self::Carbon];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Schedule => "SCHEDULE",
            Self::Price => "PRICE",
            Self::Usage => "USAGE",
            Self::Carbon => "CARBON",
        }
    }

    /// Heading used when rules are listed per type.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Schedule => "Schedule Rules",
            Self::Price => "Energy Price Rules",
            Self::Usage => "Usage Rules",
            Self::Carbon => "Carbon Rules",
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A rule as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub hardware_name: HardwareName,
    pub action: RuleAction,
    pub trigger_type: TriggerType,
    /// Encoded trigger, see [`Trigger::encode`].
    pub value: String,
    #[serde(rename = "active", default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl AutomationRule {
    /// Decode the stored value.
    ///
    /// # Errors
    ///
    /// Returns a [`TriggerError`] when the value does not match the grammar
    /// of `trigger_type`.
    pub fn trigger(&self) -> Result<Trigger, TriggerError> {
        Trigger::decode(self.trigger_type, &self.value)
    }

    /// One-line summary such as `Turn Off when At 18:00 on M, W, F`.
    ///
    /// Values that cannot be decoded are shown verbatim.
    #[must_use]
    pub fn describe(&self) -> String {
        let condition = self
            .trigger()
            .map_or_else(|_| self.value.clone(), |trigger| trigger.describe());
        format!("{} when {condition}", self.action.label())
    }

    /// Merge a partial update into this rule.
    pub fn apply(&mut self, update: &AutomationRuleUpdate) {
        if let Some(hardware_name) = &update.hardware_name {
            self.hardware_name = hardware_name.clone();
        }
        if let Some(action) = update.action {
            self.action = action;
        }
        if let Some(trigger_type) = update.trigger_type {
            self.trigger_type = trigger_type;
        }
        if let Some(value) = &update.value {
            self.value = value.clone();
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
    }
}

/// Payload for `POST /controller/automation_rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAutomationRule {
    pub hardware_name: HardwareName,
    pub action: RuleAction,
    pub trigger_type: TriggerType,
    pub value: String,
    #[serde(rename = "active")]
    pub enabled: bool,
}

impl NewAutomationRule {
    /// Build an enabled rule from a decoded trigger.
    #[must_use]
    pub fn new(hardware_name: HardwareName, action: RuleAction, trigger: &Trigger) -> Self {
        Self {
            hardware_name,
            action,
            trigger_type: trigger.kind(),
            value: trigger.encode(),
            enabled: true,
        }
    }
}

/// Payload for `PUT /controller/automation_rules/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_name: Option<HardwareName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<RuleAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<TriggerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "active", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl AutomationRuleUpdate {
    /// Replace the trigger (type and encoded value together).
    #[must_use]
    pub fn with_trigger(mut self, trigger: &Trigger) -> Self {
        self.trigger_type = Some(trigger.kind());
        self.value = Some(trigger.encode());
        self
    }
}

/// Group rules by trigger type, keeping their original order within each group.
#[must_use]
pub fn group_by_trigger(rules: &[AutomationRule]) -> BTreeMap<TriggerType, Vec<&AutomationRule>> {
    let mut groups: BTreeMap<TriggerType, Vec<&AutomationRule>> = BTreeMap::new();
    for rule in rules {
        groups.entry(rule.trigger_type).or_default().push(rule);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: i64, action: RuleAction, trigger_type: TriggerType, value: &str) -> AutomationRule {
        AutomationRule {
            id: RuleId::new(id),
            hardware_name: HardwareName::new("device1").unwrap(),
            action,
            trigger_type,
            value: value.to_string(),
            enabled: true,
        }
    }

    #[test]
    fn should_describe_schedule_rule() {
        let r = rule(1, RuleAction::PowerOff, TriggerType::Schedule, "18:00M.W.F");
        assert_eq!(r.describe(), "Turn Off when At 18:00 on M, W, F");
    }

    #[test]
    fn should_describe_price_rule() {
        let r = rule(2, RuleAction::PowerOn, TriggerType::Price, "LT,20");
        assert_eq!(r.describe(), "Turn On when Less Than 20p");
    }

    #[test]
    fn should_describe_carbon_rule() {
        let r = rule(3, RuleAction::PowerOff, TriggerType::Carbon, "HIGH");
        assert_eq!(r.describe(), "Turn Off when Green Grid Intensity: HIGH");
    }

    #[test]
    fn should_fall_back_to_raw_value_when_undecodable() {
        let r = rule(4, RuleAction::PowerOn, TriggerType::Price, "between 5 and 9");
        assert_eq!(r.describe(), "Turn On when between 5 and 9");
    }

    #[test]
    fn should_deserialize_rule_with_active_flag() {
        let json = serde_json::json!({
            "id": 2,
            "hardware_name": "device2",
            "action": "POWER_ON",
            "trigger_type": "PRICE",
            "value": "LT,20",
            "active": false
        });
        let r: AutomationRule = serde_json::from_value(json).unwrap();
        assert_eq!(r.id, RuleId::new(2));
        assert!(!r.enabled);
        assert_eq!(r.trigger_type, TriggerType::Price);
    }

    #[test]
    fn should_build_new_rule_from_trigger() {
        let trigger = Trigger::Carbon {
            level: CarbonLevel::VeryLow,
        };
        let new = NewAutomationRule::new(
            HardwareName::new("device1").unwrap(),
            RuleAction::PowerOn,
            &trigger,
        );
        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hardware_name": "device1",
                "action": "POWER_ON",
                "trigger_type": "CARBON",
                "value": "VERY_LOW",
                "active": true
            })
        );
    }

    #[test]
    fn should_serialize_only_set_update_fields() {
        let update = AutomationRuleUpdate {
            enabled: Some(false),
            ..AutomationRuleUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"active": false})
        );
    }

    #[test]
    fn should_apply_update_with_new_trigger() {
        let mut r = rule(5, RuleAction::PowerOn, TriggerType::Carbon, "LOW");
        let update = AutomationRuleUpdate::default().with_trigger(&Trigger::Price {
            operator: Comparison::GreaterThan,
            amount: 30.0,
        });
        r.apply(&update);
        assert_eq!(r.trigger_type, TriggerType::Price);
        assert_eq!(r.value, "GT,30");
        assert_eq!(r.action, RuleAction::PowerOn);
    }

    #[test]
    fn should_group_rules_by_trigger_type() {
        let rules = vec![
            rule(1, RuleAction::PowerOff, TriggerType::Schedule, "18:00M"),
            rule(2, RuleAction::PowerOn, TriggerType::Price, "LT,20"),
            rule(3, RuleAction::PowerOn, TriggerType::Schedule, "07:00S.Su"),
        ];
        let groups = group_by_trigger(&rules);
        assert_eq!(groups[&TriggerType::Schedule].len(), 2);
        assert_eq!(groups[&TriggerType::Schedule][1].id, RuleId::new(3));
        assert_eq!(groups[&TriggerType::Price].len(), 1);
        assert!(!groups.contains_key(&TriggerType::Usage));
    }
}
