//! In-progress rule form.
//!
//! A [`RuleDraft`] holds the raw text the user typed. It can always be encoded
//! for preview, but only a draft that passes [`RuleDraft::validate`] becomes a
//! [`NewAutomationRule`].

use chrono::NaiveTime;

use super::trigger::{parse_amount, parse_time};
use super::{
    AutomationRule, CarbonLevel, Comparison, DayCode, NewAutomationRule, RuleAction, Trigger,
    TriggerError, TriggerType, USAGE_WINDOW_MINUTES,
};
use crate::error::ValidationError;
use crate::id::HardwareName;

#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    pub hardware_name: Option<HardwareName>,
    pub action: RuleAction,
    pub trigger_type: TriggerType,
    /// Schedule time as typed, expected `HH:MM`.
    pub time: String,
    /// Selected days, in the order they were picked.
    pub days: Vec<DayCode>,
    pub operator: Comparison,
    /// Price threshold in pence, as typed.
    pub price_amount: String,
    /// Usage threshold in Wh, as typed.
    pub usage_amount: String,
    pub carbon_level: Option<CarbonLevel>,
}

impl Default for RuleDraft {
    fn default() -> Self {
        Self {
            hardware_name: None,
            action: RuleAction::PowerOn,
            trigger_type: TriggerType::Schedule,
            time: String::new(),
            days: Vec::new(),
            operator: Comparison::default(),
            price_amount: String::new(),
            usage_amount: String::new(),
            carbon_level: None,
        }
    }
}

impl RuleDraft {
    #[must_use]
    pub fn new(hardware_name: HardwareName) -> Self {
        Self {
            hardware_name: Some(hardware_name),
            ..Self::default()
        }
    }

    /// Pre-fill a draft from an existing rule, e.g. to edit it.
    ///
    /// # Errors
    ///
    /// Returns a [`TriggerError`] when the stored value cannot be decoded.
    pub fn from_rule(rule: &AutomationRule) -> Result<Self, TriggerError> {
        let mut draft = Self {
            hardware_name: Some(rule.hardware_name.clone()),
            action: rule.action,
            trigger_type: rule.trigger_type,
            ..Self::default()
        };
        match rule.trigger()? {
            Trigger::Schedule { time, days } => {
                draft.time = time.format("%H:%M").to_string();
                draft.days = days;
            }
            Trigger::Price { operator, amount } => {
                draft.operator = operator;
                draft.price_amount = amount.to_string();
            }
            Trigger::Usage { amount, .. } => draft.usage_amount = amount.to_string(),
            Trigger::Carbon { level } => draft.carbon_level = Some(level),
        }
        Ok(draft)
    }

    /// Switch the trigger type. Usage rules default to switching the plug
    /// off, every other type to switching it on.
    pub fn set_trigger_type(&mut self, trigger_type: TriggerType) {
        self.trigger_type = trigger_type;
        self.action = match trigger_type {
            TriggerType::Usage => RuleAction::PowerOff,
            _ => RuleAction::PowerOn,
        };
    }

    /// Select `day` if it is not selected yet, otherwise deselect it.
    pub fn toggle_day(&mut self, day: DayCode) {
        if let Some(pos) = self.days.iter().position(|d| *d == day) {
            self.days.remove(pos);
        } else {
            self.days.push(day);
        }
    }

    /// Build the trigger described by the form.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] that blocks submission.
    pub fn validate(&self) -> Result<Trigger, ValidationError> {
        if self.hardware_name.is_none() {
            return Err(ValidationError::MissingDevice);
        }
        match self.trigger_type {
            TriggerType::Schedule => {
                let time = self.schedule_time()?;
                if self.days.is_empty() {
                    return Err(ValidationError::NoDays);
                }
                Ok(Trigger::Schedule {
                    time,
                    days: self.days.clone(),
                })
            }
            TriggerType::Price => Ok(Trigger::Price {
                operator: self.operator,
                amount: amount_field(&self.price_amount)?,
            }),
            TriggerType::Usage => Ok(Trigger::Usage {
                amount: amount_field(&self.usage_amount)?,
                window_minutes: USAGE_WINDOW_MINUTES,
            }),
            TriggerType::Carbon => self
                .carbon_level
                .map(|level| Trigger::Carbon { level })
                .ok_or(ValidationError::MissingCarbonLevel),
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Encoded value for the current form state.
    ///
    /// A valid draft encodes canonically. An incomplete one concatenates
    /// whatever was typed, so a price draft without an amount yields `"GT,"`.
    #[must_use]
    pub fn encode_value(&self) -> String {
        if let Ok(trigger) = self.validate() {
            return trigger.encode();
        }
        match self.trigger_type {
            TriggerType::Schedule => {
                let days: Vec<&str> = self.days.iter().map(|day| day.code()).collect();
                format!("{}{}", self.time.trim(), days.join("."))
            }
            TriggerType::Price => {
                format!("{},{}", self.operator.code(), self.price_amount.trim())
            }
            TriggerType::Usage => {
                format!("GT,{},{USAGE_WINDOW_MINUTES}", self.usage_amount.trim())
            }
            TriggerType::Carbon => self
                .carbon_level
                .map(|level| level.code().to_string())
                .unwrap_or_default(),
        }
    }

    /// Turn the draft into an enabled rule payload.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`RuleDraft::validate`].
    pub fn into_new_rule(self) -> Result<NewAutomationRule, ValidationError> {
        let trigger = self.validate()?;
        let hardware_name = self.hardware_name.ok_or(ValidationError::MissingDevice)?;
        Ok(NewAutomationRule::new(hardware_name, self.action, &trigger))
    }

    fn schedule_time(&self) -> Result<NaiveTime, ValidationError> {
        parse_time(self.time.trim()).map_err(|_| ValidationError::InvalidTime(self.time.clone()))
    }
}

fn amount_field(raw: &str) -> Result<f64, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::InvalidAmount(raw.to_string()));
    }
    parse_amount(raw).map_err(|_| ValidationError::InvalidAmount(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(trigger_type: TriggerType) -> RuleDraft {
        let mut draft = RuleDraft::new(HardwareName::new("device1").unwrap());
        draft.set_trigger_type(trigger_type);
        draft
    }

    #[test]
    fn should_preserve_day_selection_order() {
        let mut d = draft(TriggerType::Schedule);
        d.time = "18:00".to_string();
        d.toggle_day(DayCode::Friday);
        d.toggle_day(DayCode::Monday);
        d.toggle_day(DayCode::Wednesday);
        assert_eq!(d.encode_value(), "18:00F.M.W");
    }

    #[test]
    fn should_deselect_day_when_toggled_twice() {
        let mut d = draft(TriggerType::Schedule);
        d.toggle_day(DayCode::Monday);
        d.toggle_day(DayCode::Tuesday);
        d.toggle_day(DayCode::Monday);
        assert_eq!(d.days, vec![DayCode::Tuesday]);
    }

    #[test]
    fn should_block_submit_when_schedule_has_no_days() {
        let mut d = draft(TriggerType::Schedule);
        d.time = "07:30".to_string();
        assert_eq!(d.validate(), Err(ValidationError::NoDays));
        assert!(!d.can_submit());
    }

    #[test]
    fn should_block_submit_when_time_is_malformed() {
        let mut d = draft(TriggerType::Schedule);
        d.time = "7:30".to_string();
        d.toggle_day(DayCode::Sunday);
        assert_eq!(
            d.validate(),
            Err(ValidationError::InvalidTime("7:30".to_string()))
        );
    }

    #[test]
    fn should_encode_incomplete_price_draft_without_amount() {
        let mut d = draft(TriggerType::Price);
        d.operator = Comparison::GreaterThan;
        assert_eq!(d.encode_value(), "GT,");
        assert!(matches!(
            d.validate(),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn should_reject_negative_price_amount() {
        let mut d = draft(TriggerType::Price);
        d.price_amount = "-4".to_string();
        assert!(!d.can_submit());
    }

    #[test]
    fn should_default_action_to_power_off_when_usage_selected() {
        let mut d = draft(TriggerType::Usage);
        assert_eq!(d.action, RuleAction::PowerOff);
        d.set_trigger_type(TriggerType::Carbon);
        assert_eq!(d.action, RuleAction::PowerOn);
    }

    #[test]
    fn should_encode_usage_with_fixed_window() {
        let mut d = draft(TriggerType::Usage);
        d.usage_amount = "100".to_string();
        assert_eq!(d.encode_value(), "GT,100,30");
    }

    #[test]
    fn should_require_carbon_level() {
        let mut d = draft(TriggerType::Carbon);
        assert_eq!(d.validate(), Err(ValidationError::MissingCarbonLevel));
        assert_eq!(d.encode_value(), "");
        d.carbon_level = Some(CarbonLevel::Low);
        assert_eq!(d.encode_value(), "LOW");
    }

    #[test]
    fn should_require_device() {
        let mut d = RuleDraft::default();
        d.set_trigger_type(TriggerType::Carbon);
        d.carbon_level = Some(CarbonLevel::High);
        assert_eq!(d.validate(), Err(ValidationError::MissingDevice));
    }

    #[test]
    fn should_build_enabled_rule_from_valid_draft() {
        let mut d = draft(TriggerType::Price);
        d.price_amount = "20".to_string();
        let rule = d.into_new_rule().unwrap();
        assert_eq!(rule.trigger_type, TriggerType::Price);
        assert_eq!(rule.value, "LT,20");
        assert_eq!(rule.action, RuleAction::PowerOn);
        assert!(rule.enabled);
    }

    #[test]
    fn should_prefill_draft_from_existing_rule() {
        let rule = AutomationRule {
            id: crate::id::RuleId::new(9),
            hardware_name: HardwareName::new("device3").unwrap(),
            action: RuleAction::PowerOff,
            trigger_type: TriggerType::Schedule,
            value: "22:15S.Su".to_string(),
            enabled: true,
        };
        let d = RuleDraft::from_rule(&rule).unwrap();
        assert_eq!(d.time, "22:15");
        assert_eq!(d.days, vec![DayCode::Saturday, DayCode::Sunday]);
        assert_eq!(d.encode_value(), rule.value);
    }
}
