//! Automation port: CRUD for rules stored on the backend.

use std::future::Future;

use plugdash_domain::automation::{AutomationRule, AutomationRuleUpdate, NewAutomationRule};
use plugdash_domain::error::PlugDashError;
use plugdash_domain::id::RuleId;

/// Remote automation rule store.
pub trait AutomationApi {
    fn list_rules(&self)
    -> impl Future<Output = Result<Vec<AutomationRule>, PlugDashError>> + Send;

    /// Fails with [`PlugDashError::NotFound`] for an unknown id.
    fn get_rule(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send;

    fn create_rule(
        &self,
        rule: &NewAutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send;

    fn update_rule(
        &self,
        id: RuleId,
        update: &AutomationRuleUpdate,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send;

    fn delete_rule(&self, id: RuleId) -> impl Future<Output = Result<(), PlugDashError>> + Send;

    /// Flip the rule's enabled flag and return the stored rule.
    fn toggle_rule(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send;
}

impl<T: AutomationApi + Send + Sync> AutomationApi for std::sync::Arc<T> {
    fn list_rules(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, PlugDashError>> + Send {
        (**self).list_rules()
    }

    fn get_rule(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send {
        (**self).get_rule(id)
    }

    fn create_rule(
        &self,
        rule: &NewAutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send {
        (**self).create_rule(rule)
    }

    fn update_rule(
        &self,
        id: RuleId,
        update: &AutomationRuleUpdate,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send {
        (**self).update_rule(id, update)
    }

    fn delete_rule(&self, id: RuleId) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        (**self).delete_rule(id)
    }

    fn toggle_rule(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send {
        (**self).toggle_rule(id)
    }
}
