//! Automation service: rule CRUD with local validation.

use plugdash_domain::automation::{
    AutomationRule, AutomationRuleUpdate, RuleDraft, Trigger,
};
use plugdash_domain::error::PlugDashError;
use plugdash_domain::id::RuleId;

use crate::ports::AutomationApi;

/// Application service for automation rules.
pub struct AutomationService<A> {
    api: A,
}

impl<A: AutomationApi> AutomationService<A> {
    /// Create a new service backed by the given API.
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Propagates the backend error.
    #[tracing::instrument(skip(self))]
    pub async fn list_rules(&self) -> Result<Vec<AutomationRule>, PlugDashError> {
        self.api.list_rules().await
    }

    /// # Errors
    ///
    /// Returns [`PlugDashError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<AutomationRule, PlugDashError> {
        self.api.get_rule(id).await
    }

    /// Validate the draft locally, then create the rule.
    ///
    /// # Errors
    ///
    /// Returns [`PlugDashError::Validation`] without any request when the
    /// draft is incomplete, otherwise the backend error.
    #[tracing::instrument(skip(self, draft), fields(trigger_type = %draft.trigger_type))]
    pub async fn create_rule(&self, draft: RuleDraft) -> Result<AutomationRule, PlugDashError> {
        let rule = draft.into_new_rule()?;
        let created = self.api.create_rule(&rule).await?;
        tracing::info!(id = %created.id, value = %created.value, "rule created");
        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// Whenever the type or the value changes, the resulting pair must
    /// decode: a new value against the new (or stored) type, a new type
    /// against the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`PlugDashError::Decode`] without updating anything when the
    /// pair would not decode, otherwise the backend error.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_rule(
        &self,
        id: RuleId,
        update: &AutomationRuleUpdate,
    ) -> Result<AutomationRule, PlugDashError> {
        match (update.trigger_type, &update.value) {
            (None, None) => {}
            (Some(kind), Some(value)) => {
                Trigger::decode(kind, value)?;
            }
            (kind, value) => {
                let stored = self.api.get_rule(id).await?;
                let kind = kind.unwrap_or(stored.trigger_type);
                Trigger::decode(kind, value.as_deref().unwrap_or(&stored.value))?;
            }
        }
        self.api.update_rule(id, update).await
    }

    /// # Errors
    ///
    /// Returns [`PlugDashError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), PlugDashError> {
        self.api.delete_rule(id).await?;
        tracing::info!("rule deleted");
        Ok(())
    }

    /// Enable a disabled rule or disable an enabled one.
    ///
    /// # Errors
    ///
    /// Returns [`PlugDashError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_rule(&self, id: RuleId) -> Result<AutomationRule, PlugDashError> {
        let rule = self.api.toggle_rule(id).await?;
        tracing::info!(enabled = rule.enabled, "rule toggled");
        Ok(rule)
    }
}
