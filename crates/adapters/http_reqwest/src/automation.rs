//! [`AutomationApi`] over `/controller/automation_rules`.

use std::future::Future;

use reqwest::Method;

use plugdash_app::ports::{AutomationApi, TokenStore};
use plugdash_domain::automation::{AutomationRule, AutomationRuleUpdate, NewAutomationRule};
use plugdash_domain::error::{NotFoundError, PlugDashError};
use plugdash_domain::id::RuleId;

use crate::client::HttpApiClient;

const RULES: [&str; 2] = ["controller", "automation_rules"];

fn rule_lookup(id: RuleId) -> Option<NotFoundError> {
    Some(NotFoundError {
        entity: "AutomationRule",
        id: id.to_string(),
    })
}

impl<T> HttpApiClient<T> {
    fn rule_endpoint(&self, id: RuleId, suffix: Option<&str>) -> reqwest::Url {
        let id = id.to_string();
        let mut segments = vec![RULES[0], RULES[1], id.as_str()];
        segments.extend(suffix);
        self.endpoint(&segments)
    }
}

impl<T: TokenStore + Sync> AutomationApi for HttpApiClient<T> {
    fn list_rules(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, PlugDashError>> + Send {
        self.get_json(self.endpoint(&RULES), None)
    }

    fn get_rule(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send {
        self.get_json(self.rule_endpoint(id, None), rule_lookup(id))
    }

    fn create_rule(
        &self,
        rule: &NewAutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send {
        self.send_json(Method::POST, self.endpoint(&RULES), rule, None)
    }

    fn update_rule(
        &self,
        id: RuleId,
        update: &AutomationRuleUpdate,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send {
        self.send_json(
            Method::PUT,
            self.rule_endpoint(id, None),
            update,
            rule_lookup(id),
        )
    }

    fn delete_rule(&self, id: RuleId) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        self.send_empty(Method::DELETE, self.rule_endpoint(id, None), rule_lookup(id))
    }

    fn toggle_rule(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<AutomationRule, PlugDashError>> + Send {
        self.fetch_json(
            Method::PATCH,
            self.rule_endpoint(id, Some("toggle")),
            rule_lookup(id),
        )
    }
}
