//! Database instance access rules
//!
//! The API only exposes the rule collection, so a single rule is found by a
//! linear search of the listing. Updates and deletes are PUT operations on
//! the rule path.

use opcflow_core::{
    Client, Named, PathContext, ResourceClient, ResourceDescriptor, Result, StateClassifier,
    resource_state, wait_for_deletion, wait_for_state, weak,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

pub const ACCESS_RULE: ResourceDescriptor = ResourceDescriptor::new(
    "access rule",
    "/paas/api/v1.1/instancemgmt/{tenant}/services/dbaas/instances/{service}/accessrules",
    "/paas/api/v1.1/instancemgmt/{tenant}/services/dbaas/instances/{service}/accessrules/{name}",
)
.with_items_key("access_rules")
.listing_only();

resource_state! {
    pub enum RuleStatus {
        Enabled => "enabled",
        Disabled => "disabled",
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRuleInput {
    pub rule_name: String,
    pub description: String,
    /// Source IPs or a named group such as `PUBLIC-INTERNET`
    pub source: String,
    /// `DB` or `DB_1`
    pub destination: String,
    pub ports: String,
    pub status: RuleStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessRule {
    pub rule_name: String,
    pub description: String,
    pub source: String,
    pub destination: String,
    #[serde(deserialize_with = "weak::string")]
    pub ports: String,
    pub status: RuleStatus,
    /// `DEFAULT`, `SYSTEM` or `USER`
    pub rule_type: String,
}

impl Named for AccessRule {
    fn name(&self) -> &str {
        &self.rule_name
    }
}

#[derive(Debug, Serialize)]
struct RuleOperation<'a> {
    operation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a RuleStatus>,
}

pub struct AccessRules {
    client: Client,
    resources: ResourceClient,
}

impl AccessRules {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            resources: client.resource(ACCESS_RULE),
        }
    }

    fn context(&self, instance: &str) -> PathContext {
        self.client.context().service(instance)
    }

    /// Create a rule and wait until it shows up in the listing
    pub async fn create(&self, instance: &str, input: &AccessRuleInput) -> Result<AccessRule> {
        let ctx = self.context(instance);
        let _: Value = self.resources.create(&ctx, input).await?;
        info!("Created access rule {} on {}", input.rule_name, instance);

        let spec = self
            .client
            .poll_spec(format!("access rule {} to be listed", input.rule_name));
        let listed =
            StateClassifier::new([RuleStatus::Enabled, RuleStatus::Disabled], Vec::new());
        wait_for_state(
            &self.resources,
            &ctx,
            &input.rule_name,
            &spec,
            &listed,
            |rule: &AccessRule| rule.status.clone(),
        )
        .await
    }

    pub async fn get(&self, instance: &str, name: &str) -> Result<Option<AccessRule>> {
        self.resources.find(&self.context(instance), name).await
    }

    pub async fn list(&self, instance: &str) -> Result<Vec<AccessRule>> {
        self.resources.list(&self.context(instance)).await
    }

    /// Enable or disable a rule and wait until the listing reflects it
    pub async fn set_status(
        &self,
        instance: &str,
        name: &str,
        status: RuleStatus,
    ) -> Result<AccessRule> {
        let ctx = self.context(instance);
        let body = RuleOperation {
            operation: "update",
            status: Some(&status),
        };
        let _: Value = self.resources.update(&ctx, name, &body).await?;

        let spec = self
            .client
            .poll_spec(format!("access rule {} to be {}", name, status));
        let target = StateClassifier::new([status.clone()], Vec::new());
        wait_for_state(&self.resources, &ctx, name, &spec, &target, |rule: &AccessRule| {
            rule.status.clone()
        })
        .await
    }

    /// Delete a rule and wait until it leaves the listing. Deleting an absent rule succeeds.
    pub async fn delete(&self, instance: &str, name: &str) -> Result<()> {
        let ctx = self.context(instance);
        let body = RuleOperation {
            operation: "delete",
            status: None,
        };
        match self.resources.update::<_, Value>(&ctx, name, &body).await {
            Ok(_) => info!("Deleting access rule {} on {}", name, instance),
            Err(e) if e.is_not_found() => {
                debug!("Access rule {} already absent", name);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let spec = self
            .client
            .poll_spec(format!("access rule {} to be deleted", name));
        let gone = StateClassifier::new(Vec::new(), Vec::new());
        wait_for_deletion(&self.resources, &ctx, name, &spec, &gone, |rule: &AccessRule| {
            rule.status.clone()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::client;
    use opcflow_core::testing::ScriptedBackend;
    use serde_json::json;
    use std::sync::Arc;

    const RULES_URL: &str = "https://api.example.com/paas/api/v1.1/instancemgmt/idcs-dom/services/dbaas/instances/db1/accessrules";

    fn web_rule(status: &str) -> serde_json::Value {
        json!({"accessRules": [{"ruleName": "web", "status": status}]})
    }

    fn input() -> AccessRuleInput {
        AccessRuleInput {
            rule_name: "web".to_string(),
            description: "https from anywhere".to_string(),
            source: "PUBLIC-INTERNET".to_string(),
            destination: "DB".to_string(),
            ports: "443".to_string(),
            status: RuleStatus::Enabled,
        }
    }

    #[test]
    fn test_input_serializes_status_as_wire_value() {
        let body = serde_json::to_value(input()).unwrap();
        assert_eq!(body["ruleName"], "web");
        assert_eq!(body["status"], "enabled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_waits_until_listed() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(202, "")
                .respond_json(200, json!({"accessRules": [
                    {"ruleName": "ora_p2_ssh", "status": "enabled", "ruleType": "DEFAULT"}
                ]}))
                .respond_json(200, json!({"accessRules": [
                    {"ruleName": "ora_p2_ssh", "status": "enabled", "ruleType": "DEFAULT"},
                    {"ruleName": "web", "status": "enabled", "ports": 443, "ruleType": "USER"}
                ]})),
        );
        let rules = AccessRules::new(&client(backend.clone()));

        let rule = rules.create("db1", &input()).await.unwrap();
        assert_eq!(rule.ports, "443");
        assert_eq!(rule.rule_type, "USER");

        let requests = backend.requests();
        assert_eq!(requests[0].url, RULES_URL);
        assert!(requests[1..].iter().all(|r| r.url == RULES_URL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_status_waits_for_change() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(200, "{}")
                .respond_json(200, web_rule("enabled"))
                .respond_json(200, web_rule("disabled")),
        );
        let rules = AccessRules::new(&client(backend.clone()));

        let rule = rules
            .set_status("db1", "web", RuleStatus::Disabled)
            .await
            .unwrap();
        assert_eq!(rule.status, RuleStatus::Disabled);

        let sent = &backend.requests()[0];
        assert_eq!(sent.url, format!("{}/web", RULES_URL));
        let body: serde_json::Value =
            serde_json::from_slice(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"operation": "update", "status": "disabled"}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_waits_until_unlisted() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(200, "{}")
                .respond_json(200, web_rule("enabled"))
                .respond_json(200, json!({"accessRules": []})),
        );
        let rules = AccessRules::new(&client(backend.clone()));

        rules.delete("db1", "web").await.unwrap();
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_delete_absent_rule_succeeds() {
        let backend = Arc::new(ScriptedBackend::new().respond(404, "rule not found"));
        let rules = AccessRules::new(&client(backend.clone()));

        rules.delete("db1", "web").await.unwrap();
        assert_eq!(backend.call_count(), 1);
    }
}
