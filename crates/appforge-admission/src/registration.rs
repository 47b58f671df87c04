//! Registration records for the component admission webhooks.
//!
//! Applying these configurations instructs the API server to route component
//! admission requests through the handlers in [`crate::webhooks`]. The group,
//! version and resource in the rules are derived from the [`Component`] type,
//! so they can never drift apart from the served custom resource definition.

use appforge_crds::component::Component;
use k8s_openapi::{
    ByteString,
    api::admissionregistration::v1::{
        MutatingWebhook, MutatingWebhookConfiguration, RuleWithOperations, ServiceReference,
        ValidatingWebhook, ValidatingWebhookConfiguration, WebhookClientConfig,
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use kube::Resource;

/// The HTTP path the mutating component webhook is served under.
pub const MUTATE_COMPONENTS_PATH: &str = "/mutate/components";

/// The HTTP path the validating component webhook is served under.
pub const VALIDATE_COMPONENTS_PATH: &str = "/validate/components";

const MUTATING_WEBHOOK_NAME: &str = "mcomponent.appforge.io";
const VALIDATING_WEBHOOK_NAME: &str = "vcomponent.appforge.io";

/// Describes how the API server reaches the webhook service.
#[derive(Clone, Debug)]
pub struct WebhookClientOptions {
    /// The name of the Service the webhook server is reachable through.
    pub service_name: String,

    /// The namespace the Service lives in.
    pub service_namespace: String,

    /// The HTTPS port of the Service.
    pub https_port: u16,

    /// The CA bundle the API server uses to verify the serving certificate.
    pub ca_bundle: ByteString,
}

#[derive(Debug, Default, strum::Display)]
pub enum SideEffects {
    #[default]
    None,
    NoneOnDryRun,
}

#[derive(Debug, Default, strum::Display)]
pub enum FailurePolicy {
    Ignore,
    #[default]
    Fail,
}

/// Creates the [`MutatingWebhookConfiguration`] for component defaulting.
///
/// The webhook is called for CREATE and UPDATE requests, has no side effects
/// and fails closed.
pub fn component_mutating_webhook_configuration(
    options: &WebhookClientOptions,
) -> MutatingWebhookConfiguration {
    MutatingWebhookConfiguration {
        metadata: ObjectMeta {
            name: Some(MUTATING_WEBHOOK_NAME.to_owned()),
            ..ObjectMeta::default()
        },
        webhooks: Some(vec![MutatingWebhook {
            name: MUTATING_WEBHOOK_NAME.to_owned(),
            admission_review_versions: vec!["v1".to_owned()],
            client_config: webhook_client_config(options, MUTATE_COMPONENTS_PATH),
            failure_policy: Some(FailurePolicy::default().to_string()),
            side_effects: SideEffects::default().to_string(),
            rules: Some(vec![component_rule(&["CREATE", "UPDATE"])]),
            ..MutatingWebhook::default()
        }]),
    }
}

/// Creates the [`ValidatingWebhookConfiguration`] for component validation.
///
/// The webhook is called for CREATE and UPDATE requests. Deletions are always
/// admitted, so routing DELETE requests through the webhook only adds latency.
/// It can still be enabled via `validate_delete`, e.g. to audit deletions.
pub fn component_validating_webhook_configuration(
    options: &WebhookClientOptions,
    validate_delete: bool,
) -> ValidatingWebhookConfiguration {
    let mut operations = vec!["CREATE", "UPDATE"];
    if validate_delete {
        operations.push("DELETE");
    }

    ValidatingWebhookConfiguration {
        metadata: ObjectMeta {
            name: Some(VALIDATING_WEBHOOK_NAME.to_owned()),
            ..ObjectMeta::default()
        },
        webhooks: Some(vec![ValidatingWebhook {
            name: VALIDATING_WEBHOOK_NAME.to_owned(),
            admission_review_versions: vec!["v1".to_owned()],
            client_config: webhook_client_config(options, VALIDATE_COMPONENTS_PATH),
            failure_policy: Some(FailurePolicy::default().to_string()),
            side_effects: SideEffects::default().to_string(),
            rules: Some(vec![component_rule(&operations)]),
            ..ValidatingWebhook::default()
        }]),
    }
}

/// Returns the client config that is used in the component admission webhooks.
///
/// It is used to contact the correct HTTP endpoint, which is determined from the given parameters.
fn webhook_client_config(options: &WebhookClientOptions, http_path: &str) -> WebhookClientConfig {
    WebhookClientConfig {
        service: Some(ServiceReference {
            name: options.service_name.clone(),
            namespace: options.service_namespace.clone(),
            path: Some(http_path.to_owned()),
            port: Some(options.https_port.into()),
        }),
        // Here, ByteString takes care of encoding the provided content as base64.
        ca_bundle: Some(options.ca_bundle.clone()),
        url: None,
    }
}

/// Returns the rule matching component resources for the given operations.
fn component_rule(operations: &[&str]) -> RuleWithOperations {
    RuleWithOperations {
        api_groups: Some(vec![Component::group(&()).into_owned()]),
        api_versions: Some(vec![Component::version(&()).into_owned()]),
        operations: Some(
            operations
                .iter()
                .map(|operation| (*operation).to_owned())
                .collect(),
        ),
        resources: Some(vec![Component::plural(&()).into_owned()]),
        scope: Some("Namespaced".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> WebhookClientOptions {
        WebhookClientOptions {
            service_name: "appforge-admission".to_owned(),
            service_namespace: "appforge-system".to_owned(),
            https_port: 8443,
            ca_bundle: ByteString(b"pem goes here".to_vec()),
        }
    }

    #[test]
    fn mutating_configuration() {
        let config = component_mutating_webhook_configuration(&options());

        assert_eq!(config.metadata.name.as_deref(), Some("mcomponent.appforge.io"));

        let webhook = &config.webhooks.unwrap()[0];
        assert_eq!(webhook.name, "mcomponent.appforge.io");
        assert_eq!(webhook.admission_review_versions, vec!["v1"]);
        assert_eq!(webhook.side_effects, "None");
        assert_eq!(webhook.failure_policy.as_deref(), Some("Fail"));

        let service = webhook.client_config.service.as_ref().unwrap();
        assert_eq!(service.name, "appforge-admission");
        assert_eq!(service.namespace, "appforge-system");
        assert_eq!(service.path.as_deref(), Some("/mutate/components"));
        assert_eq!(service.port, Some(8443));

        let rule = &webhook.rules.as_ref().unwrap()[0];
        assert_eq!(rule.api_groups.as_deref(), Some(["appforge.io".to_owned()].as_slice()));
        assert_eq!(rule.api_versions.as_deref(), Some(["v1alpha1".to_owned()].as_slice()));
        assert_eq!(rule.resources.as_deref(), Some(["components".to_owned()].as_slice()));
        assert_eq!(
            rule.operations.as_deref(),
            Some(["CREATE".to_owned(), "UPDATE".to_owned()].as_slice())
        );
    }

    #[test]
    fn validating_configuration() {
        let config = component_validating_webhook_configuration(&options(), false);

        assert_eq!(config.metadata.name.as_deref(), Some("vcomponent.appforge.io"));

        let webhook = &config.webhooks.unwrap()[0];
        assert_eq!(webhook.name, "vcomponent.appforge.io");

        let service = webhook.client_config.service.as_ref().unwrap();
        assert_eq!(service.path.as_deref(), Some("/validate/components"));

        let rule = &webhook.rules.as_ref().unwrap()[0];
        assert_eq!(
            rule.operations.as_deref(),
            Some(["CREATE".to_owned(), "UPDATE".to_owned()].as_slice())
        );
    }

    #[test]
    fn validating_configuration_with_delete() {
        let config = component_validating_webhook_configuration(&options(), true);

        let webhook = &config.webhooks.unwrap()[0];
        let rule = &webhook.rules.as_ref().unwrap()[0];
        assert_eq!(
            rule.operations.as_deref(),
            Some(["CREATE".to_owned(), "UPDATE".to_owned(), "DELETE".to_owned()].as_slice())
        );
    }
}
