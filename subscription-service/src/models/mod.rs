//! Subscription request model and filter construction.

use serde::Deserialize;

/// Request to create a push subscription restricted to FHIR resource types.
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    /// Subscription identifier.
    pub name: String,
    /// Push target URL the subscription delivers to.
    pub endpoint: String,
    /// Resource types the subscription should receive, in order.
    #[serde(rename = "fhir-resources")]
    pub fhir_resources: Vec<String>,
}

/// Build the attribute filter expression for the given resource types.
///
/// Clauses are joined with `" OR "` in input order. An empty list yields an
/// empty filter, which leaves the subscription unfiltered.
pub fn resource_filter(resources: &[String]) -> String {
    resources
        .iter()
        .map(|resource| format!("attributes.resourceType={}", resource))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn joins_clauses_in_input_order() {
        assert_eq!(
            resource_filter(&resources(&["Patient", "Observation"])),
            "attributes.resourceType=Patient OR attributes.resourceType=Observation"
        );
    }

    #[test]
    fn single_resource_has_no_joiner() {
        assert_eq!(
            resource_filter(&resources(&["Patient"])),
            "attributes.resourceType=Patient"
        );
    }

    #[test]
    fn empty_list_yields_empty_filter() {
        assert_eq!(resource_filter(&[]), "");
    }

    #[test]
    fn request_accepts_hyphenated_resource_key() {
        let request: CreateSubscriptionRequest = serde_json::from_str(
            r#"{"name":"new-patients","endpoint":"https://example.com/hook","fhir-resources":["Patient"]}"#,
        )
        .unwrap();

        assert_eq!(request.name, "new-patients");
        assert_eq!(request.endpoint, "https://example.com/hook");
        assert_eq!(request.fhir_resources, vec!["Patient".to_string()]);
    }

    #[test]
    fn request_without_resources_is_rejected() {
        let result: Result<CreateSubscriptionRequest, _> = serde_json::from_str(
            r#"{"name":"new-patients","endpoint":"https://example.com/hook"}"#,
        );
        assert!(result.is_err());
    }
}
