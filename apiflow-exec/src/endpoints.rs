use std::collections::BTreeMap;

use apiflow_core::{Endpoint, ResolvedStep, Step};

use crate::executor::ConfigurationError;

/// Saved request definitions that steps may reference by id.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: BTreeMap<String, Endpoint>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_endpoints(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        let mut registry = Self::new();
        for e in endpoints {
            registry.insert(e);
        }
        registry
    }

    /// Adds or replaces an endpoint, returning the one it replaced.
    pub fn insert(&mut self, endpoint: Endpoint) -> Option<Endpoint> {
        self.endpoints.insert(endpoint.id.clone(), endpoint)
    }

    pub fn get(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.get(id)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn resolve(&self, step: &Step) -> Result<ResolvedStep, ConfigurationError> {
        let endpoint = match &step.endpoint {
            Some(id) => Some(self.get(id).ok_or_else(|| ConfigurationError::UnknownEndpoint {
                step_id: step.id.clone(),
                endpoint: id.clone(),
            })?),
            None => None,
        };
        step.resolve(endpoint)
            .map_err(|error| ConfigurationError::InvalidStep {
                step_id: step.id.clone(),
                error,
            })
    }

    pub fn resolve_steps(&self, steps: &[Step]) -> Result<Vec<ResolvedStep>, ConfigurationError> {
        steps.iter().map(|s| self.resolve(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use apiflow_core::HttpMethod;

    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint {
            id: "list-orders".to_string(),
            name: Some("List orders".to_string()),
            method: "get".to_string(),
            url: "{{env.base}}/orders".to_string(),
            headers: BTreeMap::from([
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Trace".to_string(), "endpoint".to_string()),
            ]),
            body: None,
        }
    }

    fn step(endpoint: Option<&str>) -> Step {
        Step {
            id: "orders".to_string(),
            name: "Orders".to_string(),
            endpoint: endpoint.map(str::to_string),
            method: None,
            url: None,
            headers: BTreeMap::from([("x-trace".to_string(), "step".to_string())]),
            body: None,
            timeout_ms: Some(1000),
            expected_status: None,
        }
    }

    #[test]
    fn step_fields_override_endpoint_fields() {
        let registry = EndpointRegistry::from_endpoints([endpoint()]);
        let resolved = registry.resolve(&step(Some("list-orders"))).unwrap();
        assert_eq!(resolved.method, HttpMethod::Get);
        assert_eq!(resolved.url, "{{env.base}}/orders");
        assert_eq!(resolved.headers.len(), 2);
        assert_eq!(resolved.headers["x-trace"], "step");
        assert_eq!(resolved.timeout_ms, Some(1000));
    }

    #[test]
    fn unknown_endpoint_is_a_configuration_error() {
        let err = EndpointRegistry::new().resolve(&step(Some("nope"))).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownEndpoint { .. }));
    }
}
