use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::model::{EdgeStrength, EnvPresence, EnvScope, FocusKind, FocusRef};

const BUNDLED_CATALOG: &str = include_str!("../../demos/catalog.json");

/// The organization-wide entity list the blast-radius queries and the search index are built from.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub organization_id: String,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub environments: EnvPresence,
    #[serde(default)]
    pub prod_interface_count: u32,
    #[serde(default)]
    pub total_interface_count: u32,
    #[serde(default)]
    pub calls: Vec<ServiceLink>,
    #[serde(default)]
    pub dependencies: Vec<DependencyLink>,
}

impl ServiceRecord {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain
            .as_deref()
            .map(str::trim)
            .filter(|domain| !domain.is_empty())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLink {
    pub service_id: String,
    #[serde(default)]
    pub strength: EdgeStrength,
    #[serde(default)]
    pub env_scope: EnvScope,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Library,
    Runtime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyLink {
    pub name: String,
    #[serde(default)]
    pub kind: DependencyKind,
    #[serde(default)]
    pub strength: EdgeStrength,
    #[serde(default)]
    pub env_scope: EnvScope,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    0.5
}

impl Catalog {
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut catalog: Catalog = serde_json::from_str(raw).context("invalid catalog JSON")?;
        catalog.normalize()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to parse catalog {}", path.display()))
    }

    /// The demo organization shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG).context("bundled catalog is invalid")
    }

    pub fn service(&self, service_id: &str) -> Option<&ServiceRecord> {
        self.services.iter().find(|service| service.id == service_id)
    }

    /// Starting focus when none was requested: the service with the most production interfaces.
    pub fn default_focus(&self) -> Option<FocusRef> {
        self.services
            .iter()
            .max_by(|a, b| {
                a.prod_interface_count
                    .cmp(&b.prod_interface_count)
                    .then_with(|| b.id.cmp(&a.id))
            })
            .map(|service| {
                FocusRef::new(FocusKind::Service, service.id.clone(), service.display_name())
            })
    }

    fn normalize(&mut self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.services.len());
        for service in &mut self.services {
            service.id = service.id.trim().to_owned();
            if service.id.is_empty() {
                return Err(anyhow!("catalog contains a service without an id"));
            }
            if !seen.insert(service.id.clone()) {
                return Err(anyhow!("duplicate service id `{}` in catalog", service.id));
            }

            for link in &mut service.calls {
                link.weight = sanitize_weight(link.weight);
            }
            for link in &mut service.dependencies {
                link.name = link.name.trim().to_owned();
                link.weight = sanitize_weight(link.weight);
            }
            service.dependencies.retain(|link| !link.name.is_empty());
            service.total_interface_count = service
                .total_interface_count
                .max(service.prod_interface_count);
        }
        Ok(())
    }
}

fn sanitize_weight(weight: f32) -> f32 {
    if weight.is_finite() {
        weight.clamp(0.0, 1.0)
    } else {
        default_weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_catalog_with_defaults() {
        let catalog = Catalog::from_json(
            r#"{
                "organizationId": "acme",
                "services": [
                    { "id": " checkout ", "calls": [{ "serviceId": "payments", "weight": 4.0 }] },
                    { "id": "payments",
                      "dependencies": [{ "name": "postgres", "kind": "runtime" }] }
                ]
            }"#,
        )
        .unwrap();

        let checkout = catalog.service("checkout").unwrap();
        assert_eq!(checkout.display_name(), "checkout");
        assert_eq!(checkout.calls[0].weight, 1.0);
        assert_eq!(checkout.calls[0].strength, EdgeStrength::Declared);

        let payments = catalog.service("payments").unwrap();
        assert_eq!(payments.dependencies[0].kind, DependencyKind::Runtime);
        assert_eq!(payments.dependencies[0].weight, 0.5);
    }

    #[test]
    fn rejects_duplicate_service_ids() {
        let error = Catalog::from_json(
            r#"{ "organizationId": "acme", "services": [{ "id": "a" }, { "id": "a" }] }"#,
        )
        .unwrap_err();
        assert!(format!("{error:#}").contains("duplicate service id"));
    }

    #[test]
    fn blank_domain_is_treated_as_absent() {
        let service = ServiceRecord {
            id: "a".into(),
            domain: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(service.domain(), None);
    }
}
