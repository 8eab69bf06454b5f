use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::util::short_name;

pub const MIN_HOPS: u8 = 1;
pub const MAX_HOPS: u8 = 5;
pub const DEFAULT_HOPS: u8 = 3;
pub const DEFAULT_NODE_LIMIT: usize = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Software,
    Dependency,
    Runtime,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Dependency => "dependency",
            Self::Runtime => "runtime",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStrength {
    Confirmed,
    #[default]
    Declared,
}

impl EdgeStrength {
    pub fn label(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Declared => "declared",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvScope {
    #[default]
    All,
    Dev,
    Staging,
    Prod,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvPresence {
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub staging: bool,
    #[serde(default)]
    pub prod: bool,
}

impl EnvPresence {
    pub const ALL: Self = Self {
        dev: true,
        staging: true,
        prod: true,
    };

    pub fn summary(self) -> String {
        let flags = [("dev", self.dev), ("staging", self.staging), ("prod", self.prod)];
        let present = flags
            .iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>();
        if present.is_empty() {
            "none".to_owned()
        } else {
            present.join(", ")
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub node_id: String,
    pub display_name: String,
    pub kind: NodeKind,
    pub owner_id: Option<String>,
    pub environments: EnvPresence,
    pub prod_interface_count: u32,
    pub total_interface_count: u32,
    pub dependency_degree: u32,
    /// Graph distance from the focus; `None` when the provider could not resolve it.
    pub hop_distance: Option<i32>,
    pub impact_score: f32,
    pub confidence_score: f32,
    pub completeness_score: f32,
    pub missing_fields: Vec<String>,
    pub color_key: Option<String>,
}

impl GraphNode {
    /// A bare node with neutral scores, mostly useful for fixtures.
    pub fn new(node_id: impl Into<String>, kind: NodeKind, hop_distance: Option<i32>) -> Self {
        let node_id = node_id.into();
        Self {
            display_name: short_name(&node_id).to_owned(),
            node_id,
            kind,
            owner_id: None,
            environments: EnvPresence::default(),
            prod_interface_count: 0,
            total_interface_count: 0,
            dependency_degree: 0,
            hop_distance,
            impact_score: 0.0,
            confidence_score: 1.0,
            completeness_score: 1.0,
            missing_fields: Vec::new(),
            color_key: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from_id: String,
    pub to_id: String,
    pub strength: EdgeStrength,
    pub env_scope: EnvScope,
    pub weight: f32,
}

impl GraphEdge {
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        strength: EdgeStrength,
        weight: f32,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            strength,
            env_scope: EnvScope::All,
            weight,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from_id == node_id || self.to_id == node_id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMeta {
    pub total_services_in_org: usize,
    pub subgraph_size: usize,
    pub compute_time_ms: f64,
    pub node_limit: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphResponse {
    pub focus_node_id: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub query_hash: String,
    pub truncated: bool,
    pub meta: QueryMeta,
}

impl GraphResponse {
    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.node_id == node_id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusKind {
    Service,
    Domain,
    Dependency,
}

impl FocusKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Domain => "domain",
            Self::Dependency => "dependency",
        }
    }
}

impl fmt::Display for FocusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FocusKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "service" | "svc" => Ok(Self::Service),
            "domain" => Ok(Self::Domain),
            "dependency" | "dep" => Ok(Self::Dependency),
            other => Err(format!("unknown focus kind `{other}`")),
        }
    }
}

/// The entity currently driving the blast-radius query.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusRef {
    pub kind: FocusKind,
    pub id: String,
    pub display_name: String,
}

impl FocusRef {
    pub fn new(kind: FocusKind, id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// The focus that re-centers the blast radius on `node`.
    pub fn for_node(node: &GraphNode) -> Self {
        let kind = match node.kind {
            NodeKind::Software => FocusKind::Service,
            NodeKind::Dependency | NodeKind::Runtime => FocusKind::Dependency,
        };
        Self::new(kind, short_name(&node.node_id), node.display_name.clone())
    }
}

/// Parses `kind:id`, e.g. `service:checkout` or `domain:payments`.
impl FromStr for FocusRef {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, id) = value
            .split_once(':')
            .ok_or_else(|| format!("expected `kind:id`, got `{value}`"))?;
        let kind = kind.parse::<FocusKind>()?;
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("missing id in `{value}`"));
        }
        Ok(Self::new(kind, id, id))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQuery {
    pub organization_id: String,
    pub focus_kind: FocusKind,
    pub focus_id: String,
    pub hops: u8,
}

impl GraphQuery {
    pub fn new(organization_id: impl Into<String>, focus: &FocusRef, hops: u8) -> Self {
        Self {
            organization_id: organization_id.into(),
            focus_kind: focus.kind,
            focus_id: focus.id.clone(),
            hops,
        }
    }
}

pub fn service_node_id(service_id: &str) -> String {
    format!("svc:{service_id}")
}

pub fn dependency_node_id(name: &str) -> String {
    format!("dep:{name}")
}

pub fn runtime_node_id(name: &str) -> String {
    format!("rt:{name}")
}
