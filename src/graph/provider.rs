use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::time::Instant;

use log::{info, warn};
use thiserror::Error;

use super::catalog::{Catalog, DependencyKind, ServiceRecord};
use super::model::{
    DEFAULT_NODE_LIMIT, EdgeStrength, EnvPresence, FocusKind, GraphEdge, GraphNode, GraphQuery,
    GraphResponse, MAX_HOPS, MIN_HOPS, NodeKind, QueryMeta, dependency_node_id, runtime_node_id,
    service_node_id,
};

const COMPLETENESS_FIELDS: usize = 5;
const PROD_INTERFACE_IMPACT: f32 = 0.5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("hop depth {0} is outside {MIN_HOPS}..={MAX_HOPS}")]
    InvalidHops(u8),
    #[error("unknown {kind} `{id}`")]
    UnknownFocus { kind: FocusKind, id: String },
    #[error("organization `{0}` has no services")]
    EmptyCatalog(String),
    #[error("organization `{requested}` is not available (catalog serves `{available}`)")]
    UnknownOrganization { requested: String, available: String },
}

/// Source of blast-radius subgraphs. Implementations may be slow; callers run them off the UI
/// thread.
pub trait GraphDataProvider: Send + Sync {
    fn query(&self, query: &GraphQuery) -> Result<GraphResponse, QueryError>;

    fn catalog(&self) -> &Catalog;
}

struct NodeSeed {
    node_id: String,
    display_name: String,
    kind: NodeKind,
    owner_id: Option<String>,
    domain: Option<String>,
    environments: EnvPresence,
    prod_interface_count: u32,
    total_interface_count: u32,
    missing_fields: Vec<String>,
    completeness: f32,
}

pub struct CatalogProvider {
    catalog: Catalog,
    node_limit: usize,
    nodes: Vec<NodeSeed>,
    index_by_id: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    edge_endpoints: Vec<(usize, usize)>,
    incident: Vec<Vec<usize>>,
}

impl CatalogProvider {
    pub fn new(catalog: Catalog, node_limit: usize) -> Self {
        let mut provider = Self {
            catalog: Catalog::default(),
            node_limit: node_limit.clamp(1, DEFAULT_NODE_LIMIT),
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            edges: Vec::new(),
            edge_endpoints: Vec::new(),
            incident: Vec::new(),
        };
        provider.build_universe(&catalog);
        provider.catalog = catalog;
        provider
    }

    fn build_universe(&mut self, catalog: &Catalog) {
        for service in &catalog.services {
            let seed = service_seed(service);
            self.insert_node(seed);
        }

        let mut edge_by_pair: HashMap<(usize, usize), usize> = HashMap::new();
        for service in &catalog.services {
            let Some(&source) = self.index_by_id.get(&service_node_id(&service.id)) else {
                continue;
            };

            for link in &service.calls {
                let Some(&target) = self.index_by_id.get(&service_node_id(&link.service_id))
                else {
                    warn!(
                        "skipping call {} -> {}: target service is not in the catalog",
                        service.id, link.service_id
                    );
                    continue;
                };
                let edge = GraphEdge {
                    from_id: self.nodes[source].node_id.clone(),
                    to_id: self.nodes[target].node_id.clone(),
                    strength: link.strength,
                    env_scope: link.env_scope,
                    weight: link.weight,
                };
                self.insert_edge(&mut edge_by_pair, source, target, edge);
            }

            for link in &service.dependencies {
                let (node_id, kind) = match link.kind {
                    DependencyKind::Library => {
                        (dependency_node_id(&link.name), NodeKind::Dependency)
                    }
                    DependencyKind::Runtime => (runtime_node_id(&link.name), NodeKind::Runtime),
                };
                let target = match self.index_by_id.get(&node_id) {
                    Some(&index) => index,
                    None => self.insert_node(NodeSeed {
                        node_id: node_id.clone(),
                        display_name: link.name.clone(),
                        kind,
                        owner_id: None,
                        domain: None,
                        environments: EnvPresence::default(),
                        prod_interface_count: 0,
                        total_interface_count: 0,
                        missing_fields: Vec::new(),
                        completeness: 1.0,
                    }),
                };

                let env = service.environments;
                let seed = &mut self.nodes[target];
                seed.environments.dev |= env.dev;
                seed.environments.staging |= env.staging;
                seed.environments.prod |= env.prod;

                let edge = GraphEdge {
                    from_id: self.nodes[source].node_id.clone(),
                    to_id: node_id,
                    strength: link.strength,
                    env_scope: link.env_scope,
                    weight: link.weight,
                };
                self.insert_edge(&mut edge_by_pair, source, target, edge);
            }
        }
    }

    fn insert_node(&mut self, seed: NodeSeed) -> usize {
        let index = self.nodes.len();
        self.index_by_id.insert(seed.node_id.clone(), index);
        self.nodes.push(seed);
        self.incident.push(Vec::new());
        index
    }

    fn insert_edge(
        &mut self,
        edge_by_pair: &mut HashMap<(usize, usize), usize>,
        source: usize,
        target: usize,
        edge: GraphEdge,
    ) {
        if source == target {
            return;
        }

        if let Some(&existing) = edge_by_pair.get(&(source, target)) {
            let current = &mut self.edges[existing];
            current.weight = current.weight.max(edge.weight);
            if edge.strength == EdgeStrength::Confirmed {
                current.strength = EdgeStrength::Confirmed;
            }
            return;
        }

        let index = self.edges.len();
        edge_by_pair.insert((source, target), index);
        self.edges.push(edge);
        self.edge_endpoints.push((source, target));
        self.incident[source].push(index);
        self.incident[target].push(index);
    }

    /// Returns the focus node and the initial hop distance of every seed.
    fn resolve_seeds(&self, query: &GraphQuery) -> Result<(usize, Vec<(usize, u32)>), QueryError> {
        let unknown = || QueryError::UnknownFocus {
            kind: query.focus_kind,
            id: query.focus_id.clone(),
        };
        let focus_id = query.focus_id.trim();

        match query.focus_kind {
            FocusKind::Service => {
                let index = *self
                    .index_by_id
                    .get(&service_node_id(focus_id))
                    .ok_or_else(unknown)?;
                Ok((index, vec![(index, 0)]))
            }
            FocusKind::Domain => {
                let mut members = self
                    .catalog
                    .services
                    .iter()
                    .filter(|service| {
                        service
                            .domain()
                            .is_some_and(|domain| domain.eq_ignore_ascii_case(focus_id))
                    })
                    .filter_map(|service| {
                        self.index_by_id.get(&service_node_id(&service.id)).copied()
                    })
                    .collect::<Vec<_>>();
                members.sort_by(|a, b| self.nodes[*a].node_id.cmp(&self.nodes[*b].node_id));

                let (&focus, rest) = members.split_first().ok_or_else(unknown)?;
                let mut seeds = vec![(focus, 0)];
                seeds.extend(rest.iter().map(|&index| (index, 1)));
                Ok((focus, seeds))
            }
            FocusKind::Dependency => {
                let index = self
                    .index_by_id
                    .get(&dependency_node_id(focus_id))
                    .or_else(|| self.index_by_id.get(&runtime_node_id(focus_id)))
                    .copied()
                    .ok_or_else(unknown)?;
                Ok((index, vec![(index, 0)]))
            }
        }
    }

    fn hop_distances(&self, seeds: &[(usize, u32)], hops: u32) -> Vec<Option<u32>> {
        let mut distance = vec![None; self.nodes.len()];
        let mut queue = VecDeque::new();

        for &(index, hop) in seeds {
            if hop <= hops && distance[index].is_none() {
                distance[index] = Some(hop);
                queue.push_back(index);
            }
        }

        while let Some(current) = queue.pop_front() {
            let Some(current_distance) = distance[current] else {
                continue;
            };
            if current_distance >= hops {
                continue;
            }

            for &edge_index in &self.incident[current] {
                let (source, target) = self.edge_endpoints[edge_index];
                let next = if source == current { target } else { source };
                if distance[next].is_none() {
                    distance[next] = Some(current_distance + 1);
                    queue.push_back(next);
                }
            }
        }

        distance
    }

    fn confirmed_ratio(&self, index: usize) -> Option<f32> {
        let incident = &self.incident[index];
        if incident.is_empty() {
            return None;
        }
        let confirmed = incident
            .iter()
            .filter(|&&edge| self.edges[edge].strength == EdgeStrength::Confirmed)
            .count();
        Some(confirmed as f32 / incident.len() as f32)
    }
}

fn service_seed(service: &ServiceRecord) -> NodeSeed {
    let mut missing_fields = Vec::new();
    let blank = |value: &Option<String>| {
        value
            .as_deref()
            .is_none_or(|value| value.trim().is_empty())
    };

    if blank(&service.owner_id) {
        missing_fields.push("owner".to_owned());
    }
    if service.domain().is_none() {
        missing_fields.push("domain".to_owned());
    }
    if blank(&service.description) {
        missing_fields.push("description".to_owned());
    }
    if blank(&service.repository) {
        missing_fields.push("repository".to_owned());
    }
    if service.total_interface_count == 0 {
        missing_fields.push("interfaces".to_owned());
    }

    let completeness = 1.0 - (missing_fields.len() as f32 / COMPLETENESS_FIELDS as f32);
    NodeSeed {
        node_id: service_node_id(&service.id),
        display_name: service.display_name().to_owned(),
        kind: NodeKind::Software,
        owner_id: service
            .owner_id
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
            .map(str::to_owned),
        domain: service.domain().map(str::to_owned),
        environments: service.environments,
        prod_interface_count: service.prod_interface_count,
        total_interface_count: service.total_interface_count,
        missing_fields,
        completeness,
    }
}

impl GraphDataProvider for CatalogProvider {
    fn query(&self, query: &GraphQuery) -> Result<GraphResponse, QueryError> {
        let started = Instant::now();

        if !(MIN_HOPS..=MAX_HOPS).contains(&query.hops) {
            return Err(QueryError::InvalidHops(query.hops));
        }
        if !query.organization_id.is_empty()
            && query.organization_id != self.catalog.organization_id
        {
            return Err(QueryError::UnknownOrganization {
                requested: query.organization_id.clone(),
                available: self.catalog.organization_id.clone(),
            });
        }
        if self.catalog.services.is_empty() {
            return Err(QueryError::EmptyCatalog(self.catalog.organization_id.clone()));
        }

        let (focus_index, seeds) = self.resolve_seeds(query)?;
        let distance = self.hop_distances(&seeds, u32::from(query.hops));

        let mut reached = (0..self.nodes.len())
            .filter_map(|index| distance[index].map(|hop| (hop, index)))
            .collect::<Vec<_>>();
        reached.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| self.nodes[a.1].node_id.cmp(&self.nodes[b.1].node_id))
        });

        let subgraph_size = reached.len();
        let truncated = subgraph_size > self.node_limit;
        reached.truncate(self.node_limit);

        let mut kept = vec![false; self.nodes.len()];
        for &(_, index) in &reached {
            kept[index] = true;
        }

        let edge_indices = (0..self.edges.len())
            .filter(|&edge| {
                let (source, target) = self.edge_endpoints[edge];
                kept[source] && kept[target]
            })
            .collect::<Vec<_>>();

        let mut raw_impact = vec![0.0_f32; self.nodes.len()];
        for &edge in &edge_indices {
            let (_, target) = self.edge_endpoints[edge];
            raw_impact[target] += self.edges[edge].weight;
        }
        for &(_, index) in &reached {
            raw_impact[index] +=
                self.nodes[index].prod_interface_count as f32 * PROD_INTERFACE_IMPACT;
        }
        let max_impact = reached
            .iter()
            .map(|&(_, index)| raw_impact[index])
            .fold(0.0_f32, f32::max);

        let nodes = reached
            .iter()
            .map(|&(hop, index)| {
                let seed = &self.nodes[index];
                let impact_score = if max_impact > 0.0 {
                    (raw_impact[index] / max_impact * 100.0).clamp(0.0, 100.0)
                } else {
                    0.0
                };
                let confidence_score = match self.confirmed_ratio(index) {
                    Some(ratio) => (seed.completeness + ratio) * 0.5,
                    None => seed.completeness,
                };

                GraphNode {
                    node_id: seed.node_id.clone(),
                    display_name: seed.display_name.clone(),
                    kind: seed.kind,
                    owner_id: seed.owner_id.clone(),
                    environments: seed.environments,
                    prod_interface_count: seed.prod_interface_count,
                    total_interface_count: seed.total_interface_count,
                    dependency_degree: self.incident[index].len() as u32,
                    hop_distance: i32::try_from(hop).ok(),
                    impact_score,
                    confidence_score: confidence_score.clamp(0.0, 1.0),
                    completeness_score: seed.completeness,
                    missing_fields: seed.missing_fields.clone(),
                    color_key: seed.owner_id.clone().or_else(|| seed.domain.clone()),
                }
            })
            .collect::<Vec<_>>();

        let edges = edge_indices
            .iter()
            .map(|&edge| self.edges[edge].clone())
            .collect::<Vec<_>>();

        let focus_node_id = self.nodes[focus_index].node_id.clone();
        let query_hash = response_hash(query, &focus_node_id, &nodes, &edges);
        let compute_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        if truncated {
            warn!(
                "blast radius of {} {} exceeds the node limit: {subgraph_size} > {}",
                query.focus_kind, query.focus_id, self.node_limit
            );
        }
        info!(
            "query {} {} hops={} -> {} nodes, {} edges in {compute_time_ms:.2} ms",
            query.focus_kind,
            query.focus_id,
            query.hops,
            nodes.len(),
            edges.len()
        );

        Ok(GraphResponse {
            focus_node_id,
            nodes,
            edges,
            query_hash,
            truncated,
            meta: QueryMeta {
                total_services_in_org: self.catalog.services.len(),
                subgraph_size,
                compute_time_ms,
                node_limit: self.node_limit,
            },
        })
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

fn response_hash(
    query: &GraphQuery,
    focus_node_id: &str,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
) -> String {
    let mut hasher = DefaultHasher::new();
    query.focus_kind.hash(&mut hasher);
    query.focus_id.hash(&mut hasher);
    query.hops.hash(&mut hasher);
    focus_node_id.hash(&mut hasher);
    for node in nodes {
        node.node_id.hash(&mut hasher);
        node.hop_distance.hash(&mut hasher);
    }
    for edge in edges {
        edge.from_id.hash(&mut hasher);
        edge.to_id.hash(&mut hasher);
        edge.strength.hash(&mut hasher);
        edge.weight.to_bits().hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}
