mod catalog;
mod model;
mod provider;
mod runner;

pub use catalog::{Catalog, DependencyKind, DependencyLink, ServiceLink, ServiceRecord};
pub use model::{
    DEFAULT_HOPS, DEFAULT_NODE_LIMIT, EdgeStrength, EnvPresence, EnvScope, FocusKind, FocusRef,
    GraphEdge, GraphNode, GraphQuery, GraphResponse, MAX_HOPS, MIN_HOPS, NodeKind, QueryMeta,
    dependency_node_id, runtime_node_id, service_node_id,
};
pub use provider::{CatalogProvider, GraphDataProvider, QueryError};
pub use runner::{CompletedQuery, LatestRequest, QueryOutcome, QueryRunner};
