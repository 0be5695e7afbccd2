//! Routing session: the loaded graph, its table and the configuration.

use std::path::Path;
use tracing::{info, instrument, warn};

use qxmap_ir::Circuit;

use crate::config::EngineConfig;
use crate::error::{RouteError, RouteResult};
use crate::expand::expand;
use crate::fixed5::{FixedRouter, MethodMatrix, transform_fixed5};
use crate::graph::{Architecture, ConnectivityGraph};
use crate::placement::{PlacementOutcome, search_placement};
use crate::router::RoutedCircuit;
use crate::table::RoutingTable;

/// Owns the connectivity graph and routing table of one session.
///
/// The table is only valid for the graph it was built from, so replacing
/// the graph drops it.
#[derive(Debug, Clone, Default)]
pub struct RoutingEngine {
    config: EngineConfig,
    graph: Option<ConnectivityGraph>,
    table: Option<RoutingTable>,
}

impl RoutingEngine {
    /// Create an empty session.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            graph: None,
            table: None,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The loaded graph.
    pub fn graph(&self) -> Option<&ConnectivityGraph> {
        self.graph.as_ref()
    }

    /// The built table.
    pub fn table(&self) -> Option<&RoutingTable> {
        self.table.as_ref()
    }

    /// Load an architecture file. A file that fails to parse leaves the
    /// session untouched.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load(&mut self, path: impl AsRef<Path>) -> RouteResult<&ConnectivityGraph> {
        let graph = ConnectivityGraph::load(path)?;
        Ok(self.install(graph))
    }

    /// Load a built-in architecture by name.
    pub fn load_architecture(&mut self, name: &str) -> RouteResult<&ConnectivityGraph> {
        let arch = Architecture::by_name(name)?;
        info!("Loading built-in architecture {}", arch.name);
        Ok(self.install(arch.graph()))
    }

    /// Use `graph` for this session.
    pub fn set_graph(&mut self, graph: ConnectivityGraph) -> &ConnectivityGraph {
        self.install(graph)
    }

    fn install(&mut self, graph: ConnectivityGraph) -> &ConnectivityGraph {
        if self.table.take().is_some() {
            info!("Graph replaced; routing table dropped");
        }
        self.graph.insert(graph)
    }

    /// Build the routing table for the loaded graph.
    #[instrument(skip(self))]
    pub fn build(&mut self) -> RouteResult<&RoutingTable> {
        let graph = self.graph.as_ref().ok_or(RouteError::GraphNotLoaded)?;
        let table = RoutingTable::build_with_limit(graph, self.config.max_relay_moves)?;
        Ok(self.table.insert(table))
    }

    /// The built table, building it first if needed.
    pub fn ensure_table(&mut self) -> RouteResult<&RoutingTable> {
        if self.table.is_none() {
            self.build()?;
        }
        self.table.as_ref().ok_or(RouteError::TableNotBuilt)
    }

    /// Install a table from a cache file.
    ///
    /// With no graph loaded the cached graph is adopted; otherwise the cache
    /// must describe the loaded graph.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn read_cache(&mut self, path: impl AsRef<Path>) -> RouteResult<&RoutingTable> {
        let table = RoutingTable::read_cache(path)?;
        if let Some(graph) = &self.graph {
            if graph.size() != table.size() {
                return Err(RouteError::TableMismatch {
                    table: table.size(),
                    graph: graph.size(),
                });
            }
            if graph != table.graph() {
                return Err(RouteError::InvalidGraph(
                    "cached table was built for a different adjacency".into(),
                ));
            }
        } else {
            self.graph = Some(table.graph().clone());
        }
        Ok(self.table.insert(table))
    }

    /// Write the built table to a cache file.
    pub fn write_cache(&self, path: impl AsRef<Path>) -> RouteResult<()> {
        self.table
            .as_ref()
            .ok_or(RouteError::TableNotBuilt)?
            .write_cache(path)
    }

    /// Forget the graph and the table.
    pub fn clear(&mut self) {
        self.graph = None;
        self.table = None;
    }

    /// Route `circuit` with the built table.
    pub fn expand(&self, circuit: &Circuit) -> RouteResult<RoutedCircuit> {
        let table = self.table.as_ref().ok_or(RouteError::TableNotBuilt)?;
        expand(circuit, table)
    }

    /// Search a layout for `circuit` over the built table.
    pub fn search_placement(&self, circuit: &Circuit) -> RouteResult<PlacementOutcome> {
        let table = self.table.as_ref().ok_or(RouteError::TableNotBuilt)?;
        search_placement(circuit, table, &self.config)
    }

    /// Rewrite `circuit` with the fixed transform of a 5-qubit device, in
    /// the configured variant. Needs no graph or table.
    pub fn fixed5(&self, circuit: &Circuit, device: &str) -> RouteResult<RoutedCircuit> {
        let methods = MethodMatrix::by_name(device)?;
        transform_fixed5(circuit, &methods, self.config.fixed5_variant)
    }

    /// Search a layout for `circuit` over the fixed transform of a 5-qubit
    /// device.
    pub fn fixed5_placement(&self, circuit: &Circuit, device: &str) -> RouteResult<PlacementOutcome> {
        let router = FixedRouter::new(MethodMatrix::by_name(device)?, self.config.fixed5_variant);
        let outcome = search_placement(circuit, &router, &self.config)?;
        if let PlacementOutcome::Skipped { reason, .. } = &outcome {
            warn!("Fixed transform on {device}: {reason}");
        }
        Ok(outcome)
    }
}
