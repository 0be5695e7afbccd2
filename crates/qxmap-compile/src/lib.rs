//! qxmap routing engine
//!
//! Rewrites circuits written for full qubit connectivity so that every
//! CNOT runs between qubits the device actually couples, in the direction
//! the device supports.
//!
//! # Overview
//!
//! A device is a [`ConnectivityGraph`]: `adjacent(v, w)` holds when
//! CNOT(v, w) is native. For a CNOT on any other pair the engine moves the
//! control and target together with relay moves ([`Move`]), applies the
//! native CNOT and undoes the moves. The cheapest such [`RoutingPath`] for
//! every ordered pair is precomputed into a [`RoutingTable`].
//!
//! # Architecture
//!
//! ```text
//! ConnectivityGraph ──► PathEnumerator ──► RoutingTable (cached)
//!                                                │
//!                             Circuit ──► expand ◄┘
//!                                │
//!              search_placement ─┴─► Layout + routed circuit
//!
//! MethodMatrix (qx2/qx4) ──► transform_fixed5
//! ```
//!
//! Both the table and the fixed 5-qubit transform implement [`Router`], so
//! placement can search over either.
//!
//! # Example
//!
//! ```rust
//! use qxmap_compile::{EngineConfig, RoutingEngine};
//! use qxmap_ir::{Circuit, QubitId};
//!
//! let mut engine = RoutingEngine::new(EngineConfig::default());
//! engine.load_architecture("qx4").unwrap();
//! engine.build().unwrap();
//!
//! let mut circuit = Circuit::with_lines("bell", 2);
//! circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let outcome = engine.search_placement(&circuit).unwrap();
//! let placement = outcome.placement().unwrap();
//! println!("{} -> {} gates", placement.layout, placement.routed.gate_count);
//! ```
//!
//! # Move costs
//!
//! | Move | Cost |
//! |------|------|
//! | `cab`, `cba`, `tab`, `tba` and their inverses | 6 |
//! | `flip` | 4 |
//! | `nop` | 0 |
//! | `cnot3` | 3, nested relays grow the window |

pub mod cleanup;
pub mod config;
pub mod engine;
pub mod enumerate;
pub mod error;
pub mod expand;
pub mod fixed5;
pub mod graph;
pub mod layout;
pub mod path;
pub mod placement;
pub mod primitive;
pub mod router;
pub mod table;

pub use cleanup::remove_duplicates;
pub use config::EngineConfig;
pub use engine::RoutingEngine;
pub use enumerate::{PathEnumerator, PathVisitor, enumerate_paths};
pub use error::{RouteError, RouteResult};
pub use expand::expand;
pub use fixed5::{FixedRouter, MethodMatrix, RelayMethod, Variant, transform_fixed5};
pub use graph::{Architecture, ConnectivityGraph};
pub use layout::{Histogram, Layout};
pub use path::RoutingPath;
pub use placement::{Placement, PlacementOutcome, Strategy, search_placement};
pub use primitive::Move;
pub use router::{RoutedCircuit, Router};
pub use table::{RoutingEntry, RoutingTable};
