//! # godepgraph
//!
//! Render the transitive import graph of Go packages as Graphviz DOT.
//!
//! Starting from one or more root import paths, godepgraph discovers every
//! package they transitively import, deduplicates nodes, classifies each
//! package by origin (root, standard library, cgo, external) and emits a
//! directed-graph description suitable for `dot`.
//!
//! Resolution is pluggable: the [`resolver::PackageResolver`] trait is the
//! seam between traversal and the filesystem, with
//! [`resolver::GoSourceResolver`] providing GOPATH-mode lookup over real
//! Go source trees.

pub mod core;
pub mod formatters;
pub mod resolver;

pub use crate::core::{Config, GraphBuilder, Package, PackageGraph};
pub use formatters::DotFormatter;
pub use resolver::{GoSourceResolver, PackageResolver};
