//! Graphviz DOT serialization of a built package graph.

use anyhow::Result;
use std::collections::HashMap;
use std::fmt::Write;

use crate::core::{is_ignored, Config, Package, PackageGraph};

/// Stable small integers for node references, assigned lazily on first
/// reference during a single render pass and never reused.
#[derive(Debug, Default)]
struct NodeIds {
    ids: HashMap<String, usize>,
    next: usize,
}

impl NodeIds {
    fn get(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.next;
        self.next += 1;
        self.ids.insert(name.to_string(), id);
        id
    }
}

/// Deterministic DOT output: packages in sorted canonical order, ignore
/// policy re-applied per node (canonicalization can make a path newly match
/// a rule), four-way fill color classification.
pub struct DotFormatter<'a> {
    config: &'a Config,
}

impl<'a> DotFormatter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn format(&self, graph: &PackageGraph) -> Result<String> {
        let mut ids = NodeIds::default();
        let mut out = String::with_capacity(4096);

        writeln!(out, "digraph godep {{")?;
        if self.config.horizontal {
            writeln!(out, "rankdir=\"LR\"")?;
        }

        for (name, pkg) in graph.iter() {
            if is_ignored(pkg, self.config) {
                continue;
            }
            let pkg_id = ids.get(name);

            writeln!(
                out,
                "_{} [label=\"{}\" style=\"filled\" color=\"{}\"];",
                pkg_id,
                escape_label(name),
                self.color_for(pkg)
            )?;

            // Stdlib imports were never traversed unless delved into, so the
            // rendered graph truncates at the same depth. This consults the
            // delve flag only, matching the builder.
            if pkg.is_stdlib && !self.config.delve_stdlib {
                continue;
            }

            for imp in pkg.effective_imports(self.config.include_tests) {
                // Never built (recursively ignored) or unvendored away from
                // its raw name: no edge, no error.
                let Some(target) = graph.get(&imp) else {
                    continue;
                };
                if is_ignored(target, self.config) {
                    continue;
                }
                let imp_id = ids.get(&imp);
                writeln!(out, "_{} -> _{};", pkg_id, imp_id)?;
            }
        }

        writeln!(out, "}}")?;
        Ok(out)
    }

    /// Exactly one color applies, first match wins: root, stdlib, cgo,
    /// default. Root membership is tested on the raw import path.
    fn color_for(&self, pkg: &Package) -> &'static str {
        if self.config.is_root(&pkg.import_path) {
            "hotpink1"
        } else if pkg.is_stdlib {
            "palegreen"
        } else if pkg.has_cgo {
            "darkgoldenrod1"
        } else {
            "paleturquoise"
        }
    }
}

fn escape_label(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"")
}
