//! Filesystem resolution of Go import paths, GOPATH-mode semantics.
//!
//! Lookup order for a non-relative path: the nearest `vendor/` directory
//! walking up from the importing package, then `GOROOT/src` (which marks the
//! package as stdlib), then each `GOPATH/src` entry. A vendored hit is
//! reported under its full vendored import path, which is what makes the
//! unvendor flag useful downstream.

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tree_sitter::Node as TsNode;
use walkdir::WalkDir;

use super::{constraints, PackageResolver};
use crate::core::Package;

const GOOS_LIST: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "illumos", "ios", "js", "linux", "netbsd",
    "openbsd", "plan9", "solaris", "wasip1", "windows",
];

const GOARCH_LIST: &[&str] = &[
    "386", "amd64", "arm", "arm64", "loong64", "mips", "mips64", "mips64le", "mipsle", "ppc64",
    "ppc64le", "riscv64", "s390x", "wasm",
];

pub struct GoSourceResolver {
    goroot: PathBuf,
    gopaths: Vec<PathBuf>,
    tags: HashSet<String>,
}

impl GoSourceResolver {
    pub fn new(
        goroot: impl Into<PathBuf>,
        gopaths: Vec<PathBuf>,
        build_tags: &[String],
    ) -> Self {
        let mut tags: HashSet<String> = build_tags.iter().cloned().collect();
        tags.insert(goos().to_string());
        tags.insert(goarch().to_string());
        tags.insert("gc".to_string());
        Self {
            goroot: goroot.into(),
            gopaths,
            tags,
        }
    }

    /// Resolver configured from GOROOT/GOPATH, with the usual defaults when
    /// the variables are unset.
    pub fn from_env(build_tags: &[String]) -> Self {
        let goroot = env::var_os("GOROOT")
            .map(PathBuf::from)
            .or_else(|| {
                ["/usr/local/go", "/usr/lib/go"]
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.is_dir())
            })
            .unwrap_or_else(|| PathBuf::from("/usr/local/go"));

        let gopaths = match env::var_os("GOPATH") {
            Some(paths) => env::split_paths(&paths).collect(),
            None => env::var_os("HOME")
                .map(|home| vec![PathBuf::from(home).join("go")])
                .unwrap_or_default(),
        };

        Self::new(goroot, gopaths, build_tags)
    }

    /// Find the package directory and its reported import path.
    fn locate(&self, import_path: &str, base_dir: &Path) -> Result<(PathBuf, String, bool)> {
        if import_path.starts_with("./") || import_path.starts_with("../") {
            let dir = clean_join(base_dir, import_path);
            if has_go_files(&dir) {
                return Ok((dir, import_path.to_string(), false));
            }
            bail!("no Go package in {}", dir.display());
        }

        // Vendored copies shadow everything else; nearest directory wins.
        for ancestor in base_dir.ancestors() {
            let candidate = ancestor.join("vendor").join(import_path);
            if has_go_files(&candidate) {
                let vendored = self
                    .import_path_for_dir(&candidate)
                    .unwrap_or_else(|| import_path.to_string());
                return Ok((candidate, vendored, false));
            }
        }

        let candidate = self.goroot.join("src").join(import_path);
        if has_go_files(&candidate) {
            return Ok((candidate, import_path.to_string(), true));
        }

        for gopath in &self.gopaths {
            let candidate = gopath.join("src").join(import_path);
            if has_go_files(&candidate) {
                return Ok((candidate, import_path.to_string(), false));
            }
        }

        bail!(
            "cannot find package {:?} in GOROOT ({}) or GOPATH",
            import_path,
            self.goroot.display()
        )
    }

    /// Import path a directory would be known by, relative to the nearest
    /// source root. Used to name vendored packages by their full path.
    fn import_path_for_dir(&self, dir: &Path) -> Option<String> {
        let roots = std::iter::once(&self.goroot).chain(self.gopaths.iter());
        for root in roots {
            if let Ok(rel) = dir.strip_prefix(root.join("src")) {
                let parts: Vec<&str> = rel
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(s) => s.to_str(),
                        _ => None,
                    })
                    .collect();
                if !parts.is_empty() {
                    return Some(parts.join("/"));
                }
            }
        }
        None
    }

    fn scan_package(&self, dir: &Path, import_path: &str, is_stdlib: bool) -> Result<Package> {
        let mut entries: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
                name.ends_with(".go") && !name.starts_with('_') && !name.starts_with('.')
            })
            .collect();
        entries.sort();

        let mut pkg = Package {
            import_path: import_path.to_string(),
            dir: dir.to_path_buf(),
            is_stdlib,
            has_cgo: false,
            imports: Vec::new(),
            test_imports: Vec::new(),
            xtest_imports: Vec::new(),
        };
        let mut buildable = 0usize;

        for path in &entries {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !good_os_arch_file(name, &self.tags) {
                continue;
            }

            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;

            if let Some(expr) = constraints::constraint_of(&source) {
                if !constraints::evaluate(&expr, &self.tags) {
                    continue;
                }
            }

            let Some((package_name, imports)) = parse_go_source(&source)? else {
                continue;
            };

            if name.ends_with("_test.go") {
                if package_name.ends_with("_test") {
                    append_unique(&mut pkg.xtest_imports, imports);
                } else {
                    append_unique(&mut pkg.test_imports, imports);
                }
            } else {
                if imports.iter().any(|i| i == "C") {
                    pkg.has_cgo = true;
                }
                append_unique(&mut pkg.imports, imports);
                buildable += 1;
            }
        }

        if buildable == 0 {
            bail!("no buildable Go source files in {}", dir.display());
        }
        Ok(pkg)
    }
}

impl PackageResolver for GoSourceResolver {
    fn resolve(&self, import_path: &str, base_dir: &Path) -> Result<Package> {
        let (dir, reported_path, is_stdlib) = self.locate(import_path, base_dir)?;
        self.scan_package(&dir, &reported_path, is_stdlib)
    }
}

/// Parse one Go source file into its package name and import paths.
///
/// Returns `None` when no package clause is present (tree-sitter recovers
/// from most damage, so this is the only "not really Go" signal we act on).
fn parse_go_source(source: &str) -> Result<Option<(String, Vec<String>)>> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(tree_sitter_go::language())
        .map_err(|e| anyhow!("failed to load Go grammar: {e}"))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow!("tree-sitter failed to parse Go source"))?;

    let bytes = source.as_bytes();
    let root = tree.root_node();
    let mut package_name = None;
    let mut imports = Vec::new();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                if let Some(ident) = find_child_by_kind(&child, "package_identifier") {
                    package_name = Some(node_text(&ident, bytes).to_string());
                }
            }
            "import_declaration" => {
                if let Some(list) = find_child_by_kind(&child, "import_spec_list") {
                    let mut list_cursor = list.walk();
                    for spec in list.children(&mut list_cursor) {
                        if spec.kind() == "import_spec" {
                            collect_import(&spec, bytes, &mut imports);
                        }
                    }
                } else if let Some(spec) = find_child_by_kind(&child, "import_spec") {
                    collect_import(&spec, bytes, &mut imports);
                }
            }
            _ => {}
        }
    }

    Ok(package_name.map(|name| (name, imports)))
}

fn collect_import(spec: &TsNode, source: &[u8], imports: &mut Vec<String>) {
    if let Some(path_node) = spec.child_by_field_name("path") {
        let text = node_text(&path_node, source);
        let path = text.trim_matches(|c| c == '"' || c == '`');
        if !path.is_empty() {
            imports.push(path.to_string());
        }
    }
}

fn find_child_by_kind<'t>(node: &TsNode<'t>, kind: &str) -> Option<TsNode<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn node_text<'s>(node: &TsNode, source: &'s [u8]) -> &'s str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

fn append_unique(list: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

/// GOOS/GOARCH filename-suffix rule: `name_GOOS.go`, `name_GOARCH.go` and
/// `name_GOOS_GOARCH.go` only build when the suffix matches the satisfied
/// tag set. A file whose whole base name is an OS or architecture (such as
/// `linux.go`) is unconstrained.
fn good_os_arch_file(name: &str, tags: &HashSet<String>) -> bool {
    let base = name.trim_end_matches(".go");
    let base = base.strip_suffix("_test").unwrap_or(base);
    let parts: Vec<&str> = base.split('_').collect();
    if parts.len() < 2 {
        return true;
    }

    let last = parts[parts.len() - 1];
    if GOARCH_LIST.contains(&last) {
        let prev = parts[parts.len() - 2];
        if parts.len() >= 3 && GOOS_LIST.contains(&prev) {
            return tags.contains(prev) && tags.contains(last);
        }
        return tags.contains(last);
    }
    if GOOS_LIST.contains(&last) {
        return tags.contains(last);
    }
    true
}

fn has_go_files(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|e| {
        let name = e.file_name();
        let name = name.to_string_lossy();
        name.ends_with(".go")
            && !name.starts_with('_')
            && !name.starts_with('.')
            && e.path().is_file()
    })
}

/// Lexically join a relative import path onto a base directory.
fn clean_join(base: &Path, rel: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn goos() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn goarch() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        other => other,
    }
}
