use anyhow::{bail, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use godepgraph::{Config, GraphBuilder, Package, PackageResolver};

/// In-memory resolver over a synthetic package set, keyed by the requested
/// import path. Records every resolution so traversal pruning is observable.
#[derive(Default)]
struct FakeResolver {
    packages: HashMap<String, Package>,
    calls: RefCell<Vec<String>>,
}

impl FakeResolver {
    fn insert(&mut self, name: &str, pkg: Package) {
        self.packages.insert(name.to_string(), pkg);
    }

    fn add(&mut self, pkg: Package) {
        self.packages.insert(pkg.import_path.clone(), pkg);
    }

    fn resolved(&self, name: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == name)
    }
}

impl PackageResolver for FakeResolver {
    fn resolve(&self, import_path: &str, _base_dir: &Path) -> Result<Package> {
        self.calls.borrow_mut().push(import_path.to_string());
        match self.packages.get(import_path) {
            Some(pkg) => Ok(pkg.clone()),
            None => bail!("cannot find package {:?}", import_path),
        }
    }
}

fn pkg(path: &str, imports: &[&str]) -> Package {
    Package {
        import_path: path.to_string(),
        dir: PathBuf::from("/src").join(path),
        is_stdlib: false,
        has_cgo: false,
        imports: imports.iter().map(|s| s.to_string()).collect(),
        test_imports: Vec::new(),
        xtest_imports: Vec::new(),
    }
}

fn stdlib(path: &str, imports: &[&str]) -> Package {
    Package {
        is_stdlib: true,
        ..pkg(path, imports)
    }
}

#[test]
fn diamond_dependency_is_deduplicated() {
    let mut resolver = FakeResolver::default();
    resolver.add(pkg("app", &["libA", "libB"]));
    resolver.add(pkg("libA", &["libB"]));
    resolver.add(pkg("libB", &[]));

    let config = Config::new(["app".to_string()]);
    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();

    assert_eq!(graph.len(), 3);
    assert!(graph.get("app").is_some());
    assert!(graph.get("libA").is_some());
    assert!(graph.get("libB").is_some());
}

#[test]
fn import_cycle_terminates() {
    let mut resolver = FakeResolver::default();
    resolver.add(pkg("a", &["b"]));
    resolver.add(pkg("b", &["a"]));

    let config = Config::new(["a".to_string()]);
    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.get("a").unwrap().imports, vec!["b"]);
    assert_eq!(graph.get("b").unwrap().imports, vec!["a"]);
}

#[test]
fn exact_ignore_prunes_before_resolution() {
    let mut resolver = FakeResolver::default();
    // "absent" is not in the resolver at all; ignoring it must prevent the
    // resolution error entirely.
    resolver.add(pkg("app", &["absent", "libA"]));
    resolver.add(pkg("libA", &[]));

    let mut config = Config::new(["app".to_string()]);
    config.ignore_packages.insert("absent".to_string());

    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();

    assert_eq!(graph.len(), 2);
    assert!(graph.get("absent").is_none());
    assert!(!resolver.resolved("absent"));
}

#[test]
fn ignored_prefix_prunes_whole_subtree() {
    let mut resolver = FakeResolver::default();
    resolver.add(pkg("app", &["internal/libA"]));
    resolver.add(pkg("internal/libA", &["libC"]));
    resolver.add(pkg("libC", &[]));

    let mut config = Config::new(["app".to_string()]);
    config.ignore_prefixes.push("internal/".to_string());

    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();

    assert_eq!(graph.len(), 1);
    // libC was only reachable through the ignored package.
    assert!(!resolver.resolved("libC"));
}

#[test]
fn resolution_failure_aborts_whole_build() {
    let mut resolver = FakeResolver::default();
    resolver.add(pkg("app", &["nope"]));

    let config = Config::new(["app".to_string()]);
    let err = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap_err();

    let msg = format!("{err:#}");
    assert!(msg.contains("failed to import nope"), "got: {msg}");
    assert!(msg.contains("cannot find package"), "got: {msg}");
}

#[test]
fn stdlib_packages_are_leaves_by_default() {
    let mut resolver = FakeResolver::default();
    resolver.add(pkg("app", &["fmt"]));
    resolver.add(stdlib("fmt", &["runtime"]));
    resolver.add(stdlib("runtime", &[]));

    let config = Config::new(["app".to_string()]);
    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();

    assert!(graph.get("fmt").is_some());
    assert!(graph.get("runtime").is_none());
    assert!(!resolver.resolved("runtime"));
}

#[test]
fn delve_stdlib_descends_into_stdlib_imports() {
    let mut resolver = FakeResolver::default();
    resolver.add(pkg("app", &["fmt"]));
    resolver.add(stdlib("fmt", &["runtime"]));
    resolver.add(stdlib("runtime", &[]));

    let mut config = Config::new(["app".to_string()]);
    config.delve_stdlib = true;

    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();

    assert!(graph.get("runtime").is_some());
}

#[test]
fn test_imports_only_traversed_when_requested() {
    let mut resolver = FakeResolver::default();
    let mut app = pkg("app", &["libA"]);
    app.test_imports = vec!["testlib".to_string()];
    app.xtest_imports = vec!["app".to_string(), "xtestlib".to_string()];
    resolver.add(app);
    resolver.add(pkg("libA", &[]));
    resolver.add(pkg("testlib", &[]));
    resolver.add(pkg("xtestlib", &[]));

    let config = Config::new(["app".to_string()]);
    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();
    assert_eq!(graph.len(), 2);

    let mut config = Config::new(["app".to_string()]);
    config.include_tests = true;
    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();
    assert_eq!(graph.len(), 4);
    // The external test's reference to the package under test never
    // re-enters traversal as a self-import.
    let effective = graph.get("app").unwrap().effective_imports(true);
    assert_eq!(effective, vec!["libA", "testlib", "xtestlib"]);
}

#[test]
fn vendored_package_is_keyed_canonically_when_unvendoring() {
    let mut resolver = FakeResolver::default();
    resolver.add(pkg("app", &["libC"]));
    resolver.insert("libC", pkg("app/vendor/libC", &[]));

    let mut config = Config::new(["app".to_string()]);
    config.unvendor = true;

    let graph = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();

    assert!(graph.get("libC").is_some());
    assert!(graph.get("app/vendor/libC").is_none());
    assert_eq!(graph.get("libC").unwrap().import_path, "app/vendor/libC");
}

#[test]
fn builder_is_idempotent_across_runs() {
    let mut resolver = FakeResolver::default();
    resolver.add(pkg("app", &["libA", "libB"]));
    resolver.add(pkg("libA", &["libB"]));
    resolver.add(pkg("libB", &["libA"]));

    let config = Config::new(["app".to_string()]);
    let first = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();
    let second = GraphBuilder::new(&resolver, &config)
        .build(Path::new("/src"))
        .unwrap();

    let a: Vec<_> = first.iter().collect();
    let b: Vec<_> = second.iter().collect();
    assert_eq!(a, b);
}

#[test]
fn roots_are_sorted_and_deduplicated() {
    let config = Config::new(["b".to_string(), "a".to_string(), "a".to_string()]);
    assert_eq!(config.roots, vec!["a", "b"]);
    assert!(config.is_root("a"));
    assert!(!config.is_root("c"));
}
