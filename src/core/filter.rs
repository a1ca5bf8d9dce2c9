use super::{Config, Package};

/// Shared ignore predicate, applied identically at build time (pruning
/// recursion) and render time (pruning output).
///
/// Both the raw and the canonical path are checked: vendor stripping can make
/// a path newly match an exact or prefix rule that its raw form did not.
pub fn is_ignored(pkg: &Package, config: &Config) -> bool {
    let canonical = pkg.canonical_path(config.unvendor);

    config.ignore_packages.contains(&pkg.import_path)
        || config.ignore_packages.contains(&canonical)
        || (pkg.is_stdlib && config.ignore_stdlib)
        || has_prefix(&pkg.import_path, &config.ignore_prefixes)
        || has_prefix(&canonical, &config.ignore_prefixes)
}

fn has_prefix(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| path.starts_with(p.as_str()))
}
