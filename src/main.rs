use anyhow::Result;
use clap::Parser;
use std::env;

use godepgraph::{Config, DotFormatter, GoSourceResolver, GraphBuilder};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "godepgraph",
    version = "0.1.0",
    author = "godepgraph developers",
    about = "Render the transitive import graph of Go packages as Graphviz DOT"
)]
struct Cli {
    /// Root packages to graph
    #[arg(value_name = "PACKAGE", required = true)]
    packages: Vec<String>,

    /// Ignore packages in the Go standard library
    #[arg(short = 's', long = "ignore-stdlib")]
    ignore_stdlib: bool,

    /// Show dependencies of packages in the Go standard library
    #[arg(short = 'd', long = "delve-stdlib")]
    delve_stdlib: bool,

    /// Comma-separated list of import path prefixes to ignore
    #[arg(
        short = 'p',
        long = "ignore-prefixes",
        value_name = "PREFIXES",
        value_delimiter = ','
    )]
    ignore_prefixes: Vec<String>,

    /// Comma-separated list of packages to ignore
    #[arg(
        short = 'i',
        long = "ignore-packages",
        value_name = "PACKAGES",
        value_delimiter = ','
    )]
    ignore_packages: Vec<String>,

    /// Comma-separated list of build tags considered satisfied
    #[arg(long = "tags", value_name = "TAGS", value_delimiter = ',')]
    tags: Vec<String>,

    /// Lay out the dependency graph horizontally instead of vertically
    #[arg(long)]
    horizontal: bool,

    /// Include test packages
    #[arg(short = 't', long = "include-tests")]
    include_tests: bool,

    /// Strip vendor prefixes from package import paths
    #[arg(short = 'V', long = "unvendor")]
    unvendor: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::new(cli.packages);
    config.ignore_stdlib = cli.ignore_stdlib;
    config.delve_stdlib = cli.delve_stdlib;
    config.ignore_prefixes = cli.ignore_prefixes;
    config.ignore_packages.extend(cli.ignore_packages);
    config.build_tags = cli.tags;
    config.horizontal = cli.horizontal;
    config.include_tests = cli.include_tests;
    config.unvendor = cli.unvendor;

    let cwd = env::current_dir()?;
    let resolver = GoSourceResolver::from_env(&config.build_tags);

    let graph = GraphBuilder::new(&resolver, &config).build(&cwd)?;
    let output = DotFormatter::new(&config).format(&graph)?;
    print!("{output}");

    Ok(())
}
