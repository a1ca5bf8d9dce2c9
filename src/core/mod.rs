pub mod builder;
pub mod config;
pub mod filter;
pub mod package;

pub use builder::{GraphBuilder, PackageGraph};
pub use config::Config;
pub use filter::is_ignored;
pub use package::Package;
