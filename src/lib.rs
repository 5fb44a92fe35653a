//! Generative AI Workspace
//!
//! Tooling around the workspace's Document Index plus the tutorial API:
//! - `layout`: the six suggested subfolders, inspection and scaffolding
//! - `index`: README parsing into headed sections and bullets
//! - `lint`: presentation-format checks over the README and the folder tree
//! - `store` / `api_server` (feature `api`): DuckDB-backed items/users served with Axum

pub mod error;
pub mod index;
pub mod layout;
pub mod lint;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod config;
#[cfg(feature = "api")]
pub mod models;
#[cfg(feature = "api")]
pub mod store;

// Re-export commonly used types
pub use error::WorkspaceError;
pub use index::{DocumentIndex, Section};
pub use layout::{inspect, scaffold, LayoutReport, Subfolder};
pub use lint::{layout_checks, lint_file, lint_readme, CheckResult, LintReport};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
#[cfg(feature = "api")]
pub use config::ServerConfig;
#[cfg(feature = "api")]
pub use error::StoreError;
#[cfg(feature = "api")]
pub use store::Store;
