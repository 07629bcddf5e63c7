// cbm-core/src/lib.rs
pub mod install;
pub mod inventory;
pub mod launch;
pub mod locate;
pub mod manager;
pub mod probe;
pub mod reconcile;
pub mod resolve;

// Re-export key types
pub use inventory::Inventory;
pub use locate::{Artifact, ArtifactLocator};
pub use manager::{BuildManager, InstallRequest, InventoryEntry};
pub use probe::{ProcessVersionProbe, VersionProbe};
pub use reconcile::{ReconcileFailure, ReconcileReport, Reconciler};
pub use resolve::BuildResolver;
