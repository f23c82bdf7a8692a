//! Asset detection - interface probing, classification and registry reconciliation

mod classifier;
mod probe;
mod reconciler;

pub use classifier::{normalize_balance, AssetClassifier};
pub use probe::{InterfaceProbe, ProbeAnswer};
pub use reconciler::{candidates, AssetReconciler, ReconcilerOptions};
