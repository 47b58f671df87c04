//! This crate contains the custom resource definitions of the Appforge platform together with
//! helpers to emit them as YAML manifests.

pub mod component;
pub mod yaml;

// External re-exports
pub use k8s_openapi;
pub use kube;
pub use schemars;
