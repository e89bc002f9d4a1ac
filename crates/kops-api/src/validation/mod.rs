//! Validation of clusters, instance groups and keysets.
//!
//! Every validator returns an [`ErrorList`] holding all problems it found.
//! Paths in the errors use the internal field names; see
//! [`FieldError::human_field`] for the spelling of the older document
//! version.
//!
//! | Entry point | Scope |
//! |---|---|
//! | [`validate_cluster`] | one cluster on its own |
//! | [`validate_instance_group`] | one instance group on its own |
//! | [`cross_validate_instance_group`] | one instance group against its cluster |
//! | [`deep_validate`] | a cluster with all of its instance groups |
//! | [`validate_cluster_update`] | a changed cluster against the accepted one |
//! | [`validate_keyset`] | one keyset |

mod aws;
mod cluster;
mod deep;
mod field;
#[cfg(test)]
mod fixtures;
mod gce;
mod instance_group;
mod keyset;
mod openstack;
pub mod primitives;
mod update;

pub use cluster::{validate_cluster, validate_cluster_with_options};
pub use deep::{deep_validate, deep_validate_with_options};
pub use field::*;
pub use instance_group::{cross_validate_instance_group, validate_instance_group};
pub use keyset::validate_keyset;
pub use update::validate_cluster_update;
