//! The document core of kops: the internal model of clusters, instance
//! groups and keysets, their conversion from and to the versioned wire
//! formats, defaulting and validation.
//!
//! ## Usage
//!
//! ```
//! use kops_api::{codec, validation};
//!
//! let decoded = codec::decode(
//!     "apiVersion: kops.k8s.io/v1alpha2\nkind: Keyset\nmetadata:\n  name: ca\nspec:\n  type: Secret\n",
//! )
//! .expect("valid keyset document");
//!
//! let keyset = decoded.object.into_keyset().expect("document is a keyset");
//! assert!(validation::validate_keyset(&keyset).is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`codec`] reads and writes documents of any registered version.
//! - [`defaults`] fills in cluster settings left unset by the user.
//! - [`validation`] checks single documents, a cluster with its instance
//!   groups and updates of an accepted cluster.
//! - [`resolve`] combines cluster-wide defaults with instance group settings.
//! - [`channel`] loads release channels and component bundles.

pub mod channel;
pub mod codec;
pub mod defaults;
pub mod field_path;
pub mod logging;
pub mod merge;
pub mod model;
pub mod options;
pub mod registry;
pub mod resolve;
pub mod validation;
pub mod versions;

// External re-exports
pub use kops_version;
pub use options::{Feature, FeatureFlags, ValidationOptions};
pub use validation::{
    ErrorList, FieldError, cross_validate_instance_group, deep_validate,
    deep_validate_with_options, validate_cluster, validate_cluster_update,
    validate_instance_group, validate_keyset,
};
