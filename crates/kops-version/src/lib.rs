//! Strongly-typed version identifiers used by the kops document formats.
//!
//! Two unrelated kinds of versions show up in kops documents:
//!
//! - The schema version of a document, written as `apiVersion: kops/v1alpha2`.
//!   It consists of an optional group and a version following the
//!   `v<MAJOR>(beta/alpha<LEVEL>)` format, see [`ApiVersion`].
//! - The Kubernetes version a cluster runs, written as a (loosely formatted)
//!   semantic version or as a release URL, see [`KubernetesVersion`].
//!
//! ## Usage
//!
//! ```
//! # use std::str::FromStr;
//! use kops_version::{ApiVersion, KubernetesVersion};
//!
//! let api_version: ApiVersion = "kops/v1alpha2".parse()
//!     .expect("valid kops API version");
//! assert_eq!(api_version.to_string(), "kops/v1alpha2");
//!
//! let kubernetes_version = KubernetesVersion::from_str("v1.6.0-alpha.1")
//!     .expect("valid Kubernetes version");
//! assert!(kubernetes_version.is_gte(&semver::Version::new(1, 6, 0)));
//! ```

// NOTE: Needed for the rstest_reuse templates in the unit tests.
#[cfg(test)]
use rstest_reuse::{self};

mod api_version;
mod group;
mod kubernetes;
mod level;
mod version;

pub use api_version::*;
pub use group::*;
pub use kubernetes::*;
pub use level::*;
pub use version::*;
