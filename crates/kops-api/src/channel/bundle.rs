use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{channel::VersionRange, model::ObjectMeta};

/// A frozen set of component releases.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: BundleSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<BundleComponent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleComponent {
    pub name: String,

    pub version: String,

    /// Range of Kubernetes versions this release is pinned for. Absent
    /// means every version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Bundle {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }

    /// Returns the first release of `name` pinned for `kubernetes_version`.
    pub fn find_component(&self, name: &str, kubernetes_version: &Version) -> Option<&BundleComponent> {
        self.spec
            .components
            .iter()
            .filter(|component| component.name == name)
            .find(|component| match &component.kubernetes_version {
                None => true,
                Some(range) => match range.parse::<VersionRange>() {
                    Ok(range) => range.matches(kubernetes_version),
                    Err(error) => {
                        warn!(%error, component = name, "ignoring bundle component with malformed version range");
                        false
                    }
                },
            })
    }
}
