use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Annotation marking a cluster that was imported from an existing
/// installation. Imported clusters may carry names that are not DNS names.
pub const ANNOTATION_MANAGEMENT: &str = "kops.kubernetes.io/management";
pub const ANNOTATION_VALUE_MANAGEMENT_IMPORTED: &str = "imported";

/// The closed set of document kinds.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Kind {
    Cluster,
    InstanceGroup,
    Keyset,
}

/// Identity shared by every document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_imported(&self) -> bool {
        self.annotations
            .get(ANNOTATION_MANAGEMENT)
            .is_some_and(|value| value == ANNOTATION_VALUE_MANAGEMENT_IMPORTED)
    }
}
