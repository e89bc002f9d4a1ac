use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::{
    FileAssetSpec, HookSpec, KubeletConfig, ObjectMeta, RollingUpdate, WarmPoolSpec,
};

pub const SUPPORTED_TENANCIES: &[&str] = &["default", "dedicated", "host"];

pub const SUPPORTED_FILESYSTEMS: &[&str] = &["btrfs", "ext4", "xfs"];

pub const SUPPORTED_USER_DATA_TYPES: &[&str] = &[
    "text/x-include-once-url",
    "text/x-include-url",
    "text/cloud-config-archive",
    "text/upstart-job",
    "text/cloud-config",
    "text/part-handler",
    "text/x-shellscript",
    "text/cloud-boothook",
];

/// The membership class of an instance group.
///
/// Older documents call the control plane role `Master`; both spellings are
/// accepted wherever roles are read.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum InstanceGroupRole {
    #[strum(to_string = "ControlPlane", serialize = "Master")]
    #[serde(alias = "Master")]
    ControlPlane,

    Node,

    Bastion,

    #[strum(serialize = "APIServer")]
    #[serde(rename = "APIServer")]
    ApiServer,
}

impl InstanceGroupRole {
    /// The lowercase name used as key in per-role policy maps.
    pub fn policy_key(&self) -> &'static str {
        match self {
            Self::ControlPlane => "master",
            Self::Node => "node",
            Self::Bastion => "bastion",
            Self::ApiServer => "apiserver",
        }
    }
}

/// A set of instances sharing a role and a shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstanceGroup {
    pub metadata: ObjectMeta,
    pub spec: InstanceGroupSpec,
}

impl InstanceGroup {
    pub fn is_control_plane(&self) -> bool {
        self.spec.role == Some(InstanceGroupRole::ControlPlane)
    }

    pub fn is_bastion(&self) -> bool {
        self.spec.role == Some(InstanceGroupRole::Bastion)
    }
}

/// The internal form of an instance group specification.
///
/// The role is spelled differently across document versions and is
/// therefore handled by the version modules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroupSpec {
    #[serde(skip)]
    pub role: Option<InstanceGroupRole>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,

    /// One machine type, or a comma-separated list of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_volume: Option<RootVolumeSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMountSpec>,

    /// Names of cluster subnets the instances are placed in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cloud_labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_security_groups: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_group_override: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixed_instances_policy: Option<MixedInstancesPolicySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warm_pool: Option<WarmPoolSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<HookSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_assets: Vec<FileAssetSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_update: Option<RollingUpdate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_user_data: Vec<UserData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_duration_in_minutes: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_interruption_behavior: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_credits: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_metadata: Option<InstanceMetadataOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam: Option<IamProfileSpec>,

    #[serde(default, rename = "associatePublicIp", skip_serializing_if = "Option::is_none")]
    pub associate_public_ip: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenancy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubelet: Option<KubeletConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suspend_processes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_instance_monitoring: Option<bool>,
}

impl InstanceGroupSpec {
    /// The configured machine types, split on commas.
    pub fn machine_types(&self) -> Vec<&str> {
        self.machine_type
            .as_deref()
            .map(|types| {
                types
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootVolumeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSpec {
    #[serde(default)]
    pub device: String,

    #[serde(default)]
    pub size: i64,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMountSpec {
    #[serde(default)]
    pub device: String,

    /// One of `btrfs`, `ext4` or `xfs`.
    #[serde(default)]
    pub filesystem: String,

    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format_options: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mount_options: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedInstancesPolicySpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_demand_allocation_strategy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_demand_base: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_demand_above_base: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_allocation_strategy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_instance_pools: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadataOptions {
    /// `optional` or `required`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_tokens: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_put_response_hop_limit: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamProfileSpec {
    /// An instance profile ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}
