//! Per-component configuration blocks of a cluster.
//!
//! Every block is optional on the cluster; absence means the component runs
//! with its built-in defaults. The blocks have the same shape in all document
//! versions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::InstanceGroupRole;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeApiServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,

    #[serde(default, rename = "serviceClusterIPRange", skip_serializing_if = "Option::is_none")]
    pub service_cluster_ip_range: Option<String>,

    /// A `startPort-endPort` range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_node_port_range: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_client_cert_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_client_key_file: Option<String>,

    /// Comma-separated list of authorizers, for example `Node,RBAC,Webhook`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_webhook_config_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_auth: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_gates: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeControllerManagerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,

    #[serde(default, rename = "clusterCIDR", skip_serializing_if = "Option::is_none")]
    pub cluster_cidr: Option<String>,

    #[serde(default, rename = "allocateNodeCIDRs", skip_serializing_if = "Option::is_none")]
    pub allocate_node_cidrs: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeSchedulerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeProxyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// API server URL, needs a scheme and a host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,

    #[serde(default, rename = "clusterCIDR", skip_serializing_if = "Option::is_none")]
    pub cluster_cidr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_mode: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeDnsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, rename = "serverIP", skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeletConfig {
    /// Removed in Kubernetes 1.6.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_servers: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,

    #[serde(default, rename = "nonMasqueradeCIDR", skip_serializing_if = "Option::is_none")]
    pub non_masquerade_cidr: Option<String>,

    #[serde(default, rename = "clusterDNS", skip_serializing_if = "Option::is_none")]
    pub cluster_dns: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_schedulable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_auth: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_gates: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudControllerManagerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,

    #[serde(default, rename = "clusterCIDR", skip_serializing_if = "Option::is_none")]
    pub cluster_cidr: Option<String>,

    #[serde(default, rename = "allocateNodeCIDRs", skip_serializing_if = "Option::is_none")]
    pub allocate_node_cidrs: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerdConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_install: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub registry_mirrors: BTreeMap<String, Vec<String>>,
}

/// Deprecated. Read from documents but never written back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_driver: Option<String>,

    #[serde(default, rename = "bridgeIP", skip_serializing_if = "Option::is_none")]
    pub bridge_ip: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NtpConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamSpec {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub legacy: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_container_registry: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_storage_classes: Option<bool>,

    #[serde(default, rename = "awsEBSCSIDriver", skip_serializing_if = "Option::is_none")]
    pub aws_ebs_csi_driver: Option<AwsEbsCsiDriver>,
}

impl CloudConfiguration {
    /// `true` only if the EBS CSI driver was explicitly switched off.
    pub fn ebs_csi_driver_disabled(&self) -> bool {
        self.aws_ebs_csi_driver
            .as_ref()
            .and_then(|driver| driver.enabled)
            == Some(false)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsEbsCsiDriver {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A systemd unit or container run on matching instances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,

    /// Restricts the hook to these roles. Empty means all roles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<InstanceGroupRole>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_container: Option<ExecContainerAction>,

    /// Raw systemd unit contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_raw_manifest: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecContainerAction {
    #[serde(default)]
    pub image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// A file written to matching instances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAssetSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<InstanceGroupRole>,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_base64: bool,
}

/// Pre-initialized instances kept outside of an autoscaling group. AWS only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmPoolSpec {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub min_size: i64,

    /// `None` lets the pool grow as large as the autoscaling group allows;
    /// `Some(0)` disables the pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i64>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enable_lifecycle_hook: bool,
}

impl WarmPoolSpec {
    /// The effective value of a group without a warm pool.
    pub fn disabled() -> Self {
        Self {
            max_size: Some(0),
            ..Self::default()
        }
    }
}

/// An integer or a percentage such as `25%`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    String(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drain_and_terminate: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<IntOrString>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &i64) -> bool {
    *value == 0
}
