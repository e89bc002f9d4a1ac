use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    Authentication, Authorization, CloudConfiguration, CloudControllerManagerConfig,
    CloudProviderId, CloudProviderSpec, ContainerdConfig, DockerConfig, FileAssetSpec, HookSpec,
    IamSpec, KubeApiServerConfig, KubeControllerManagerConfig, KubeDnsConfig, KubeProxyConfig,
    KubeSchedulerConfig, KubeletConfig, NetworkingSpec, NtpConfig, ObjectMeta, RollingUpdate,
    Target, WarmPoolSpec,
};

pub const DEFAULT_CHANNEL: &str = "stable";

pub const UPDATE_POLICY_AUTOMATIC: &str = "automatic";
pub const UPDATE_POLICY_EXTERNAL: &str = "external";
pub const SUPPORTED_UPDATE_POLICIES: &[&str] = &[UPDATE_POLICY_AUTOMATIC, UPDATE_POLICY_EXTERNAL];

pub const LOAD_BALANCER_TYPE_PUBLIC: &str = "Public";
pub const LOAD_BALANCER_TYPE_INTERNAL: &str = "Internal";
pub const SUPPORTED_LOAD_BALANCER_TYPES: &[&str] =
    &[LOAD_BALANCER_TYPE_PUBLIC, LOAD_BALANCER_TYPE_INTERNAL];

pub const LOAD_BALANCER_CLASS_CLASSIC: &str = "Classic";
pub const LOAD_BALANCER_CLASS_NETWORK: &str = "Network";
pub const SUPPORTED_LOAD_BALANCER_CLASSES: &[&str] =
    &[LOAD_BALANCER_CLASS_CLASSIC, LOAD_BALANCER_CLASS_NETWORK];

pub const ETCD_PROVIDER_MANAGER: &str = "Manager";
pub const SUPPORTED_ETCD_PROVIDERS: &[&str] = &[ETCD_PROVIDER_MANAGER];

/// A complete cluster description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cluster {
    pub metadata: ObjectMeta,
    pub spec: ClusterSpec,
}

/// The internal form of a cluster specification.
///
/// Fields that look the same in every document version are (de)serialized
/// directly. Fields that were moved, renamed or that hold a choice between
/// alternatives are skipped here and handled by the version modules in
/// [`crate::versions`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Logical name of the channel with version recommendations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,

    #[serde(skip)]
    pub cloud_provider: Option<CloudProviderSpec>,

    #[serde(skip)]
    pub networking: NetworkingSpec,

    #[serde(skip)]
    pub api: ApiSpec,

    #[serde(skip)]
    pub authentication: Option<Authentication>,

    #[serde(skip)]
    pub authorization: Option<Authorization>,

    #[serde(skip)]
    pub target: Option<Target>,

    #[serde(skip)]
    pub etcd_clusters: Vec<EtcdClusterSpec>,

    #[serde(skip)]
    pub config_store: ConfigStoreSpec,

    #[serde(skip)]
    pub cloud_config: Option<CloudConfiguration>,

    #[serde(skip)]
    pub control_plane_kubelet: Option<KubeletConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_internal_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_zone: Option<String>,

    #[serde(default, rename = "clusterDNSDomain", skip_serializing_if = "Option::is_none")]
    pub cluster_dns_domain: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_access: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_port_access: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key_name: Option<String>,

    /// `automatic` or `external`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_policy: Option<String>,

    /// Role name to policy ARNs attached to the instances of that role.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub external_policies: BTreeMap<String, Vec<String>>,

    /// Role name to a JSON IAM policy document with extra statements.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_policies: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_assets: Vec<FileAssetSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<HookSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cloud_labels: BTreeMap<String, String>,

    #[serde(default, rename = "kubeAPIServer", skip_serializing_if = "Option::is_none")]
    pub kube_api_server: Option<KubeApiServerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_controller_manager: Option<KubeControllerManagerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_cloud_controller_manager: Option<CloudControllerManagerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_scheduler: Option<KubeSchedulerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_proxy: Option<KubeProxyConfig>,

    #[serde(default, rename = "kubeDNS", skip_serializing_if = "Option::is_none")]
    pub kube_dns: Option<KubeDnsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubelet: Option<KubeletConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containerd: Option<ContainerdConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntp: Option<NtpConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam: Option<IamSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_config: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_host_certificates: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sysctl_parameters: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,

    /// Cluster-wide warm pool default, see [`crate::resolve::resolve_warm_pool`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warm_pool: Option<WarmPoolSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_update: Option<RollingUpdate>,

    /// Deprecated, decoded but never written.
    #[serde(default, skip_serializing)]
    pub docker: Option<DockerConfig>,

    /// Deprecated, decoded but never written.
    #[serde(default, skip_serializing)]
    pub container_runtime: Option<String>,
}

impl ClusterSpec {
    pub fn cloud_provider_id(&self) -> Option<CloudProviderId> {
        self.cloud_provider.as_ref().map(CloudProviderSpec::id)
    }

    pub fn is_aws(&self) -> bool {
        self.cloud_provider_id() == Some(CloudProviderId::Aws)
    }

    /// Parses `kubernetesVersion`, returning `None` if it is absent or
    /// malformed.
    pub fn kubernetes_version(&self) -> Option<kops_version::KubernetesVersion> {
        self.kubernetes_version.as_deref()?.parse().ok()
    }

    /// `true` if the cluster runs at least `major.minor.patch`. Unparsable
    /// versions compare as `false`.
    pub fn is_kubernetes_gte(&self, major: u64, minor: u64, patch: u64) -> bool {
        self.kubernetes_version()
            .is_some_and(|version| version.is_gte(&semver::Version::new(major, minor, patch)))
    }

    /// `true` if the cluster runs a version below `major.minor.patch`.
    /// Unparsable versions compare as `false`.
    pub fn is_kubernetes_lt(&self, major: u64, minor: u64, patch: u64) -> bool {
        self.kubernetes_version()
            .is_some_and(|version| version.is_lt(&semver::Version::new(major, minor, patch)))
    }

    pub fn subnet(&self, name: &str) -> Option<&crate::model::ClusterSubnetSpec> {
        self.networking.subnets.iter().find(|subnet| subnet.name == name)
    }
}

/// How the Kubernetes API is published.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsAccessSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancerAccessSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_name: Option<String>,

    #[serde(default, rename = "additionalSANs", skip_serializing_if = "Vec::is_empty")]
    pub additional_sans: Vec<String>,

    /// CIDRs allowed to reach the API.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access: Vec<String>,
}

impl ApiSpec {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsAccessSpec {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerAccessSpec {
    /// `Public` or `Internal`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub lb_type: Option<String>,

    /// `Classic` or `Network`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_group_override: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_security_groups: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_for_internal_api: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_certificate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_zone_load_balancing: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<LoadBalancerSubnetSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSubnetSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "privateIPv4Address", skip_serializing_if = "Option::is_none")]
    pub private_ipv4_address: Option<String>,

    #[serde(default, rename = "allocationID", skip_serializing_if = "Option::is_none")]
    pub allocation_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdClusterSpec {
    #[serde(default)]
    pub name: String,

    /// Only `Manager` is supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<EtcdMemberSpec>,

    #[serde(default, rename = "enableEtcdTLS", skip_serializing_if = "std::ops::Not::not")]
    pub enable_etcd_tls: bool,

    #[serde(default, rename = "enableTLSAuth", skip_serializing_if = "std::ops::Not::not")]
    pub enable_tls_auth: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups: Option<EtcdBackupSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<EtcdManagerSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdMemberSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,

    #[serde(default, rename = "volumeIOPS", skip_serializing_if = "Option::is_none")]
    pub volume_iops: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<i32>,

    #[serde(default, rename = "kmsKeyID", skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_volume: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdBackupSpec {
    #[serde(default)]
    pub backup_store: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdManagerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Locations of cluster state. The values are opaque VFS paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStoreSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypairs: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<String>,
}

impl ConfigStoreSpec {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// What has already been created for a cluster. Consulted when validating
/// updates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub etcd_clusters: Vec<EtcdClusterStatus>,
}

impl ClusterStatus {
    pub fn is_etcd_cluster_created(&self, name: &str) -> bool {
        self.etcd_clusters.iter().any(|etcd| etcd.name == name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdClusterStatus {
    #[serde(default)]
    pub name: String,
}
