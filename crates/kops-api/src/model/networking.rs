use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub const TOPOLOGY_PUBLIC: &str = "public";
pub const TOPOLOGY_PRIVATE: &str = "private";
pub const SUPPORTED_TOPOLOGIES: &[&str] = &[TOPOLOGY_PUBLIC, TOPOLOGY_PRIVATE];

pub const DNS_TYPE_PUBLIC: &str = "Public";
pub const DNS_TYPE_PRIVATE: &str = "Private";
pub const DNS_TYPE_NONE: &str = "None";
pub const SUPPORTED_DNS_TYPES: &[&str] = &[DNS_TYPE_PUBLIC, DNS_TYPE_PRIVATE, DNS_TYPE_NONE];

pub const SUBNET_TYPE_PUBLIC: &str = "Public";
pub const SUBNET_TYPE_PRIVATE: &str = "Private";
pub const SUBNET_TYPE_UTILITY: &str = "Utility";
pub const SUPPORTED_SUBNET_TYPES: &[&str] =
    &[SUBNET_TYPE_PUBLIC, SUBNET_TYPE_PRIVATE, SUBNET_TYPE_UTILITY];

/// Egress value telling kops not to manage outbound routing of a subnet.
pub const EGRESS_EXTERNAL: &str = "External";

pub const FLANNEL_BACKEND_UDP: &str = "udp";
pub const FLANNEL_BACKEND_VXLAN: &str = "vxlan";
pub const SUPPORTED_FLANNEL_BACKENDS: &[&str] = &[FLANNEL_BACKEND_UDP, FLANNEL_BACKEND_VXLAN];

pub const CILIUM_IPAM_ENI: &str = "eni";

/// Everything about the cluster network: address ranges, subnets, the
/// topology, and the selected networking plugin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkingSpec {
    pub plugin: Option<NetworkingPlugin>,
    pub network_id: Option<String>,
    pub network_cidr: Option<String>,
    pub additional_network_cidrs: Vec<String>,
    pub subnets: Vec<ClusterSubnetSpec>,
    pub non_masquerade_cidr: Option<String>,
    pub service_cluster_ip_range: Option<String>,
    pub pod_cidr: Option<String>,
    pub topology: Option<TopologySpec>,
}

/// Identifies a networking plugin; the string form is the document key.
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum NetworkingPluginId {
    Classic,
    Kubenet,
    External,
    Cni,
    Kopeio,
    Weave,
    Flannel,
    Calico,
    Canal,
    KubeRouter,
    Romana,
    AmazonVpc,
    Cilium,
    LyftVpc,
    Gce,
    Kindnet,
}

/// The selected networking plugin with its settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkingPlugin {
    Classic(NoOptions),
    Kubenet(NoOptions),
    External(NoOptions),
    Cni(CniNetworkingSpec),
    Kopeio(NoOptions),
    Weave(WeaveNetworkingSpec),
    Flannel(FlannelNetworkingSpec),
    Calico(CalicoNetworkingSpec),
    Canal(CanalNetworkingSpec),
    KubeRouter(NoOptions),
    Romana(RomanaNetworkingSpec),
    AmazonVpc(AmazonVpcNetworkingSpec),
    Cilium(CiliumNetworkingSpec),
    LyftVpc(LyftVpcNetworkingSpec),
    Gce(NoOptions),
    Kindnet(KindnetNetworkingSpec),
}

impl NetworkingPlugin {
    pub fn id(&self) -> NetworkingPluginId {
        match self {
            Self::Classic(_) => NetworkingPluginId::Classic,
            Self::Kubenet(_) => NetworkingPluginId::Kubenet,
            Self::External(_) => NetworkingPluginId::External,
            Self::Cni(_) => NetworkingPluginId::Cni,
            Self::Kopeio(_) => NetworkingPluginId::Kopeio,
            Self::Weave(_) => NetworkingPluginId::Weave,
            Self::Flannel(_) => NetworkingPluginId::Flannel,
            Self::Calico(_) => NetworkingPluginId::Calico,
            Self::Canal(_) => NetworkingPluginId::Canal,
            Self::KubeRouter(_) => NetworkingPluginId::KubeRouter,
            Self::Romana(_) => NetworkingPluginId::Romana,
            Self::AmazonVpc(_) => NetworkingPluginId::AmazonVpc,
            Self::Cilium(_) => NetworkingPluginId::Cilium,
            Self::LyftVpc(_) => NetworkingPluginId::LyftVpc,
            Self::Gce(_) => NetworkingPluginId::Gce,
            Self::Kindnet(_) => NetworkingPluginId::Kindnet,
        }
    }

    /// Plugins that hand out pod addresses from the primary network range.
    pub fn uses_network_cidr_for_pods(&self) -> bool {
        match self {
            Self::AmazonVpc(_) | Self::LyftVpc(_) => true,
            Self::Cilium(cilium) => cilium.ipam.as_deref() == Some(CILIUM_IPAM_ENI),
            _ => false,
        }
    }
}

/// Settings of plugins that take no options, written as `kubenet: {}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoOptions {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CniNetworkingSpec {
    #[serde(default, rename = "usesSecondaryIP", skip_serializing_if = "std::ops::Not::not")]
    pub uses_secondary_ip: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaveNetworkingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlannelNetworkingSpec {
    /// Either `udp` or `vxlan`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalicoNetworkingSpec {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub typha_replicas: i32,

    /// `v3` requires every etcd cluster to run etcd v3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanalNetworkingSpec {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub typha_replicas: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RomanaNetworkingSpec {
    #[serde(default, rename = "daemonServiceIP", skip_serializing_if = "Option::is_none")]
    pub daemon_service_ip: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmazonVpcNetworkingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiliumNetworkingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// `eni` makes pods draw addresses from the VPC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipam: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyftVpcNetworkingSpec {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subnet_tags: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindnetNetworkingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Where control plane and nodes live, and how the cluster is published in
/// DNS.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySpec {
    /// `public` or `private`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<String>,

    /// `public` or `private`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bastion: Option<BastionSpec>,

    /// `Public`, `Private` or `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BastionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_seconds: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSubnetSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "cidr", skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,

    /// AWS style availability zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    /// GCE style region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Cloud handle of a pre-existing subnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// NAT gateway, instance or transit gateway handling outbound traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress: Option<String>,

    /// `Public`, `Private` or `Utility`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub subnet_type: Option<String>,

    #[serde(default, rename = "publicIP", skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &i32) -> bool {
    *value == 0
}
