//! The `kops/v1alpha2` document format.
//!
//! Compared to the internal model, this version keeps networking settings at
//! the top of `spec`, spells the cloud provider as a string with its
//! settings spread over other fields, names etcd members `etcdMembers` and
//! calls the control plane role `Master`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ensure};

use crate::{
    model::{
        self, ApiSpec, AwsSpec, AzureSpec, BastionSpec, CloudConfiguration, CloudProviderId,
        CloudProviderSpec, ClusterSubnetSpec, ConfigStoreSpec, DnsAccessSpec, EtcdClusterSpec,
        EtcdMemberSpec, GceSpec, InstanceGroupRole, KubeletConfig, LoadBalancerAccessSpec,
        NetworkingPluginId, OpenstackSpec, TopologySpec,
    },
    versions::{
        AuthenticationFields, AuthorizationFields, MismatchedProviderSettingsSnafu,
        NetworkingPluginFields, Result, TargetFields, UnknownCloudProviderSnafu, WireSpec,
        parse_role, role_spelling,
    },
};

pub const VERSION_NAME: &str = "v1alpha2";

pub(crate) const ROLES: &[(&str, InstanceGroupRole)] = &[
    ("Master", InstanceGroupRole::ControlPlane),
    ("Node", InstanceGroupRole::Node),
    ("Bastion", InstanceGroupRole::Bastion),
    ("APIServer", InstanceGroupRole::ApiServer),
];
pub(crate) const ROLE_NAMES: &[&str] = &["Master", "Node", "Bastion", "APIServer"];

pub const NETWORKING_PLUGINS: &[NetworkingPluginId] = &[
    NetworkingPluginId::Classic,
    NetworkingPluginId::Kubenet,
    NetworkingPluginId::External,
    NetworkingPluginId::Cni,
    NetworkingPluginId::Kopeio,
    NetworkingPluginId::Weave,
    NetworkingPluginId::Flannel,
    NetworkingPluginId::Calico,
    NetworkingPluginId::Canal,
    NetworkingPluginId::KubeRouter,
    NetworkingPluginId::Romana,
    NetworkingPluginId::AmazonVpc,
    NetworkingPluginId::Cilium,
    NetworkingPluginId::LyftVpc,
    NetworkingPluginId::Gce,
    NetworkingPluginId::Kindnet,
];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// One of `aws`, `gce`, `azure`, `digitalocean`, `hetzner`, `openstack`
    /// or `scaleway`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,

    /// GCE only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_config: Option<CloudConfigurationSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<NetworkingPluginFields>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologySpecV2>,

    #[serde(default, rename = "networkID", skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,

    #[serde(default, rename = "networkCIDR", skip_serializing_if = "Option::is_none")]
    pub network_cidr: Option<String>,

    #[serde(default, rename = "additionalNetworkCIDRs", skip_serializing_if = "Vec::is_empty")]
    pub additional_network_cidrs: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<ClusterSubnetSpec>,

    #[serde(default, rename = "nonMasqueradeCIDR", skip_serializing_if = "Option::is_none")]
    pub non_masquerade_cidr: Option<String>,

    #[serde(default, rename = "serviceClusterIPRange", skip_serializing_if = "Option::is_none")]
    pub service_cluster_ip_range: Option<String>,

    #[serde(default, rename = "podCIDR", skip_serializing_if = "Option::is_none")]
    pub pod_cidr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<AccessSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_public_name: Option<String>,

    #[serde(default, rename = "kubernetesApiAccess", skip_serializing_if = "Vec::is_empty")]
    pub kubernetes_api_access: Vec<String>,

    #[serde(default, rename = "additionalSans", skip_serializing_if = "Vec::is_empty")]
    pub additional_sans: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationFields>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthorizationFields>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetFields>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub etcd_clusters: Vec<EtcdClusterSpecV2>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_store: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_store: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_kubelet: Option<KubeletConfig>,

    #[serde(flatten)]
    pub common: model::ClusterSpec,
}

/// `cloudConfig`, which in this version also carries provider settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfigurationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<OpenstackSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotinst_product: Option<String>,

    #[serde(flatten)]
    pub common: CloudConfiguration,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySpecV2 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masters: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bastion: Option<BastionSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSpec {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub dns_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsAccessSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancerAccessSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdClusterSpecV2 {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub etcd_members: Vec<EtcdMemberSpec>,

    #[serde(flatten)]
    pub common: EtcdClusterSpec,
}

impl From<EtcdClusterSpecV2> for EtcdClusterSpec {
    fn from(value: EtcdClusterSpecV2) -> Self {
        Self {
            members: value.etcd_members,
            ..value.common
        }
    }
}

impl From<&EtcdClusterSpec> for EtcdClusterSpecV2 {
    fn from(value: &EtcdClusterSpec) -> Self {
        Self {
            etcd_members: value.members.clone(),
            common: EtcdClusterSpec {
                members: Vec::new(),
                ..value.clone()
            },
        }
    }
}

impl From<TopologySpecV2> for TopologySpec {
    fn from(value: TopologySpecV2) -> Self {
        Self {
            control_plane: value.masters,
            nodes: value.nodes,
            bastion: value.bastion,
            dns: value.dns.and_then(|dns| dns.dns_type),
        }
    }
}

impl From<&TopologySpec> for TopologySpecV2 {
    fn from(value: &TopologySpec) -> Self {
        Self {
            masters: value.control_plane.clone(),
            nodes: value.nodes.clone(),
            bastion: value.bastion.clone(),
            dns: value.dns.clone().map(|dns_type| DnsSpec {
                dns_type: Some(dns_type),
            }),
        }
    }
}

impl WireSpec for ClusterSpec {
    type Internal = model::ClusterSpec;

    fn into_internal(self) -> Result<model::ClusterSpec> {
        let Self {
            cloud_provider,
            project,
            cloud_config,
            networking,
            topology,
            network_id,
            network_cidr,
            additional_network_cidrs,
            subnets,
            non_masquerade_cidr,
            service_cluster_ip_range,
            pod_cidr,
            api,
            master_public_name,
            kubernetes_api_access,
            additional_sans,
            authentication,
            authorization,
            target,
            etcd_clusters,
            config_base,
            key_store,
            secret_store,
            master_kubelet,
            common: mut spec,
        } = self;

        let cloud_config = cloud_config.unwrap_or_default();
        spec.cloud_provider = convert_cloud_provider(
            cloud_provider,
            project,
            cloud_config.openstack,
            cloud_config.azure,
            cloud_config.spotinst_product,
        )?;
        spec.cloud_config =
            (cloud_config.common != CloudConfiguration::default()).then_some(cloud_config.common);

        spec.networking = model::NetworkingSpec {
            plugin: networking
                .unwrap_or_default()
                .into_internal(NETWORKING_PLUGINS, VERSION_NAME)?,
            network_id,
            network_cidr,
            additional_network_cidrs,
            subnets,
            non_masquerade_cidr,
            service_cluster_ip_range,
            pod_cidr,
            topology: topology.map(TopologySpec::from),
        };

        let api = api.unwrap_or_default();
        spec.api = ApiSpec {
            dns: api.dns,
            load_balancer: api.load_balancer,
            public_name: master_public_name,
            additional_sans,
            access: kubernetes_api_access,
        };

        spec.authentication = match authentication {
            Some(fields) => fields.into_internal()?,
            None => None,
        };
        spec.authorization = match authorization {
            Some(fields) => fields.into_internal()?,
            None => None,
        };
        spec.target = match target {
            Some(fields) => fields.into_internal()?,
            None => None,
        };

        spec.etcd_clusters = etcd_clusters.into_iter().map(EtcdClusterSpec::from).collect();
        spec.config_store = ConfigStoreSpec {
            base: config_base,
            keypairs: key_store,
            secrets: secret_store,
        };
        spec.control_plane_kubelet = master_kubelet;

        Ok(spec)
    }

    fn from_internal(spec: &model::ClusterSpec) -> Result<Self> {
        let networking = &spec.networking;

        let (cloud_provider, project, provider_config) = match &spec.cloud_provider {
            Some(provider) => split_cloud_provider(provider),
            None => (None, None, CloudConfigurationSpec::default()),
        };
        let cloud_config = CloudConfigurationSpec {
            common: spec.cloud_config.clone().unwrap_or_default(),
            ..provider_config
        };

        let plugin = networking
            .plugin
            .as_ref()
            .map(|plugin| {
                NetworkingPluginFields::from_internal(plugin, NETWORKING_PLUGINS, VERSION_NAME)
            })
            .transpose()?;

        let api = AccessSpec {
            dns: spec.api.dns.clone(),
            load_balancer: spec.api.load_balancer.clone(),
        };

        Ok(Self {
            cloud_provider,
            project,
            cloud_config: (cloud_config != CloudConfigurationSpec::default()).then_some(cloud_config),
            networking: plugin,
            topology: networking.topology.as_ref().map(TopologySpecV2::from),
            network_id: networking.network_id.clone(),
            network_cidr: networking.network_cidr.clone(),
            additional_network_cidrs: networking.additional_network_cidrs.clone(),
            subnets: networking.subnets.clone(),
            non_masquerade_cidr: networking.non_masquerade_cidr.clone(),
            service_cluster_ip_range: networking.service_cluster_ip_range.clone(),
            pod_cidr: networking.pod_cidr.clone(),
            api: (api != AccessSpec::default()).then_some(api),
            master_public_name: spec.api.public_name.clone(),
            kubernetes_api_access: spec.api.access.clone(),
            additional_sans: spec.api.additional_sans.clone(),
            authentication: spec.authentication.as_ref().map(AuthenticationFields::from_internal),
            authorization: spec.authorization.map(AuthorizationFields::from_internal),
            target: spec.target.as_ref().map(TargetFields::from_internal),
            etcd_clusters: spec.etcd_clusters.iter().map(EtcdClusterSpecV2::from).collect(),
            config_base: spec.config_store.base.clone(),
            key_store: spec.config_store.keypairs.clone(),
            secret_store: spec.config_store.secrets.clone(),
            master_kubelet: spec.control_plane_kubelet.clone(),
            common: spec.clone(),
        })
    }
}

/// Reassembles the provider from its id and the settings stored elsewhere in
/// `spec`. Settings for a provider other than the selected one cannot be
/// represented internally.
fn convert_cloud_provider(
    cloud_provider: Option<String>,
    project: Option<String>,
    openstack: Option<OpenstackSpec>,
    azure: Option<AzureSpec>,
    spotinst_product: Option<String>,
) -> Result<Option<CloudProviderSpec>> {
    let id = match cloud_provider {
        Some(provider) => Some(
            CloudProviderId::from_str(&provider)
                .ok()
                .context(UnknownCloudProviderSnafu { provider })?,
        ),
        None => None,
    };

    ensure!(project.is_none() || id == Some(CloudProviderId::Gce), MismatchedProviderSettingsSnafu {
        field: "spec.project",
        expected: "gce",
    });
    ensure!(openstack.is_none() || id == Some(CloudProviderId::Openstack), MismatchedProviderSettingsSnafu {
        field: "spec.cloudConfig.openstack",
        expected: "openstack",
    });
    ensure!(azure.is_none() || id == Some(CloudProviderId::Azure), MismatchedProviderSettingsSnafu {
        field: "spec.cloudConfig.azure",
        expected: "azure",
    });
    ensure!(spotinst_product.is_none() || id == Some(CloudProviderId::Aws), MismatchedProviderSettingsSnafu {
        field: "spec.cloudConfig.spotinstProduct",
        expected: "aws",
    });

    Ok(id.map(|id| match id {
        CloudProviderId::Aws => CloudProviderSpec::Aws(AwsSpec { spotinst_product }),
        CloudProviderId::Gce => CloudProviderSpec::Gce(GceSpec { project }),
        CloudProviderId::Azure => CloudProviderSpec::Azure(azure.unwrap_or_default()),
        CloudProviderId::Openstack => CloudProviderSpec::Openstack(openstack.unwrap_or_default()),
        other => CloudProviderSpec::from_id(other),
    }))
}

fn split_cloud_provider(
    provider: &CloudProviderSpec,
) -> (Option<String>, Option<String>, CloudConfigurationSpec) {
    let id = Some(provider.id().to_string());
    let mut config = CloudConfigurationSpec::default();
    match provider {
        CloudProviderSpec::Aws(aws) => {
            config.spotinst_product = aws.spotinst_product.clone();
            (id, None, config)
        }
        CloudProviderSpec::Gce(gce) => (id, gce.project.clone(), config),
        CloudProviderSpec::Azure(azure) => {
            config.azure = (azure != &AzureSpec::default()).then(|| azure.clone());
            (id, None, config)
        }
        CloudProviderSpec::Openstack(openstack) => {
            config.openstack = (openstack != &OpenstackSpec::default()).then(|| openstack.clone());
            (id, None, config)
        }
        CloudProviderSpec::DigitalOcean(_)
        | CloudProviderSpec::Hetzner(_)
        | CloudProviderSpec::Scaleway(_) => (id, None, config),
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroupSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(flatten)]
    pub common: model::InstanceGroupSpec,
}

impl WireSpec for InstanceGroupSpec {
    type Internal = model::InstanceGroupSpec;

    fn into_internal(self) -> Result<model::InstanceGroupSpec> {
        let mut spec = self.common;
        spec.role = parse_role(self.role, ROLES, ROLE_NAMES)?;
        Ok(spec)
    }

    fn from_internal(spec: &model::InstanceGroupSpec) -> Result<Self> {
        Ok(Self {
            role: spec.role.map(|role| role_spelling(role, ROLES)),
            common: spec.clone(),
        })
    }
}
