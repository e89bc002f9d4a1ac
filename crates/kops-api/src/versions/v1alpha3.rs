//! The `kops/v1alpha3` document format.
//!
//! Networking settings are grouped under `spec.networking`, the cloud
//! provider is an object with one key per provider, and the control plane
//! role is called `ControlPlane`.

use serde::{Deserialize, Serialize};

use crate::{
    model::{
        self, ApiSpec, CloudConfiguration, ClusterSubnetSpec, ConfigStoreSpec, EtcdClusterSpec,
        InstanceGroupRole, KubeletConfig, NetworkingPluginId, TopologySpec,
    },
    versions::{
        AuthenticationFields, AuthorizationFields, CloudProviderFields, NetworkingPluginFields,
        Result, TargetFields, WireSpec, parse_role, role_spelling,
    },
};

pub const VERSION_NAME: &str = "v1alpha3";

pub(crate) const ROLES: &[(&str, InstanceGroupRole)] = &[
    ("ControlPlane", InstanceGroupRole::ControlPlane),
    ("Node", InstanceGroupRole::Node),
    ("Bastion", InstanceGroupRole::Bastion),
    ("APIServer", InstanceGroupRole::ApiServer),
];
pub(crate) const ROLE_NAMES: &[&str] = &["ControlPlane", "Node", "Bastion", "APIServer"];

/// Plugins that were retired before this version was introduced are absent.
pub const NETWORKING_PLUGINS: &[NetworkingPluginId] = &[
    NetworkingPluginId::Kubenet,
    NetworkingPluginId::External,
    NetworkingPluginId::Cni,
    NetworkingPluginId::Kopeio,
    NetworkingPluginId::Weave,
    NetworkingPluginId::Flannel,
    NetworkingPluginId::Calico,
    NetworkingPluginId::Canal,
    NetworkingPluginId::KubeRouter,
    NetworkingPluginId::AmazonVpc,
    NetworkingPluginId::Cilium,
    NetworkingPluginId::Gce,
    NetworkingPluginId::Kindnet,
];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<CloudProviderFields>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<NetworkingSpec>,

    #[serde(default, skip_serializing_if = "ApiSpec::is_empty")]
    pub api: ApiSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationFields>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthorizationFields>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetFields>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub etcd_clusters: Vec<EtcdClusterSpec>,

    #[serde(default, skip_serializing_if = "ConfigStoreSpec::is_empty")]
    pub config_store: ConfigStoreSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_config: Option<CloudConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_kubelet: Option<KubeletConfig>,

    #[serde(flatten)]
    pub common: model::ClusterSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingSpec {
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
    pub topology: Option<TopologySpec>,

    #[serde(flatten)]
    pub plugin: NetworkingPluginFields,
}

impl WireSpec for ClusterSpec {
    type Internal = model::ClusterSpec;

    fn into_internal(self) -> Result<model::ClusterSpec> {
        let Self {
            cloud_provider,
            networking,
            api,
            authentication,
            authorization,
            target,
            etcd_clusters,
            config_store,
            cloud_config,
            control_plane_kubelet,
            common: mut spec,
        } = self;

        spec.cloud_provider = match cloud_provider {
            Some(fields) => fields.into_internal()?,
            None => None,
        };

        let networking = networking.unwrap_or_default();
        spec.networking = model::NetworkingSpec {
            plugin: networking
                .plugin
                .into_internal(NETWORKING_PLUGINS, VERSION_NAME)?,
            network_id: networking.network_id,
            network_cidr: networking.network_cidr,
            additional_network_cidrs: networking.additional_network_cidrs,
            subnets: networking.subnets,
            non_masquerade_cidr: networking.non_masquerade_cidr,
            service_cluster_ip_range: networking.service_cluster_ip_range,
            pod_cidr: networking.pod_cidr,
            topology: networking.topology,
        };

        spec.api = api;
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
        spec.etcd_clusters = etcd_clusters;
        spec.config_store = config_store;
        spec.cloud_config = cloud_config;
        spec.control_plane_kubelet = control_plane_kubelet;

        Ok(spec)
    }

    fn from_internal(spec: &model::ClusterSpec) -> Result<Self> {
        let networking = &spec.networking;
        let plugin = match &networking.plugin {
            Some(plugin) => {
                NetworkingPluginFields::from_internal(plugin, NETWORKING_PLUGINS, VERSION_NAME)?
            }
            None => NetworkingPluginFields::default(),
        };
        let networking = NetworkingSpec {
            network_id: networking.network_id.clone(),
            network_cidr: networking.network_cidr.clone(),
            additional_network_cidrs: networking.additional_network_cidrs.clone(),
            subnets: networking.subnets.clone(),
            non_masquerade_cidr: networking.non_masquerade_cidr.clone(),
            service_cluster_ip_range: networking.service_cluster_ip_range.clone(),
            pod_cidr: networking.pod_cidr.clone(),
            topology: networking.topology.clone(),
            plugin,
        };

        Ok(Self {
            cloud_provider: spec.cloud_provider.as_ref().map(CloudProviderFields::from_internal),
            networking: (networking != NetworkingSpec::default()).then_some(networking),
            api: spec.api.clone(),
            authentication: spec.authentication.as_ref().map(AuthenticationFields::from_internal),
            authorization: spec.authorization.map(AuthorizationFields::from_internal),
            target: spec.target.as_ref().map(TargetFields::from_internal),
            etcd_clusters: spec.etcd_clusters.clone(),
            config_store: spec.config_store.clone(),
            cloud_config: spec.cloud_config.clone(),
            control_plane_kubelet: spec.control_plane_kubelet.clone(),
            common: spec.clone(),
        })
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

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::{
        model::{CloudProviderSpec, NetworkingPlugin, NoOptions},
        versions::ConversionError,
    };

    #[test]
    fn decode_nested_networking() {
        let spec: ClusterSpec = serde_yaml::from_str(indoc! {"
            cloudProvider:
              gce:
                project: my-project
            kubernetesVersion: 1.30.0
            networking:
              kindnet: {}
              nonMasqueradeCIDR: 100.64.0.0/10
              topology:
                controlPlane: private
                nodes: private
                dns: Private
              subnets:
              - name: us-east1
                region: us-east1
                type: Private
            api:
              publicName: api.example.com
              access:
              - 0.0.0.0/0
        "})
        .expect("spec must deserialize");

        let spec = spec.into_internal().expect("spec must convert");
        assert_eq!(spec.kubernetes_version.as_deref(), Some("1.30.0"));
        assert!(matches!(spec.cloud_provider, Some(CloudProviderSpec::Gce(ref gce)) if gce.project.as_deref() == Some("my-project")));
        assert!(matches!(spec.networking.plugin, Some(NetworkingPlugin::Kindnet(_))));
        assert_eq!(spec.networking.non_masquerade_cidr.as_deref(), Some("100.64.0.0/10"));
        assert_eq!(spec.networking.subnets[0].region.as_deref(), Some("us-east1"));
        assert_eq!(spec.api.public_name.as_deref(), Some("api.example.com"));
        assert_eq!(spec.api.access, vec!["0.0.0.0/0".to_owned()]);
    }

    #[test]
    fn classic_networking_is_not_representable() {
        let spec: ClusterSpec =
            serde_yaml::from_str("networking:\n  classic: {}\n").expect("spec must deserialize");
        assert!(matches!(
            spec.into_internal(),
            Err(ConversionError::NotRepresentable { .. })
        ));

        let mut internal = model::ClusterSpec::default();
        internal.networking.plugin = Some(NetworkingPlugin::Classic(NoOptions {}));
        assert!(matches!(
            ClusterSpec::from_internal(&internal),
            Err(ConversionError::NotRepresentable { version: "v1alpha3", .. })
        ));
    }

    #[test]
    fn two_cloud_providers_are_rejected() {
        let spec: ClusterSpec = serde_yaml::from_str(indoc! {"
            cloudProvider:
              aws: {}
              gce: {}
        "})
        .expect("spec must deserialize");
        assert!(matches!(
            spec.into_internal(),
            Err(ConversionError::MultipleVariants { .. })
        ));
    }

    #[test]
    fn control_plane_role() {
        let spec: InstanceGroupSpec =
            serde_yaml::from_str("role: ControlPlane\nminSize: 1\n").expect("spec must deserialize");
        let spec = spec.into_internal().expect("spec must convert");
        assert_eq!(spec.role, Some(InstanceGroupRole::ControlPlane));
        assert_eq!(spec.min_size, Some(1));

        let spec: InstanceGroupSpec =
            serde_yaml::from_str("role: Master\n").expect("spec must deserialize");
        assert!(matches!(
            spec.into_internal(),
            Err(ConversionError::UnknownRole { .. })
        ));
    }
}
