use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Identifies a cloud provider. The string form is what sub-specs such as
/// `kubeAPIServer.cloudProvider` and the older document version use.
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum CloudProviderId {
    Aws,
    Gce,
    Azure,
    #[strum(serialize = "digitalocean")]
    DigitalOcean,
    Hetzner,
    Openstack,
    Scaleway,
}

/// Value accepted in component `cloudProvider` fields in addition to the
/// cluster's own provider.
pub const CLOUD_PROVIDER_EXTERNAL: &str = "external";

/// The selected cloud provider together with its provider-specific settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloudProviderSpec {
    Aws(AwsSpec),
    Gce(GceSpec),
    Azure(AzureSpec),
    DigitalOcean(DigitalOceanSpec),
    Hetzner(HetznerSpec),
    Openstack(OpenstackSpec),
    Scaleway(ScalewaySpec),
}

impl CloudProviderSpec {
    pub fn id(&self) -> CloudProviderId {
        match self {
            Self::Aws(_) => CloudProviderId::Aws,
            Self::Gce(_) => CloudProviderId::Gce,
            Self::Azure(_) => CloudProviderId::Azure,
            Self::DigitalOcean(_) => CloudProviderId::DigitalOcean,
            Self::Hetzner(_) => CloudProviderId::Hetzner,
            Self::Openstack(_) => CloudProviderId::Openstack,
            Self::Scaleway(_) => CloudProviderId::Scaleway,
        }
    }

    /// Builds the provider with default settings.
    pub fn from_id(id: CloudProviderId) -> Self {
        match id {
            CloudProviderId::Aws => Self::Aws(AwsSpec::default()),
            CloudProviderId::Gce => Self::Gce(GceSpec::default()),
            CloudProviderId::Azure => Self::Azure(AzureSpec::default()),
            CloudProviderId::DigitalOcean => Self::DigitalOcean(DigitalOceanSpec::default()),
            CloudProviderId::Hetzner => Self::Hetzner(HetznerSpec::default()),
            CloudProviderId::Openstack => Self::Openstack(OpenstackSpec::default()),
            CloudProviderId::Scaleway => Self::Scaleway(ScalewaySpec::default()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsSpec {
    /// Use spot instances through the Spotinst integration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotinst_product: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GceSpec {
    /// The GCP project the cluster lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureSpec {
    #[serde(default, rename = "subscriptionID", skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalOceanSpec {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HetznerSpec {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalewaySpec {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenstackSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<OpenstackRouter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loadbalancer: Option<OpenstackLoadbalancerConfig>,
}

impl OpenstackSpec {
    pub fn external_network(&self) -> Option<&str> {
        self.router.as_ref()?.external_network.as_deref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenstackRouter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_network: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_subnet: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenstackLoadbalancerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floating_network: Option<String>,
}

/// How users authenticate against the API server. At most one is selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication {
    Kopeio(KopeioAuthenticationSpec),
    Aws(AwsAuthenticationSpec),
    Oidc(OidcAuthenticationSpec),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KopeioAuthenticationSpec {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsAuthenticationSpec {
    /// One of `MountedFile`, `EKSConfigMap` or `CRD`, optionally comma-separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_mode: Option<String>,

    #[serde(default, rename = "clusterID", skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcAuthenticationSpec {
    #[serde(default, rename = "issuerURL", skip_serializing_if = "Option::is_none")]
    pub issuer_url: Option<String>,

    #[serde(default, rename = "clientID", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_claim: Option<String>,
}

/// How API requests are authorized. At most one is selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Authorization {
    AlwaysAllow,
    #[strum(serialize = "RBAC")]
    Rbac,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Terraform(TerraformSpec),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerraformSpec {
    #[serde(
        default,
        skip_serializing_if = "std::collections::BTreeMap::is_empty"
    )]
    pub provider_extra_config: std::collections::BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(CloudProviderId::Aws, "aws")]
    #[case(CloudProviderId::Gce, "gce")]
    #[case(CloudProviderId::Azure, "azure")]
    #[case(CloudProviderId::DigitalOcean, "digitalocean")]
    #[case(CloudProviderId::Hetzner, "hetzner")]
    #[case(CloudProviderId::Openstack, "openstack")]
    #[case(CloudProviderId::Scaleway, "scaleway")]
    fn cloud_provider_id_strings(#[case] id: CloudProviderId, #[case] expected: &str) {
        assert_eq!(id.to_string(), expected);
        assert_eq!(CloudProviderId::from_str(expected), Ok(id));
    }

    #[test]
    fn cloud_provider_id_round_trips_through_spec() {
        for id in CloudProviderId::iter() {
            assert_eq!(CloudProviderSpec::from_id(id).id(), id);
        }
    }

    #[test]
    fn unknown_cloud_provider() {
        assert!(CloudProviderId::from_str("vsphere").is_err());
    }
}
