//! External document versions and their conversions to and from the
//! internal model.
//!
//! Each version module declares wire types only for the parts of a document
//! whose shape differs from the internal model. Everything else is shared via
//! `#[serde(flatten)]` on the internal types.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use snafu::{Snafu, ensure};

use crate::model::{
    AmazonVpcNetworkingSpec, Authentication, Authorization, AwsAuthenticationSpec, AwsSpec,
    AzureSpec, CalicoNetworkingSpec, CanalNetworkingSpec, CiliumNetworkingSpec,
    CloudProviderSpec, CniNetworkingSpec, DigitalOceanSpec, FlannelNetworkingSpec, GceSpec,
    HetznerSpec, InstanceGroupRole, KindnetNetworkingSpec, KopeioAuthenticationSpec,
    LyftVpcNetworkingSpec, NetworkingPlugin, NetworkingPluginId, NoOptions,
    OidcAuthenticationSpec, ObjectMeta, OpenstackSpec, RomanaNetworkingSpec, ScalewaySpec,
    Target, TerraformSpec, WeaveNetworkingSpec,
};

pub mod v1alpha2;
pub mod v1alpha3;

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ConversionError {
    #[snafu(display("{field} must select exactly one of its alternatives, found {found:?}"))]
    MultipleVariants {
        field: &'static str,
        found: Vec<&'static str>,
    },

    #[snafu(display("unknown instance group role {role:?}, supported roles are {supported:?}"))]
    UnknownRole {
        role: String,
        supported: &'static [&'static str],
    },

    #[snafu(display("unknown cloud provider {provider:?}"))]
    UnknownCloudProvider { provider: String },

    #[snafu(display("{field} is only valid with cloud provider {expected:?}"))]
    MismatchedProviderSettings {
        field: &'static str,
        expected: &'static str,
    },

    #[snafu(display("{field}: {value:?} cannot be represented in {version}"))]
    NotRepresentable {
        field: &'static str,
        value: String,
        version: &'static str,
    },
}

type Result<T, E = ConversionError> = std::result::Result<T, E>;

/// The envelope shared by all documents.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<S> {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    pub spec: S,
}

/// A spec type as it appears in one document version.
pub trait WireSpec: Serialize + DeserializeOwned {
    /// The internal type this wire spec converts to.
    type Internal;

    fn into_internal(self) -> Result<Self::Internal>;

    fn from_internal(internal: &Self::Internal) -> Result<Self>;
}

/// Keysets look the same in every version.
impl WireSpec for crate::model::KeysetSpec {
    type Internal = Self;

    fn into_internal(self) -> Result<Self> {
        Ok(self)
    }

    fn from_internal(internal: &Self) -> Result<Self> {
        Ok(internal.clone())
    }
}

/// Picks the single alternative that is set. Zero alternatives yield `None`.
fn single<T>(field: &'static str, candidates: Vec<(&'static str, Option<T>)>) -> Result<Option<T>> {
    let (found, values): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .unzip();

    ensure!(found.len() <= 1, MultipleVariantsSnafu { field, found });
    Ok(values.into_iter().next())
}

/// `cloudProvider` in its object form: exactly one provider key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProviderFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gce: Option<GceSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureSpec>,

    #[serde(default, rename = "digitalocean", skip_serializing_if = "Option::is_none")]
    pub digital_ocean: Option<DigitalOceanSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hetzner: Option<HetznerSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<OpenstackSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaleway: Option<ScalewaySpec>,
}

impl CloudProviderFields {
    pub fn into_internal(self) -> Result<Option<CloudProviderSpec>> {
        single("spec.cloudProvider", vec![
            ("aws", self.aws.map(CloudProviderSpec::Aws)),
            ("gce", self.gce.map(CloudProviderSpec::Gce)),
            ("azure", self.azure.map(CloudProviderSpec::Azure)),
            ("digitalocean", self.digital_ocean.map(CloudProviderSpec::DigitalOcean)),
            ("hetzner", self.hetzner.map(CloudProviderSpec::Hetzner)),
            ("openstack", self.openstack.map(CloudProviderSpec::Openstack)),
            ("scaleway", self.scaleway.map(CloudProviderSpec::Scaleway)),
        ])
    }

    pub fn from_internal(provider: &CloudProviderSpec) -> Self {
        let mut fields = Self::default();
        match provider.clone() {
            CloudProviderSpec::Aws(spec) => fields.aws = Some(spec),
            CloudProviderSpec::Gce(spec) => fields.gce = Some(spec),
            CloudProviderSpec::Azure(spec) => fields.azure = Some(spec),
            CloudProviderSpec::DigitalOcean(spec) => fields.digital_ocean = Some(spec),
            CloudProviderSpec::Hetzner(spec) => fields.hetzner = Some(spec),
            CloudProviderSpec::Openstack(spec) => fields.openstack = Some(spec),
            CloudProviderSpec::Scaleway(spec) => fields.scaleway = Some(spec),
        }
        fields
    }
}

/// The networking plugin selection: exactly one plugin key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingPluginFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classic: Option<NoOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubenet: Option<NoOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<NoOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cni: Option<CniNetworkingSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kopeio: Option<NoOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weave: Option<WeaveNetworkingSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flannel: Option<FlannelNetworkingSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calico: Option<CalicoNetworkingSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canal: Option<CanalNetworkingSpec>,

    #[serde(default, rename = "kuberouter", skip_serializing_if = "Option::is_none")]
    pub kube_router: Option<NoOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romana: Option<RomanaNetworkingSpec>,

    #[serde(default, rename = "amazonvpc", skip_serializing_if = "Option::is_none")]
    pub amazon_vpc: Option<AmazonVpcNetworkingSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cilium: Option<CiliumNetworkingSpec>,

    #[serde(default, rename = "lyftvpc", skip_serializing_if = "Option::is_none")]
    pub lyft_vpc: Option<LyftVpcNetworkingSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gce: Option<NoOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kindnet: Option<KindnetNetworkingSpec>,
}

impl NetworkingPluginFields {
    /// Converts to the internal plugin, rejecting plugins the version does
    /// not know.
    pub fn into_internal(
        self,
        supported: &[NetworkingPluginId],
        version: &'static str,
    ) -> Result<Option<NetworkingPlugin>> {
        let plugin = single("spec.networking", vec![
            ("classic", self.classic.map(NetworkingPlugin::Classic)),
            ("kubenet", self.kubenet.map(NetworkingPlugin::Kubenet)),
            ("external", self.external.map(NetworkingPlugin::External)),
            ("cni", self.cni.map(NetworkingPlugin::Cni)),
            ("kopeio", self.kopeio.map(NetworkingPlugin::Kopeio)),
            ("weave", self.weave.map(NetworkingPlugin::Weave)),
            ("flannel", self.flannel.map(NetworkingPlugin::Flannel)),
            ("calico", self.calico.map(NetworkingPlugin::Calico)),
            ("canal", self.canal.map(NetworkingPlugin::Canal)),
            ("kuberouter", self.kube_router.map(NetworkingPlugin::KubeRouter)),
            ("romana", self.romana.map(NetworkingPlugin::Romana)),
            ("amazonvpc", self.amazon_vpc.map(NetworkingPlugin::AmazonVpc)),
            ("cilium", self.cilium.map(NetworkingPlugin::Cilium)),
            ("lyftvpc", self.lyft_vpc.map(NetworkingPlugin::LyftVpc)),
            ("gce", self.gce.map(NetworkingPlugin::Gce)),
            ("kindnet", self.kindnet.map(NetworkingPlugin::Kindnet)),
        ])?;

        if let Some(plugin) = &plugin {
            check_plugin_supported(plugin, supported, version)?;
        }
        Ok(plugin)
    }

    pub fn from_internal(
        plugin: &NetworkingPlugin,
        supported: &[NetworkingPluginId],
        version: &'static str,
    ) -> Result<Self> {
        check_plugin_supported(plugin, supported, version)?;

        let mut fields = Self::default();
        match plugin.clone() {
            NetworkingPlugin::Classic(spec) => fields.classic = Some(spec),
            NetworkingPlugin::Kubenet(spec) => fields.kubenet = Some(spec),
            NetworkingPlugin::External(spec) => fields.external = Some(spec),
            NetworkingPlugin::Cni(spec) => fields.cni = Some(spec),
            NetworkingPlugin::Kopeio(spec) => fields.kopeio = Some(spec),
            NetworkingPlugin::Weave(spec) => fields.weave = Some(spec),
            NetworkingPlugin::Flannel(spec) => fields.flannel = Some(spec),
            NetworkingPlugin::Calico(spec) => fields.calico = Some(spec),
            NetworkingPlugin::Canal(spec) => fields.canal = Some(spec),
            NetworkingPlugin::KubeRouter(spec) => fields.kube_router = Some(spec),
            NetworkingPlugin::Romana(spec) => fields.romana = Some(spec),
            NetworkingPlugin::AmazonVpc(spec) => fields.amazon_vpc = Some(spec),
            NetworkingPlugin::Cilium(spec) => fields.cilium = Some(spec),
            NetworkingPlugin::LyftVpc(spec) => fields.lyft_vpc = Some(spec),
            NetworkingPlugin::Gce(spec) => fields.gce = Some(spec),
            NetworkingPlugin::Kindnet(spec) => fields.kindnet = Some(spec),
        }
        Ok(fields)
    }
}

fn check_plugin_supported(
    plugin: &NetworkingPlugin,
    supported: &[NetworkingPluginId],
    version: &'static str,
) -> Result<()> {
    let id = plugin.id();
    ensure!(supported.contains(&id), NotRepresentableSnafu {
        field: "spec.networking",
        value: id.to_string(),
        version,
    });
    Ok(())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kopeio: Option<KopeioAuthenticationSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsAuthenticationSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc: Option<OidcAuthenticationSpec>,
}

impl AuthenticationFields {
    pub fn into_internal(self) -> Result<Option<Authentication>> {
        single("spec.authentication", vec![
            ("kopeio", self.kopeio.map(Authentication::Kopeio)),
            ("aws", self.aws.map(Authentication::Aws)),
            ("oidc", self.oidc.map(Authentication::Oidc)),
        ])
    }

    pub fn from_internal(authentication: &Authentication) -> Self {
        let mut fields = Self::default();
        match authentication.clone() {
            Authentication::Kopeio(spec) => fields.kopeio = Some(spec),
            Authentication::Aws(spec) => fields.aws = Some(spec),
            Authentication::Oidc(spec) => fields.oidc = Some(spec),
        }
        fields
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlwaysAllowAuthorizationSpec {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacAuthorizationSpec {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_allow: Option<AlwaysAllowAuthorizationSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbac: Option<RbacAuthorizationSpec>,
}

impl AuthorizationFields {
    pub fn into_internal(self) -> Result<Option<Authorization>> {
        single("spec.authorization", vec![
            ("alwaysAllow", self.always_allow.map(|_| Authorization::AlwaysAllow)),
            ("rbac", self.rbac.map(|_| Authorization::Rbac)),
        ])
    }

    pub fn from_internal(authorization: Authorization) -> Self {
        match authorization {
            Authorization::AlwaysAllow => Self {
                always_allow: Some(AlwaysAllowAuthorizationSpec {}),
                rbac: None,
            },
            Authorization::Rbac => Self {
                always_allow: None,
                rbac: Some(RbacAuthorizationSpec {}),
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform: Option<TerraformSpec>,
}

impl TargetFields {
    pub fn into_internal(self) -> Result<Option<Target>> {
        single("spec.target", vec![(
            "terraform",
            self.terraform.map(Target::Terraform),
        )])
    }

    pub fn from_internal(target: &Target) -> Self {
        match target.clone() {
            Target::Terraform(spec) => Self {
                terraform: Some(spec),
            },
        }
    }
}

/// Converts a role string of a given document version. Absent roles stay
/// absent and are reported by validation.
fn parse_role(
    role: Option<String>,
    spellings: &'static [(&'static str, InstanceGroupRole)],
    supported: &'static [&'static str],
) -> Result<Option<InstanceGroupRole>> {
    let Some(role) = role else {
        return Ok(None);
    };
    spellings
        .iter()
        .find(|(spelling, _)| *spelling == role)
        .map(|(_, role)| Some(*role))
        .ok_or(ConversionError::UnknownRole { role, supported })
}

fn role_spelling(
    role: InstanceGroupRole,
    spellings: &'static [(&'static str, InstanceGroupRole)],
) -> String {
    spellings
        .iter()
        .find(|(_, candidate)| *candidate == role)
        .map_or_else(|| role.to_string(), |(spelling, _)| (*spelling).to_owned())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn single_picks_the_one_set_value() {
        let picked = single("x", vec![("a", None), ("b", Some(2)), ("c", None)]);
        assert_eq!(picked, Ok(Some(2)));
    }

    #[test]
    fn single_allows_none() {
        assert_eq!(single::<i32>("x", vec![("a", None)]), Ok(None));
    }

    #[test]
    fn single_rejects_two() {
        let picked = single("spec.cloudProvider", vec![("aws", Some(1)), ("gce", Some(2))]);
        assert_eq!(
            picked,
            Err(ConversionError::MultipleVariants {
                field: "spec.cloudProvider",
                found: vec!["aws", "gce"],
            })
        );
    }

    #[rstest]
    #[case(Some("Master"), Ok(Some(InstanceGroupRole::ControlPlane)))]
    #[case(Some("Node"), Ok(Some(InstanceGroupRole::Node)))]
    #[case(None, Ok(None))]
    fn parse_v1alpha2_roles(
        #[case] input: Option<&str>,
        #[case] expected: Result<Option<InstanceGroupRole>>,
    ) {
        let parsed = parse_role(
            input.map(str::to_owned),
            v1alpha2::ROLES,
            v1alpha2::ROLE_NAMES,
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parse_unknown_role() {
        let parsed = parse_role(Some("ControlPlane".to_owned()), v1alpha2::ROLES, v1alpha2::ROLE_NAMES);
        assert!(matches!(parsed, Err(ConversionError::UnknownRole { .. })));
    }

    #[test]
    fn authorization_fields_round_trip() {
        for authorization in [Authorization::AlwaysAllow, Authorization::Rbac] {
            let fields = AuthorizationFields::from_internal(authorization);
            assert_eq!(fields.into_internal(), Ok(Some(authorization)));
        }
    }
}
