//! Rules that only apply to clusters and instance groups on AWS.

use std::{collections::HashSet, net::IpAddr, str::FromStr, sync::LazyLock};

use ipnet::IpNet;
use regex::Regex;
use strum::{Display, EnumString};

use crate::{
    model::{
        Cluster, ClusterSpec, InstanceGroup, InstanceGroupSpec, InstanceMetadataOptions,
        LOAD_BALANCER_CLASS_NETWORK, LOAD_BALANCER_TYPE_INTERNAL, LoadBalancerAccessSpec,
        MixedInstancesPolicySpec,
    },
    validation::{
        ErrorList, FieldError, Path,
        primitives::is_valid_value,
    },
};

const SUPPORTED_SPOT_DURATIONS: &[&str] = &["60", "120", "180", "240", "300", "360"];

const SUPPORTED_INSTANCE_INTERRUPTION_BEHAVIORS: &[&str] = &["hibernate", "stop", "terminate"];

const SUPPORTED_HTTP_TOKENS: &[&str] = &["optional", "required"];

const SUPPORTED_CPU_CREDITS: &[&str] = &["standard", "unlimited"];

const SECURITY_GROUP_PREFIX: &str = "sg-";

static MACHINE_SIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(nano|micro|small|medium|large|xlarge|[1-9][0-9]?xlarge|metal)$")
        .expect("failed to compile machine size regex")
});

/// CPU architecture of a machine type or an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Architecture {
    Amd64,
    Arm64,
}

impl Architecture {
    /// Guesses the architecture from an image name. Images without an ARM
    /// marker are assumed to be amd64.
    pub fn of_image(image: &str) -> Self {
        let image = image.to_ascii_lowercase();
        if image.contains("arm64") || image.contains("aarch64") {
            Self::Arm64
        } else {
            Self::Amd64
        }
    }
}

/// A known EC2 instance family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineFamily {
    pub name: &'static str,
    pub architecture: Architecture,
    pub gpu: bool,
}

const fn family(name: &'static str, architecture: Architecture, gpu: bool) -> MachineFamily {
    MachineFamily {
        name,
        architecture,
        gpu,
    }
}

const MACHINE_FAMILIES: &[MachineFamily] = &[
    family("t2", Architecture::Amd64, false),
    family("t3", Architecture::Amd64, false),
    family("t3a", Architecture::Amd64, false),
    family("t4g", Architecture::Arm64, false),
    family("m4", Architecture::Amd64, false),
    family("m5", Architecture::Amd64, false),
    family("m5a", Architecture::Amd64, false),
    family("m6g", Architecture::Arm64, false),
    family("m6i", Architecture::Amd64, false),
    family("c4", Architecture::Amd64, false),
    family("c5", Architecture::Amd64, false),
    family("c6g", Architecture::Arm64, false),
    family("r5", Architecture::Amd64, false),
    family("a1", Architecture::Arm64, false),
    family("g4dn", Architecture::Amd64, true),
    family("g4ad", Architecture::Amd64, true),
    family("p3", Architecture::Amd64, true),
];

/// Looks up the family of a machine type such as `m5.large`.
pub fn machine_family(machine_type: &str) -> Option<&'static MachineFamily> {
    let (family, size) = machine_type.split_once('.')?;
    if !MACHINE_SIZE_REGEX.is_match(size) {
        return None;
    }
    MACHINE_FAMILIES.iter().find(|known| known.name == family)
}

/// The parts of an AWS resource name,
/// `arn:<partition>:<service>:<region>:<account>:<resource>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account_id: &'a str,
    pub resource: &'a str,
}

impl<'a> Arn<'a> {
    pub fn parse(value: &'a str) -> Option<Self> {
        let mut parts = value.splitn(6, ':');
        if parts.next()? != "arn" {
            return None;
        }
        let arn = Self {
            partition: parts.next()?,
            service: parts.next()?,
            region: parts.next()?,
            account_id: parts.next()?,
            resource: parts.next()?,
        };

        let complete =
            !arn.partition.is_empty() && !arn.service.is_empty() && !arn.resource.is_empty();
        complete.then_some(arn)
    }
}

pub(super) fn validate_cluster(cluster: &Cluster) -> ErrorList {
    let mut errors = ErrorList::new();
    let spec = &cluster.spec;
    let spec_path = Path::new("spec");
    let networking_path = spec_path.child("networking");

    if spec.networking.network_cidr.is_none() {
        errors.push(FieldError::required(
            &networking_path.child("networkCIDR"),
            "Cluster did not have NetworkCIDR set",
        ));
    }

    for (i, subnet) in spec.networking.subnets.iter().enumerate() {
        if subnet.zone.as_deref().is_none_or(str::is_empty) {
            errors.push(FieldError::required(
                &networking_path.child("subnets").index(i).child("zone"),
                "subnets on AWS must name an availability zone",
            ));
        }
    }

    if let Some(load_balancer) = &spec.api.load_balancer {
        let lb_path = spec_path.child("api").child("loadBalancer");
        validate_security_groups(
            &load_balancer.additional_security_groups,
            &lb_path.child("additionalSecurityGroups"),
            &mut errors,
        );
        if let Some(group) = load_balancer.security_group_override.as_deref() {
            validate_security_group_override(group, &lb_path.child("securityGroupOverride"), &mut errors);
        }
        validate_ssl_policy(load_balancer, &lb_path.child("sslPolicy"), &mut errors);
        validate_load_balancer_subnets(spec, load_balancer, &lb_path.child("subnets"), &mut errors);
    }

    validate_external_cloud_controller_manager(spec, &mut errors);

    errors
}

fn validate_security_groups(groups: &[String], path: &Path, errors: &mut ErrorList) {
    let mut seen = HashSet::new();
    for (i, group) in groups.iter().enumerate() {
        let field = path.index(i);
        if !seen.insert(group.as_str()) {
            errors.push(FieldError::duplicate(&field, group.as_str()));
        }

        if group.trim().is_empty() {
            errors.push(FieldError::invalid(
                &field,
                group.as_str(),
                "security group cannot be empty, if specified",
            ));
        } else if !group.starts_with(SECURITY_GROUP_PREFIX) {
            errors.push(FieldError::invalid(
                &field,
                group.as_str(),
                "security group does not match the expected AWS format",
            ));
        }
    }
}

fn validate_security_group_override(group: &str, path: &Path, errors: &mut ErrorList) {
    if !group.starts_with(SECURITY_GROUP_PREFIX) {
        errors.push(FieldError::invalid(
            path,
            group,
            "security group does not match the expected AWS format",
        ));
    }
}

fn validate_ssl_policy(load_balancer: &LoadBalancerAccessSpec, path: &Path, errors: &mut ErrorList) {
    if load_balancer.ssl_policy.is_none() {
        return;
    }

    if load_balancer.class.as_deref() != Some(LOAD_BALANCER_CLASS_NETWORK) {
        errors.push(FieldError::forbidden(
            path,
            "sslPolicy should be specified with Network Load Balancer",
        ));
    }
    if load_balancer.ssl_certificate.as_deref().is_none_or(str::is_empty) {
        errors.push(FieldError::forbidden(
            path,
            "sslPolicy should not be specified without SSLCertificate",
        ));
    }
}

fn validate_load_balancer_subnets(
    spec: &ClusterSpec,
    load_balancer: &LoadBalancerAccessSpec,
    path: &Path,
    errors: &mut ErrorList,
) {
    let network = load_balancer.class.as_deref() == Some(LOAD_BALANCER_CLASS_NETWORK);
    let internal = load_balancer.lb_type.as_deref() == Some(LOAD_BALANCER_TYPE_INTERNAL);

    for (i, subnet) in load_balancer.subnets.iter().enumerate() {
        let subnet_path = path.index(i);

        let cluster_subnet = if subnet.name.is_empty() {
            errors.push(FieldError::required(
                &subnet_path.child("name"),
                "subnet name can't be empty",
            ));
            None
        } else {
            let found = spec.subnet(&subnet.name);
            if found.is_none() {
                errors.push(FieldError::not_found(
                    &subnet_path.child("name"),
                    subnet.name.as_str(),
                    format!("subnet {:?} not found in cluster subnets", subnet.name),
                ));
            }
            found
        };

        if let Some(address) = subnet.private_ipv4_address.as_deref() {
            let field = subnet_path.child("privateIPv4Address");
            match IpAddr::from_str(address) {
                _ if address.is_empty() => errors.push(FieldError::required(
                    &field,
                    "privateIPv4Address can't be empty",
                )),
                Ok(ip @ IpAddr::V4(_)) => {
                    let subnet_cidr = cluster_subnet
                        .and_then(|cluster_subnet| cluster_subnet.cidr.as_deref())
                        .and_then(|cidr| IpNet::from_str(cidr).ok());
                    if subnet_cidr.is_some_and(|cidr| !cidr.contains(&ip)) {
                        errors.push(FieldError::invalid(
                            &field,
                            address,
                            "privateIPv4Address is not part of the subnet CIDR",
                        ));
                    }
                }
                _ => errors.push(FieldError::invalid(
                    &field,
                    address,
                    "privateIPv4Address is not a valid IPv4 address",
                )),
            }

            if !network || !internal {
                errors.push(FieldError::forbidden(
                    &field,
                    "privateIPv4Address only allowed for internal NLBs",
                ));
            }
        }

        if let Some(allocation_id) = subnet.allocation_id.as_deref() {
            let field = subnet_path.child("allocationID");
            if allocation_id.is_empty() {
                errors.push(FieldError::required(&field, "allocationID can't be empty"));
            }
            if !network || internal {
                errors.push(FieldError::forbidden(
                    &field,
                    "allocationID only allowed for Public NLBs",
                ));
            }
        }
    }
}

fn validate_external_cloud_controller_manager(spec: &ClusterSpec, errors: &mut ErrorList) {
    if spec.external_cloud_controller_manager.is_none() {
        return;
    }
    let path = Path::new("spec").child("externalCloudControllerManager");

    if !spec.is_kubernetes_gte(1, 18, 0) {
        errors.push(FieldError::forbidden(
            &path,
            "AWS external CCM requires kubernetes 1.18+",
        ));
    }

    let ebs_csi_disabled = spec
        .cloud_config
        .as_ref()
        .is_some_and(|config| config.ebs_csi_driver_disabled());
    if ebs_csi_disabled {
        errors.push(FieldError::forbidden(
            &path,
            "AWS external CCM cannot be used without enabling spec.cloudConfig.AWSEBSCSIDriver.",
        ));
    }
}

pub(super) fn validate_instance_group(ig: &InstanceGroup) -> ErrorList {
    let mut errors = ErrorList::new();
    let spec = &ig.spec;
    let spec_path = Path::new("spec");

    validate_security_groups(
        &spec.additional_security_groups,
        &spec_path.child("additionalSecurityGroups"),
        &mut errors,
    );
    if let Some(group) = spec.security_group_override.as_deref() {
        validate_security_group_override(group, &spec_path.child("securityGroupOverride"), &mut errors);
    }

    if let Some(machine_type) = spec.machine_type.as_deref() {
        validate_machine_types(
            machine_type,
            spec.image.as_deref(),
            &spec_path.child("machineType"),
            &mut errors,
        );
    }

    if let Some(duration) = spec.spot_duration_in_minutes {
        errors.extend(is_valid_value(
            &spec_path.child("spotDurationInMinutes"),
            Some(duration.to_string().as_str()),
            SUPPORTED_SPOT_DURATIONS,
        ));
    }

    errors.extend(is_valid_value(
        &spec_path.child("instanceInterruptionBehavior"),
        spec.instance_interruption_behavior.as_deref(),
        SUPPORTED_INSTANCE_INTERRUPTION_BEHAVIORS,
    ));

    if let Some(policy) = &spec.mixed_instances_policy {
        validate_mixed_instances_policy(
            spec,
            policy,
            &spec_path.child("mixedInstancesPolicy"),
            &mut errors,
        );
    }

    if let Some(metadata) = &spec.instance_metadata {
        validate_instance_metadata(metadata, &spec_path.child("instanceMetadata"), &mut errors);
    }

    errors.extend(is_valid_value(
        &spec_path.child("cpuCredits"),
        spec.cpu_credits.as_deref(),
        SUPPORTED_CPU_CREDITS,
    ));

    errors
}

/// Checks a comma-separated list of machine types against the known
/// families and the architecture of the image.
fn validate_machine_types(
    machine_types: &str,
    image: Option<&str>,
    path: &Path,
    errors: &mut ErrorList,
) {
    let image_architecture = image.map(Architecture::of_image);

    for machine_type in machine_types.split(',').map(str::trim) {
        let Some(family) = machine_family(machine_type) else {
            errors.push(FieldError::invalid(
                path,
                machine_types,
                format!("machine type specified is invalid: {machine_type:?}"),
            ));
            continue;
        };

        if let Some(image_architecture) = image_architecture {
            if family.architecture != image_architecture {
                errors.push(FieldError::invalid(
                    path,
                    machine_types,
                    format!(
                        "machine type architecture does not match image architecture: {:?} - {:?}",
                        family.architecture.to_string(),
                        image_architecture.to_string()
                    ),
                ));
            }
        }
    }
}

fn validate_mixed_instances_policy(
    spec: &InstanceGroupSpec,
    policy: &MixedInstancesPolicySpec,
    path: &Path,
    errors: &mut ErrorList,
) {
    let main_gpu = spec
        .machine_types()
        .first()
        .and_then(|machine_type| machine_family(machine_type))
        .map(|family| family.gpu);

    for (i, instance_types) in policy.instances.iter().enumerate() {
        let field = path.child("instances").index(i);
        validate_machine_types(instance_types, spec.image.as_deref(), &field, errors);

        let Some(main_gpu) = main_gpu else {
            continue;
        };
        let mixes_gpu = instance_types
            .split(',')
            .filter_map(|machine_type| machine_family(machine_type.trim()))
            .any(|family| family.gpu != main_gpu);
        if mixes_gpu {
            errors.push(FieldError::forbidden(
                &field,
                "Cannot mix GPU and non-GPU machine types in the same Instance Group",
            ));
        }
    }
}

fn validate_instance_metadata(
    metadata: &InstanceMetadataOptions,
    path: &Path,
    errors: &mut ErrorList,
) {
    errors.extend(is_valid_value(
        &path.child("httpTokens"),
        metadata.http_tokens.as_deref(),
        SUPPORTED_HTTP_TOKENS,
    ));

    if let Some(limit) = metadata.http_put_response_hop_limit {
        if !(1..=64).contains(&limit) {
            errors.push(FieldError::invalid(
                &path.child("httpPutResponseHopLimit"),
                limit,
                "HTTPPutResponseLimit must be a value between 1 and 64",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        model::{CloudConfiguration, AwsEbsCsiDriver, CloudControllerManagerConfig, LoadBalancerSubnetSpec},
        validation::fixtures::{self, render},
    };

    #[rstest]
    #[case("m5.large", Some(Architecture::Amd64), false)]
    #[case("t2.micro", Some(Architecture::Amd64), false)]
    #[case("a1.large", Some(Architecture::Arm64), false)]
    #[case("t4g.nano", Some(Architecture::Arm64), false)]
    #[case("g4ad.16xlarge", Some(Architecture::Amd64), true)]
    #[case("p3.2xlarge", Some(Architecture::Amd64), true)]
    #[case("t2.invalidType", None, false)]
    #[case("z9.large", None, false)]
    #[case("m5", None, false)]
    fn machine_families(
        #[case] machine_type: &str,
        #[case] architecture: Option<Architecture>,
        #[case] gpu: bool,
    ) {
        let family = machine_family(machine_type);
        assert_eq!(family.map(|f| f.architecture), architecture);
        assert_eq!(family.is_some_and(|f| f.gpu), gpu);
    }

    #[rstest]
    #[case("ubuntu/ubuntu-jammy-22.04-amd64-server-20240101", Architecture::Amd64)]
    #[case("ubuntu/ubuntu-jammy-22.04-arm64-server-20240101", Architecture::Arm64)]
    #[case("debian-12-aarch64", Architecture::Arm64)]
    #[case("ami-073c8c0760395aab8", Architecture::Amd64)]
    fn image_architecture(#[case] image: &str, #[case] expected: Architecture) {
        assert_eq!(Architecture::of_image(image), expected);
    }

    #[rstest]
    #[case("arn:aws:iam::123456789012:instance-profile/nodes", Some(("aws", "iam", "instance-profile/nodes")))]
    #[case("arn:aws-us-gov:s3:::bucket/key:with:colons", Some(("aws-us-gov", "s3", "bucket/key:with:colons")))]
    #[case("arn:aws:iam::123456789012:", None)]
    #[case("arn::iam::123456789012:role/x", None)]
    #[case("nra:aws:iam::123456789012:role/x", None)]
    #[case("arn:aws:iam", None)]
    fn arns(#[case] value: &str, #[case] expected: Option<(&str, &str, &str)>) {
        let arn = Arn::parse(value).map(|arn| (arn.partition, arn.service, arn.resource));
        assert_eq!(arn, expected);
    }

    fn validate_group(change: impl FnOnce(&mut InstanceGroupSpec)) -> Vec<String> {
        let mut ig = fixtures::nodes();
        change(&mut ig.spec);
        render(&validate_instance_group(&ig))
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&["sg-1234"], &[])]
    #[case(&["sg-1234", "sg-1234"], &["Duplicate value::spec.additionalSecurityGroups[1]"])]
    #[case(&["sg-1234", "sg-abcd", " "], &["Invalid value::spec.additionalSecurityGroups[2]"])]
    #[case(&["sg-1234", "abcd"], &["Invalid value::spec.additionalSecurityGroups[1]"])]
    #[case(&["", ""], &["Invalid value::spec.additionalSecurityGroups[0]", "Duplicate value::spec.additionalSecurityGroups[1]", "Invalid value::spec.additionalSecurityGroups[1]"])]
    fn security_groups(#[case] groups: &[&str], #[case] expected: &[&str]) {
        let groups = groups.iter().map(|g| (*g).to_owned()).collect::<Vec<_>>();
        assert_eq!(validate_group(|spec| spec.additional_security_groups = groups), expected);
    }

    #[rstest]
    #[case("t2.micro", &[])]
    #[case("m4.large", &[])]
    #[case("c5.large", &[])]
    #[case("t3.medium,m5.large", &[])]
    #[case("t2.invalidType", &["Invalid value::spec.machineType"])]
    #[case("a1.large", &["Invalid value::spec.machineType"])]
    fn machine_types(#[case] machine_type: &str, #[case] expected: &[&str]) {
        assert_eq!(
            validate_group(|spec| spec.machine_type = Some(machine_type.to_owned())),
            expected
        );
    }

    #[test]
    fn arm_image_with_arm_machine() {
        let errors = validate_group(|spec| {
            spec.machine_type = Some("m6g.large".to_owned());
            spec.image = Some("ubuntu/ubuntu-jammy-22.04-arm64-server-20240101".to_owned());
        });
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn machine_type_details() {
        let mut ig = fixtures::nodes();
        ig.spec.machine_type = Some("a1.large".to_owned());
        let errors = validate_instance_group(&ig);
        assert_eq!(
            errors.as_slice()[0].detail,
            r#"machine type architecture does not match image architecture: "arm64" - "amd64""#
        );
    }

    #[rstest]
    #[case(60, &[])]
    #[case(120, &[])]
    #[case(360, &[])]
    #[case(55, &["Unsupported value::spec.spotDurationInMinutes"])]
    #[case(125, &["Unsupported value::spec.spotDurationInMinutes"])]
    #[case(380, &["Unsupported value::spec.spotDurationInMinutes"])]
    fn spot_durations(#[case] minutes: i64, #[case] expected: &[&str]) {
        assert_eq!(validate_group(|spec| spec.spot_duration_in_minutes = Some(minutes)), expected);
    }

    #[rstest]
    #[case("terminate", &[])]
    #[case("hibernate", &[])]
    #[case("stop", &[])]
    #[case("invalidValue", &["Unsupported value::spec.instanceInterruptionBehavior"])]
    fn interruption_behavior(#[case] behavior: &str, #[case] expected: &[&str]) {
        assert_eq!(
            validate_group(|spec| spec.instance_interruption_behavior = Some(behavior.to_owned())),
            expected
        );
    }

    #[rstest]
    #[case("m4.large", &["m4.large", "t3.medium", "c5.large"], &[])]
    #[case("m4.large", &["a1.large", "c4.large", "c5.large"], &["Invalid value::spec.mixedInstancesPolicy.instances[0]"])]
    #[case("g4dn.xlarge", &["g4dn.xlarge", "g4ad.16xlarge"], &[])]
    #[case("g4dn.xlarge", &["g4dn.xlarge", "g4ad.16xlarge", "c4.xlarge"], &["Forbidden::spec.mixedInstancesPolicy.instances[2]"])]
    fn mixed_instances(#[case] machine_type: &str, #[case] instances: &[&str], #[case] expected: &[&str]) {
        let instances = instances.iter().map(|i| (*i).to_owned()).collect::<Vec<_>>();
        assert_eq!(
            validate_group(|spec| {
                spec.machine_type = Some(machine_type.to_owned());
                spec.mixed_instances_policy = Some(MixedInstancesPolicySpec {
                    instances,
                    ..MixedInstancesPolicySpec::default()
                });
            }),
            expected
        );
    }

    #[rstest]
    #[case(Some("required"), Some(1), &[])]
    #[case(Some("optional"), Some(64), &[])]
    #[case(Some("sometimes"), None, &["Unsupported value::spec.instanceMetadata.httpTokens"])]
    #[case(None, Some(0), &["Invalid value::spec.instanceMetadata.httpPutResponseHopLimit"])]
    #[case(None, Some(65), &["Invalid value::spec.instanceMetadata.httpPutResponseHopLimit"])]
    fn instance_metadata(
        #[case] http_tokens: Option<&str>,
        #[case] hop_limit: Option<i64>,
        #[case] expected: &[&str],
    ) {
        assert_eq!(
            validate_group(|spec| {
                spec.instance_metadata = Some(InstanceMetadataOptions {
                    http_tokens: http_tokens.map(str::to_owned),
                    http_put_response_hop_limit: hop_limit,
                });
            }),
            expected
        );
    }

    #[rstest]
    #[case("standard", &[])]
    #[case("unlimited", &[])]
    #[case("burst", &["Unsupported value::spec.cpuCredits"])]
    fn cpu_credits(#[case] credits: &str, #[case] expected: &[&str]) {
        assert_eq!(validate_group(|spec| spec.cpu_credits = Some(credits.to_owned())), expected);
    }

    #[test]
    fn security_group_override() {
        assert_eq!(
            validate_group(|spec| spec.security_group_override = Some("nodes".to_owned())),
            ["Invalid value::spec.securityGroupOverride"]
        );
    }

    fn lb_cluster(
        lb_type: &str,
        class: &str,
        subnets: &[(&str, Option<&str>, Option<&str>)],
    ) -> Cluster {
        let mut cluster = fixtures::cluster();
        cluster.spec.networking.subnets = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, name)| crate::model::ClusterSubnetSpec {
                name: (*name).to_owned(),
                cidr: Some(format!("172.20.{i}.0/24")),
                zone: Some(fixtures::SUBNET.to_owned()),
                subnet_type: Some("Public".to_owned()),
                ..Default::default()
            })
            .collect();
        cluster.spec.api.dns = None;
        cluster.spec.api.load_balancer = Some(LoadBalancerAccessSpec {
            lb_type: Some(lb_type.to_owned()),
            class: Some(class.to_owned()),
            subnets: subnets
                .iter()
                .map(|(name, address, allocation)| LoadBalancerSubnetSpec {
                    name: (*name).to_owned(),
                    private_ipv4_address: address.map(str::to_owned),
                    allocation_id: allocation.map(str::to_owned),
                })
                .collect(),
            ..LoadBalancerAccessSpec::default()
        });
        cluster
    }

    #[rstest]
    #[case::plain("Internal", "Network", &[("a", None, None), ("b", None, None)], &[])]
    #[case::private_address("Internal", "Network", &[("a", Some("172.20.0.10"), None), ("b", None, None)], &[])]
    #[case::empty_name("Internal", "Network", &[("", None, None)], &["Required value::spec.api.loadBalancer.subnets[0].name"])]
    #[case::unknown_name("Internal", "Network", &[("d", None, None)], &["Not found::spec.api.loadBalancer.subnets[0].name"])]
    #[case::empty_address("Internal", "Network", &[("a", Some(""), None)], &["Required value::spec.api.loadBalancer.subnets[0].privateIPv4Address"])]
    #[case::empty_allocation("Public", "Network", &[("a", None, Some(""))], &["Required value::spec.api.loadBalancer.subnets[0].allocationID"])]
    #[case::invalid_address("Internal", "Network", &[("a", Some("invalidip"), None)], &["Invalid value::spec.api.loadBalancer.subnets[0].privateIPv4Address"])]
    #[case::ipv6_address("Internal", "Network", &[("a", Some("fd00::10"), None)], &["Invalid value::spec.api.loadBalancer.subnets[0].privateIPv4Address"])]
    #[case::address_outside_subnet("Internal", "Network", &[("a", Some("172.20.1.10"), None)], &["Invalid value::spec.api.loadBalancer.subnets[0].privateIPv4Address"])]
    #[case::address_on_classic("Internal", "Classic", &[("a", Some("172.20.0.10"), None)], &["Forbidden::spec.api.loadBalancer.subnets[0].privateIPv4Address"])]
    #[case::allocation_on_classic("Public", "Classic", &[("a", None, Some("eipalloc-222ghi789"))], &["Forbidden::spec.api.loadBalancer.subnets[0].allocationID"])]
    #[case::address_on_public("Public", "Network", &[("a", Some("172.20.0.10"), None)], &["Forbidden::spec.api.loadBalancer.subnets[0].privateIPv4Address"])]
    #[case::allocation_on_internal("Internal", "Network", &[("a", None, Some("eipalloc-222ghi789"))], &["Forbidden::spec.api.loadBalancer.subnets[0].allocationID"])]
    #[case::allocation_on_public("Public", "Network", &[("a", None, Some("eipalloc-222ghi789"))], &[])]
    fn load_balancer_subnets(
        #[case] lb_type: &str,
        #[case] class: &str,
        #[case] subnets: &[(&str, Option<&str>, Option<&str>)],
        #[case] expected: &[&str],
    ) {
        let cluster = lb_cluster(lb_type, class, subnets);
        assert_eq!(render(&validate_cluster(&cluster)), expected);
    }

    #[rstest]
    #[case(Some("ELBSecurityPolicy-TLS13-1-2-2021-06"), "Network", Some("arn:aws:acm:us-test-1:123456789012:certificate/1"), &[])]
    #[case(Some("ELBSecurityPolicy-TLS13-1-2-2021-06"), "Classic", Some("arn:aws:acm:us-test-1:123456789012:certificate/1"), &["Forbidden::spec.api.loadBalancer.sslPolicy"])]
    #[case(Some("ELBSecurityPolicy-TLS13-1-2-2021-06"), "Network", None, &["Forbidden::spec.api.loadBalancer.sslPolicy"])]
    #[case(None, "Classic", None, &[])]
    fn ssl_policy_requirements(
        #[case] ssl_policy: Option<&str>,
        #[case] class: &str,
        #[case] certificate: Option<&str>,
        #[case] expected: &[&str],
    ) {
        let mut cluster = lb_cluster("Public", class, &[]);
        let load_balancer = cluster.spec.api.load_balancer.as_mut().expect("load balancer is set");
        load_balancer.ssl_policy = ssl_policy.map(str::to_owned);
        load_balancer.ssl_certificate = certificate.map(str::to_owned);
        assert_eq!(render(&validate_cluster(&cluster)), expected);
    }

    #[rstest]
    #[case("1.17.0", None, &["Forbidden::spec.externalCloudControllerManager"])]
    #[case("1.21.0", None, &[])]
    #[case("1.21.0", Some(true), &[])]
    #[case("1.21.0", Some(false), &["Forbidden::spec.externalCloudControllerManager"])]
    fn external_cloud_controller_manager(
        #[case] version: &str,
        #[case] ebs_csi_enabled: Option<bool>,
        #[case] expected: &[&str],
    ) {
        let mut cluster = fixtures::cluster();
        cluster.spec.kubernetes_version = Some(version.to_owned());
        cluster.spec.external_cloud_controller_manager = Some(CloudControllerManagerConfig::default());
        cluster.spec.cloud_config = Some(CloudConfiguration {
            aws_ebs_csi_driver: Some(AwsEbsCsiDriver {
                enabled: ebs_csi_enabled,
                version: None,
            }),
            ..CloudConfiguration::default()
        });
        assert_eq!(render(&validate_cluster(&cluster)), expected);
    }

    #[test]
    fn network_cidr_and_zones_required() {
        let mut cluster = fixtures::cluster();
        cluster.spec.networking.network_cidr = None;
        cluster.spec.networking.subnets[0].zone = None;
        assert_eq!(render(&validate_cluster(&cluster)), [
            "Required value::spec.networking.networkCIDR",
            "Required value::spec.networking.subnets[0].zone",
        ]);
    }
}
