use std::{collections::HashSet, net::IpAddr, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};
use ipnet::IpNet;
use kops_version::KubernetesVersion;
use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    model::{
        Authentication, CLOUD_PROVIDER_EXTERNAL, CloudProviderId, CloudProviderSpec, Cluster, ClusterSpec,
        EGRESS_EXTERNAL, EtcdClusterSpec, FileAssetSpec, HookSpec, InstanceGroupRole, IntOrString,
        KubeApiServerConfig, KubeProxyConfig, KubeletConfig, NetworkingPlugin, ObjectMeta,
        RollingUpdate, SUBNET_TYPE_PRIVATE, SUPPORTED_DNS_TYPES, SUPPORTED_ETCD_PROVIDERS,
        SUPPORTED_FLANNEL_BACKENDS, SUPPORTED_LOAD_BALANCER_CLASSES,
        SUPPORTED_LOAD_BALANCER_TYPES, SUPPORTED_SUBNET_TYPES, SUPPORTED_TOPOLOGIES,
        SUPPORTED_UPDATE_POLICIES, TOPOLOGY_PUBLIC, WarmPoolSpec,
    },
    options::{Feature, ValidationOptions},
    validation::{
        ErrorList, FieldError, Path, aws, gce, openstack,
        primitives::{
            is_subnet, is_valid_api_server_url, is_valid_value, overlap, parse_cidr,
            parse_port_range, validate_cidr, validate_dns_1123_subdomain, validate_ip,
        },
    },
};

const SUPPORTED_AUTHORIZATION_MODES: &[&str] =
    &["AlwaysAllow", "AlwaysDeny", "ABAC", "Webhook", "RBAC", "Node"];

const SUPPORTED_PROXY_MODES: &[&str] = &["userspace", "iptables", "ipvs", "kernelspace"];

const SUPPORTED_AWS_AUTHENTICATOR_BACKEND_MODES: &[&str] = &["MountedFile", "EKSConfigMap", "CRD"];

const SUPPORTED_POLICY_EFFECTS: &[&str] = &["Allow", "Deny"];

/// Roles that may carry external policies.
const EXTERNAL_POLICY_ROLES: &[&str] = &["master", "node", "bastion"];

/// Prefixes of NAT gateways, NAT instances and transit gateways.
const EGRESS_PREFIXES: &[&str] = &["nat-", "i-", "tgw-"];

const MAX_BASTION_IDLE_TIMEOUT_SECONDS: i64 = 60 * 60;

/// The parsed address ranges of a cluster. Unset or malformed ranges are
/// `None` and skip every rule that depends on them.
#[derive(Debug, Default)]
struct NetworkRanges {
    network: Option<IpNet>,
    additional: Vec<IpNet>,
    non_masquerade: Option<IpNet>,
    service: Option<IpNet>,
}

/// Validates a cluster on its own.
///
/// In strict mode the component configuration that is otherwise filled in
/// later must already be present. Equivalent to
/// [`validate_cluster_with_options`] with default feature flags.
pub fn validate_cluster(cluster: &Cluster, strict: bool) -> ErrorList {
    validate_cluster_with_options(cluster, &ValidationOptions::strict(strict))
}

pub fn validate_cluster_with_options(cluster: &Cluster, options: &ValidationOptions) -> ErrorList {
    let mut errors = ErrorList::new();
    let spec = &cluster.spec;
    let spec_path = Path::new("spec");
    let networking_path = spec_path.child("networking");
    let strict = options.strict_validation;

    validate_cluster_name(&cluster.metadata, &mut errors);
    validate_kubernetes_version(spec, &spec_path, &mut errors);
    if strict {
        validate_strict(spec, &spec_path, &mut errors);
    }

    if spec.cloud_provider.is_none() {
        errors.push(FieldError::required(
            &spec_path.child("cloudProvider"),
            "a cloud provider must be selected",
        ));
    }

    let ranges = validate_network_ranges(spec, &networking_path, strict, &mut errors);
    validate_component_ranges(spec, &spec_path, &ranges, strict, &mut errors);
    validate_cloud_provider_references(spec, &spec_path, strict, &mut errors);
    validate_subnets(spec, &ranges, &networking_path.child("subnets"), &mut errors);

    for (field, cidrs) in [
        (spec_path.child("sshAccess"), &spec.ssh_access),
        (spec_path.child("api").child("access"), &spec.api.access),
        (spec_path.child("nodePortAccess"), &spec.node_port_access),
    ] {
        for (i, cidr) in cidrs.iter().enumerate() {
            errors.extend(validate_cidr(cidr, &field.index(i)));
        }
    }

    errors.extend(is_valid_value(
        &spec_path.child("updatePolicy"),
        spec.update_policy.as_deref(),
        SUPPORTED_UPDATE_POLICIES,
    ));

    validate_topology(spec, &networking_path.child("topology"), &mut errors);
    validate_etcd_clusters(spec, &spec_path.child("etcdClusters"), options, &mut errors);
    validate_networking_plugin(spec, &networking_path, options, &mut errors);
    validate_api(spec, &spec_path.child("api"), &mut errors);

    if let Some(kube_api_server) = &spec.kube_api_server {
        validate_kube_api_server(kube_api_server, &spec_path.child("kubeAPIServer"), &mut errors);
    }
    if let Some(kube_proxy) = &spec.kube_proxy {
        validate_kube_proxy(kube_proxy, &spec_path.child("kubeProxy"), strict, &mut errors);
    }
    for (name, _, kubelet) in kubelets(spec) {
        validate_kubelet(kubelet, spec, &spec_path.child(name), strict, &mut errors);
    }

    validate_hooks(&spec.hooks, &spec_path.child("hooks"), &mut errors);
    validate_file_assets(&spec.file_assets, &spec_path.child("fileAssets"), &mut errors);
    validate_additional_policies(spec, &spec_path.child("additionalPolicies"), &mut errors);
    validate_external_policies(spec, &spec_path.child("externalPolicies"), &mut errors);
    validate_authentication(spec, &spec_path.child("authentication"), &mut errors);

    if let Some(warm_pool) = &spec.warm_pool {
        let warm_pool_path = spec_path.child("warmPool");
        if !spec.is_aws() {
            errors.push(FieldError::forbidden(
                &warm_pool_path,
                "warm pools are only supported on AWS",
            ));
        }
        validate_warm_pool(warm_pool, &warm_pool_path, &mut errors);
    }
    if let Some(rolling_update) = &spec.rolling_update {
        validate_rolling_update(rolling_update, &spec_path.child("rollingUpdate"), &mut errors);
    }

    match &spec.cloud_provider {
        Some(CloudProviderSpec::Aws(_)) => errors.extend(aws::validate_cluster(cluster)),
        Some(CloudProviderSpec::Gce(gce)) => errors.extend(gce::validate_cluster(cluster, gce)),
        Some(CloudProviderSpec::Openstack(openstack)) => {
            errors.extend(openstack::validate_cluster(cluster, openstack));
        }
        _ => {}
    }

    debug!(
        cluster = %cluster.metadata.name,
        errors = errors.len(),
        strict,
        "validated cluster"
    );
    errors
}

fn validate_cluster_name(metadata: &ObjectMeta, errors: &mut ErrorList) {
    let field = Path::new("metadata").child("name");
    let name = metadata.name.as_str();

    if name.is_empty() {
        errors.push(FieldError::required(
            &field,
            "Cluster Name is required (e.g. --name=mycluster.myzone.com)",
        ));
        return;
    }

    errors.extend(validate_dns_1123_subdomain(name, &field));

    // Imported clusters keep the name they were created with.
    if !name.contains('.') && !metadata.is_imported() {
        errors.push(FieldError::invalid(
            &field,
            name,
            "Cluster Name must be a fully-qualified DNS name (e.g. --name=mycluster.myzone.com)",
        ));
    }
}

fn validate_kubernetes_version(spec: &ClusterSpec, spec_path: &Path, errors: &mut ErrorList) {
    let field = spec_path.child("kubernetesVersion");
    match spec.kubernetes_version.as_deref() {
        None => errors.push(FieldError::required(&field, "kubernetesVersion must be specified")),
        Some(value) => {
            if let Err(error) = KubernetesVersion::from_str(value) {
                debug!(%error, "rejecting kubernetes version");
                errors.push(FieldError::invalid(
                    &field,
                    value,
                    "unable to determine kubernetes version",
                ));
            }
        }
    }
}

fn validate_strict(spec: &ClusterSpec, spec_path: &Path, errors: &mut ErrorList) {
    let missing = [
        ("kubelet", "Kubelet", spec.kubelet.is_none()),
        ("controlPlaneKubelet", "ControlPlaneKubelet", spec.control_plane_kubelet.is_none()),
        ("kubeControllerManager", "KubeControllerManager", spec.kube_controller_manager.is_none()),
        ("kubeDNS", "KubeDNS", spec.kube_dns.is_none()),
        ("kubeAPIServer", "KubeAPIServer", spec.kube_api_server.is_none()),
        ("kubeProxy", "KubeProxy", spec.kube_proxy.is_none()),
        ("sshAccess", "SSHAccess", spec.ssh_access.is_empty()),
    ];
    for (field, label, missing) in missing {
        if missing {
            errors.push(FieldError::required(
                &spec_path.child(field),
                format!("{label} not configured"),
            ));
        }
    }

    if spec.api.access.is_empty() {
        errors.push(FieldError::required(
            &spec_path.child("api").child("access"),
            "KubernetesAPIAccess not configured",
        ));
    }
}

fn validate_network_ranges(
    spec: &ClusterSpec,
    path: &Path,
    strict: bool,
    errors: &mut ErrorList,
) -> NetworkRanges {
    let networking = &spec.networking;
    let mut ranges = NetworkRanges::default();

    if let Some(value) = networking.network_cidr.as_deref() {
        ranges.network = parse_cidr(value, &path.child("networkCIDR"), errors);
    }

    for (i, value) in networking.additional_network_cidrs.iter().enumerate() {
        let field = path.child("additionalNetworkCIDRs").index(i);
        let Some(cidr) = parse_cidr(value, &field, errors) else {
            continue;
        };
        if ranges.network.is_some_and(|network| overlap(&network, &cidr)) {
            errors.push(FieldError::invalid(
                &field,
                value.as_str(),
                "additional network CIDR overlaps with the networkCIDR",
            ));
        }
        ranges.additional.push(cidr);
    }

    if let Some(value) = networking.non_masquerade_cidr.as_deref() {
        let field = path.child("nonMasqueradeCIDR");
        ranges.non_masquerade = parse_cidr(value, &field, errors);

        let pods_in_network = networking
            .plugin
            .as_ref()
            .is_some_and(NetworkingPlugin::uses_network_cidr_for_pods);
        if let (Some(non_masquerade), Some(network)) = (ranges.non_masquerade, ranges.network) {
            if !pods_in_network && overlap(&non_masquerade, &network) {
                errors.push(FieldError::forbidden(
                    &field,
                    format!(
                        "nonMasqueradeCIDR {value:?} cannot overlap with networkCIDR {:?}",
                        network.to_string()
                    ),
                ));
            }
        }
    }

    let service_path = path.child("serviceClusterIPRange");
    match networking.service_cluster_ip_range.as_deref() {
        None if strict => errors.push(FieldError::required(
            &service_path,
            "Cluster did not have ServiceClusterIPRange set",
        )),
        None => {}
        Some(value) => {
            ranges.service = parse_cidr(value, &service_path, errors);

            // GCE networking allocates services from its own ranges.
            let gce_networking = matches!(networking.plugin, Some(NetworkingPlugin::Gce(_)));
            if let (Some(service), Some(non_masquerade)) = (ranges.service, ranges.non_masquerade)
            {
                if !gce_networking && !is_subnet(&non_masquerade, &service) {
                    errors.push(FieldError::invalid(
                        &service_path,
                        value,
                        format!(
                            "ServiceClusterIPRange {value:?} must be a subnet of NonMasqueradeCIDR {:?}",
                            non_masquerade.to_string()
                        ),
                    ));
                }
            }
        }
    }

    if let Some(value) = networking.pod_cidr.as_deref() {
        errors.extend(validate_cidr(value, &path.child("podCIDR")));
    }

    ranges
}

/// The kubelet configurations of a cluster with their field and display
/// names.
fn kubelets(spec: &ClusterSpec) -> impl Iterator<Item = (&'static str, &'static str, &KubeletConfig)> {
    [
        ("kubelet", "Kubelet", spec.kubelet.as_ref()),
        ("controlPlaneKubelet", "ControlPlaneKubelet", spec.control_plane_kubelet.as_ref()),
    ]
    .into_iter()
    .filter_map(|(field, label, kubelet)| kubelet.map(|kubelet| (field, label, kubelet)))
}

/// A component copy of a cluster value must agree with it. An absent copy
/// only counts as disagreeing in strict mode.
fn disagrees(component: Option<&str>, cluster: Option<&str>, strict: bool) -> bool {
    match component {
        Some(value) => Some(value) != cluster,
        None => strict && cluster.is_some(),
    }
}

fn validate_component_ranges(
    spec: &ClusterSpec,
    spec_path: &Path,
    ranges: &NetworkRanges,
    strict: bool,
    errors: &mut ErrorList,
) {
    let networking = &spec.networking;

    for (field, label, kubelet) in kubelets(spec) {
        if disagrees(
            kubelet.non_masquerade_cidr.as_deref(),
            networking.non_masquerade_cidr.as_deref(),
            strict,
        ) {
            errors.push(FieldError::invalid(
                &spec_path.child(field).child("nonMasqueradeCIDR"),
                kubelet.non_masquerade_cidr.clone(),
                format!("{label} NonMasqueradeCIDR did not match cluster NonMasqueradeCIDR"),
            ));
        }
    }

    if let Some(kube_api_server) = &spec.kube_api_server {
        if disagrees(
            kube_api_server.service_cluster_ip_range.as_deref(),
            networking.service_cluster_ip_range.as_deref(),
            strict,
        ) {
            errors.push(FieldError::invalid(
                &spec_path.child("kubeAPIServer").child("serviceClusterIPRange"),
                kube_api_server.service_cluster_ip_range.clone(),
                "KubeAPIServer ServiceClusterIPRange did not match cluster ServiceClusterIPRange",
            ));
        }
    }

    let cluster_cidr = spec
        .kube_controller_manager
        .as_ref()
        .and_then(|kcm| kcm.cluster_cidr.as_deref());
    if let Some(value) = cluster_cidr {
        let field = spec_path.child("kubeControllerManager").child("clusterCIDR");
        let cidr = parse_cidr(value, &field, errors);
        if let (Some(cidr), Some(non_masquerade)) = (cidr, ranges.non_masquerade) {
            if !is_subnet(&non_masquerade, &cidr) {
                errors.push(FieldError::invalid(
                    &field,
                    value,
                    format!(
                        "KubeControllerManager.ClusterCIDR {value:?} must be a subnet of NonMasqueradeCIDR {:?}",
                        non_masquerade.to_string()
                    ),
                ));
            }
        }
    }

    let server_ip = spec.kube_dns.as_ref().and_then(|dns| dns.server_ip.as_deref());
    if let Some(server_ip) = server_ip {
        let field = spec_path.child("kubeDNS").child("serverIP");
        match IpAddr::from_str(server_ip) {
            Err(_) => errors.extend(validate_ip(server_ip, &field)),
            Ok(ip) => {
                if let Some(service) = ranges.service {
                    if !service.contains(&ip) {
                        errors.push(FieldError::invalid(
                            &field,
                            server_ip,
                            format!(
                                "ServiceClusterIPRange {:?} must contain the DNS Server IP {server_ip:?}",
                                service.to_string()
                            ),
                        ));
                    }
                }
            }
        }

        for (field, label, kubelet) in kubelets(spec) {
            if disagrees(kubelet.cluster_dns.as_deref(), Some(server_ip), strict) {
                errors.push(FieldError::invalid(
                    &spec_path.child(field).child("clusterDNS"),
                    kubelet.cluster_dns.clone(),
                    format!("{label} ClusterDNS did not match cluster KubeDNS.ServerIP"),
                ));
            }
        }
    }
}

fn validate_cloud_provider_references(
    spec: &ClusterSpec,
    spec_path: &Path,
    strict: bool,
    errors: &mut ErrorList,
) {
    let Some(cloud_provider) = spec.cloud_provider_id() else {
        return;
    };
    let cloud_provider: &'static str = cloud_provider.into();

    let references = [
        ("kubelet", spec.kubelet.as_ref().map(|c| c.cloud_provider.as_deref())),
        (
            "controlPlaneKubelet",
            spec.control_plane_kubelet.as_ref().map(|c| c.cloud_provider.as_deref()),
        ),
        (
            "kubeAPIServer",
            spec.kube_api_server.as_ref().map(|c| c.cloud_provider.as_deref()),
        ),
        (
            "kubeControllerManager",
            spec.kube_controller_manager.as_ref().map(|c| c.cloud_provider.as_deref()),
        ),
        (
            "externalCloudControllerManager",
            spec.external_cloud_controller_manager
                .as_ref()
                .map(|c| c.cloud_provider.as_deref()),
        ),
    ];

    for (component, reference) in references {
        // The component is not configured at all.
        let Some(reference) = reference else {
            continue;
        };

        let field = spec_path.child(component).child("cloudProvider");
        match reference {
            Some(value) if value != cloud_provider && value != CLOUD_PROVIDER_EXTERNAL => {
                errors.push(FieldError::forbidden(&field, "Did not match cluster cloudProvider"));
            }
            None if strict => {
                errors.push(FieldError::required(&field, "cloudProvider not configured"));
            }
            _ => {}
        }
    }
}

fn validate_subnets(
    spec: &ClusterSpec,
    ranges: &NetworkRanges,
    path: &Path,
    errors: &mut ErrorList,
) {
    let subnets = &spec.networking.subnets;
    let with_id = subnets.iter().filter(|subnet| subnet.id.is_some()).count();
    let mixed_ids = with_id != 0 && with_id != subnets.len();
    let mut names = HashSet::new();

    for (i, subnet) in subnets.iter().enumerate() {
        let subnet_path = path.index(i);

        if subnet.name.is_empty() {
            errors.push(FieldError::required(
                &subnet_path.child("name"),
                "subnet name must be specified",
            ));
        } else if !names.insert(subnet.name.as_str()) {
            errors.push(FieldError::duplicate(
                &subnet_path.child("name"),
                subnet.name.as_str(),
            ));
        }

        if mixed_ids && subnet.id.is_none() {
            errors.push(FieldError::forbidden(
                &subnet_path.child("id"),
                "cannot mix subnets with specified ID and without specified ID",
            ));
        }

        if let Some(value) = subnet.cidr.as_deref() {
            let field = subnet_path.child("cidr");
            let cidr = parse_cidr(value, &field, errors);
            if let (Some(cidr), Some(network)) = (cidr, ranges.network) {
                let contained = is_subnet(&network, &cidr)
                    || ranges.additional.iter().any(|extra| is_subnet(extra, &cidr));
                if !contained {
                    errors.push(FieldError::invalid(
                        &field,
                        value,
                        "Subnet had a CIDR that was not a subnet of the NetworkCIDR",
                    ));
                }
            }
        }

        errors.extend(is_valid_value(
            &subnet_path.child("type"),
            subnet.subnet_type.as_deref(),
            SUPPORTED_SUBNET_TYPES,
        ));

        if let Some(egress) = subnet.egress.as_deref() {
            let field = subnet_path.child("egress");
            if egress != EGRESS_EXTERNAL {
                if !EGRESS_PREFIXES.iter().any(|prefix| egress.starts_with(prefix)) {
                    errors.push(FieldError::invalid(
                        &field,
                        egress,
                        "egress must be of type NAT Gateway, NAT EC2 Instance, Transit Gateway or External",
                    ));
                }
                if subnet.subnet_type.as_deref() != Some(SUBNET_TYPE_PRIVATE) {
                    errors.push(FieldError::forbidden(
                        &field,
                        "egress can only be specified for Private subnets",
                    ));
                }
            }
        }

        if let Some(public_ip) = subnet.public_ip.as_deref() {
            errors.extend(validate_ip(public_ip, &subnet_path.child("publicIP")));
        }
    }
}

fn validate_topology(spec: &ClusterSpec, path: &Path, errors: &mut ErrorList) {
    let Some(topology) = &spec.networking.topology else {
        return;
    };

    errors.extend(is_valid_value(
        &path.child("controlPlane"),
        topology.control_plane.as_deref(),
        SUPPORTED_TOPOLOGIES,
    ));
    errors.extend(is_valid_value(
        &path.child("nodes"),
        topology.nodes.as_deref(),
        SUPPORTED_TOPOLOGIES,
    ));
    errors.extend(is_valid_value(
        &path.child("dns"),
        topology.dns.as_deref(),
        SUPPORTED_DNS_TYPES,
    ));

    if let Some(bastion) = &topology.bastion {
        let bastion_path = path.child("bastion");
        let public = Some(TOPOLOGY_PUBLIC);
        if topology.control_plane.as_deref() == public || topology.nodes.as_deref() == public {
            errors.push(FieldError::forbidden(
                &bastion_path,
                "Bastion supports only Private Masters and Nodes",
            ));
        }

        let timeout_path = bastion_path.child("idleTimeoutSeconds");
        match bastion.idle_timeout_seconds {
            Some(timeout) if timeout <= 0 => errors.push(FieldError::invalid(
                &timeout_path,
                timeout,
                "Bastion IdleTimeoutSeconds should be greater than zero",
            )),
            Some(timeout) if timeout > MAX_BASTION_IDLE_TIMEOUT_SECONDS => {
                errors.push(FieldError::invalid(
                    &timeout_path,
                    timeout,
                    "Bastion IdleTimeoutSeconds cannot be greater than one hour",
                ));
            }
            _ => {}
        }
    }
}

/// Parses an etcd version such as `3.5.9` or `v3.5.9`.
pub(super) fn parse_etcd_version(version: &str) -> Option<semver::Version> {
    semver::Version::parse(version.strip_prefix('v').unwrap_or(version)).ok()
}

fn validate_etcd_clusters(
    spec: &ClusterSpec,
    path: &Path,
    options: &ValidationOptions,
    errors: &mut ErrorList,
) {
    if spec.etcd_clusters.is_empty() {
        errors.push(FieldError::required(path, "at least one etcd cluster must be configured"));
        return;
    }

    let check_versions = !options
        .feature_flags
        .is_enabled(Feature::SkipEtcdVersionCheck);
    let mut names = HashSet::new();

    for (i, etcd) in spec.etcd_clusters.iter().enumerate() {
        let etcd_path = path.index(i);

        if etcd.name.is_empty() {
            errors.push(FieldError::required(
                &etcd_path.child("name"),
                "EtcdCluster did not have name",
            ));
        } else if !names.insert(etcd.name.as_str()) {
            errors.push(FieldError::duplicate(&etcd_path.child("name"), etcd.name.as_str()));
        }

        errors.extend(is_valid_value(
            &etcd_path.child("provider"),
            etcd.provider.as_deref(),
            SUPPORTED_ETCD_PROVIDERS,
        ));

        validate_etcd_members(etcd, &etcd_path.child("members"), errors);

        if let Some(version) = etcd.version.as_deref() {
            if check_versions && parse_etcd_version(version).is_none() {
                errors.push(FieldError::invalid(
                    &etcd_path.child("version"),
                    version,
                    "the etcd version must be a semantic version such as 3.5.9",
                ));
            }
        }
    }
}

fn validate_etcd_members(etcd: &EtcdClusterSpec, path: &Path, errors: &mut ErrorList) {
    if etcd.members.is_empty() {
        errors.push(FieldError::required(
            path,
            format!("No members defined in etcd cluster {:?}", etcd.name),
        ));
        return;
    }

    if etcd.members.len() % 2 == 0 {
        errors.push(FieldError::invalid(
            path,
            etcd.members.len(),
            "There should be an odd number of master-zones, for etcd's quorum.",
        ));
    }

    let mut names = HashSet::new();
    for (i, member) in etcd.members.iter().enumerate() {
        let member_path = path.index(i);

        if member.name.is_empty() {
            errors.push(FieldError::required(
                &member_path.child("name"),
                format!("EtcdMember did not have Name in cluster {:?}", etcd.name),
            ));
        } else if !names.insert(member.name.as_str()) {
            errors.push(FieldError::duplicate(&member_path.child("name"), member.name.as_str()));
        }

        if member.instance_group.as_deref().is_none_or(str::is_empty) {
            errors.push(FieldError::required(
                &member_path.child("instanceGroup"),
                format!("EtcdMember did not have InstanceGroup in cluster {:?}", etcd.name),
            ));
        }
    }
}

fn validate_networking_plugin(
    spec: &ClusterSpec,
    path: &Path,
    options: &ValidationOptions,
    errors: &mut ErrorList,
) {
    let Some(plugin) = &spec.networking.plugin else {
        errors.push(FieldError::required(path, "a networking plugin must be selected"));
        return;
    };
    let plugin_path = path.child(plugin.id().to_string());

    match plugin {
        NetworkingPlugin::Classic(_) if spec.is_kubernetes_gte(1, 4, 0) => {
            errors.push(FieldError::invalid(
                &plugin_path,
                "classic",
                "classic networking is not supported with kubernetes versions 1.4 and later",
            ));
        }
        NetworkingPlugin::Flannel(flannel) => {
            let backend_path = plugin_path.child("backend");
            match flannel.backend.as_deref() {
                None => errors.push(FieldError::required(
                    &backend_path,
                    "Flannel backend must be specified",
                )),
                backend => errors.extend(is_valid_value(
                    &backend_path,
                    backend,
                    SUPPORTED_FLANNEL_BACKENDS,
                )),
            }
        }
        NetworkingPlugin::Calico(calico) => {
            validate_typha_replicas(calico.typha_replicas, &plugin_path, errors);

            let check_versions = !options
                .feature_flags
                .is_enabled(Feature::SkipEtcdVersionCheck);
            if calico.major_version.as_deref() == Some("v3") && check_versions {
                for etcd in &spec.etcd_clusters {
                    let Some(version) = etcd.version.as_deref() else {
                        continue;
                    };
                    if parse_etcd_version(version).is_none_or(|version| version.major != 3) {
                        errors.push(FieldError::forbidden(
                            &plugin_path.child("majorVersion"),
                            format!(
                                "Unable to use v3 when ETCD version for {} cluster is {version}",
                                etcd.name
                            ),
                        ));
                    }
                }
            }
        }
        NetworkingPlugin::Canal(canal) => {
            validate_typha_replicas(canal.typha_replicas, &plugin_path, errors);
        }
        NetworkingPlugin::AmazonVpc(_) | NetworkingPlugin::LyftVpc(_) if !spec.is_aws() => {
            errors.push(FieldError::forbidden(
                &plugin_path,
                format!("{} networking is only supported on AWS", plugin.id()),
            ));
        }
        NetworkingPlugin::Gce(_) if spec.cloud_provider_id() != Some(CloudProviderId::Gce) => {
            errors.push(FieldError::forbidden(
                &plugin_path,
                "gce networking is only supported on GCE",
            ));
        }
        _ => {}
    }
}

fn validate_typha_replicas(replicas: i32, path: &Path, errors: &mut ErrorList) {
    if replicas < 0 {
        errors.push(FieldError::invalid(
            &path.child("typhaReplicas"),
            replicas,
            "Unable to scale beyond 0, must be greater than or equal to 0",
        ));
    }
}

fn validate_api(spec: &ClusterSpec, path: &Path, errors: &mut ErrorList) {
    let api = &spec.api;

    if api.dns.is_some() && api.load_balancer.is_some() {
        errors.push(FieldError::forbidden(
            &path.child("loadBalancer"),
            "only one of dns or loadBalancer can be specified",
        ));
    }

    if let Some(load_balancer) = &api.load_balancer {
        let lb_path = path.child("loadBalancer");
        errors.extend(is_valid_value(
            &lb_path.child("type"),
            load_balancer.lb_type.as_deref(),
            SUPPORTED_LOAD_BALANCER_TYPES,
        ));
        errors.extend(is_valid_value(
            &lb_path.child("class"),
            load_balancer.class.as_deref(),
            SUPPORTED_LOAD_BALANCER_CLASSES,
        ));
    }

    if let Some(public_name) = api.public_name.as_deref() {
        errors.extend(validate_dns_1123_subdomain(public_name, &path.child("publicName")));
    }
}

fn validate_kube_api_server(config: &KubeApiServerConfig, path: &Path, errors: &mut ErrorList) {
    if config.proxy_client_cert_file.is_some() != config.proxy_client_key_file.is_some() {
        errors.push(FieldError::forbidden(
            &path.child("proxyClientCertFile"),
            "proxyClientCertFile and proxyClientKeyFile must both be specified (or neither)",
        ));
    }

    if let Some(range) = config.service_node_port_range.as_deref() {
        if parse_port_range(range).is_none() {
            errors.push(FieldError::invalid(
                &path.child("serviceNodePortRange"),
                range,
                "must be a port range in the form startPort-endPort",
            ));
        }
    }

    if let Some(modes) = config.authorization_mode.as_deref() {
        let modes_path = path.child("authorizationMode");
        let modes = modes.split(',').map(str::trim).collect::<Vec<_>>();
        for mode in modes.iter().copied() {
            errors.extend(is_valid_value(&modes_path, Some(mode), SUPPORTED_AUTHORIZATION_MODES));
        }

        if modes.contains(&"Webhook") && config.authorization_webhook_config_file.is_none() {
            errors.push(FieldError::required(
                &path.child("authorizationWebhookConfigFile"),
                "Authorization mode Webhook requires authorizationWebhookConfigFile to be specified",
            ));
        }
    }
}

fn validate_kube_proxy(config: &KubeProxyConfig, path: &Path, strict: bool, errors: &mut ErrorList) {
    let master_path = path.child("master");
    match config.master.as_deref() {
        None if strict => errors.push(FieldError::required(
            &master_path,
            "KubeProxy master not configured",
        )),
        Some(master) if !is_valid_api_server_url(master) => {
            errors.push(FieldError::invalid(&master_path, master, "Not a valid APIServer URL"));
        }
        _ => {}
    }

    if let Some(cluster_cidr) = config.cluster_cidr.as_deref() {
        errors.extend(validate_cidr(cluster_cidr, &path.child("clusterCIDR")));
    }

    errors.extend(is_valid_value(
        &path.child("proxyMode"),
        config.proxy_mode.as_deref(),
        SUPPORTED_PROXY_MODES,
    ));
}

fn validate_kubelet(
    config: &KubeletConfig,
    spec: &ClusterSpec,
    path: &Path,
    strict: bool,
    errors: &mut ErrorList,
) {
    let api_servers_path = path.child("apiServers");
    match config.api_servers.as_deref() {
        Some(api_servers) if spec.is_kubernetes_gte(1, 6, 0) => {
            errors.push(FieldError::invalid(
                &api_servers_path,
                api_servers,
                "api-servers flag was removed in 1.6",
            ));
        }
        Some(api_servers) if !is_valid_api_server_url(api_servers) => {
            errors.push(FieldError::invalid(
                &api_servers_path,
                api_servers,
                "Not a valid APIServer URL",
            ));
        }
        None if strict && spec.is_kubernetes_lt(1, 6, 0) => {
            errors.push(FieldError::required(&api_servers_path, "apiServers not configured"));
        }
        _ => {}
    }
}

pub(super) fn validate_hooks(hooks: &[HookSpec], path: &Path, errors: &mut ErrorList) {
    let mut names = HashSet::new();
    for (i, hook) in hooks.iter().enumerate() {
        let hook_path = path.index(i);
        if !hook.name.is_empty() && !names.insert(hook.name.as_str()) {
            errors.push(FieldError::duplicate(&hook_path.child("name"), hook.name.as_str()));
        }
        validate_hook(hook, &hook_path, errors);
    }
}

fn validate_hook(hook: &HookSpec, path: &Path, errors: &mut ErrorList) {
    if !hook.disabled && hook.exec_container.is_none() && hook.manifest.is_none() {
        errors.push(FieldError::required(
            path,
            "you must set either manifest or execContainer for a hook",
        ));
    }

    if hook.use_raw_manifest {
        if hook.exec_container.is_some() {
            errors.push(FieldError::forbidden(
                &path.child("execContainer"),
                "execContainer may not be used with useRawManifest (use manifest instead)",
            ));
        }
        if !hook.before.is_empty() {
            errors.push(FieldError::forbidden(
                &path.child("before"),
                "before may not be used with useRawManifest",
            ));
        }
        if !hook.requires.is_empty() {
            errors.push(FieldError::forbidden(
                &path.child("requires"),
                "requires may not be used with useRawManifest",
            ));
        }
        if hook.manifest.is_none() {
            errors.push(FieldError::required(
                &path.child("manifest"),
                "you need to specify manifest when using useRawManifest",
            ));
        }
    }

    if let Some(exec_container) = &hook.exec_container {
        if exec_container.image.is_empty() {
            errors.push(FieldError::required(
                &path.child("execContainer").child("image"),
                "image must be specified",
            ));
        }
    }
}

pub(super) fn validate_file_assets(assets: &[FileAssetSpec], path: &Path, errors: &mut ErrorList) {
    let mut names = HashSet::new();
    for (i, asset) in assets.iter().enumerate() {
        let asset_path = path.index(i);

        if asset.name.is_empty() {
            errors.push(FieldError::required(
                &asset_path.child("name"),
                "file assets must have a name",
            ));
        } else if !names.insert(asset.name.as_str()) {
            errors.push(FieldError::duplicate(&asset_path.child("name"), asset.name.as_str()));
        }

        if asset.path.is_empty() {
            errors.push(FieldError::required(
                &asset_path.child("path"),
                "file assets must have a path",
            ));
        }

        if asset.content.is_empty() {
            errors.push(FieldError::required(
                &asset_path.child("content"),
                "file assets must have content",
            ));
        } else if asset.is_base64 && STANDARD.decode(asset.content.trim()).is_err() {
            errors.push(FieldError::invalid(
                &asset_path.child("content"),
                asset.content.as_str(),
                "content is marked as base64 but could not be decoded",
            ));
        }
    }
}

pub(super) fn validate_warm_pool(warm_pool: &WarmPoolSpec, path: &Path, errors: &mut ErrorList) {
    if warm_pool.min_size < 0 {
        errors.push(FieldError::invalid(
            &path.child("minSize"),
            warm_pool.min_size,
            "warm pool minSize cannot be negative",
        ));
    }

    match warm_pool.max_size {
        Some(max_size) if max_size < 0 => errors.push(FieldError::invalid(
            &path.child("maxSize"),
            max_size,
            "warm pool maxSize cannot be negative",
        )),
        Some(max_size) if max_size < warm_pool.min_size => errors.push(FieldError::invalid(
            &path.child("maxSize"),
            max_size,
            "warm pool maxSize cannot be set to lower than minSize",
        )),
        _ => {}
    }
}

pub(super) fn validate_rolling_update(update: &RollingUpdate, path: &Path, errors: &mut ErrorList) {
    for (name, value) in [
        ("maxUnavailable", &update.max_unavailable),
        ("maxSurge", &update.max_surge),
    ] {
        let field = path.child(name);
        match value {
            Some(IntOrString::Int(count)) if *count < 0 => {
                errors.push(FieldError::invalid(
                    &field,
                    *count,
                    "must be greater than or equal to 0",
                ));
            }
            Some(IntOrString::String(percent)) if parse_percent(percent).is_none() => {
                errors.push(FieldError::invalid(
                    &field,
                    percent.as_str(),
                    "must be an integer or a percentage between 0% and 100%",
                ));
            }
            _ => {}
        }
    }
}

fn parse_percent(value: &str) -> Option<u8> {
    value
        .strip_suffix('%')?
        .parse::<u8>()
        .ok()
        .filter(|percent| *percent <= 100)
}

fn validate_additional_policies(spec: &ClusterSpec, path: &Path, errors: &mut ErrorList) {
    let roles = InstanceGroupRole::iter()
        .map(|role| role.policy_key())
        .collect::<Vec<_>>();

    for (role, policy) in &spec.additional_policies {
        let policy_path = path.key(role);
        if !roles.contains(&role.as_str()) {
            errors.push(FieldError::not_supported(&policy_path, role.as_str(), roles.as_slice()));
        }

        match serde_json::from_str::<Value>(policy) {
            Ok(document) => validate_policy_statements(&document, &policy_path, errors),
            Err(error) => errors.push(FieldError::invalid(
                &policy_path,
                policy.as_str(),
                format!("policy must be valid JSON: {error}"),
            )),
        }
    }
}

/// Checks the `Effect` of every statement. Policies are written either as a
/// list of statements or as a document with a `Statement` key.
fn validate_policy_statements(document: &Value, path: &Path, errors: &mut ErrorList) {
    let statements = match document {
        Value::Array(statements) => statements.as_slice(),
        Value::Object(object) => match object.get("Statement") {
            Some(Value::Array(statements)) => statements.as_slice(),
            Some(statement) => std::slice::from_ref(statement),
            None => &[],
        },
        _ => {
            errors.push(FieldError::invalid(
                path,
                document.clone(),
                "policy must be a list of IAM statements",
            ));
            return;
        }
    };

    for (i, statement) in statements.iter().enumerate() {
        let effect_path = path.index(i).child("Effect");
        match statement.get("Effect").and_then(Value::as_str) {
            None | Some("") => errors.push(FieldError::required(
                &effect_path,
                "Effect must be specified for IAM policy",
            )),
            effect => errors.extend(is_valid_value(&effect_path, effect, SUPPORTED_POLICY_EFFECTS)),
        }
    }
}

fn validate_external_policies(spec: &ClusterSpec, path: &Path, errors: &mut ErrorList) {
    for (role, arns) in &spec.external_policies {
        let policy_path = path.key(role);
        if !EXTERNAL_POLICY_ROLES.contains(&role.as_str()) {
            errors.push(FieldError::not_supported(
                &policy_path,
                role.as_str(),
                EXTERNAL_POLICY_ROLES,
            ));
        }

        for (i, arn) in arns.iter().enumerate() {
            if aws::Arn::parse(arn).is_none() {
                errors.push(FieldError::invalid(
                    &policy_path.index(i),
                    arn.as_str(),
                    "Policy ARN must be a valid AWS ARN such as arn:aws:iam::123456789012:policy/ExamplePolicy",
                ));
            }
        }
    }
}

fn validate_authentication(spec: &ClusterSpec, path: &Path, errors: &mut ErrorList) {
    match &spec.authentication {
        Some(Authentication::Aws(aws_authentication)) => {
            let aws_path = path.child("aws");
            if !spec.is_aws() {
                errors.push(FieldError::forbidden(
                    &aws_path,
                    "AWS IAM Authenticator is only supported on AWS",
                ));
            }
            if let Some(modes) = aws_authentication.backend_mode.as_deref() {
                for mode in modes.split(',').map(str::trim) {
                    errors.extend(is_valid_value(
                        &aws_path.child("backendMode"),
                        Some(mode),
                        SUPPORTED_AWS_AUTHENTICATOR_BACKEND_MODES,
                    ));
                }
            }
        }
        Some(Authentication::Oidc(oidc)) => {
            if let Some(issuer_url) = oidc.issuer_url.as_deref() {
                let is_https = url::Url::parse(issuer_url)
                    .is_ok_and(|url| url.scheme() == "https" && url.host_str().is_some());
                if !is_https {
                    errors.push(FieldError::invalid(
                        &path.child("oidc").child("issuerURL"),
                        issuer_url,
                        "issuerURL must be an https URL",
                    ));
                }
            }
        }
        Some(Authentication::Kopeio(_)) | None => {}
    }
}
