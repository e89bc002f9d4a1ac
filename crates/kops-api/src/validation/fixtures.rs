//! Minimal valid documents shared by the validator tests. Each test breaks
//! exactly the rule it is about.

use crate::{
    model::{
        ApiSpec, AwsSpec, CloudProviderSpec, Cluster, ClusterSpec, ClusterSubnetSpec,
        DNS_TYPE_PUBLIC, DnsAccessSpec, EtcdClusterSpec, EtcdMemberSpec, InstanceGroup,
        InstanceGroupRole, InstanceGroupSpec, KubeDnsConfig, NetworkingPlugin, NetworkingSpec,
        NoOptions, ObjectMeta, SUBNET_TYPE_PUBLIC, TOPOLOGY_PUBLIC, TopologySpec,
    },
    validation::ErrorList,
};

pub(crate) const SUBNET: &str = "us-test-1a";
pub(crate) const CONTROL_PLANE: &str = "master-us-test-1a";
pub(crate) const NODES: &str = "nodes-us-test-1a";

pub(crate) fn cluster() -> Cluster {
    let etcd = |name: &str| EtcdClusterSpec {
        name: name.to_owned(),
        members: vec![EtcdMemberSpec {
            name: "a".to_owned(),
            instance_group: Some(CONTROL_PLANE.to_owned()),
            ..EtcdMemberSpec::default()
        }],
        ..EtcdClusterSpec::default()
    };

    Cluster {
        metadata: ObjectMeta::named("minimal.example.com"),
        spec: ClusterSpec {
            kubernetes_version: Some("1.30.2".to_owned()),
            cloud_provider: Some(CloudProviderSpec::Aws(AwsSpec::default())),
            networking: NetworkingSpec {
                plugin: Some(NetworkingPlugin::Kubenet(NoOptions {})),
                network_cidr: Some("172.20.0.0/16".to_owned()),
                non_masquerade_cidr: Some("100.64.0.0/10".to_owned()),
                service_cluster_ip_range: Some("100.64.0.0/13".to_owned()),
                subnets: vec![ClusterSubnetSpec {
                    name: SUBNET.to_owned(),
                    cidr: Some("172.20.32.0/19".to_owned()),
                    zone: Some(SUBNET.to_owned()),
                    subnet_type: Some(SUBNET_TYPE_PUBLIC.to_owned()),
                    ..ClusterSubnetSpec::default()
                }],
                topology: Some(TopologySpec {
                    control_plane: Some(TOPOLOGY_PUBLIC.to_owned()),
                    nodes: Some(TOPOLOGY_PUBLIC.to_owned()),
                    bastion: None,
                    dns: Some(DNS_TYPE_PUBLIC.to_owned()),
                }),
                ..NetworkingSpec::default()
            },
            api: ApiSpec {
                dns: Some(DnsAccessSpec {}),
                access: vec!["0.0.0.0/0".to_owned()],
                ..ApiSpec::default()
            },
            ssh_access: vec!["0.0.0.0/0".to_owned()],
            etcd_clusters: vec![etcd("main"), etcd("events")],
            kube_dns: Some(KubeDnsConfig {
                server_ip: Some("100.64.0.10".to_owned()),
                ..KubeDnsConfig::default()
            }),
            ..ClusterSpec::default()
        },
    }
}

pub(crate) fn control_plane() -> InstanceGroup {
    InstanceGroup {
        metadata: ObjectMeta::named(CONTROL_PLANE),
        spec: InstanceGroupSpec {
            role: Some(InstanceGroupRole::ControlPlane),
            image: Some("ubuntu/ubuntu-jammy-22.04-amd64-server-20240101".to_owned()),
            min_size: Some(1),
            max_size: Some(1),
            machine_type: Some("m5.large".to_owned()),
            subnets: vec![SUBNET.to_owned()],
            ..InstanceGroupSpec::default()
        },
    }
}

pub(crate) fn nodes() -> InstanceGroup {
    InstanceGroup {
        metadata: ObjectMeta::named(NODES),
        spec: InstanceGroupSpec {
            role: Some(InstanceGroupRole::Node),
            image: Some("ubuntu/ubuntu-jammy-22.04-amd64-server-20240101".to_owned()),
            min_size: Some(2),
            max_size: Some(2),
            machine_type: Some("t3.medium".to_owned()),
            subnets: vec![SUBNET.to_owned()],
            ..InstanceGroupSpec::default()
        },
    }
}

/// Renders errors as `<kind>::<path>` for compact assertions.
pub(crate) fn render(errors: &ErrorList) -> Vec<String> {
    errors
        .iter()
        .map(|error| format!("{}::{}", error.kind, error.field))
        .collect()
}
