//! Defaulting of decoded clusters.
//!
//! Defaults are only written into fields that are absent. A value set by the
//! user, including an explicit `false` or empty string, is never replaced.

use snafu::{Snafu, ensure};
use tracing::debug;

use crate::model::{
    Authorization, CloudProviderSpec, Cluster, DEFAULT_CHANNEL, DNS_TYPE_PUBLIC, DnsAccessSpec,
    ETCD_PROVIDER_MANAGER, FLANNEL_BACKEND_UDP, LOAD_BALANCER_CLASS_CLASSIC,
    LOAD_BALANCER_TYPE_PUBLIC, LoadBalancerAccessSpec, NetworkingPlugin, NoOptions,
    TOPOLOGY_PRIVATE, TOPOLOGY_PUBLIC, TopologySpec,
};

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display("cluster name is required"))]
    MissingName,
}

/// Fills the defaults of a freshly decoded cluster.
pub fn fill_defaults(cluster: &mut Cluster) -> Result<(), Error> {
    ensure!(!cluster.metadata.name.is_empty(), MissingNameSnafu);

    let name = cluster.metadata.name.clone();
    let spec = &mut cluster.spec;

    spec.channel.get_or_insert_with(|| DEFAULT_CHANNEL.to_owned());

    let openstack_without_router = matches!(
        &spec.cloud_provider,
        Some(CloudProviderSpec::Openstack(openstack)) if openstack.external_network().is_none()
    );
    let default_topology = if openstack_without_router {
        TOPOLOGY_PRIVATE
    } else {
        TOPOLOGY_PUBLIC
    };

    let topology = spec.networking.topology.get_or_insert_with(|| TopologySpec {
        dns: Some(DNS_TYPE_PUBLIC.to_owned()),
        ..TopologySpec::default()
    });
    topology.control_plane.get_or_insert_with(|| default_topology.to_owned());
    topology.nodes.get_or_insert_with(|| default_topology.to_owned());
    topology.dns.get_or_insert_with(|| DNS_TYPE_PUBLIC.to_owned());
    let control_plane_public = topology.control_plane.as_deref() == Some(TOPOLOGY_PUBLIC);

    if spec.networking.plugin.is_none() {
        debug!(cluster = %name, "no networking plugin selected, defaulting to kubenet");
        spec.networking.plugin = Some(NetworkingPlugin::Kubenet(NoOptions {}));
    }
    if let Some(NetworkingPlugin::Flannel(flannel)) = &mut spec.networking.plugin {
        flannel.backend.get_or_insert_with(|| FLANNEL_BACKEND_UDP.to_owned());
    }

    spec.master_internal_name.get_or_insert_with(|| format!("api.internal.{name}"));
    spec.api.public_name.get_or_insert_with(|| format!("api.{name}"));

    let is_openstack = matches!(spec.cloud_provider, Some(CloudProviderSpec::Openstack(_)));
    if spec.api.dns.is_none() && spec.api.load_balancer.is_none() && !is_openstack {
        if control_plane_public {
            spec.api.dns = Some(DnsAccessSpec {});
        } else {
            spec.api.load_balancer = Some(LoadBalancerAccessSpec::default());
        }
    }
    let is_aws = spec.is_aws();
    if let Some(load_balancer) = &mut spec.api.load_balancer {
        load_balancer
            .lb_type
            .get_or_insert_with(|| LOAD_BALANCER_TYPE_PUBLIC.to_owned());
        if is_aws {
            load_balancer
                .class
                .get_or_insert_with(|| LOAD_BALANCER_CLASS_CLASSIC.to_owned());
        }
    }

    spec.authorization.get_or_insert(Authorization::AlwaysAllow);

    for etcd_cluster in &mut spec.etcd_clusters {
        etcd_cluster
            .provider
            .get_or_insert_with(|| ETCD_PROVIDER_MANAGER.to_owned());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::model::{
        AwsSpec, EtcdClusterSpec, FlannelNetworkingSpec, ObjectMeta, OpenstackRouter, OpenstackSpec,
    };

    fn cluster(cloud_provider: Option<CloudProviderSpec>) -> Cluster {
        let mut cluster = Cluster {
            metadata: ObjectMeta::named("example.com"),
            ..Cluster::default()
        };
        cluster.spec.cloud_provider = cloud_provider;
        cluster
    }

    #[test]
    fn missing_name() {
        let mut cluster = cluster(None);
        cluster.metadata.name.clear();
        assert_eq!(fill_defaults(&mut cluster), Err(Error::MissingName));
        assert_eq!(cluster.spec.channel, None);
    }

    #[test]
    fn empty_cluster() {
        let mut cluster = cluster(Some(CloudProviderSpec::Aws(AwsSpec::default())));
        cluster.spec.etcd_clusters.push(EtcdClusterSpec {
            name: "main".to_owned(),
            ..EtcdClusterSpec::default()
        });
        fill_defaults(&mut cluster).expect("defaults must apply");

        let spec = &cluster.spec;
        assert_eq!(spec.channel.as_deref(), Some("stable"));
        assert_eq!(spec.master_internal_name.as_deref(), Some("api.internal.example.com"));
        assert_eq!(spec.api.public_name.as_deref(), Some("api.example.com"));
        assert_eq!(spec.api.dns, Some(DnsAccessSpec {}));
        assert_eq!(spec.api.load_balancer, None);
        assert_eq!(spec.authorization, Some(Authorization::AlwaysAllow));
        assert!(matches!(spec.networking.plugin, Some(NetworkingPlugin::Kubenet(_))));
        assert_eq!(spec.etcd_clusters[0].provider.as_deref(), Some("Manager"));

        let topology = spec.networking.topology.as_ref().expect("topology must be set");
        assert_eq!(topology.control_plane.as_deref(), Some("public"));
        assert_eq!(topology.nodes.as_deref(), Some("public"));
        assert_eq!(topology.dns.as_deref(), Some("Public"));
    }

    #[rstest]
    #[case::aws(Some(CloudProviderSpec::Aws(AwsSpec::default())), Some("Classic"))]
    #[case::other(None, None)]
    fn private_topology_uses_load_balancer(
        #[case] cloud_provider: Option<CloudProviderSpec>,
        #[case] class: Option<&str>,
    ) {
        let mut cluster = cluster(cloud_provider);
        cluster.spec.networking.topology = Some(TopologySpec {
            control_plane: Some("private".to_owned()),
            ..TopologySpec::default()
        });
        fill_defaults(&mut cluster).expect("defaults must apply");

        let load_balancer = cluster.spec.api.load_balancer.expect("load balancer must be set");
        assert_eq!(load_balancer.lb_type.as_deref(), Some("Public"));
        assert_eq!(load_balancer.class.as_deref(), class);
        assert_eq!(cluster.spec.api.dns, None);
    }

    #[rstest]
    #[case::no_router(None, "private")]
    #[case::router(Some("public-net"), "public")]
    fn openstack_topology(#[case] external_network: Option<&str>, #[case] expected: &str) {
        let mut cluster = cluster(Some(CloudProviderSpec::Openstack(OpenstackSpec {
            router: external_network.map(|network| OpenstackRouter {
                external_network: Some(network.to_owned()),
                ..OpenstackRouter::default()
            }),
            ..OpenstackSpec::default()
        })));
        fill_defaults(&mut cluster).expect("defaults must apply");

        let topology = cluster.spec.networking.topology.expect("topology must be set");
        assert_eq!(topology.control_plane.as_deref(), Some(expected));
        assert_eq!(topology.nodes.as_deref(), Some(expected));
        assert_eq!(cluster.spec.api.dns, None);
        assert_eq!(cluster.spec.api.load_balancer, None);
    }

    #[test]
    fn explicit_values_are_kept() {
        let mut cluster = cluster(None);
        cluster.spec.channel = Some(String::new());
        cluster.spec.authorization = Some(Authorization::Rbac);
        cluster.spec.networking.plugin = Some(NetworkingPlugin::Flannel(FlannelNetworkingSpec {
            backend: Some("vxlan".to_owned()),
        }));
        cluster.spec.api.load_balancer = Some(LoadBalancerAccessSpec {
            lb_type: Some("Internal".to_owned()),
            ..LoadBalancerAccessSpec::default()
        });
        fill_defaults(&mut cluster).expect("defaults must apply");

        assert_eq!(cluster.spec.channel.as_deref(), Some(""));
        assert_eq!(cluster.spec.authorization, Some(Authorization::Rbac));
        assert_eq!(
            cluster.spec.networking.plugin,
            Some(NetworkingPlugin::Flannel(FlannelNetworkingSpec {
                backend: Some("vxlan".to_owned())
            }))
        );
        assert_eq!(cluster.spec.api.dns, None);
        assert_eq!(
            cluster.spec.api.load_balancer.and_then(|lb| lb.lb_type).as_deref(),
            Some("Internal")
        );
    }

    #[test]
    fn flannel_backend() {
        let mut cluster = cluster(None);
        cluster.spec.networking.plugin = Some(NetworkingPlugin::Flannel(FlannelNetworkingSpec::default()));
        fill_defaults(&mut cluster).expect("defaults must apply");
        assert_eq!(
            cluster.spec.networking.plugin,
            Some(NetworkingPlugin::Flannel(FlannelNetworkingSpec {
                backend: Some("udp".to_owned())
            }))
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(CloudProviderSpec::Aws(AwsSpec::default())))]
    #[case(Some(CloudProviderSpec::Openstack(OpenstackSpec::default())))]
    fn idempotent(#[case] cloud_provider: Option<CloudProviderSpec>) {
        let mut once = cluster(cloud_provider);
        fill_defaults(&mut once).expect("defaults must apply");
        let mut twice = once.clone();
        fill_defaults(&mut twice).expect("defaults must apply");
        assert_eq!(once, twice);
    }
}
