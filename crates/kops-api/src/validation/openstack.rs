use crate::{
    model::{Cluster, InstanceGroup, OpenstackSpec, TOPOLOGY_PUBLIC},
    validation::{ErrorList, FieldError, Path, primitives::is_valid_value},
};

const SUPPORTED_LOAD_BALANCER_METHODS: &[&str] = &["ROUND_ROBIN", "LEAST_CONNECTIONS", "SOURCE_IP"];

pub(super) fn validate_cluster(cluster: &Cluster, openstack: &OpenstackSpec) -> ErrorList {
    let mut errors = ErrorList::new();
    let topology_path = Path::new("spec").child("networking").child("topology");

    // Without an external network nothing can be reached from outside.
    if openstack.external_network().is_none() {
        if let Some(topology) = &cluster.spec.networking.topology {
            for (field, value) in [
                ("controlPlane", topology.control_plane.as_deref()),
                ("nodes", topology.nodes.as_deref()),
            ] {
                if value == Some(TOPOLOGY_PUBLIC) {
                    errors.push(FieldError::forbidden(
                        &topology_path.child(field),
                        "Public topology requires an external network (spec.cloudProvider.openstack.router.externalNetwork)",
                    ));
                }
            }
        }
    }

    if let Some(load_balancer) = &openstack.loadbalancer {
        errors.extend(is_valid_value(
            &Path::new("spec")
                .child("cloudProvider")
                .child("openstack")
                .child("loadbalancer")
                .child("method"),
            load_balancer.method.as_deref(),
            SUPPORTED_LOAD_BALANCER_METHODS,
        ));
    }

    errors
}

pub(super) fn validate_instance_group(ig: &InstanceGroup) -> ErrorList {
    let mut errors = ErrorList::new();
    if ig.spec.image.as_deref().is_none_or(str::is_empty) {
        errors.push(FieldError::required(
            &Path::new("spec").child("image"),
            "image must be specified on OpenStack",
        ));
    }
    errors
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        model::{OpenstackLoadbalancerConfig, OpenstackRouter},
        validation::fixtures::{self, render},
    };

    #[rstest]
    #[case(Some("ext-net"), "public", "public", &[])]
    #[case(None, "private", "private", &[])]
    #[case(None, "public", "private", &["Forbidden::spec.networking.topology.controlPlane"])]
    #[case(None, "public", "public", &["Forbidden::spec.networking.topology.controlPlane", "Forbidden::spec.networking.topology.nodes"])]
    fn topology_needs_external_network(
        #[case] external_network: Option<&str>,
        #[case] control_plane: &str,
        #[case] nodes: &str,
        #[case] expected: &[&str],
    ) {
        let mut cluster = fixtures::cluster();
        let topology = cluster.spec.networking.topology.as_mut().expect("fixture has a topology");
        topology.control_plane = Some(control_plane.to_owned());
        topology.nodes = Some(nodes.to_owned());
        let openstack = OpenstackSpec {
            router: Some(OpenstackRouter {
                external_network: external_network.map(str::to_owned),
                external_subnet: None,
            }),
            loadbalancer: None,
        };
        assert_eq!(render(&validate_cluster(&cluster, &openstack)), expected);
    }

    #[rstest]
    #[case("ROUND_ROBIN", &[])]
    #[case("LEAST_CONNECTIONS", &[])]
    #[case("SOURCE_IP", &[])]
    #[case("RANDOM", &["Unsupported value::spec.cloudProvider.openstack.loadbalancer.method"])]
    fn load_balancer_methods(#[case] method: &str, #[case] expected: &[&str]) {
        let openstack = OpenstackSpec {
            router: Some(OpenstackRouter {
                external_network: Some("ext-net".to_owned()),
                external_subnet: None,
            }),
            loadbalancer: Some(OpenstackLoadbalancerConfig {
                method: Some(method.to_owned()),
                ..OpenstackLoadbalancerConfig::default()
            }),
        };
        assert_eq!(render(&validate_cluster(&fixtures::cluster(), &openstack)), expected);
    }

    #[test]
    fn image_required() {
        let mut ig = fixtures::nodes();
        assert!(validate_instance_group(&ig).is_empty());
        ig.spec.image = None;
        assert_eq!(render(&validate_instance_group(&ig)), ["Required value::spec.image"]);
    }
}
