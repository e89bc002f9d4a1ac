//! Validators run over randomly broken documents. Whatever they report must
//! point at a field and say what is wrong with it.

use kops_api::{
    model::{
        AwsSpec, CloudProviderSpec, Cluster, ClusterSpec, ClusterSubnetSpec, EtcdClusterSpec,
        EtcdMemberSpec, GceSpec, InstanceGroup, InstanceGroupRole, InstanceGroupSpec,
        NetworkingPlugin, NetworkingSpec, NoOptions, ObjectMeta, OpenstackSpec, TopologySpec,
        WarmPoolSpec,
    },
    options::{Feature, FeatureFlags, ValidationOptions},
    validation::{
        ErrorList, deep_validate_with_options, validate_cluster, validate_instance_group,
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use strum::IntoEnumIterator;

const SEED: u64 = 0x6b6f_7073;
const ROUNDS: usize = 500;

const CIDRS: &[&str] = &[
    "172.20.0.0/16",
    "172.20.32.0/19",
    "100.64.0.0/10",
    "100.64.0.0/13",
    "10.0.0.1",
    "2001:db8::1",
    "10.0.0.0/33",
    "not-a-cidr",
    "",
];

const NAMES: &[&str] = &["minimal.example.com", "example", "", "UPPER.example.com", "a.b"];
const VERSIONS: &[&str] = &["1.30.2", "1.5.0", "1.6.0-alpha.1", "v1.29.0", "latest", ""];
const SUBNETS: &[&str] = &["us-test-1a", "us-test-1b", ""];
const TOPOLOGIES: &[&str] = &["public", "private", "hybrid"];
const MACHINE_TYPES: &[&str] = &["m5.large", "t4g.medium", "m5.large,c6g.large", "x9.huge", ""];

fn pick<'a, T>(rng: &mut StdRng, values: &'a [T]) -> &'a T {
    values.choose(rng).expect("value pools are not empty")
}

fn maybe(rng: &mut StdRng, values: &[&str]) -> Option<String> {
    rng.random_bool(0.8).then(|| (*pick(rng, values)).to_owned())
}

fn random_cluster(rng: &mut StdRng) -> Cluster {
    let cloud_provider = match rng.random_range(0..5) {
        0 => None,
        1 => Some(CloudProviderSpec::Gce(GceSpec {
            project: maybe(rng, &["project-1"]),
        })),
        2 => Some(CloudProviderSpec::Openstack(OpenstackSpec::default())),
        _ => Some(CloudProviderSpec::Aws(AwsSpec::default())),
    };

    let members = (0..rng.random_range(0..4))
        .map(|i| EtcdMemberSpec {
            name: if rng.random_bool(0.9) { format!("m{i}") } else { String::new() },
            instance_group: maybe(rng, &["master-us-test-1a", "nodes-us-test-1a", "missing"]),
            ..EtcdMemberSpec::default()
        })
        .collect();

    Cluster {
        metadata: ObjectMeta::named(*pick(rng, NAMES)),
        spec: ClusterSpec {
            kubernetes_version: maybe(rng, VERSIONS),
            cloud_provider,
            networking: NetworkingSpec {
                plugin: rng
                    .random_bool(0.9)
                    .then_some(NetworkingPlugin::Kubenet(NoOptions {})),
                network_cidr: maybe(rng, CIDRS),
                non_masquerade_cidr: maybe(rng, CIDRS),
                service_cluster_ip_range: maybe(rng, CIDRS),
                subnets: (0..rng.random_range(0..3))
                    .map(|_| ClusterSubnetSpec {
                        name: (*pick(rng, SUBNETS)).to_owned(),
                        cidr: maybe(rng, CIDRS),
                        zone: maybe(rng, SUBNETS),
                        subnet_type: maybe(rng, &["Public", "Private", "Utility", "Hidden"]),
                        ..ClusterSubnetSpec::default()
                    })
                    .collect(),
                topology: Some(TopologySpec {
                    control_plane: maybe(rng, TOPOLOGIES),
                    nodes: maybe(rng, TOPOLOGIES),
                    bastion: None,
                    dns: maybe(rng, &["Public", "Private", "None", "Other"]),
                }),
                ..NetworkingSpec::default()
            },
            ssh_access: (0..rng.random_range(0..3))
                .map(|_| (*pick(rng, CIDRS)).to_owned())
                .collect(),
            etcd_clusters: vec![EtcdClusterSpec {
                name: "main".to_owned(),
                members,
                ..EtcdClusterSpec::default()
            }],
            warm_pool: rng.random_bool(0.2).then(|| WarmPoolSpec {
                min_size: rng.random_range(-2..3),
                max_size: Some(rng.random_range(-2..3)),
                enable_lifecycle_hook: false,
            }),
            ..ClusterSpec::default()
        },
    }
}

fn random_instance_group(rng: &mut StdRng) -> InstanceGroup {
    let role = rng
        .random_bool(0.9)
        .then(|| *pick(rng, &InstanceGroupRole::iter().collect::<Vec<_>>()));

    InstanceGroup {
        metadata: ObjectMeta::named(*pick(rng, &["master-us-test-1a", "nodes-us-test-1a", ""])),
        spec: InstanceGroupSpec {
            role,
            image: maybe(rng, &["ubuntu-22.04-amd64", "ubuntu-22.04-arm64"]),
            min_size: rng.random_bool(0.8).then(|| rng.random_range(-1..4)),
            max_size: rng.random_bool(0.8).then(|| rng.random_range(-1..4)),
            machine_type: maybe(rng, MACHINE_TYPES),
            subnets: (0..rng.random_range(0..3))
                .map(|_| (*pick(rng, SUBNETS)).to_owned())
                .collect(),
            tenancy: maybe(rng, &["default", "dedicated", "shared"]),
            ..InstanceGroupSpec::default()
        },
    }
}

fn assert_explained(errors: &ErrorList, round: usize) {
    for error in errors {
        assert!(!error.field.is_empty(), "round {round}: {error} has no field");
        assert!(
            !error.field.to_string().is_empty(),
            "round {round}: {error} renders an empty field"
        );
        assert!(!error.detail.is_empty(), "round {round}: {error} has no detail");
    }
}

#[test]
fn random_documents_yield_located_errors() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut seen_errors = 0;

    for round in 0..ROUNDS {
        let cluster = random_cluster(&mut rng);
        let groups: Vec<_> = (0..rng.random_range(0..4))
            .map(|_| random_instance_group(&mut rng))
            .collect();
        let options = ValidationOptions {
            strict_validation: rng.random_bool(0.3),
            feature_flags: if rng.random_bool(0.5) {
                FeatureFlags::default().with(Feature::ApiServerNodes)
            } else {
                FeatureFlags::default()
            },
        };

        let errors = validate_cluster(&cluster, options.strict_validation);
        assert_explained(&errors, round);

        for ig in &groups {
            assert_explained(&validate_instance_group(ig), round);
        }

        let errors = deep_validate_with_options(&cluster, &groups, &options);
        assert_explained(&errors, round);
        seen_errors += errors.len();
    }

    // The generator must actually break things.
    assert!(seen_errors > ROUNDS, "only {seen_errors} errors in {ROUNDS} rounds");
}

#[test]
fn validation_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let cluster = random_cluster(&mut rng);
    let groups: Vec<_> = (0..3).map(|_| random_instance_group(&mut rng)).collect();
    let options = ValidationOptions::strict(true);

    assert_eq!(
        deep_validate_with_options(&cluster, &groups, &options),
        deep_validate_with_options(&cluster, &groups, &options)
    );
}
