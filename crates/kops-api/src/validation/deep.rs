use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    model::{Cluster, InstanceGroup, InstanceGroupRole},
    options::{Feature, ValidationOptions},
    validation::{
        ErrorList, FieldError, Path, cluster::validate_cluster_with_options,
        instance_group::cross_validate_instance_group,
    },
};

/// Validates a cluster together with all of its instance groups.
///
/// Equivalent to [`deep_validate_with_options`] with default feature flags.
pub fn deep_validate(cluster: &Cluster, groups: &[InstanceGroup], strict: bool) -> ErrorList {
    deep_validate_with_options(cluster, groups, &ValidationOptions::strict(strict))
}

/// Validates a cluster together with all of its instance groups.
///
/// Errors found in a single instance group are reported below
/// `instanceGroups[<name>]`, for example
/// `instanceGroups[nodes].spec.subnets[0]`.
pub fn deep_validate_with_options(
    cluster: &Cluster,
    groups: &[InstanceGroup],
    options: &ValidationOptions,
) -> ErrorList {
    let mut errors = validate_cluster_with_options(cluster, options);
    let groups_path = Path::new("instanceGroups");

    if groups.is_empty() {
        errors.push(FieldError::required(
            &groups_path,
            "must configure at least one InstanceGroup",
        ));
    } else {
        if !groups.iter().any(InstanceGroup::is_control_plane) {
            errors.push(FieldError::required(
                &groups_path,
                "must configure at least one Master InstanceGroup",
            ));
        }
        if !groups
            .iter()
            .any(|ig| ig.spec.role == Some(InstanceGroupRole::Node))
        {
            errors.push(FieldError::required(
                &groups_path,
                "must configure at least one Node InstanceGroup",
            ));
        }
    }

    let mut names = HashSet::new();
    for ig in groups {
        let ig_path = groups_path.key(ig.metadata.name.as_str());

        if !names.insert(ig.metadata.name.as_str()) {
            errors.push(FieldError::duplicate(
                &ig_path.child("metadata").child("name"),
                ig.metadata.name.as_str(),
            ));
        }

        if ig.spec.role == Some(InstanceGroupRole::ApiServer)
            && !options.feature_flags.is_enabled(Feature::ApiServerNodes)
        {
            errors.push(FieldError::forbidden(
                &ig_path.child("spec").child("role"),
                format!(
                    "the APIServer role requires the {} feature flag",
                    Feature::ApiServerNodes
                ),
            ));
        }

        errors.extend(
            cross_validate_instance_group(ig, cluster, options.strict_validation)
                .into_iter()
                .map(|error| error.under(&ig_path)),
        );
    }

    validate_etcd_members(cluster, groups, &mut errors);

    debug!(
        cluster = %cluster.metadata.name,
        instance_groups = groups.len(),
        errors = errors.len(),
        "deep-validated cluster"
    );
    errors
}

/// Every etcd member must run on an existing control-plane instance group.
fn validate_etcd_members(cluster: &Cluster, groups: &[InstanceGroup], errors: &mut ErrorList) {
    let by_name: HashMap<&str, &InstanceGroup> = groups
        .iter()
        .map(|ig| (ig.metadata.name.as_str(), ig))
        .collect();
    let etcd_path = Path::new("spec").child("etcdClusters");

    for (i, etcd) in cluster.spec.etcd_clusters.iter().enumerate() {
        for (j, member) in etcd.members.iter().enumerate() {
            // A missing reference is reported by the cluster validator.
            let Some(name) = member.instance_group.as_deref() else {
                continue;
            };
            let path = etcd_path
                .index(i)
                .child("members")
                .index(j)
                .child("instanceGroup");

            match by_name.get(name) {
                None => errors.push(FieldError::not_found(
                    &path,
                    name,
                    format!(
                        "etcd member {:?} of etcd cluster {:?} refers to an InstanceGroup that does not exist",
                        member.name, etcd.name
                    ),
                )),
                Some(ig) if !ig.is_control_plane() => errors.push(FieldError::forbidden(
                    &path,
                    format!(
                        "etcd member {:?} of etcd cluster {:?} must run on a control-plane InstanceGroup, {name:?} has role {}",
                        member.name,
                        etcd.name,
                        ig.spec
                            .role
                            .map_or_else(|| "<unset>".to_owned(), |role| role.to_string()),
                    ),
                )),
                Some(_) => {}
            }
        }
    }
}
