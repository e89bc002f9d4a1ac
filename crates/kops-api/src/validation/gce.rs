use crate::{
    model::{Cluster, GceSpec, InstanceGroup},
    validation::{ErrorList, FieldError, Path},
};

pub(super) fn validate_cluster(cluster: &Cluster, gce: &GceSpec) -> ErrorList {
    let mut errors = ErrorList::new();
    let spec = &cluster.spec;
    let networking_path = Path::new("spec").child("networking");

    if gce.project.as_deref().is_none_or(str::is_empty) {
        errors.push(FieldError::required(
            &Path::new("spec").child("cloudProvider").child("gce").child("project"),
            "project must be specified on GCE",
        ));
    }

    if spec.networking.network_cidr.is_some() {
        errors.push(FieldError::forbidden(
            &networking_path.child("networkCIDR"),
            "networkCIDR should not be set on GCE",
        ));
    }

    let mut cluster_region: Option<&str> = None;
    for (i, subnet) in spec.networking.subnets.iter().enumerate() {
        let subnet_path = networking_path.child("subnets").index(i);

        if subnet.zone.is_some() {
            errors.push(FieldError::forbidden(
                &subnet_path.child("zone"),
                "zones should not be specified for GCE subnets, as GCE subnets are regional",
            ));
        }

        match subnet.region.as_deref() {
            None | Some("") => errors.push(FieldError::required(
                &subnet_path.child("region"),
                "region must be specified for GCE subnets",
            )),
            Some(region) => match cluster_region {
                None => cluster_region = Some(region),
                Some(first) if first != region => errors.push(FieldError::forbidden(
                    &subnet_path.child("region"),
                    format!("clusters cannot span GCE regions (both {first:?} and {region:?} are specified)"),
                )),
                Some(_) => {}
            },
        }
    }

    errors
}

pub(super) fn validate_instance_group(ig: &InstanceGroup) -> ErrorList {
    let mut errors = ErrorList::new();
    let spec = &ig.spec;
    let spec_path = Path::new("spec");

    let aws_only = [
        ("mixedInstancesPolicy", spec.mixed_instances_policy.is_some()),
        ("instanceMetadata", spec.instance_metadata.is_some()),
        ("cpuCredits", spec.cpu_credits.is_some()),
        ("spotDurationInMinutes", spec.spot_duration_in_minutes.is_some()),
    ];
    for (field, set) in aws_only {
        if set {
            errors.push(FieldError::forbidden(
                &spec_path.child(field),
                format!("{field} is only supported on AWS"),
            ));
        }
    }

    errors
}
