use std::collections::HashSet;

use tracing::debug;

use crate::{
    model::{
        CLOUD_PROVIDER_EXTERNAL, CloudProviderSpec, Cluster, InstanceGroup, InstanceGroupRole,
        MixedInstancesPolicySpec, SUPPORTED_FILESYSTEMS, SUPPORTED_TENANCIES,
        SUPPORTED_USER_DATA_TYPES, UserData, VolumeMountSpec, VolumeSpec,
    },
    validation::{
        ErrorList, FieldError, Path, aws,
        cluster::{validate_file_assets, validate_hooks, validate_rolling_update, validate_warm_pool},
        gce, openstack,
        primitives::is_valid_value,
    },
};

const SUPPORTED_SPOT_ALLOCATION_STRATEGIES: &[&str] = &[
    "lowest-price",
    "capacity-optimized",
    "capacity-optimized-prioritized",
    "price-capacity-optimized",
];

const SUPPORTED_ON_DEMAND_ALLOCATION_STRATEGIES: &[&str] = &["lowest-price", "prioritized"];

const INSTANCE_PROFILE_RESOURCE_PREFIX: &str = "instance-profile";

/// Validates an instance group without looking at its cluster.
pub fn validate_instance_group(ig: &InstanceGroup) -> ErrorList {
    let mut errors = ErrorList::new();
    let spec = &ig.spec;
    let spec_path = Path::new("spec");

    if ig.metadata.name.is_empty() {
        errors.push(FieldError::required(
            &Path::new("metadata").child("name"),
            "InstanceGroup name is required",
        ));
    }

    match spec.role {
        None => errors.push(FieldError::required(
            &spec_path.child("role"),
            "InstanceGroup did not have a role set",
        )),
        Some(InstanceGroupRole::ControlPlane) if spec.subnets.is_empty() => {
            errors.push(FieldError::required(
                &spec_path.child("subnets"),
                "control-plane InstanceGroups must specify at least one subnet",
            ));
        }
        Some(_) => {}
    }

    if let Some(min_size) = spec.min_size {
        if min_size < 0 {
            errors.push(FieldError::invalid(
                &spec_path.child("minSize"),
                min_size,
                "minSize must be greater than or equal to 0",
            ));
        }
    }
    if let Some(max_size) = spec.max_size {
        if spec.min_size.is_some_and(|min_size| max_size < min_size) {
            errors.push(FieldError::invalid(
                &spec_path.child("maxSize"),
                max_size,
                "maxSize must be greater than or equal to minSize",
            ));
        }
    }

    errors.extend(is_valid_value(
        &spec_path.child("tenancy"),
        spec.tenancy.as_deref(),
        SUPPORTED_TENANCIES,
    ));

    let iops = spec.root_volume.as_ref().and_then(|volume| volume.iops);
    if let Some(iops) = iops {
        if iops < 0 {
            errors.push(FieldError::invalid(
                &spec_path.child("rootVolume").child("iops"),
                iops,
                "rootVolume iops must be greater than or equal to 0",
            ));
        }
    }

    validate_volumes(&spec.volumes, &spec_path.child("volumes"), &mut errors);
    validate_volume_mounts(&spec.volume_mounts, &spec_path.child("volumeMounts"), &mut errors);

    let profile = spec.iam.as_ref().and_then(|iam| iam.profile.as_deref());
    if let Some(profile) = profile {
        let is_instance_profile = aws::Arn::parse(profile)
            .is_some_and(|arn| arn.resource.starts_with(INSTANCE_PROFILE_RESOURCE_PREFIX));
        if !is_instance_profile {
            errors.push(FieldError::invalid(
                &spec_path.child("iam").child("profile"),
                profile,
                "Instance Group IAM Instance Profile must be a valid aws arn such as arn:aws:iam::123456789012:instance-profile/KopsExampleRole",
            ));
        }
    }

    if let Some(policy) = &spec.mixed_instances_policy {
        validate_mixed_instances_policy(
            policy,
            spec.max_size,
            &spec_path.child("mixedInstancesPolicy"),
            &mut errors,
        );
    }

    validate_user_data(
        &spec.additional_user_data,
        &spec_path.child("additionalUserData"),
        &mut errors,
    );
    validate_hooks(&spec.hooks, &spec_path.child("hooks"), &mut errors);
    validate_file_assets(&spec.file_assets, &spec_path.child("fileAssets"), &mut errors);

    if let Some(warm_pool) = &spec.warm_pool {
        validate_warm_pool(warm_pool, &spec_path.child("warmPool"), &mut errors);
    }
    if let Some(rolling_update) = &spec.rolling_update {
        validate_rolling_update(rolling_update, &spec_path.child("rollingUpdate"), &mut errors);
    }

    errors
}

fn validate_volumes(volumes: &[VolumeSpec], path: &Path, errors: &mut ErrorList) {
    let mut devices = HashSet::new();
    for (i, volume) in volumes.iter().enumerate() {
        let field = path.index(i).child("device");
        if volume.device.is_empty() {
            errors.push(FieldError::required(&field, "volumes must have a device name"));
        } else if !devices.insert(volume.device.as_str()) {
            errors.push(FieldError::duplicate(&field, volume.device.as_str()));
        }
    }
}

fn validate_volume_mounts(mounts: &[VolumeMountSpec], path: &Path, errors: &mut ErrorList) {
    let mut devices = HashSet::new();
    let mut paths = HashSet::new();

    for (i, mount) in mounts.iter().enumerate() {
        let mount_path = path.index(i);

        if mount.device.is_empty() {
            errors.push(FieldError::required(
                &mount_path.child("device"),
                "volume mounts must name a device",
            ));
        } else if !devices.insert(mount.device.as_str()) {
            errors.push(FieldError::duplicate(&mount_path.child("device"), mount.device.as_str()));
        }

        if mount.path.is_empty() {
            errors.push(FieldError::required(
                &mount_path.child("path"),
                "volume mounts must have a mount path",
            ));
        } else if !paths.insert(mount.path.as_str()) {
            errors.push(FieldError::duplicate(&mount_path.child("path"), mount.path.as_str()));
        }

        let filesystem_path = mount_path.child("filesystem");
        if mount.filesystem.is_empty() {
            errors.push(FieldError::required(
                &filesystem_path,
                "volume mounts must specify a filesystem",
            ));
        } else {
            errors.extend(is_valid_value(
                &filesystem_path,
                Some(mount.filesystem.as_str()),
                SUPPORTED_FILESYSTEMS,
            ));
        }
    }
}

fn validate_mixed_instances_policy(
    policy: &MixedInstancesPolicySpec,
    max_size: Option<i32>,
    path: &Path,
    errors: &mut ErrorList,
) {
    if policy.instances.len() < 2 {
        errors.push(FieldError::invalid(
            &path.child("instances"),
            policy.instances.len(),
            "Mixed Instance Policy must have at least 2 instance types",
        ));
    }

    if let Some(base) = policy.on_demand_base {
        let field = path.child("onDemandBase");
        if base < 0 {
            errors.push(FieldError::invalid(&field, base, "cannot be less than zero"));
        }
        if base > i64::from(max_size.unwrap_or_default()) {
            errors.push(FieldError::invalid(&field, base, "cannot be greater than max size"));
        }
    }

    if let Some(above_base) = policy.on_demand_above_base {
        let field = path.child("onDemandAboveBase");
        if above_base < 0 {
            errors.push(FieldError::invalid(&field, above_base, "cannot be less than 0"));
        }
        if above_base > 100 {
            errors.push(FieldError::invalid(&field, above_base, "cannot be greater than 100"));
        }
    }

    errors.extend(is_valid_value(
        &path.child("onDemandAllocationStrategy"),
        policy.on_demand_allocation_strategy.as_deref(),
        SUPPORTED_ON_DEMAND_ALLOCATION_STRATEGIES,
    ));
    errors.extend(is_valid_value(
        &path.child("spotAllocationStrategy"),
        policy.spot_allocation_strategy.as_deref(),
        SUPPORTED_SPOT_ALLOCATION_STRATEGIES,
    ));
}

fn validate_user_data(user_data: &[UserData], path: &Path, errors: &mut ErrorList) {
    for (i, data) in user_data.iter().enumerate() {
        let data_path = path.index(i);

        if data.name.is_empty() {
            errors.push(FieldError::required(
                &data_path.child("name"),
                "AdditionalUserData name is required",
            ));
        }
        if data.content.is_empty() {
            errors.push(FieldError::required(
                &data_path.child("content"),
                "AdditionalUserData content is required",
            ));
        }

        let type_path = data_path.child("type");
        if data.data_type.is_empty() {
            errors.push(FieldError::required(&type_path, "AdditionalUserData type is required"));
        } else {
            errors.extend(is_valid_value(
                &type_path,
                Some(data.data_type.as_str()),
                SUPPORTED_USER_DATA_TYPES,
            ));
        }
    }
}

/// Validates an instance group together with the cluster it belongs to.
/// The errors of [`validate_instance_group`] are included.
pub fn cross_validate_instance_group(ig: &InstanceGroup, cluster: &Cluster, strict: bool) -> ErrorList {
    let mut errors = validate_instance_group(ig);
    let spec = &ig.spec;
    let spec_path = Path::new("spec");

    for (i, subnet) in spec.subnets.iter().enumerate() {
        if cluster.spec.subnet(subnet).is_none() {
            errors.push(FieldError::not_found(
                &spec_path.child("subnets").index(i),
                subnet.as_str(),
                format!(
                    "InstanceGroup {:?} is configured in {subnet:?}, but this is not configured as a Subnet in the cluster",
                    ig.metadata.name
                ),
            ));
        }
    }

    if !spec.taints.is_empty() && cluster.spec.is_kubernetes_lt(1, 6, 0) {
        errors.push(FieldError::forbidden(
            &spec_path.child("taints"),
            format!(
                "User-specified taints are not supported before kubernetes version 1.6.0, cluster runs {}",
                cluster.spec.kubernetes_version.as_deref().unwrap_or_default()
            ),
        ));
    }

    if let Some(cloud_provider) = cluster.spec.cloud_provider_id() {
        let cloud_provider: &'static str = cloud_provider.into();
        let kubelet_provider = spec.kubelet.as_ref().and_then(|kubelet| kubelet.cloud_provider.as_deref());
        if let Some(value) = kubelet_provider {
            if value != cloud_provider && value != CLOUD_PROVIDER_EXTERNAL {
                errors.push(FieldError::forbidden(
                    &spec_path.child("kubelet").child("cloudProvider"),
                    "Did not match cluster cloudProvider",
                ));
            }
        }
    }

    if strict && spec.machine_type.as_deref().is_none_or(str::is_empty) {
        errors.push(FieldError::required(
            &spec_path.child("machineType"),
            "machineType must be set",
        ));
    }

    if !cluster.spec.is_aws() {
        if !spec.volumes.is_empty() {
            errors.push(FieldError::forbidden(
                &spec_path.child("volumes"),
                "instance group volumes are only supported on AWS",
            ));
        }
        if spec.warm_pool.is_some() {
            errors.push(FieldError::forbidden(
                &spec_path.child("warmPool"),
                "warm pools are only supported on AWS",
            ));
        }
    }

    match &cluster.spec.cloud_provider {
        Some(CloudProviderSpec::Aws(_)) => errors.extend(aws::validate_instance_group(ig)),
        Some(CloudProviderSpec::Gce(_)) => errors.extend(gce::validate_instance_group(ig)),
        Some(CloudProviderSpec::Openstack(_)) => {
            errors.extend(openstack::validate_instance_group(ig));
        }
        _ => {}
    }

    debug!(
        instance_group = %ig.metadata.name,
        cluster = %cluster.metadata.name,
        errors = errors.len(),
        "cross-validated instance group"
    );
    errors
}
