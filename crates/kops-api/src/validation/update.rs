use tracing::debug;

use crate::{
    model::{Cluster, ClusterSpec, ClusterStatus, EtcdClusterSpec, EtcdMemberSpec},
    validation::{ErrorList, FieldError, Path, cluster::validate_cluster},
};

/// A field that may not change once set, addressed relative to `spec`.
struct ImmutableField<T> {
    path: &'static [&'static str],
    label: &'static str,
    value: fn(&T) -> Option<String>,
}

const IMMUTABLE_CLUSTER_FIELDS: &[ImmutableField<ClusterSpec>] = &[
    ImmutableField {
        path: &["networking", "networkCIDR"],
        label: "NetworkCIDR",
        value: |spec: &ClusterSpec| spec.networking.network_cidr.clone(),
    },
    ImmutableField {
        path: &["networking", "networkID"],
        label: "NetworkID",
        value: |spec: &ClusterSpec| spec.networking.network_id.clone(),
    },
    ImmutableField {
        path: &["networking", "nonMasqueradeCIDR"],
        label: "NonMasqueradeCIDR",
        value: |spec: &ClusterSpec| spec.networking.non_masquerade_cidr.clone(),
    },
    ImmutableField {
        path: &["networking", "serviceClusterIPRange"],
        label: "ServiceClusterIPRange",
        value: |spec: &ClusterSpec| spec.networking.service_cluster_ip_range.clone(),
    },
    ImmutableField {
        path: &["cloudProvider"],
        label: "CloudProvider",
        value: |spec: &ClusterSpec| {
            spec.cloud_provider_id()
                .map(|id| <&'static str>::from(id).to_owned())
        },
    },
];

const IMMUTABLE_ETCD_MEMBER_FIELDS: &[ImmutableField<EtcdMemberSpec>] = &[
    ImmutableField {
        path: &["name"],
        label: "Name",
        value: |member: &EtcdMemberSpec| Some(member.name.clone()),
    },
    ImmutableField {
        path: &["instanceGroup"],
        label: "InstanceGroup",
        value: |member: &EtcdMemberSpec| member.instance_group.clone(),
    },
    ImmutableField {
        path: &["volumeType"],
        label: "VolumeType",
        value: |member: &EtcdMemberSpec| member.volume_type.clone(),
    },
    ImmutableField {
        path: &["volumeIOPS"],
        label: "VolumeIOPS",
        value: |member: &EtcdMemberSpec| member.volume_iops.map(|iops| iops.to_string()),
    },
    ImmutableField {
        path: &["volumeSize"],
        label: "VolumeSize",
        value: |member: &EtcdMemberSpec| member.volume_size.map(|size| size.to_string()),
    },
    ImmutableField {
        path: &["kmsKeyID"],
        label: "KmsKeyID",
        value: |member: &EtcdMemberSpec| member.kms_key_id.clone(),
    },
    ImmutableField {
        path: &["encryptedVolume"],
        label: "EncryptedVolume",
        value: |member: &EtcdMemberSpec| member.encrypted_volume.map(|encrypted| encrypted.to_string()),
    },
];

impl<T> ImmutableField<T> {
    fn field(&self, parent: &Path) -> Path {
        self.path
            .iter()
            .fold(parent.clone(), |path, segment| path.child(*segment))
    }
}

/// Validates a change from the accepted cluster `old` to `new`.
///
/// `new` must be valid on its own. Fields that cannot change after creation
/// are reported as [`Forbidden`](super::ErrorKind::Forbidden). The members of
/// an etcd cluster are only locked once `status` records that the etcd
/// cluster was created.
pub fn validate_cluster_update(new: &Cluster, status: &ClusterStatus, old: &Cluster) -> ErrorList {
    let mut errors = validate_cluster(new, false);
    let spec_path = Path::new("spec");

    if new.metadata.name != old.metadata.name {
        errors.push(FieldError::forbidden(
            &Path::new("metadata").child("name"),
            "Name cannot be changed",
        ));
    }

    // Later defaulting fills in unset fields, so only a set value is locked.
    for field in IMMUTABLE_CLUSTER_FIELDS {
        let Some(old_value) = (field.value)(&old.spec) else {
            continue;
        };
        if (field.value)(&new.spec).as_deref() != Some(old_value.as_str()) {
            errors.push(FieldError::forbidden(
                &field.field(&spec_path),
                format!("{} cannot be changed", field.label),
            ));
        }
    }

    let etcd_path = spec_path.child("etcdClusters");
    for old_etcd in &old.spec.etcd_clusters {
        let path = etcd_path.key(old_etcd.name.as_str());
        let new_etcd = new
            .spec
            .etcd_clusters
            .iter()
            .find(|etcd| etcd.name == old_etcd.name);

        match new_etcd {
            None => errors.push(FieldError::forbidden(&path, "EtcdClusters cannot be removed")),
            Some(new_etcd) if status.is_etcd_cluster_created(&old_etcd.name) => {
                validate_etcd_cluster_update(new_etcd, old_etcd, &path, &mut errors);
            }
            Some(_) => {}
        }
    }

    debug!(
        cluster = %new.metadata.name,
        errors = errors.len(),
        "validated cluster update"
    );
    errors
}

fn validate_etcd_cluster_update(
    new: &EtcdClusterSpec,
    old: &EtcdClusterSpec,
    path: &Path,
    errors: &mut ErrorList,
) {
    let members_path = path.child("members");

    if new.members.len() != old.members.len() {
        errors.push(FieldError::forbidden(
            &members_path,
            format!(
                "the number of members of a created etcd cluster cannot be changed, it has {} and would get {}",
                old.members.len(),
                new.members.len()
            ),
        ));
        return;
    }

    for (new_member, old_member) in new.members.iter().zip(&old.members) {
        let member_path = members_path.key(old_member.name.as_str());
        for field in IMMUTABLE_ETCD_MEMBER_FIELDS {
            if (field.value)(new_member) != (field.value)(old_member) {
                errors.push(FieldError::forbidden(
                    &field.field(&member_path),
                    format!("{} cannot be changed", field.label),
                ));
            }
        }
    }
}
