//! Effective values of settings that an instance group can override.
//!
//! Each resolver takes the cluster level default and the instance group and
//! returns a fresh value. Neither input is modified.

use tracing::trace;

use crate::{
    merge::Merge,
    model::{InstanceGroup, RollingUpdate, WarmPoolSpec},
};

/// Resolves the warm pool an instance group actually gets.
///
/// Control plane and bastion groups never inherit the cluster default.
pub fn resolve_warm_pool(cluster_default: Option<&WarmPoolSpec>, ig: &InstanceGroup) -> WarmPoolSpec {
    let inherits = !(ig.is_control_plane() || ig.is_bastion());

    let resolved = match (ig.spec.warm_pool.as_ref(), cluster_default) {
        (None, Some(default)) if inherits => default.clone(),
        (None, _) => WarmPoolSpec::disabled(),
        (Some(own), Some(default)) if inherits => {
            let mut resolved = own.clone();
            resolved.merge(default);
            resolved
        }
        (Some(own), _) => own.clone(),
    };

    trace!(instance_group = %ig.metadata.name, ?resolved, "resolved warm pool");
    resolved
}

impl WarmPoolSpec {
    /// Whether a warm pool should be created for this value.
    pub fn is_enabled(&self) -> bool {
        self.max_size.is_none_or(|max_size| max_size != 0)
    }
}

/// Whether an optional effective value enables the warm pool.
pub fn is_warm_pool_enabled(warm_pool: Option<&WarmPoolSpec>) -> bool {
    warm_pool.is_some_and(WarmPoolSpec::is_enabled)
}

/// Resolves the rolling update settings of an instance group.
///
/// Every field set on the group wins. Control plane groups do not inherit
/// the cluster level `maxSurge`.
pub fn resolve_rolling_update(cluster_default: Option<&RollingUpdate>, ig: &InstanceGroup) -> RollingUpdate {
    let mut resolved = ig.spec.rolling_update.clone().unwrap_or_default();

    if let Some(default) = cluster_default {
        let mut default = default.clone();
        if ig.is_control_plane() {
            default.max_surge = None;
        }
        resolved.merge(&default);
    }

    resolved
}
