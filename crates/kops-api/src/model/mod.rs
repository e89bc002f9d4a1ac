//! The internal, version-independent data model.
//!
//! Choices between alternatives (cloud provider, networking plugin,
//! authentication, authorization, target) are sum types here. The
//! "record of optional fields" shape used in documents only exists in
//! [`crate::versions`].

mod cloud;
mod cluster;
mod components;
mod instance_group;
mod keyset;
mod meta;
mod networking;

pub use cloud::*;
pub use cluster::*;
pub use components::*;
pub use instance_group::*;
pub use keyset::*;
pub use meta::*;
pub use networking::*;

/// Any decoded document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Cluster(Box<Cluster>),
    InstanceGroup(Box<InstanceGroup>),
    Keyset(Box<Keyset>),
}

impl Object {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Cluster(_) => Kind::Cluster,
            Self::InstanceGroup(_) => Kind::InstanceGroup,
            Self::Keyset(_) => Kind::Keyset,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Cluster(cluster) => &cluster.metadata,
            Self::InstanceGroup(ig) => &ig.metadata,
            Self::Keyset(keyset) => &keyset.metadata,
        }
    }

    pub fn into_cluster(self) -> Option<Cluster> {
        match self {
            Self::Cluster(cluster) => Some(*cluster),
            _ => None,
        }
    }

    pub fn into_instance_group(self) -> Option<InstanceGroup> {
        match self {
            Self::InstanceGroup(ig) => Some(*ig),
            _ => None,
        }
    }

    pub fn into_keyset(self) -> Option<Keyset> {
        match self {
            Self::Keyset(keyset) => Some(*keyset),
            _ => None,
        }
    }
}

impl From<Cluster> for Object {
    fn from(cluster: Cluster) -> Self {
        Self::Cluster(Box::new(cluster))
    }
}

impl From<InstanceGroup> for Object {
    fn from(ig: InstanceGroup) -> Self {
        Self::InstanceGroup(Box::new(ig))
    }
}

impl From<Keyset> for Object {
    fn from(keyset: Keyset) -> Self {
        Self::Keyset(Box::new(keyset))
    }
}
