//! The process wide registry of document versions.
//!
//! Every registered version knows how to convert each [`Kind`] between its
//! wire format and the internal model. The registry is built once on first
//! use and is read-only afterwards.

use std::{collections::BTreeMap, sync::LazyLock};

use kops_version::{ApiVersion, V1ALPHA2, V1ALPHA3, Version};
use snafu::{OptionExt, ResultExt, Snafu};

use crate::{
    model::{Cluster, InstanceGroup, Keyset, KeysetSpec, Kind, Object, ObjectMeta},
    versions::{ConversionError, Document, WireSpec, v1alpha2, v1alpha3},
};

#[derive(Debug, Snafu)]
pub enum SchemaError {
    #[snafu(display("failed to deserialize the document"))]
    Deserialize { source: serde_yaml::Error },

    #[snafu(display("failed to serialize the document"))]
    Serialize { source: serde_yaml::Error },

    #[snafu(display("failed to convert the document"))]
    Convert { source: ConversionError },

    #[snafu(display("object of kind {actual} cannot be handled as {expected}"))]
    WrongKind { expected: Kind, actual: Kind },
}

type Result<T, E = SchemaError> = std::result::Result<T, E>;

pub type DecodeFn = fn(serde_yaml::Value) -> Result<Object>;
pub type EncodeFn = fn(&Object, &ApiVersion) -> Result<serde_yaml::Value>;

/// Conversions of one kind in one version.
#[derive(Clone, Copy)]
pub struct KindCodec {
    pub decode: DecodeFn,
    pub encode: EncodeFn,
}

/// A registered document version.
pub struct SchemaVersion {
    pub version: Version,
    kinds: BTreeMap<Kind, KindCodec>,
}

impl SchemaVersion {
    fn new(version: Version) -> Self {
        Self {
            version,
            kinds: BTreeMap::new(),
        }
    }

    fn with_kind<E, W>(mut self) -> Self
    where
        E: Entity,
        W: WireSpec<Internal = E::Spec>,
    {
        self.kinds.insert(E::KIND, KindCodec {
            decode: decode_document::<E, W>,
            encode: encode_document::<E, W>,
        });
        self
    }

    pub fn kind(&self, kind: Kind) -> Option<&KindCodec> {
        self.kinds.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.kinds.keys().copied()
    }
}

pub struct Registry {
    versions: BTreeMap<Version, SchemaVersion>,
    preferred: Version,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let versions = [
        SchemaVersion::new(V1ALPHA2)
            .with_kind::<Cluster, v1alpha2::ClusterSpec>()
            .with_kind::<InstanceGroup, v1alpha2::InstanceGroupSpec>()
            .with_kind::<Keyset, KeysetSpec>(),
        SchemaVersion::new(V1ALPHA3)
            .with_kind::<Cluster, v1alpha3::ClusterSpec>()
            .with_kind::<InstanceGroup, v1alpha3::InstanceGroupSpec>()
            .with_kind::<Keyset, KeysetSpec>(),
    ];

    Registry {
        versions: versions
            .into_iter()
            .map(|schema| (schema.version, schema))
            .collect(),
        preferred: V1ALPHA2,
    }
});

impl Registry {
    pub fn get() -> &'static Self {
        &REGISTRY
    }

    /// Looks up a version of the kops group.
    pub fn version(&self, api_version: &ApiVersion) -> Option<&SchemaVersion> {
        if !api_version.is_kops() {
            return None;
        }
        self.versions.get(&api_version.version)
    }

    /// All registered versions, oldest first.
    pub fn versions(&self) -> impl Iterator<Item = &SchemaVersion> {
        self.versions.values()
    }

    /// The version documents are written in unless the caller picks one.
    pub fn preferred(&self) -> ApiVersion {
        ApiVersion::kops(self.preferred)
    }
}

/// Ties an internal document type to its kind and spec.
pub trait Entity: Into<Object> {
    const KIND: Kind;
    type Spec;

    fn from_parts(metadata: ObjectMeta, spec: Self::Spec) -> Self;

    fn parts(object: &Object) -> Option<(&ObjectMeta, &Self::Spec)>;
}

impl Entity for Cluster {
    type Spec = crate::model::ClusterSpec;

    const KIND: Kind = Kind::Cluster;

    fn from_parts(metadata: ObjectMeta, spec: Self::Spec) -> Self {
        Self { metadata, spec }
    }

    fn parts(object: &Object) -> Option<(&ObjectMeta, &Self::Spec)> {
        match object {
            Object::Cluster(cluster) => Some((&cluster.metadata, &cluster.spec)),
            _ => None,
        }
    }
}

impl Entity for InstanceGroup {
    type Spec = crate::model::InstanceGroupSpec;

    const KIND: Kind = Kind::InstanceGroup;

    fn from_parts(metadata: ObjectMeta, spec: Self::Spec) -> Self {
        Self { metadata, spec }
    }

    fn parts(object: &Object) -> Option<(&ObjectMeta, &Self::Spec)> {
        match object {
            Object::InstanceGroup(ig) => Some((&ig.metadata, &ig.spec)),
            _ => None,
        }
    }
}

impl Entity for Keyset {
    type Spec = KeysetSpec;

    const KIND: Kind = Kind::Keyset;

    fn from_parts(metadata: ObjectMeta, spec: Self::Spec) -> Self {
        Self { metadata, spec }
    }

    fn parts(object: &Object) -> Option<(&ObjectMeta, &Self::Spec)> {
        match object {
            Object::Keyset(keyset) => Some((&keyset.metadata, &keyset.spec)),
            _ => None,
        }
    }
}

fn decode_document<E, W>(value: serde_yaml::Value) -> Result<Object>
where
    E: Entity,
    W: WireSpec<Internal = E::Spec>,
{
    let document: Document<W> = serde_yaml::from_value(value).context(DeserializeSnafu)?;
    let spec = document.spec.into_internal().context(ConvertSnafu)?;
    Ok(E::from_parts(document.metadata, spec).into())
}

fn encode_document<E, W>(object: &Object, api_version: &ApiVersion) -> Result<serde_yaml::Value>
where
    E: Entity,
    W: WireSpec<Internal = E::Spec>,
{
    let (metadata, spec) = E::parts(object).context(WrongKindSnafu {
        expected: E::KIND,
        actual: object.kind(),
    })?;

    let document = Document {
        api_version: api_version.to_string(),
        kind: E::KIND.to_string(),
        metadata: metadata.clone(),
        spec: W::from_internal(spec).context(ConvertSnafu)?,
    };
    serde_yaml::to_value(&document).context(SerializeSnafu)
}
