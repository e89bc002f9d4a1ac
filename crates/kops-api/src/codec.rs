//! Decoding and encoding of kops documents.
//!
//! Documents are YAML or JSON. The `apiVersion` and `kind` fields are read
//! first to find the matching conversion in the [`Registry`], then the whole
//! document is decoded into the wire type of that version and converted to
//! the internal model.

use std::str::FromStr;

use kops_version::{ApiVersion, ParseApiVersionError};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::debug;

use crate::{
    model::{Kind, Object},
    registry::{KindCodec, Registry, SchemaError},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse the document"))]
    Parse { source: serde_yaml::Error },

    #[snafu(display("document does not specify an apiVersion"))]
    MissingApiVersion,

    #[snafu(display("document does not specify a kind"))]
    MissingKind,

    #[snafu(display("failed to parse apiVersion {api_version:?}"))]
    ParseApiVersion {
        source: ParseApiVersionError,
        api_version: String,
    },

    #[snafu(display("unknown apiVersion {api_version}"))]
    UnknownVersion { api_version: ApiVersion },

    #[snafu(display("unknown kind {kind:?}"))]
    UnknownKind { kind: String },

    #[snafu(display("{api_version} does not support kind {kind}"))]
    UnsupportedKind { api_version: ApiVersion, kind: Kind },

    #[snafu(display("failed to decode {kind} from {api_version}"))]
    Decode {
        source: SchemaError,
        api_version: ApiVersion,
        kind: Kind,
    },

    #[snafu(display("failed to encode {kind} as {api_version}"))]
    Encode {
        source: SchemaError,
        api_version: ApiVersion,
        kind: Kind,
    },

    #[snafu(display("failed to write the document as YAML"))]
    WriteYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write the document as JSON"))]
    WriteJson { source: serde_json::Error },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// The output format of [`encode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// A decoded document and the version it was written in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub object: Object,
    pub api_version: ApiVersion,
}

impl Decoded {
    pub fn kind(&self) -> Kind {
        self.object.kind()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeMeta {
    #[serde(default)]
    api_version: Option<String>,

    #[serde(default)]
    kind: Option<String>,
}

/// Decodes a single YAML or JSON document.
pub fn decode(input: &str) -> Result<Decoded> {
    let value: serde_yaml::Value = serde_yaml::from_str(input).context(ParseSnafu)?;
    decode_value(value)
}

/// Decodes every document of a YAML stream separated by `---`.
pub fn decode_all(input: &str) -> Result<Vec<Decoded>> {
    serde_yaml::Deserializer::from_str(input)
        .map(|document| serde_yaml::Value::deserialize(document).context(ParseSnafu))
        .filter(|value| !matches!(value, Ok(serde_yaml::Value::Null)))
        .map(|value| value.and_then(decode_value))
        .collect()
}

fn decode_value(value: serde_yaml::Value) -> Result<Decoded> {
    let type_meta: TypeMeta = serde_yaml::from_value(value.clone()).context(ParseSnafu)?;

    let api_version = type_meta.api_version.context(MissingApiVersionSnafu)?;
    let api_version =
        ApiVersion::from_str(&api_version).context(ParseApiVersionSnafu { api_version })?;

    let kind = type_meta.kind.context(MissingKindSnafu)?;
    let kind = Kind::from_str(&kind).ok().context(UnknownKindSnafu { kind })?;

    let codec = lookup(&api_version, kind)?;
    let object = (codec.decode)(value).context(DecodeSnafu {
        api_version: api_version.clone(),
        kind,
    })?;

    debug!(%api_version, %kind, name = %object.metadata().name, "decoded document");
    Ok(Decoded {
        object,
        api_version: ApiVersion::kops(api_version.version),
    })
}

/// Encodes an object in the given version.
///
/// The written `apiVersion` always uses the `kops` group.
pub fn encode(object: &Object, api_version: &ApiVersion, format: OutputFormat) -> Result<String> {
    let api_version = ApiVersion::kops(api_version.version);
    let kind = object.kind();
    let codec = lookup(&api_version, kind)?;

    let value = (codec.encode)(object, &api_version).context(EncodeSnafu {
        api_version: api_version.clone(),
        kind,
    })?;

    debug!(%api_version, %kind, %format, "encoding document");
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(&value).context(WriteYamlSnafu),
        OutputFormat::Json => to_json(&value),
    }
}

/// Encodes an object in the preferred version of the [`Registry`].
pub fn encode_preferred(object: &Object, format: OutputFormat) -> Result<String> {
    encode(object, &Registry::get().preferred(), format)
}

fn to_json(value: &impl Serialize) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context(WriteJsonSnafu)?;
    json.push('\n');
    Ok(json)
}

fn lookup(api_version: &ApiVersion, kind: Kind) -> Result<KindCodec> {
    let schema = Registry::get()
        .version(api_version)
        .context(UnknownVersionSnafu {
            api_version: api_version.clone(),
        })?;

    schema.kind(kind).copied().context(UnsupportedKindSnafu {
        api_version: api_version.clone(),
        kind,
    })
}
