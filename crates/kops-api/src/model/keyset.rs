use serde::{Deserialize, Serialize};

use crate::model::ObjectMeta;

pub const KEYSET_TYPE_KEYPAIR: &str = "Keypair";
pub const KEYSET_TYPE_SECRET: &str = "Secret";
pub const SUPPORTED_KEYSET_TYPES: &[&str] = &[KEYSET_TYPE_KEYPAIR, KEYSET_TYPE_SECRET];

/// A named set of key material. The material itself is opaque.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyset {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: KeysetSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysetSpec {
    /// `Keypair` or `Secret`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub keyset_type: Option<String>,

    /// Id of the item currently used for signing.
    #[serde(default, rename = "primaryID", skip_serializing_if = "Option::is_none")]
    pub primary_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<KeysetItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysetItem {
    #[serde(default)]
    pub id: String,

    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub public_material: Option<Vec<u8>>,

    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub private_material: Option<Vec<u8>>,
}

/// Byte strings are written as standard base64 on the wire.
mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| STANDARD.decode(encoded.trim()).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn material_is_base64_on_the_wire() {
        let keyset: Keyset = serde_yaml::from_str(indoc! {"
            metadata:
              name: ca
            spec:
              type: Keypair
              primaryID: \"2\"
              keys:
              - id: \"2\"
                publicMaterial: aGVsbG8=
        "})
        .expect("keyset must deserialize");

        assert_eq!(keyset.spec.keys[0].public_material.as_deref(), Some(b"hello".as_slice()));
        assert_eq!(keyset.spec.keys[0].private_material, None);

        let yaml = serde_yaml::to_string(&keyset).expect("keyset must serialize");
        assert!(yaml.contains("publicMaterial: aGVsbG8="), "{yaml}");
        assert!(!yaml.contains("privateMaterial"), "{yaml}");
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result = serde_yaml::from_str::<KeysetItem>("id: a\npublicMaterial: '!!!'");
        assert!(result.is_err());
    }
}
