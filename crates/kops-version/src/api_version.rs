use std::{cmp::Ordering, fmt::Display, str::FromStr};

use snafu::{ResultExt, Snafu};

use crate::{Group, Level, ParseGroupError, ParseVersionError, Version};

/// The `v1alpha2` schema version.
pub const V1ALPHA2: Version = Version::new(1, Some(Level::Alpha(2)));

/// The `v1alpha3` schema version.
pub const V1ALPHA3: Version = Version::new(1, Some(Level::Alpha(3)));

#[derive(Debug, PartialEq, Snafu)]
pub enum ParseApiVersionError {
    #[snafu(display("failed to parse version"))]
    ParseVersion { source: ParseVersionError },

    #[snafu(display("failed to parse group"))]
    ParseGroup { source: ParseGroupError },
}

/// An API version with the `(<GROUP>/)<VERSION>` format, for example
/// `kops/v1alpha2`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ApiVersion {
    pub group: Option<Group>,
    pub version: Version,
}

impl FromStr for ApiVersion {
    type Err = ParseApiVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (group, version) = match input.split_once('/') {
            Some((group, version)) => (
                Some(Group::from_str(group).context(ParseGroupSnafu)?),
                Version::from_str(version).context(ParseVersionSnafu)?,
            ),
            None => (None, Version::from_str(input).context(ParseVersionSnafu)?),
        };

        Ok(Self { group, version })
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.group.partial_cmp(&other.group) {
            Some(Ordering::Equal) => {}
            _ => return None,
        }
        self.version.partial_cmp(&other.version)
    }
}

impl Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{group}/{version}", version = self.version),
            None => write!(f, "{version}", version = self.version),
        }
    }
}

impl ApiVersion {
    /// Creates a kops API version (`kops/<version>`).
    pub fn kops(version: Version) -> Self {
        Self {
            group: Some(Group::kops()),
            version,
        }
    }

    /// Returns `true` if the group is the kops group (or its alias).
    pub fn is_kops(&self) -> bool {
        self.group.as_ref().is_some_and(Group::is_kops)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::str::FromStr;

    use serde::{Deserialize, Serialize, de::Visitor};

    use super::ApiVersion;

    impl<'de> Deserialize<'de> for ApiVersion {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            struct ApiVersionVisitor;

            impl Visitor<'_> for ApiVersionVisitor {
                type Value = ApiVersion;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(formatter, "a valid kops API version")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: serde::de::Error,
                {
                    ApiVersion::from_str(v).map_err(serde::de::Error::custom)
                }
            }

            deserializer.deserialize_str(ApiVersionVisitor)
        }
    }

    impl Serialize for ApiVersion {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }
}
