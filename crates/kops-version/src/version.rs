use std::{cmp::Ordering, fmt::Display, num::ParseIntError, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{OptionExt, ResultExt, Snafu};

use crate::{Level, ParseLevelError};

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(?P<major>\d+)(?P<level>[a-z0-9][a-z0-9-]{0,60}[a-z0-9])?$")
        .expect("failed to compile version regex")
});

/// Error variants which can be encountered when creating a new [`Version`] from
/// unparsed input.
#[derive(Debug, PartialEq, Snafu)]
pub enum ParseVersionError {
    #[snafu(display(
        "invalid version format. Input is empty, contains non-ASCII characters or contains more than 63 characters"
    ))]
    InvalidFormat,

    #[snafu(display("failed to parse major version"))]
    ParseMajorVersion { source: ParseIntError },

    #[snafu(display("failed to parse version level"))]
    ParseLevel { source: ParseLevelError },
}

/// A schema version following the `v<MAJOR>(alpha<LEVEL>|beta<LEVEL>)` format,
/// for example `v1alpha2`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub level: Option<Level>,
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let captures = VERSION_REGEX.captures(input).context(InvalidFormatSnafu)?;

        let major = captures
            .name("major")
            .expect("internal error: check that the correct match label is specified")
            .as_str()
            .parse::<u64>()
            .context(ParseMajorVersionSnafu)?;

        let level = captures
            .name("level")
            .map(|level| Level::from_str(level.as_str()))
            .transpose()
            .context(ParseLevelSnafu)?;

        Ok(Self { major, level })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (&self.level, &other.level) {
            (Some(lhs), Some(rhs)) => lhs.cmp(rhs),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.level {
            Some(level) => write!(f, "v{major}{level}", major = self.major),
            None => write!(f, "v{major}", major = self.major),
        }
    }
}

impl Version {
    pub const fn new(major: u64, level: Option<Level>) -> Self {
        Self { major, level }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::str::FromStr;

    use serde::{Deserialize, Serialize, de::Visitor};

    use super::Version;

    impl<'de> Deserialize<'de> for Version {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            struct VersionVisitor;

            impl Visitor<'_> for VersionVisitor {
                type Value = Version;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(formatter, "a valid kops schema version")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: serde::de::Error,
                {
                    Version::from_str(v).map_err(serde::de::Error::custom)
                }
            }

            deserializer.deserialize_str(VersionVisitor)
        }
    }

    impl Serialize for Version {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }
}
