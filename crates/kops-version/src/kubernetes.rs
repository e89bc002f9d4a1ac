use std::{fmt::Display, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{ResultExt, Snafu, ensure};

/// Matches the last `/v<version>` path segment of a release URL, for example
/// `https://storage.googleapis.com/kubernetes-release-dev/ci/v1.4.0-alpha.2.677+ea69570f61af8e/`.
static RELEASE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/v(?P<version>\d+(?:\.\d+)*(?:[-+][^/]*)?)/?$")
        .expect("failed to compile release URL regex")
});

#[derive(Debug, Snafu)]
pub enum ParseKubernetesVersionError {
    #[snafu(display("kubernetes version must not be empty"))]
    Empty,

    #[snafu(display("unable to parse kubernetes version {input:?}"))]
    InvalidSemver { source: semver::Error, input: String },
}

/// A Kubernetes version as it appears in `spec.kubernetesVersion`.
///
/// Parsing is tolerant: a leading `v` is stripped, missing minor and patch
/// components are filled with zeroes, and release URLs are reduced to the
/// version in their last `/v<version>` segment. Prerelease and build metadata
/// are kept for display but ignored by [`Self::is_gte`] and [`Self::is_lt`].
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct KubernetesVersion(semver::Version);

impl FromStr for KubernetesVersion {
    type Err = ParseKubernetesVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        ensure!(!trimmed.is_empty(), EmptySnafu);

        let candidate = match RELEASE_URL_REGEX.captures(trimmed) {
            Some(captures) => captures
                .name("version")
                .expect("internal error: check that the correct match label is specified")
                .as_str(),
            None => trimmed.strip_prefix('v').unwrap_or(trimmed),
        };

        semver::Version::parse(&pad_version_core(candidate))
            .map(Self)
            .context(InvalidSemverSnafu { input })
    }
}

impl Display for KubernetesVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<semver::Version> for KubernetesVersion {
    fn from(version: semver::Version) -> Self {
        Self(version)
    }
}

impl KubernetesVersion {
    /// The version exactly as parsed, including prerelease and build metadata.
    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }

    /// The `major.minor.patch` part of the version, used for every ordering
    /// decision.
    pub fn release(&self) -> semver::Version {
        semver::Version::new(self.0.major, self.0.minor, self.0.patch)
    }

    /// The `major.minor` part of the version.
    pub fn minor_release(&self) -> semver::Version {
        semver::Version::new(self.0.major, self.0.minor, 0)
    }

    /// Returns `true` if this version is at or above `other`, ignoring
    /// prerelease and build metadata on both sides.
    pub fn is_gte(&self, other: &semver::Version) -> bool {
        self.release() >= strip(other)
    }

    /// Returns `true` if this version is below `other`, ignoring prerelease
    /// and build metadata on both sides.
    pub fn is_lt(&self, other: &semver::Version) -> bool {
        !self.is_gte(other)
    }
}

fn strip(version: &semver::Version) -> semver::Version {
    semver::Version::new(version.major, version.minor, version.patch)
}

/// Pads `1` and `1.6` style version cores to three components so that strict
/// semver parsing accepts them.
fn pad_version_core(input: &str) -> String {
    let split = input.find(['-', '+']).unwrap_or(input.len());
    let (core, rest) = input.split_at(split);

    let mut padded = core.to_owned();
    for _ in core.split('.').count()..3 {
        padded.push_str(".0");
    }
    padded.push_str(rest);
    padded
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::str::FromStr;

    use serde::{Deserialize, Serialize, de::Visitor};

    use super::KubernetesVersion;

    impl<'de> Deserialize<'de> for KubernetesVersion {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            struct KubernetesVersionVisitor;

            impl Visitor<'_> for KubernetesVersionVisitor {
                type Value = KubernetesVersion;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(formatter, "a Kubernetes version or release URL")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: serde::de::Error,
                {
                    KubernetesVersion::from_str(v).map_err(serde::de::Error::custom)
                }
            }

            deserializer.deserialize_str(KubernetesVersionVisitor)
        }
    }

    impl Serialize for KubernetesVersion {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }
}
