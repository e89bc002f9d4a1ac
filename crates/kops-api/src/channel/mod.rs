//! Channels: published documents recommending Kubernetes versions, kops
//! versions and machine images.
//!
//! Fetching is delegated to a [`VfsReader`], so this module performs no I/O
//! on its own.

use std::{collections::BTreeMap, sync::LazyLock};

use jiff::{SignedDuration, Timestamp};
use kops_version::KubernetesVersion;
use semver::Version;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};
use url::Url;

use crate::model::{CloudProviderId, ObjectMeta};

mod bundle;
mod range;

pub use bundle::*;
pub use range::*;

/// Channel names without a scheme are resolved against this location.
pub const DEFAULT_CHANNEL_BASE_URL: &str =
    "https://raw.githubusercontent.com/kubernetes/kops/master/channels/";

/// Channels older than this are reported as stale.
const STALE_AFTER: SignedDuration = SignedDuration::from_hours(24 * 365);

static DEFAULT_BASE: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(DEFAULT_CHANNEL_BASE_URL).expect("failed to parse the default channel base URL")
});

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("invalid channel location {location:?}"))]
    InvalidLocation {
        source: url::ParseError,
        location: String,
    },

    #[snafu(display("failed to read channel {location}"))]
    ReadChannel {
        source: std::io::Error,
        location: Url,
    },

    #[snafu(display("failed to parse channel {location}"))]
    ParseChannel {
        source: serde_yaml::Error,
        location: Url,
    },

    #[snafu(display("failed to parse version range {range:?}"))]
    InvalidRange {
        source: ParseRangeError,
        range: String,
    },

    #[snafu(display("failed to parse version {version:?}"))]
    InvalidVersion {
        source: kops_version::ParseKubernetesVersionError,
        version: String,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Reads documents from local disk, object storage or HTTPS.
pub trait VfsReader {
    fn read_file(&self, location: &Url) -> std::io::Result<Vec<u8>>;
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ChannelSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ChannelImageSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kops_versions: Vec<VersionSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kubernetes_versions: Vec<VersionSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelImageSpec {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, rename = "providerID")]
    pub provider_id: String,

    #[serde(default)]
    pub name: String,

    /// Range of Kubernetes versions the image is meant for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,

    #[serde(default, rename = "architectureID", skip_serializing_if = "Option::is_none")]
    pub architecture_id: Option<String>,
}

/// Recommendations for the versions inside `range`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSpec {
    pub range: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_version: Option<String>,

    /// Versions below this one must be upgraded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_version: Option<String>,

    /// The Kubernetes version recommended for kops versions in `range`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
}

impl VersionSpec {
    pub fn matches(&self, version: &Version) -> Result<bool> {
        let range: VersionRange = self.range.parse().context(InvalidRangeSnafu {
            range: self.range.clone(),
        })?;
        Ok(range.matches(version))
    }

    /// Returns the recommended version if it is newer than `current`.
    pub fn find_recommended_upgrade(&self, current: &Version) -> Result<Option<Version>> {
        let Some(recommended) = parse_version(self.recommended_version.as_deref())? else {
            return Ok(None);
        };

        if recommended > *current {
            debug!(%current, %recommended, "upgrade recommended");
            Ok(Some(recommended))
        } else {
            Ok(None)
        }
    }

    /// Whether `current` is older than the required version.
    pub fn is_upgrade_required(&self, current: &Version) -> Result<bool> {
        Ok(parse_version(self.required_version.as_deref())?.is_some_and(|required| required > *current))
    }
}

fn parse_version(version: Option<&str>) -> Result<Option<Version>> {
    version
        .map(|version| {
            version
                .parse::<KubernetesVersion>()
                .map(|parsed| parsed.as_semver().clone())
                .context(InvalidVersionSnafu { version })
        })
        .transpose()
}

/// Returns the first spec whose range contains `version`.
///
/// Specs with a malformed range are skipped.
pub fn find_version_spec<'a>(specs: &'a [VersionSpec], version: &Version) -> Option<&'a VersionSpec> {
    specs.iter().find(|spec| match spec.matches(version) {
        Ok(matches) => matches,
        Err(error) => {
            warn!(%error, range = spec.range, "ignoring version spec with malformed range");
            false
        }
    })
}

/// Resolves a channel name or URL to the location it is read from.
pub fn resolve_location(location: &str) -> Result<Url> {
    let location = if location.is_empty() {
        crate::model::DEFAULT_CHANNEL
    } else {
        location
    };

    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            DEFAULT_BASE.join(location).context(InvalidLocationSnafu { location })
        }
        Err(source) => Err(source).context(InvalidLocationSnafu { location }),
    }
}

/// Loads and parses a channel.
pub fn load_channel(location: &str, reader: &impl VfsReader, clock: &impl Clock) -> Result<Channel> {
    let location = resolve_location(location)?;
    debug!(%location, "loading channel");

    let bytes = reader.read_file(&location).context(ReadChannelSnafu {
        location: location.clone(),
    })?;
    let channel = Channel::parse(&bytes).context(ParseChannelSnafu {
        location: location.clone(),
    })?;

    channel.report_staleness(clock, &location);
    Ok(channel)
}

impl Channel {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_slice(bytes)
    }

    fn report_staleness(&self, clock: &impl Clock, location: &Url) {
        let Some(created) = self
            .metadata
            .creation_timestamp
            .as_deref()
            .and_then(|created| created.parse::<Timestamp>().ok())
        else {
            return;
        };

        let age = clock.now().duration_since(created);
        if age > STALE_AFTER {
            warn!(%location, %created, "channel has not been updated for more than a year");
        } else {
            debug!(%location, %created, "channel is current");
        }
    }

    /// Finds the image recommended for a cloud and, optionally, a
    /// Kubernetes version.
    pub fn find_image(
        &self,
        provider: CloudProviderId,
        kubernetes_version: Option<&KubernetesVersion>,
    ) -> Option<&ChannelImageSpec> {
        let provider = provider.to_string();
        let matching: Vec<_> = self
            .spec
            .images
            .iter()
            .filter(|image| image.provider_id == provider)
            .filter(|image| match (&image.kubernetes_version, kubernetes_version) {
                (Some(range), Some(version)) => match range.parse::<VersionRange>() {
                    Ok(range) => range.matches(&version.release()),
                    Err(error) => {
                        warn!(%error, image = image.name, "ignoring image with malformed version range");
                        false
                    }
                },
                _ => true,
            })
            .collect();

        match matching.as_slice() {
            [] => {
                debug!(%provider, "no matching images specified in channel");
                None
            }
            [image] => Some(image),
            [image, ..] => {
                warn!(%provider, count = matching.len(), "multiple matching images specified in channel");
                Some(image)
            }
        }
    }

    pub fn find_kops_version_spec(&self, kops_version: &Version) -> Option<&VersionSpec> {
        find_version_spec(&self.spec.kops_versions, kops_version)
    }

    pub fn find_kubernetes_version_spec(&self, kubernetes_version: &Version) -> Option<&VersionSpec> {
        find_version_spec(&self.spec.kubernetes_versions, kubernetes_version)
    }

    /// The Kubernetes version recommended for new clusters created by the
    /// given kops version.
    pub fn find_kubernetes_version(&self, kops_version: &Version) -> Result<Option<KubernetesVersion>> {
        let Some(spec) = self.find_kops_version_spec(kops_version) else {
            return Ok(None);
        };

        spec.kubernetes_version
            .as_deref()
            .map(|version| {
                version
                    .parse::<KubernetesVersion>()
                    .context(InvalidVersionSnafu { version })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, io};

    use indoc::indoc;
    use rstest::{fixture, rstest};

    use super::*;

    const CHANNEL: &str = indoc! {r#"
        kind: Channel
        metadata:
          name: stable
          creationTimestamp: "2024-01-01T00:00:00Z"
        spec:
          images:
          - name: kope.io/k8s-1.4-debian-jessie-amd64-hvm-ebs-2016-10-21
            providerID: aws
            kubernetesVersion: ">=1.4.0 <1.5.0"
          - name: kope.io/k8s-1.5-debian-jessie-amd64-hvm-ebs-2017-01-09
            providerID: aws
            kubernetesVersion: ">=1.5.0"
          - name: cos-cloud/cos-stable-57-9202-64-0
            providerID: gce
          kubernetesVersions:
          - range: ">=1.5.0"
            recommendedVersion: 1.5.2
            requiredVersion: 1.5.1
          - range: "<1.5.0"
            recommendedVersion: 1.4.8
            requiredVersion: 1.4.2
          kopsVersions:
          - range: ">=1.5.0-alpha1 <1.5.0"
            recommendedVersion: 1.5.0-beta1
            requiredVersion: 1.5.0-beta1
            kubernetesVersion: 1.5.2
          - range: ">=1.5.0"
            recommendedVersion: 1.5.1
            kubernetesVersion: 1.5.2
          - range: "<1.5.0"
            recommendedVersion: 1.4.5
            requiredVersion: 1.4.5
            kubernetesVersion: 1.4.8
    "#};

    struct MemoryVfs(BTreeMap<String, String>);

    impl VfsReader for MemoryVfs {
        fn read_file(&self, location: &Url) -> io::Result<Vec<u8>> {
            self.0
                .get(location.as_str())
                .map(|content| content.as_bytes().to_vec())
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    struct FixedClock(Timestamp);

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    #[fixture]
    fn channel() -> Channel {
        Channel::parse(CHANNEL.as_bytes()).expect("channel must parse")
    }

    fn version(version: &str) -> Version {
        Version::parse(version).expect("version must parse")
    }

    #[rstest]
    #[case("1.4.0", Some("1.4.8"), true)]
    #[case("1.4.1", Some("1.4.8"), true)]
    #[case("1.4.2", Some("1.4.8"), false)]
    #[case("1.4.4", Some("1.4.8"), false)]
    #[case("1.4.8", None, false)]
    #[case("1.5.0", Some("1.5.2"), true)]
    #[case("1.5.1", Some("1.5.2"), false)]
    #[case("1.5.2", None, false)]
    fn kubernetes_upgrades(
        channel: Channel,
        #[case] current: &str,
        #[case] upgrade: Option<&str>,
        #[case] required: bool,
    ) {
        let current = version(current);
        let spec = channel
            .find_kubernetes_version_spec(&current)
            .expect("version spec must exist");

        assert_eq!(
            spec.find_recommended_upgrade(&current).expect("versions must parse"),
            upgrade.map(version)
        );
        assert_eq!(spec.is_upgrade_required(&current).expect("versions must parse"), required);
    }

    #[rstest]
    #[case("1.4.4", Some("1.4.5"), true)]
    #[case("1.4.5", None, false)]
    #[case("1.5.0-alpha4", Some("1.5.0-beta1"), true)]
    #[case("1.5.0-beta1", None, false)]
    #[case("1.5.0-beta2", None, false)]
    #[case("1.5.0", Some("1.5.1"), false)]
    #[case("1.5.1", None, false)]
    fn kops_upgrades(
        channel: Channel,
        #[case] current: &str,
        #[case] upgrade: Option<&str>,
        #[case] required: bool,
    ) {
        let current = version(current);
        let spec = channel
            .find_kops_version_spec(&current)
            .expect("version spec must exist");

        assert_eq!(
            spec.find_recommended_upgrade(&current).expect("versions must parse"),
            upgrade.map(version)
        );
        assert_eq!(spec.is_upgrade_required(&current).expect("versions must parse"), required);
    }

    #[rstest]
    #[case(CloudProviderId::Aws, Some("1.4.6"), Some("kope.io/k8s-1.4-debian-jessie-amd64-hvm-ebs-2016-10-21"))]
    #[case(CloudProviderId::Aws, Some("1.5.3"), Some("kope.io/k8s-1.5-debian-jessie-amd64-hvm-ebs-2017-01-09"))]
    #[case(CloudProviderId::Aws, Some("1.5.0-alpha.1"), Some("kope.io/k8s-1.5-debian-jessie-amd64-hvm-ebs-2017-01-09"))]
    #[case(CloudProviderId::Aws, None, Some("kope.io/k8s-1.4-debian-jessie-amd64-hvm-ebs-2016-10-21"))]
    #[case(CloudProviderId::Gce, Some("1.5.3"), Some("cos-cloud/cos-stable-57-9202-64-0"))]
    #[case(CloudProviderId::Azure, None, None)]
    fn find_image(
        channel: Channel,
        #[case] provider: CloudProviderId,
        #[case] kubernetes_version: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let kubernetes_version = kubernetes_version
            .map(|version| version.parse::<KubernetesVersion>().expect("version must parse"));
        assert_eq!(
            channel
                .find_image(provider, kubernetes_version.as_ref())
                .map(|image| image.name.as_str()),
            expected
        );
    }

    #[rstest]
    fn kubernetes_version_for_kops(channel: Channel) {
        let found = channel
            .find_kubernetes_version(&version("1.4.3"))
            .expect("version must parse");
        assert_eq!(found.map(|version| version.to_string()), Some("1.4.8".to_owned()));
    }

    #[rstest]
    #[case("stable", "https://raw.githubusercontent.com/kubernetes/kops/master/channels/stable")]
    #[case("", "https://raw.githubusercontent.com/kubernetes/kops/master/channels/stable")]
    #[case("alpha", "https://raw.githubusercontent.com/kubernetes/kops/master/channels/alpha")]
    #[case("s3://bucket/channels/stable", "s3://bucket/channels/stable")]
    #[case("file:///tmp/channel.yaml", "file:///tmp/channel.yaml")]
    fn locations(#[case] location: &str, #[case] expected: &str) {
        assert_eq!(resolve_location(location).expect("location must resolve").as_str(), expected);
    }

    #[test]
    fn load_through_vfs() {
        let vfs = MemoryVfs(BTreeMap::from([(
            format!("{DEFAULT_CHANNEL_BASE_URL}stable"),
            CHANNEL.to_owned(),
        )]));
        let clock = FixedClock("2026-01-01T00:00:00Z".parse().expect("timestamp must parse"));

        let channel = load_channel("stable", &vfs, &clock).expect("channel must load");
        assert_eq!(channel.metadata.name, "stable");

        assert!(matches!(
            load_channel("alpha", &vfs, &clock),
            Err(Error::ReadChannel { .. })
        ));
    }

    #[test]
    fn malformed_channel() {
        let vfs = MemoryVfs(BTreeMap::from([(
            "file:///channel".to_owned(),
            "spec: [".to_owned(),
        )]));
        assert!(matches!(
            load_channel("file:///channel", &vfs, &SystemClock),
            Err(Error::ParseChannel { .. })
        ));
    }
}
