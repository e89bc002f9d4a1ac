use std::{collections::BTreeSet, convert::Infallible, fmt::Display, str::FromStr};

use clap::Args;
use tracing::debug;

/// Options embedding CLIs flatten into their own argument parser.
///
/// ```
/// # use clap::Parser;
/// use kops_api::options::{Feature, ValidationOptions};
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     validation: ValidationOptions,
/// }
///
/// let cli = Cli::parse_from(["kops", "--strict-validation", "--feature-flags", "+APIServerNodes"]);
/// assert!(cli.validation.strict_validation);
/// assert!(cli.validation.feature_flags.is_enabled(Feature::ApiServerNodes));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Args)]
#[command(next_help_heading = "Validation Options")]
pub struct ValidationOptions {
    /// Require the component configuration that is otherwise filled in later.
    #[arg(long, env = "KOPS_STRICT_VALIDATION")]
    pub strict_validation: bool,

    /// Comma-separated feature flags, for example `+APIServerNodes,-SkipEtcdVersionCheck`.
    #[arg(long, env = "KOPS_FEATURE_FLAGS", default_value = "")]
    pub feature_flags: FeatureFlags,
}

impl ValidationOptions {
    pub fn strict(strict_validation: bool) -> Self {
        Self {
            strict_validation,
            ..Self::default()
        }
    }
}

/// Features that change validation. All are off by default.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Feature {
    /// Allows instance groups with the `APIServer` role.
    #[strum(serialize = "APIServerNodes")]
    ApiServerNodes,

    /// Skips the etcd version checks.
    SkipEtcdVersionCheck,
}

/// Parsed `+Flag,-Flag,Flag` feature flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    enabled: BTreeSet<Feature>,
    unknown: Vec<String>,
}

impl FromStr for FeatureFlags {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::default();

        for flag in input.split(',').map(str::trim).filter(|flag| !flag.is_empty()) {
            let (enable, name) = match flag.strip_prefix('-') {
                Some(name) => (false, name),
                None => (true, flag.strip_prefix('+').unwrap_or(flag)),
            };

            match Feature::from_str(name) {
                Ok(feature) if enable => {
                    flags.enabled.insert(feature);
                }
                Ok(feature) => {
                    flags.enabled.remove(&feature);
                }
                Err(_) => {
                    debug!(flag = name, "ignoring unknown feature flag");
                    flags.unknown.push(name.to_owned());
                }
            }
        }

        Ok(flags)
    }
}

impl Display for FeatureFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags = self
            .enabled
            .iter()
            .map(ToString::to_string)
            .chain(self.unknown.iter().cloned())
            .collect::<Vec<_>>();
        f.write_str(&flags.join(","))
    }
}

impl FeatureFlags {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.enabled.contains(&feature)
    }

    pub fn with(mut self, feature: Feature) -> Self {
        self.enabled.insert(feature);
        self
    }

    /// Flags that did not name a known feature.
    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        validation: ValidationOptions,
    }

    #[rstest]
    #[case("", &[], &[])]
    #[case("APIServerNodes", &[Feature::ApiServerNodes], &[])]
    #[case("+APIServerNodes,+SkipEtcdVersionCheck", &[Feature::ApiServerNodes, Feature::SkipEtcdVersionCheck], &[])]
    #[case("+APIServerNodes,-APIServerNodes", &[], &[])]
    #[case(" +SkipEtcdVersionCheck , Bogus", &[Feature::SkipEtcdVersionCheck], &["Bogus"])]
    fn parse(#[case] input: &str, #[case] enabled: &[Feature], #[case] unknown: &[&str]) {
        let flags: FeatureFlags = input.parse().expect("flags are infallible");
        for feature in Feature::iter() {
            assert_eq!(flags.is_enabled(feature), enabled.contains(&feature), "{feature}");
        }
        assert_eq!(flags.unknown(), unknown);
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["kops"]);
        assert_eq!(cli.validation, ValidationOptions::default());
    }

    #[test]
    fn display_round_trips() {
        let flags = FeatureFlags::default().with(Feature::ApiServerNodes);
        assert_eq!(flags.to_string(), "APIServerNodes");
        assert_eq!(flags.to_string().parse::<FeatureFlags>().expect("flags are infallible"), flags);
    }
}
