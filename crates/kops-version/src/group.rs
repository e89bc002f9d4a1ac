use std::{fmt, ops::Deref, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{Snafu, ensure};

const MAX_GROUP_LENGTH: usize = 253;

/// The group every kops document belongs to.
pub const KOPS_GROUP: &str = "kops";

/// The fully-qualified spelling of [`KOPS_GROUP`] used by newer tooling.
pub const KOPS_GROUP_ALIAS: &str = "kops.k8s.io";

static API_GROUP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:[a-z0-9][a-z0-9-]{0,61}[a-z0-9]|[a-z0-9])\.?)+$")
        .expect("failed to compile API group regex")
});

/// Error variants which can be encountered when creating a new [`Group`] from
/// unparsed input.
#[derive(Debug, PartialEq, Snafu)]
pub enum ParseGroupError {
    #[snafu(display("group must not be empty"))]
    Empty,

    #[snafu(display("group must not be longer than 253 characters"))]
    TooLong,

    #[snafu(display("group must be a valid DNS subdomain"))]
    InvalidFormat,
}

/// A validated API group, for example `kops`.
///
/// The group string must be non-empty, lower case and a valid DNS subdomain.
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Group(String);

impl FromStr for Group {
    type Err = ParseGroupError;

    fn from_str(group: &str) -> Result<Self, Self::Err> {
        ensure!(!group.is_empty(), EmptySnafu);
        ensure!(group.len() <= MAX_GROUP_LENGTH, TooLongSnafu);
        ensure!(API_GROUP_REGEX.is_match(group), InvalidFormatSnafu);

        Ok(Self(group.to_owned()))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl Deref for Group {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Group {
    /// The canonical kops group.
    pub fn kops() -> Self {
        Self(KOPS_GROUP.to_owned())
    }

    /// Returns `true` if this group names kops documents, either through the
    /// short or the fully-qualified spelling.
    pub fn is_kops(&self) -> bool {
        self.0 == KOPS_GROUP || self.0 == KOPS_GROUP_ALIAS
    }
}
