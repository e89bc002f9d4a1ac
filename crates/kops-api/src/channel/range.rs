use std::{cmp::Ordering, fmt::Display, str::FromStr};

use semver::Version;
use snafu::{OptionExt, ResultExt, Snafu, ensure};

#[derive(Debug, Snafu)]
pub enum ParseRangeError {
    #[snafu(display("version range and its alternatives must not be empty"))]
    Empty,

    #[snafu(display("unknown operator {operator:?} in comparator {comparator:?}"))]
    UnknownOperator { operator: String, comparator: String },

    #[snafu(display("invalid version in comparator {comparator:?}"))]
    InvalidVersion {
        source: semver::Error,
        comparator: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Operator {
    fn parse(operator: &str) -> Option<Self> {
        match operator {
            "" | "=" | "==" => Some(Self::Equal),
            "!" | "!=" => Some(Self::NotEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterOrEqual),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering.is_eq(),
            Self::NotEqual => ordering.is_ne(),
            Self::Greater => ordering.is_gt(),
            Self::GreaterOrEqual => ordering.is_ge(),
            Self::Less => ordering.is_lt(),
            Self::LessOrEqual => ordering.is_le(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Comparator {
    operator: Operator,
    version: Version,
}

impl FromStr for Comparator {
    type Err = ParseRangeError;

    fn from_str(comparator: &str) -> Result<Self, Self::Err> {
        let split = comparator
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '!'))
            .unwrap_or(comparator.len());
        let (operator, version) = comparator.split_at(split);

        let operator = Operator::parse(operator).context(UnknownOperatorSnafu { operator, comparator })?;
        let version = Version::parse(version).context(InvalidVersionSnafu { comparator })?;

        Ok(Self { operator, version })
    }
}

impl Comparator {
    /// Build metadata takes no part in the comparison.
    fn matches(&self, version: &Version) -> bool {
        let precedence = |v: &Version| (v.major, v.minor, v.patch, v.pre.clone());
        self.operator
            .accepts(precedence(version).cmp(&precedence(&self.version)))
    }
}

/// A version range such as `>=1.4.0 <1.5.0` or `<1.4.0 || >=1.6.0`.
///
/// Comparators within a set are separated by spaces and must all match.
/// A comparator without an operator means exact equality. Versions are
/// compared by semver precedence, so `1.5.0-beta.1` is below `1.5.0` and
/// build metadata is ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    alternatives: Vec<Vec<Comparator>>,
}

impl FromStr for VersionRange {
    type Err = ParseRangeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.trim().is_empty(), EmptySnafu);

        let alternatives = input
            .split("||")
            .map(|set| {
                ensure!(!set.trim().is_empty(), EmptySnafu);
                set.split_whitespace().map(Comparator::from_str).collect()
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            raw: input.to_owned(),
            alternatives,
        })
    }
}

impl Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl VersionRange {
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|set| set.iter().all(|comparator| comparator.matches(version)))
    }
}
