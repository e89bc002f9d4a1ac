//! Translation of field paths between the `v1alpha2` spelling most users
//! still recognize and the internal spelling used by the validators.
//!
//! Paths are compared segment by segment. A `[*]` segment in the table
//! matches any index or key and is carried over to the translated path.
//! When several entries match, the one with the most segments wins.

use std::sync::LazyLock;

/// `(v1alpha2, internal)` pairs.
pub const MOVED_FIELDS: &[(&str, &str)] = &[
    ("spec.masterPublicName", "spec.api.publicName"),
    ("spec.kubernetesApiAccess", "spec.api.access"),
    ("spec.additionalSans", "spec.api.additionalSANs"),
    ("spec.networkCIDR", "spec.networking.networkCIDR"),
    ("spec.networkID", "spec.networking.networkID"),
    ("spec.additionalNetworkCIDRs", "spec.networking.additionalNetworkCIDRs"),
    ("spec.subnets", "spec.networking.subnets"),
    ("spec.nonMasqueradeCIDR", "spec.networking.nonMasqueradeCIDR"),
    ("spec.serviceClusterIPRange", "spec.networking.serviceClusterIPRange"),
    ("spec.podCIDR", "spec.networking.podCIDR"),
    ("spec.topology.masters", "spec.networking.topology.controlPlane"),
    ("spec.topology", "spec.networking.topology"),
    ("spec.masterKubelet", "spec.controlPlaneKubelet"),
    ("spec.configBase", "spec.configStore.base"),
    ("spec.keyStore", "spec.configStore.keypairs"),
    ("spec.secretStore", "spec.configStore.secrets"),
    ("spec.project", "spec.cloudProvider.gce.project"),
    ("spec.etcdClusters[*].etcdMembers", "spec.etcdClusters[*].members"),
];

const WILDCARD: &str = "[*]";

struct Rule {
    human: Vec<String>,
    internal: Vec<String>,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    MOVED_FIELDS
        .iter()
        .map(|(human, internal)| Rule {
            human: tokenize(human),
            internal: tokenize(internal),
        })
        .collect()
});

/// Returns the path as users of the older document format know it.
pub fn human_path(internal: &str) -> String {
    translate(internal, |rule| (rule.internal.as_slice(), rule.human.as_slice()))
}

/// Normalizes a path in either spelling to the internal one.
pub fn internal_path(path: &str) -> String {
    translate(path, |rule| (rule.human.as_slice(), rule.internal.as_slice()))
}

fn translate(path: &str, direction: impl Fn(&Rule) -> (&[String], &[String])) -> String {
    let tokens = tokenize(path);

    let best = RULES
        .iter()
        .map(&direction)
        .filter_map(|(from, to)| matches_prefix(from, &tokens).map(|captures| (from, to, captures)))
        .max_by_key(|(from, ..)| from.len());

    let Some((from, to, captures)) = best else {
        return path.to_owned();
    };

    let mut captures = captures.into_iter();
    let mut translated: Vec<&str> = to
        .iter()
        .map(|token| match token.as_str() {
            WILDCARD => captures.next().unwrap_or(WILDCARD),
            token => token,
        })
        .collect();
    translated.extend(tokens[from.len()..].iter().map(String::as_str));

    render(&translated)
}

/// Returns the tokens matched by wildcards if `pattern` is a prefix of `tokens`.
fn matches_prefix<'a>(pattern: &[String], tokens: &'a [String]) -> Option<Vec<&'a str>> {
    if pattern.len() > tokens.len() {
        return None;
    }

    let mut captures = Vec::new();
    for (expected, actual) in pattern.iter().zip(tokens) {
        if expected == WILDCARD && actual.starts_with('[') {
            captures.push(actual.as_str());
        } else if expected != actual {
            return None;
        }
    }
    Some(captures)
}

/// Splits `a.b[0].c` into `a`, `b`, `[0]`, `c`.
fn tokenize(path: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for c in path.chars() {
        match c {
            '[' if !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                current.push(c);
                in_brackets = true;
            }
            ']' if in_brackets => {
                current.push(c);
                tokens.push(std::mem::take(&mut current));
                in_brackets = false;
            }
            '.' if !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn render(tokens: &[&str]) -> String {
    let mut rendered = String::new();
    for token in tokens {
        if !rendered.is_empty() && !token.starts_with('[') {
            rendered.push('.');
        }
        rendered.push_str(token);
    }
    rendered
}
