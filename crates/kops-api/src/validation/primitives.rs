// Adapted from the Kubernetes apimachinery validation helpers (pkg/util/validation/validation.go)
// and the kops validation helpers operating on them.

use std::{net::IpAddr, str::FromStr, sync::LazyLock};

use const_format::concatcp;
use ipnet::IpNet;
use regex::Regex;

use crate::validation::{ErrorList, FieldError, Path};

pub const RFC_1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const RFC_1123_LABEL_MAX_LENGTH: usize = 63;

/// This is a subdomain's max length in DNS (RFC 1123)
const RFC_1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
pub const RFC_1123_SUBDOMAIN_FMT: &str =
    concatcp!(RFC_1123_LABEL_FMT, "(\\.", RFC_1123_LABEL_FMT, ")*");
const RFC_1123_SUBDOMAIN_ERROR_MSG: &str = "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character";

static RFC_1123_SUBDOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1123_SUBDOMAIN_FMT}$"))
        .expect("failed to compile RFC 1123 subdomain regex")
});

static RFC_1123_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1123_LABEL_FMT}$")).expect("failed to compile RFC 1123 label regex")
});

/// Returns `true` if `child` is a subnet of `parent`. A network is a subnet
/// of itself, and networks of different families never nest.
pub fn is_subnet(parent: &IpNet, child: &IpNet) -> bool {
    parent.trunc().contains(&child.trunc())
}

/// Returns `true` if either network contains the other.
pub fn overlap(a: &IpNet, b: &IpNet) -> bool {
    is_subnet(a, b) || is_subnet(b, a)
}

/// Checks that `value` is a CIDR. Bare IP addresses produce a hint about the
/// missing prefix length.
pub fn validate_cidr(value: &str, field: &Path) -> ErrorList {
    let mut errors = ErrorList::new();
    if IpNet::from_str(value).is_err() {
        let mut detail = String::from("Could not be parsed as a CIDR");
        if !value.contains('/') {
            match IpAddr::from_str(value) {
                Ok(IpAddr::V4(_)) => detail.push_str(&format!(" (did you mean \"{value}/32\")")),
                Ok(IpAddr::V6(_)) => detail.push_str(&format!(" (did you mean \"{value}/128\")")),
                Err(_) => {}
            }
        }
        errors.push(FieldError::invalid(field, value, detail));
    }
    errors
}

/// Parses `value` as a CIDR, recording an error on failure.
pub fn parse_cidr(value: &str, field: &Path, errors: &mut ErrorList) -> Option<IpNet> {
    let parsed = IpNet::from_str(value).ok();
    if parsed.is_none() {
        errors.extend(validate_cidr(value, field));
    }
    parsed
}

/// Checks that `value` is one of `valid`. An absent value is always fine.
pub fn is_valid_value(field: &Path, value: Option<&str>, valid: &[&str]) -> ErrorList {
    let mut errors = ErrorList::new();
    if let Some(value) = value {
        if !valid.contains(&value) {
            errors.push(FieldError::not_supported(field, value, valid));
        }
    }
    errors
}

/// Checks that `value` is a URL with a scheme and a host.
pub fn is_valid_api_server_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Checks that `value` is a lowercase RFC 1123 subdomain.
pub fn validate_dns_1123_subdomain(value: &str, field: &Path) -> ErrorList {
    let mut errors = ErrorList::new();
    if value.len() > RFC_1123_SUBDOMAIN_MAX_LENGTH {
        errors.push(FieldError::invalid(
            field,
            value,
            format!("must be no more than {RFC_1123_SUBDOMAIN_MAX_LENGTH} characters"),
        ));
    }
    if !RFC_1123_SUBDOMAIN_REGEX.is_match(value) {
        errors.push(FieldError::invalid(
            field,
            value,
            format!(
                "{RFC_1123_SUBDOMAIN_ERROR_MSG} (e.g. \"example.com\", regex used for validation is {RFC_1123_SUBDOMAIN_FMT:?})"
            ),
        ));
    }
    errors
}

/// Returns `true` if `value` is a lowercase RFC 1123 label.
pub fn is_dns_1123_label(value: &str) -> bool {
    value.len() <= RFC_1123_LABEL_MAX_LENGTH && RFC_1123_LABEL_REGEX.is_match(value)
}

/// Parses a `startPort-endPort` range.
pub fn parse_port_range(value: &str) -> Option<(u16, u16)> {
    let (start, end) = value.split_once('-')?;
    let start = start.trim().parse::<u16>().ok()?;
    let end = end.trim().parse::<u16>().ok()?;
    (start <= end).then_some((start, end))
}

/// Checks that `value` parses as an IP address.
pub fn validate_ip(value: &str, field: &Path) -> ErrorList {
    let mut errors = ErrorList::new();
    if IpAddr::from_str(value).is_err() {
        errors.push(FieldError::invalid(field, value, "Could not be parsed as an IP address"));
    }
    errors
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::validation::ErrorKind;

    fn cidr(s: &str) -> IpNet {
        s.parse().expect("test CIDR must parse")
    }

    #[rstest]
    #[case("10.0.0.0/16")]
    #[case("10.0.0.1/32")]
    #[case("0.0.0.0/0")]
    #[case("2001:db8::/32")]
    #[case("::/0")]
    fn validate_cidr_pass(#[case] value: &str) {
        assert!(validate_cidr(value, &Path::new("cidr")).is_empty());
    }

    #[rstest]
    #[case("10.0.0.1", Some("did you mean \"10.0.0.1/32\""))]
    #[case("2001:db8::1", Some("did you mean \"2001:db8::1/128\""))]
    #[case("10.0.0.0/33", None)]
    #[case("10.0.0/16", None)]
    #[case("10.0.0.0/+8", None)]
    #[case("10.0.0.0/", None)]
    #[case("not-a-cidr", None)]
    #[case("", None)]
    fn validate_cidr_fail(#[case] value: &str, #[case] hint: Option<&str>) {
        let errors = validate_cidr(value, &Path::new("spec").child("sshAccess").index(0));
        assert_eq!(errors.len(), 1);

        let error = &errors.as_slice()[0];
        assert_eq!(error.kind, ErrorKind::Invalid);
        assert_eq!(error.field.to_string(), "spec.sshAccess[0]");
        match hint {
            Some(hint) => assert!(error.detail.contains(hint), "{}", error.detail),
            None => assert!(!error.detail.contains("did you mean")),
        }
    }

    #[rstest]
    #[case("10.0.0.0/16", "10.0.0.0/16", true)]
    #[case("10.0.0.0/16", "10.0.32.0/19", true)]
    #[case("10.0.0.0/8", "10.255.255.255/32", true)]
    #[case("0.0.0.0/0", "192.168.1.0/24", true)]
    #[case("10.0.32.0/19", "10.0.0.0/16", false)]
    #[case("10.0.0.0/16", "10.1.0.0/24", false)]
    #[case("10.0.0.0/16", "2001:db8::/64", false)]
    #[case("2001:db8::/32", "2001:db8:1::/48", true)]
    fn is_subnet_cases(#[case] parent: &str, #[case] child: &str, #[case] expected: bool) {
        assert_eq!(is_subnet(&cidr(parent), &cidr(child)), expected);
    }

    #[rstest]
    #[case("10.0.0.0/16", "10.0.1.0/24", true)]
    #[case("10.0.1.0/24", "10.0.0.0/16", true)]
    #[case("10.0.0.0/16", "10.0.0.0/16", true)]
    #[case("10.0.0.0/16", "10.1.0.0/16", false)]
    #[case("100.64.0.0/10", "172.20.0.0/16", false)]
    #[case("10.0.0.0/8", "::/0", false)]
    fn overlap_cases(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
        assert_eq!(overlap(&cidr(a), &cidr(b)), expected);
    }

    #[test]
    fn host_bits_are_kept_but_ignored_for_nesting() {
        let parsed = cidr("10.0.3.7/16");
        assert_eq!(parsed.to_string(), "10.0.3.7/16");
        assert_eq!(parsed.trunc().to_string(), "10.0.0.0/16");
        assert!(is_subnet(&cidr("10.0.0.0/16"), &parsed));
        assert!(is_subnet(&parsed, &cidr("10.0.200.0/24")));
    }

    #[test]
    fn is_valid_value_absent_is_fine() {
        assert!(is_valid_value(&Path::new("x"), None, &["a", "b"]).is_empty());
    }

    #[rstest]
    #[case("a", true)]
    #[case("b", true)]
    #[case("c", false)]
    #[case("A", false)]
    fn is_valid_value_cases(#[case] value: &str, #[case] ok: bool) {
        let errors = is_valid_value(&Path::new("x"), Some(value), &["a", "b"]);
        assert_eq!(errors.is_empty(), ok);
        if !ok {
            assert_eq!(errors.as_slice()[0].kind, ErrorKind::NotSupported);
        }
    }

    #[rstest]
    #[case("https://api.example.com", true)]
    #[case("http://127.0.0.1:8080", true)]
    #[case("api.example.com", false)]
    #[case("file:///etc/passwd", false)]
    #[case("", false)]
    fn api_server_url(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_api_server_url(value), expected);
    }

    #[rstest]
    #[case("example.com")]
    #[case("a.b.c")]
    #[case("my-cluster.k8s.local")]
    #[case("0.0")]
    fn dns_subdomain_pass(#[case] value: &str) {
        assert!(validate_dns_1123_subdomain(value, &Path::new("name")).is_empty());
    }

    #[rstest]
    #[case("")]
    #[case("-example.com")]
    #[case("Example.com")]
    #[case("example..com")]
    #[case("example.com.")]
    #[case("under_score.com")]
    fn dns_subdomain_fail(#[case] value: &str) {
        assert!(!validate_dns_1123_subdomain(value, &Path::new("name")).is_empty());
    }

    #[rstest]
    #[case("30000-32767", Some((30000, 32767)))]
    #[case("80-80", Some((80, 80)))]
    #[case("32767-30000", None)]
    #[case("30000", None)]
    #[case("a-b", None)]
    #[case("1-70000", None)]
    fn port_range(#[case] value: &str, #[case] expected: Option<(u16, u16)>) {
        assert_eq!(parse_port_range(value), expected);
    }
}
