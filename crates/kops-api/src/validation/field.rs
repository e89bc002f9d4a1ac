use std::fmt::Display;

use itertools::Itertools as _;
use serde_json::Value;

/// One step of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named field, rendered as `.name`.
    Field(String),

    /// A position in a list, rendered as `[0]`.
    Index(usize),

    /// A map key or list element addressed by name, rendered as `[name]`.
    Key(String),
}

/// The location of a field inside a document, for example
/// `spec.etcdClusters[0].members`.
///
/// Paths are values: every builder method returns a new path and leaves the
/// receiver untouched, so a parent path can be reused for all of its children.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    /// Creates a path consisting of a single field.
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![Segment::Field(root.into())])
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with(Segment::Field(name.into()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.with(Segment::Index(index))
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        self.with(Segment::Key(key.into()))
    }

    /// Appends all segments of `tail` to this path.
    pub fn join(&self, tail: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(tail.0.iter().cloned());
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

/// The closed set of validation error kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum ErrorKind {
    #[strum(serialize = "Required value")]
    Required,

    #[strum(serialize = "Invalid value")]
    Invalid,

    #[strum(serialize = "Unsupported value")]
    NotSupported,

    #[strum(serialize = "Forbidden")]
    Forbidden,

    #[strum(serialize = "Duplicate value")]
    Duplicate,

    #[strum(serialize = "Not found")]
    NotFound,

    #[strum(serialize = "Internal error")]
    InternalError,
}

/// A single validation failure: what went wrong, where, and with which value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub field: Path,
    pub bad_value: Option<Value>,
    pub detail: String,
}

impl FieldError {
    pub fn required(field: &Path, detail: impl Into<String>) -> Self {
        Self::build(ErrorKind::Required, field, None, detail)
    }

    pub fn invalid(field: &Path, value: impl Into<Value>, detail: impl Into<String>) -> Self {
        Self::build(ErrorKind::Invalid, field, Some(value.into()), detail)
    }

    /// The detail lists the supported values, quoted and in the given order.
    pub fn not_supported<S: AsRef<str>>(
        field: &Path,
        value: impl Into<Value>,
        supported: &[S],
    ) -> Self {
        let supported = supported
            .iter()
            .map(|value| format!("{:?}", value.as_ref()))
            .join(", ");
        Self::build(
            ErrorKind::NotSupported,
            field,
            Some(value.into()),
            format!("supported values: {supported}"),
        )
    }

    pub fn forbidden(field: &Path, detail: impl Into<String>) -> Self {
        Self::build(ErrorKind::Forbidden, field, None, detail)
    }

    pub fn duplicate(field: &Path, value: impl Into<Value>) -> Self {
        let value = value.into();
        let detail = format!("{value} is specified more than once");
        Self::build(ErrorKind::Duplicate, field, Some(value), detail)
    }

    pub fn not_found(field: &Path, value: impl Into<Value>, detail: impl Into<String>) -> Self {
        Self::build(ErrorKind::NotFound, field, Some(value.into()), detail)
    }

    pub fn internal(field: &Path, detail: impl Into<String>) -> Self {
        Self::build(ErrorKind::InternalError, field, None, detail)
    }

    fn build(
        kind: ErrorKind,
        field: &Path,
        bad_value: Option<Value>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.clone(),
            bad_value,
            detail: detail.into(),
        }
    }

    /// Re-roots the error below `parent`, used when errors of one document
    /// are reported as part of a larger validation run.
    pub fn under(mut self, parent: &Path) -> Self {
        self.field = parent.join(&self.field);
        self
    }

    /// The field path in the spelling users of the older document version
    /// recognize, see [`crate::field_path::human_path`].
    pub fn human_field(&self) -> String {
        crate::field_path::human_path(&self.field.to_string())
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.human_field(), self.kind)?;
        if let Some(value) = &self.bad_value {
            write!(f, ": {value}")?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// An ordered collection of [`FieldError`]s.
///
/// Validators never stop at the first problem. They append to an error list
/// and return all findings at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorList(Vec<FieldError>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns [`Ok`] if no errors were collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ErrorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            let prefix = match i {
                0 => "",
                _ => "\n",
            };
            write!(f, "{prefix}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl From<FieldError> for ErrorList {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl From<Vec<FieldError>> for ErrorList {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl Extend<FieldError> for ErrorList {
    fn extend<T: IntoIterator<Item = FieldError>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<FieldError> for ErrorList {
    fn from_iter<T: IntoIterator<Item = FieldError>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ErrorList {
    type IntoIter = std::vec::IntoIter<FieldError>;
    type Item = FieldError;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type IntoIter = std::slice::Iter<'a, FieldError>;
    type Item = &'a FieldError;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Path::new("spec"), "spec")]
    #[case(Path::new("spec").child("etcdClusters").index(0).child("members"), "spec.etcdClusters[0].members")]
    #[case(Path::new("spec").child("etcdClusters").key("main").child("members").key("a").child("name"), "spec.etcdClusters[main].members[a].name")]
    #[case(Path::new("spec").child("cloudLabels").key("team"), "spec.cloudLabels[team]")]
    #[case(Path::default(), "")]
    fn path_display(#[case] path: Path, #[case] expected: &str) {
        assert_eq!(path.to_string(), expected);
    }

    #[test]
    fn error_under_parent() {
        let error = FieldError::required(&Path::new("spec").child("role"), "role must be set")
            .under(&Path::new("instanceGroups").key("nodes"));
        assert_eq!(error.field.to_string(), "instanceGroups[nodes].spec.role");
    }

    #[test]
    fn path_builders_do_not_mutate_parent() {
        let parent = Path::new("spec").child("subnets");
        let _ = parent.index(3);
        assert_eq!(parent.to_string(), "spec.subnets");
    }

    #[rstest]
    #[case(ErrorKind::Required, "Required value")]
    #[case(ErrorKind::Invalid, "Invalid value")]
    #[case(ErrorKind::NotSupported, "Unsupported value")]
    #[case(ErrorKind::Forbidden, "Forbidden")]
    #[case(ErrorKind::Duplicate, "Duplicate value")]
    #[case(ErrorKind::NotFound, "Not found")]
    #[case(ErrorKind::InternalError, "Internal error")]
    fn error_kind_display(#[case] kind: ErrorKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }

    #[test]
    fn not_supported_lists_values() {
        let error = FieldError::not_supported(
            &Path::new("spec").child("updatePolicy"),
            "sometimes",
            &["automatic", "external"],
        );
        assert_eq!(error.kind, ErrorKind::NotSupported);
        assert_eq!(error.detail, r#"supported values: "automatic", "external""#);
        assert_eq!(
            error.to_string(),
            r#"spec.updatePolicy: Unsupported value: "sometimes": supported values: "automatic", "external""#
        );
    }

    #[test]
    fn display_without_value() {
        let error = FieldError::required(&Path::new("spec").child("kubernetesVersion"), "");
        assert_eq!(error.to_string(), "spec.kubernetesVersion: Required value");
    }

    #[test]
    fn display_uses_human_path() {
        let error = FieldError::invalid(
            &Path::new("spec").child("networking").child("networkCIDR"),
            "10.0.0.0",
            "Could not be parsed as a CIDR",
        );
        assert_eq!(
            error.to_string(),
            r#"spec.networkCIDR: Invalid value: "10.0.0.0": Could not be parsed as a CIDR"#
        );
    }

    #[test]
    fn duplicate_has_detail() {
        let error = FieldError::duplicate(&Path::new("metadata").child("name"), "nodes");
        assert!(!error.detail.is_empty());
    }

    #[test]
    fn error_list_into_result() {
        assert!(ErrorList::new().into_result().is_ok());

        let mut errors = ErrorList::new();
        errors.push(FieldError::forbidden(&Path::new("spec"), "nope"));
        errors.push(FieldError::forbidden(&Path::new("spec"), "still no"));

        let err = errors.into_result().expect_err("two errors were pushed");
        assert_eq!(err.len(), 2);
        assert_eq!(err.to_string(), "spec: Forbidden: nope\nspec: Forbidden: still no");
    }
}
