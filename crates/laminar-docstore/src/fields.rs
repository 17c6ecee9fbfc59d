//! Field sets and field-name resolution.
//!
//! A [`FieldSet`] describes the columns a pipeline tuple exposes. Only a
//! [`FieldSet::Defined`] set carries a usable, ordered list of
//! identifiers; every other variant defers naming to the document's own
//! keys.

use std::fmt;

/// Identifier of a single tuple field.
///
/// The pipeline engine addresses fields either by name or by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldId {
    /// A named field.
    Name(String),

    /// A positional field.
    Pos(usize),
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldId::Name(name) => f.write_str(name),
            FieldId::Pos(pos) => write!(f, "{pos}"),
        }
    }
}

impl From<&str> for FieldId {
    fn from(name: &str) -> Self {
        FieldId::Name(name.to_string())
    }
}

impl From<String> for FieldId {
    fn from(name: String) -> Self {
        FieldId::Name(name)
    }
}

impl From<usize> for FieldId {
    fn from(pos: usize) -> Self {
        FieldId::Pos(pos)
    }
}

/// The declared (or undeclared) columns of a tuple.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSet {
    /// Fully declared fields, in position order.
    Defined(Vec<FieldId>),

    /// Fields are not known until records arrive.
    #[default]
    Unknown,

    /// Wildcard: whatever fields the record carries.
    All,

    /// A merge of known and unknown fields.
    ///
    /// Handled exactly like [`FieldSet::Unknown`]; no partial resolution
    /// is attempted.
    Partial(Vec<FieldId>),
}

impl FieldSet {
    /// Creates a defined field set from anything convertible to field ids.
    #[must_use]
    pub fn defined<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldId>,
    {
        FieldSet::Defined(fields.into_iter().map(Into::into).collect())
    }

    /// Parses a comma-separated list of field names.
    ///
    /// Blank entries are skipped; an empty list yields [`FieldSet::Unknown`].
    #[must_use]
    pub fn parse(list: &str) -> Self {
        let fields: Vec<FieldId> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(FieldId::from)
            .collect();
        if fields.is_empty() {
            FieldSet::Unknown
        } else {
            FieldSet::Defined(fields)
        }
    }

    /// Returns `true` if every field is declared.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        matches!(self, FieldSet::Defined(_))
    }

    /// Returns the declared fields, or an empty slice when not defined.
    #[must_use]
    pub fn fields(&self) -> &[FieldId] {
        match self {
            FieldSet::Defined(fields) => fields,
            _ => &[],
        }
    }

    /// Number of declared fields (zero when not defined).
    #[must_use]
    pub fn size(&self) -> usize {
        self.fields().len()
    }

    /// Returns the position of `field` within a defined set.
    #[must_use]
    pub fn position_of(&self, field: &FieldId) -> Option<usize> {
        match field {
            FieldId::Pos(pos) if *pos < self.size() => Some(*pos),
            _ => self.fields().iter().position(|f| f == field),
        }
    }
}

/// Resolves a field set into an ordered list of output names.
///
/// Returns one name per declared position for a defined set. Absent,
/// unknown, wildcard and partial sets resolve to an empty list, which
/// tells the writer to fall back to generated names.
#[must_use]
pub fn resolve_names(fields: Option<&FieldSet>) -> Vec<String> {
    match fields {
        Some(FieldSet::Defined(ids)) => ids.iter().map(ToString::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defined_keeps_order() {
        let fields = FieldSet::defined(["b", "a", "c"]);
        assert_eq!(resolve_names(Some(&fields)), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_resolve_one_name_per_position() {
        for n in 0..16 {
            let fields = FieldSet::defined((0..n).map(|i| format!("f{i}")));
            let names = resolve_names(Some(&fields));
            assert_eq!(names.len(), n);
            for (i, name) in names.iter().enumerate() {
                assert_eq!(name, &format!("f{i}"));
            }
        }
    }

    #[test]
    fn test_resolve_positional_ids() {
        let fields = FieldSet::Defined(vec![FieldId::Pos(1), FieldId::from("x")]);
        assert_eq!(resolve_names(Some(&fields)), vec!["1", "x"]);
    }

    #[test]
    fn test_resolve_undefined_is_empty() {
        assert!(resolve_names(None).is_empty());
        assert!(resolve_names(Some(&FieldSet::Unknown)).is_empty());
        assert!(resolve_names(Some(&FieldSet::All)).is_empty());
        let partial = FieldSet::Partial(vec![FieldId::from("a")]);
        assert!(resolve_names(Some(&partial)).is_empty());
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let fields = FieldSet::defined(["id", "name"]);
        assert_eq!(resolve_names(Some(&fields)), resolve_names(Some(&fields)));
    }

    #[test]
    fn test_parse_field_list() {
        assert_eq!(FieldSet::parse("id, name,,"), FieldSet::defined(["id", "name"]));
        assert_eq!(FieldSet::parse(" , "), FieldSet::Unknown);
        assert_eq!(FieldSet::parse(""), FieldSet::Unknown);
    }

    #[test]
    fn test_position_of() {
        let fields = FieldSet::defined(["b", "a"]);
        assert_eq!(fields.position_of(&FieldId::from("a")), Some(1));
        assert_eq!(fields.position_of(&FieldId::Pos(0)), Some(0));
        assert_eq!(fields.position_of(&FieldId::Pos(5)), None);
        assert_eq!(fields.position_of(&FieldId::from("zz")), None);
        assert_eq!(FieldSet::All.position_of(&FieldId::from("a")), None);
    }

    #[test]
    fn test_field_id_display() {
        assert_eq!(FieldId::from("name").to_string(), "name");
        assert_eq!(FieldId::Pos(3).to_string(), "3");
    }
}
