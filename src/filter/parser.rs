use super::error::FilterError;

/// Reserved key naming the sort path
pub const SORT_BY_KEY: &str = "sortby";
/// Reserved key selecting descending order when set to `true`
pub const SORT_DESCENDING_KEY: &str = "sortdescending";

const MIN_PREFIX: &str = "min";
const MAX_PREFIX: &str = "max";

/// How a criterion constrains its field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionKind {
    /// Equality, substring or collection match
    Plain,
    /// Lower bound from a `min<field>` key
    Min,
    /// Upper bound from a `max<field>` key
    Max,
}

/// A single `key=value` pair from the filter string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriterion {
    /// Lowercased key as written, prefix included
    pub field_key: String,
    pub raw_value: String,
    pub kind: CriterionKind,
}

impl FilterCriterion {
    /// Classify a lowercased key/value pair
    pub fn new(field_key: impl Into<String>, raw_value: impl Into<String>) -> Self {
        let field_key = field_key.into();
        let kind = if field_key.len() > MIN_PREFIX.len() && field_key.starts_with(MIN_PREFIX) {
            CriterionKind::Min
        } else if field_key.len() > MAX_PREFIX.len() && field_key.starts_with(MAX_PREFIX) {
            CriterionKind::Max
        } else {
            CriterionKind::Plain
        };

        FilterCriterion {
            field_key,
            raw_value: raw_value.into(),
            kind,
        }
    }

    /// The field this criterion targets: the key with any range prefix stripped
    pub fn target(&self) -> &str {
        match self.kind {
            CriterionKind::Plain => &self.field_key,
            CriterionKind::Min | CriterionKind::Max => &self.field_key[MIN_PREFIX.len()..],
        }
    }

    pub fn is_dotted(&self) -> bool {
        self.target().contains('.')
    }

    /// Keys starting with a range prefix never act as plain criteria,
    /// including the bare prefixes themselves.
    fn is_range_prefixed(&self) -> bool {
        self.field_key.starts_with(MIN_PREFIX) || self.field_key.starts_with(MAX_PREFIX)
    }
}

/// A filter string split into criteria and sort directives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParts {
    /// Field criteria in the order written
    pub criteria: Vec<FilterCriterion>,
    pub sort_by: Option<String>,
    pub sort_descending: bool,
}

impl FilterParts {
    /// Parse a filter string
    ///
    /// Pairs are separated by `,` and split on `=`; a pair that does not
    /// split into exactly two segments is dropped. Keys are trimmed and
    /// lowercased, values trimmed.
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        if s.trim().is_empty() {
            return Err(FilterError::invalid("Filter string cannot be empty"));
        }

        let mut parts = FilterParts::default();
        let mut seen: Vec<String> = Vec::new();

        for pair in s.split(',') {
            let segments: Vec<&str> = pair.split('=').collect();
            if segments.len() != 2 {
                if !pair.trim().is_empty() {
                    tracing::warn!(pair = pair.trim(), "dropping malformed filter pair");
                }
                continue;
            }

            let key = segments[0].trim().to_lowercase();
            let value = segments[1].trim().to_string();
            if key.is_empty() {
                tracing::warn!(pair = pair.trim(), "dropping filter pair without a key");
                continue;
            }

            if seen.contains(&key) {
                return Err(FilterError::invalid(format!("Duplicate filter key '{}'", key)));
            }
            seen.push(key.clone());

            match key.as_str() {
                SORT_BY_KEY => parts.sort_by = Some(value),
                SORT_DESCENDING_KEY => {
                    parts.sort_descending = value.eq_ignore_ascii_case("true");
                }
                _ => parts.criteria.push(FilterCriterion::new(key, value)),
            }
        }

        Ok(parts)
    }

    /// Criteria that build plain predicates, in the order written
    pub fn plain(&self) -> impl Iterator<Item = &FilterCriterion> {
        self.criteria.iter().filter(|c| !c.is_range_prefixed())
    }

    pub fn min_bounds(&self) -> impl Iterator<Item = &FilterCriterion> {
        self.of_kind(CriterionKind::Min)
    }

    pub fn max_bounds(&self) -> impl Iterator<Item = &FilterCriterion> {
        self.of_kind(CriterionKind::Max)
    }

    /// Whether a `min`/`max` bound names this (lowercased) field
    pub fn has_bound(&self, field: &str) -> bool {
        self.criteria
            .iter()
            .any(|c| c.kind != CriterionKind::Plain && c.target() == field)
    }

    fn of_kind(&self, kind: CriterionKind) -> impl Iterator<Item = &FilterCriterion> {
        self.criteria.iter().filter(move |c| c.kind == kind)
    }
}
