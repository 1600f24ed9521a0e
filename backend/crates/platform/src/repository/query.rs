use super::record::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, Value),
    NotEq(&'static str, Value),
    /// Substring match, case-sensitive.
    Contains(&'static str, String),
    AnyOf(&'static str, Vec<i64>),
}

/// Conjunction of conditions over live rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(column, value.into()));
        self
    }

    pub fn not_eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::NotEq(column, value.into()));
        self
    }

    pub fn any_of(mut self, column: &'static str, ids: Vec<i64>) -> Self {
        self.conditions.push(Condition::AnyOf(column, ids));
        self
    }

    /// Adds a substring match unless `keyword` is absent or empty.
    pub fn keyword(mut self, column: &'static str, keyword: Option<&str>) -> Self {
        if let Some(needle) = keyword.filter(|k| !k.is_empty()) {
            self.conditions
                .push(Condition::Contains(column, needle.to_owned()));
        }
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// One relation to eager-load, e.g. `"Details.Users"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preload {
    pub path: &'static str,
    pub columns: Option<&'static [&'static str]>,
}

/// Eager-load and diagnostics settings for a read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    preloads: Vec<Preload>,
    debug: bool,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(mut self, path: &'static str) -> Self {
        self.preloads.push(Preload {
            path,
            columns: None,
        });
        self
    }

    /// Preload `path`, loading only `id` plus `columns` of the target.
    pub fn preload_columns(mut self, path: &'static str, columns: &'static [&'static str]) -> Self {
        self.preloads.push(Preload {
            path,
            columns: Some(columns),
        });
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn is_empty(&self) -> bool {
        self.preloads.is_empty()
    }

    pub fn preloads(&self) -> &[Preload] {
        &self.preloads
    }

    /// True if `relation` or anything beneath it was requested.
    pub fn wants(&self, relation: &str) -> bool {
        self.preloads.iter().any(|p| {
            p.path == relation
                || p.path
                    .strip_prefix(relation)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Column projection requested for exactly `relation`.
    pub fn columns(&self, relation: &str) -> Option<&'static [&'static str]> {
        self.preloads
            .iter()
            .find(|p| p.path == relation)
            .and_then(|p| p.columns)
    }

    /// Options relative to `relation`: `"Details.Users"` becomes `"Users"`.
    pub fn nested(&self, relation: &str) -> FindOptions {
        let preloads = self
            .preloads
            .iter()
            .filter_map(|p| {
                let path: &'static str = p.path;
                path.strip_prefix(relation)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .map(|path| Preload {
                        path,
                        columns: p.columns,
                    })
            })
            .collect();
        FindOptions {
            preloads,
            debug: self.debug,
        }
    }
}

/// Filter plus preloads for a paginated listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    pub options: FindOptions,
}

impl ListQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            options: FindOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FindOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_skips_empty() {
        assert!(Filter::new().keyword("name", None).is_empty());
        assert!(Filter::new().keyword("name", Some("")).is_empty());
        assert_eq!(
            Filter::new().keyword("name", Some("ab")).conditions(),
            &[Condition::Contains("name", "ab".into())]
        );
    }

    #[test]
    fn test_nested_preloads() {
        let options = FindOptions::new()
            .preload("Type")
            .preload("Details")
            .preload_columns("Details.Users", &["account"]);

        assert!(options.wants("Type"));
        assert!(options.wants("Details"));
        assert!(!options.wants("Detail"));
        assert!(!options.wants("Users"));

        let nested = options.nested("Details");
        assert_eq!(nested.preloads().len(), 1);
        assert!(nested.wants("Users"));
        assert_eq!(nested.columns("Users"), Some(&["account"][..]));
        assert_eq!(nested.columns("Type"), None);
    }

    #[test]
    fn test_nested_only_implies_parent() {
        let options = FindOptions::new().preload("Details.Users");
        assert!(options.wants("Details"));
        assert!(options.nested("Details").wants("Users"));
    }
}
