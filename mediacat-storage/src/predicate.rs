//! WHERE-clause construction for the recent listing.
//!
//! A [`Predicate`] is a list of SQL conjuncts and the text parameters bound to
//! their `?` placeholders. Format tags are always bound, never spliced into the
//! statement; the only text interpolated is identifiers taken from
//! [`MediaKind`] and the engine's JSON path expressions.

use std::collections::BTreeSet;

use mediacat_types::{Format, MediaKind};

/// Engine-specific SQL for reaching into the nested progress document.
pub trait SqlDialect {
    /// A condition that holds when `<progress>.latest.<count key>` is a
    /// positive number.
    fn latest_count_positive(&self, kind: MediaKind) -> String;

    /// An ORDER BY term sorting by `<progress>.latest.updatedAt`, newest
    /// first. Only a hint: the value is compared in storage form.
    fn latest_updated_at_desc(&self, kind: MediaKind) -> String;
}

/// Quoted `"table"."column"` reference.
pub fn column_ref(kind: MediaKind, column: &str) -> String {
    format!("\"{}\".\"{}\"", kind.table(), column)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<String>,
    params: Vec<String>,
}

impl Predicate {
    /// Format filter (when `formats` is non-empty) AND the zero-exclusion
    /// condition on the latest count.
    pub fn build<D: SqlDialect + ?Sized>(
        dialect: &D,
        kind: MediaKind,
        formats: &BTreeSet<Format>,
    ) -> Self {
        let mut predicate = Self::default();
        if !formats.is_empty() {
            let placeholders = vec!["?"; formats.len()].join(", ");
            predicate.clauses.push(format!(
                "{} IN ({placeholders})",
                column_ref(kind, "format")
            ));
            predicate
                .params
                .extend(formats.iter().map(|f| f.as_str().to_string()));
        }
        predicate.clauses.push(dialect.latest_count_positive(kind));
        predicate
    }

    #[must_use]
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    /// Values for the `?` placeholders, in order.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// `WHERE a AND b`, or an empty string when there is nothing to filter.
    #[must_use]
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }
}
