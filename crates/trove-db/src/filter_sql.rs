//! Parameterized WHERE-clause generation for item search filters.
//!
//! Converts a [`SearchFilters`] value into SQL fragments plus bind
//! parameters. Every piece of user input is bound, never interpolated;
//! LIKE patterns additionally escape wildcard characters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use trove_core::{temporal::resolve_period, SearchFilters};

use crate::escape_like;

/// Type-safe parameter binding for dynamically built SQL.
#[derive(Debug, Clone)]
pub enum QueryParam {
    /// Single UUID parameter.
    Uuid(Uuid),
    /// Floating-point parameter (price bounds).
    Float(f64),
    /// Timestamp parameter.
    Timestamp(DateTime<Utc>),
    /// Boolean parameter.
    Bool(bool),
    /// String parameter.
    String(String),
    /// Array of strings (tag overlap).
    StringArray(Vec<String>),
}

/// Generates WHERE-clause fragments for a [`SearchFilters`] value.
///
/// Fragments are emitted in a fixed order (content type, price, dates,
/// tags, favorite, collection, colors, author, keywords) and are meant to
/// be ANDed into an outer query. The caller supplies the number of
/// parameters already bound so placeholder numbering continues from there.
///
/// `suggested_type` is deliberately not translated into SQL: it is an
/// advisory signal consumed by the re-ranker, not a hard filter.
pub struct FilterQueryBuilder<'a> {
    filters: &'a SearchFilters,
    param_offset: usize,
}

impl<'a> FilterQueryBuilder<'a> {
    /// Maximum number of elements across all list-valued filters.
    /// Oversized filters degrade to a match-nothing clause instead of
    /// building an unbounded query.
    const MAX_FILTER_ELEMENTS: usize = 1000;

    /// Create a new builder.
    ///
    /// # Parameters
    ///
    /// * `filters` - The structured search filters
    /// * `param_offset` - Number of parameters already in the outer query
    pub fn new(filters: &'a SearchFilters, param_offset: usize) -> Self {
        Self {
            filters,
            param_offset,
        }
    }

    /// Build the clause fragments and their parameters.
    pub fn build(&self) -> (Vec<String>, Vec<QueryParam>) {
        self.build_at(Utc::now())
    }

    /// Like [`build`](Self::build), with an explicit clock for resolving
    /// relative date periods.
    pub fn build_at(&self, now: DateTime<Utc>) -> (Vec<String>, Vec<QueryParam>) {
        let total_elements =
            self.filters.tags.len() + self.filters.colors.len() + self.filters.keywords.len();
        if total_elements > Self::MAX_FILTER_ELEMENTS {
            return (vec!["FALSE".to_string()], vec![]);
        }

        let mut clauses = Vec::new();
        let mut params = Vec::new();
        let mut param_idx = self.param_offset;

        if !self.filters.include_archived {
            clauses.push("i.is_archived = FALSE".to_string());
        }

        if let Some(content_type) = self.filters.content_type {
            param_idx += 1;
            clauses.push(format!("i.content_type = ${}", param_idx));
            params.push(QueryParam::String(content_type.to_string()));
        }

        if let Some(price) = self.filters.price {
            if let Some(min) = price.min {
                param_idx += 1;
                clauses.push(format!("(i.metadata->>'price')::numeric >= ${}", param_idx));
                params.push(QueryParam::Float(min));
            }
            if let Some(max) = price.max {
                param_idx += 1;
                clauses.push(format!("(i.metadata->>'price')::numeric <= ${}", param_idx));
                params.push(QueryParam::Float(max));
            }
        }

        if let Some(range) = &self.filters.date_range {
            if let Some(from) = range.from {
                param_idx += 1;
                clauses.push(format!("i.created_at >= ${}", param_idx));
                params.push(QueryParam::Timestamp(from));
            }
            if let Some(to) = range.to {
                param_idx += 1;
                clauses.push(format!("i.created_at <= ${}", param_idx));
                params.push(QueryParam::Timestamp(to));
            }
            // Relative periods ("last week") resolve to a lower bound at
            // build time. Unrecognized phrases contribute no clause.
            if let Some(period) = &range.period {
                if let Some(bound) = resolve_period(period, now) {
                    param_idx += 1;
                    clauses.push(format!("i.created_at >= ${}", param_idx));
                    params.push(QueryParam::Timestamp(bound));
                }
            }
        }

        if !self.filters.tags.is_empty() {
            param_idx += 1;
            clauses.push(format!("i.tags && ${}::text[]", param_idx));
            params.push(QueryParam::StringArray(self.filters.tags.clone()));
        }

        if let Some(favorite) = self.filters.is_favorite {
            param_idx += 1;
            clauses.push(format!("i.is_favorite = ${}", param_idx));
            params.push(QueryParam::Bool(favorite));
        }

        if let Some(collection_id) = self.filters.collection_id {
            param_idx += 1;
            clauses.push(format!("i.collection_id = ${}", param_idx));
            params.push(QueryParam::Uuid(collection_id));
        }

        // A color can appear in flat metadata, the description, or nested
        // vision objects; one placeholder serves all three probes.
        if !self.filters.colors.is_empty() {
            let mut color_conditions = Vec::new();
            for color in &self.filters.colors {
                param_idx += 1;
                color_conditions.push(format!(
                    "(i.metadata::text ILIKE ${n} OR i.description ILIKE ${n} OR \
                     EXISTS (SELECT 1 FROM jsonb_array_elements(i.metadata->'objects') obj \
                     WHERE obj->>'colors' ILIKE ${n}))",
                    n = param_idx
                ));
                params.push(QueryParam::String(format!("%{}%", escape_like(color))));
            }
            clauses.push(format!("({})", color_conditions.join(" OR ")));
        }

        if let Some(author) = &self.filters.author {
            param_idx += 1;
            clauses.push(format!(
                "(i.metadata->>'author' ILIKE ${n} OR i.content ILIKE ${n} OR \
                 i.description ILIKE ${n})",
                n = param_idx
            ));
            params.push(QueryParam::String(format!("%{}%", escape_like(author))));
        }

        // Keywords are conjunctive: every keyword must match somewhere in
        // the item's text fields or tags.
        if !self.filters.keywords.is_empty() {
            let mut keyword_conditions = Vec::new();
            for keyword in &self.filters.keywords {
                param_idx += 1;
                keyword_conditions.push(format!(
                    "(i.title ILIKE ${n} OR i.description ILIKE ${n} OR i.content ILIKE ${n} OR \
                     EXISTS (SELECT 1 FROM unnest(i.tags) tag WHERE tag ILIKE ${n}))",
                    n = param_idx
                ));
                params.push(QueryParam::String(format!("%{}%", escape_like(keyword))));
            }
            clauses.push(format!("({})", keyword_conditions.join(" AND ")));
        }

        (clauses, params)
    }
}
