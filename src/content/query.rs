//! Fetch query construction.
//!
//! A [`FetchQuery`] describes exactly one request against the content source.
//! Queries are validated once, at build time, and are immutable afterwards.

use crate::content::types::{ContentError, ContentResult};

/// Sort field applied to every collection query.
pub const COLLECTION_SORT_FIELD: &str = "created_at";

/// A validated request for a single entry or a page of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    content_type_id: String,
    entry_id: Option<String>,
    locale: String,
    include_embedded: bool,
    reference_name: Option<String>,
    skip: Option<u32>,
    take: Option<u32>,
    sort_field: Option<String>,
    sort_descending: bool,
    include_count: bool,
}

impl FetchQuery {
    /// Start a single-entry query.
    pub fn entry(content_type_id: impl Into<String>, entry_id: impl Into<String>) -> FetchQueryBuilder {
        FetchQueryBuilder {
            content_type_id: content_type_id.into(),
            entry_id: Some(entry_id.into()),
            ..FetchQueryBuilder::default()
        }
    }

    /// Start a collection query over every entry of a content type.
    pub fn collection(content_type_id: impl Into<String>) -> FetchQueryBuilder {
        FetchQueryBuilder {
            content_type_id: content_type_id.into(),
            ..FetchQueryBuilder::default()
        }
    }

    pub fn content_type_id(&self) -> &str {
        &self.content_type_id
    }

    /// `None` for collection queries.
    pub fn entry_id(&self) -> Option<&str> {
        self.entry_id.as_deref()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn include_embedded(&self) -> bool {
        self.include_embedded
    }

    pub fn reference_name(&self) -> Option<&str> {
        self.reference_name.as_deref()
    }

    pub fn skip(&self) -> Option<u32> {
        self.skip
    }

    pub fn take(&self) -> Option<u32> {
        self.take
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    pub fn sort_descending(&self) -> bool {
        self.sort_descending
    }

    pub fn include_count(&self) -> bool {
        self.include_count
    }

    /// True when this query targets a collection rather than one entry.
    pub fn is_collection(&self) -> bool {
        self.entry_id.is_none()
    }
}

/// Builder for [`FetchQuery`].
///
/// Pagination setters are ignored for single-entry queries, and the reference
/// setter is ignored for collections.
#[derive(Debug, Clone, Default)]
pub struct FetchQueryBuilder {
    content_type_id: String,
    entry_id: Option<String>,
    locale: String,
    reference_name: Option<String>,
    skip: Option<u32>,
    take: Option<u32>,
}

impl FetchQueryBuilder {
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Expand one reference field. An empty name means no expansion.
    pub fn reference(mut self, reference_name: Option<&str>) -> Self {
        self.reference_name = reference_name
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        self
    }

    pub fn skip(mut self, skip: Option<u32>) -> Self {
        self.skip = skip;
        self
    }

    pub fn take(mut self, take: Option<u32>) -> Self {
        self.take = take;
        self
    }

    /// Validate and produce the query.
    pub fn build(self) -> ContentResult<FetchQuery> {
        if self.content_type_id.trim().is_empty() {
            return Err(ContentError::InvalidArgument(
                "content type id must not be empty".to_string(),
            ));
        }

        match self.entry_id {
            Some(entry_id) => {
                if entry_id.trim().is_empty() {
                    return Err(ContentError::InvalidArgument(
                        "entry id must not be empty".to_string(),
                    ));
                }
                Ok(FetchQuery {
                    content_type_id: self.content_type_id,
                    entry_id: Some(entry_id),
                    locale: self.locale,
                    include_embedded: true,
                    reference_name: self.reference_name,
                    skip: None,
                    take: None,
                    sort_field: None,
                    sort_descending: false,
                    include_count: false,
                })
            }
            None => Ok(FetchQuery {
                content_type_id: self.content_type_id,
                entry_id: None,
                locale: self.locale,
                include_embedded: true,
                reference_name: None,
                skip: self.skip,
                take: self.take,
                sort_field: Some(COLLECTION_SORT_FIELD.to_string()),
                sort_descending: true,
                include_count: true,
            }),
        }
    }
}
