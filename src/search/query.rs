//! Search query description.

use std::fmt;

use crate::clients::{ApiRequest, HttpMethod, ParamValue, Params, Scalar, ValidationError};

/// Requested size meaning "every matching result".
pub const ALL_RESULTS: i64 = -1;

/// Free-text term used when none is given.
pub const DEFAULT_TERM: &str = "*";

/// Path prefix of every search endpoint.
const SEARCH_PATH_PREFIX: &str = "/api/search";

/// Sort direction of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Returns the direction as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search against `/api/search/{search_type}[/{path param}...]`.
///
/// Queries are plain values: [`RestClient::search`](crate::RestClient::search)
/// may turn one query into several requests that differ only in `limit`.
///
/// # Example
///
/// ```rust
/// use tenant_rest::search::{SearchQuery, SortDirection, ALL_RESULTS};
///
/// let query = SearchQuery::builder("library")
///     .path_param("g:cam:readers")
///     .size(ALL_RESULTS)
///     .sort(SortDirection::Desc)
///     .build()
///     .unwrap();
///
/// assert_eq!(query.path(), "/api/search/library/g%3Acam%3Areaders");
/// assert!(query.wants_all());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    search_type: String,
    path_params: Vec<String>,
    term: String,
    size: i64,
    offset: u64,
    sort: Option<SortDirection>,
    extra: Vec<(String, Vec<Scalar>)>,
}

impl SearchQuery {
    /// Creates a new builder for a search of the given type.
    #[must_use]
    pub fn builder(search_type: impl Into<String>) -> SearchQueryBuilder {
        SearchQueryBuilder::new(search_type)
    }

    /// Returns the search type (first path segment after `/api/search`).
    #[must_use]
    pub fn search_type(&self) -> &str {
        &self.search_type
    }

    /// Returns the extra path segments.
    #[must_use]
    pub fn path_params(&self) -> &[String] {
        &self.path_params
    }

    /// Returns the free-text term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Returns the requested size, [`ALL_RESULTS`] for everything.
    #[must_use]
    pub const fn size(&self) -> i64 {
        self.size
    }

    /// Returns the offset of the first result.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the sort direction, if any.
    #[must_use]
    pub const fn sort(&self) -> Option<SortDirection> {
        self.sort
    }

    /// Returns `true` if every matching result is requested.
    #[must_use]
    pub const fn wants_all(&self) -> bool {
        self.size == ALL_RESULTS
    }

    /// Returns the endpoint path, with each segment percent-encoded.
    #[must_use]
    pub fn path(&self) -> String {
        std::iter::once(&self.search_type)
            .chain(&self.path_params)
            .fold(SEARCH_PATH_PREFIX.to_string(), |mut path, segment| {
                path.push('/');
                path.push_str(&urlencoding::encode(segment));
                path
            })
    }

    /// Builds the GET request for this query with the given `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the resulting request is invalid.
    pub fn to_request(&self, limit: i64) -> Result<ApiRequest, ValidationError> {
        let mut params = Params::new()
            .with("q", self.term.as_str())
            .with("start", i64::try_from(self.offset).unwrap_or(i64::MAX))
            .with("limit", limit);
        if let Some(sort) = self.sort {
            params.insert("sort", sort.as_str());
        }
        for (name, values) in &self.extra {
            params.insert(name.as_str(), ParamValue::Array(values.clone()));
        }
        ApiRequest::builder(HttpMethod::Get, self.path())
            .params(params)
            .build()
    }
}

/// Builder for constructing [`SearchQuery`] instances.
///
/// A size is required; use [`ALL_RESULTS`] to request everything.
#[derive(Debug)]
pub struct SearchQueryBuilder {
    search_type: String,
    path_params: Vec<String>,
    term: Option<String>,
    size: Option<i64>,
    offset: u64,
    sort: Option<SortDirection>,
    extra: Vec<(String, Vec<Scalar>)>,
}

impl SearchQueryBuilder {
    fn new(search_type: impl Into<String>) -> Self {
        Self {
            search_type: search_type.into(),
            path_params: Vec::new(),
            term: None,
            size: None,
            offset: 0,
            sort: None,
            extra: Vec::new(),
        }
    }

    /// Appends a path segment after the search type.
    #[must_use]
    pub fn path_param(mut self, segment: impl Into<String>) -> Self {
        self.path_params.push(segment.into());
        self
    }

    /// Sets the free-text term. Defaults to `*`.
    #[must_use]
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Sets the number of results, or [`ALL_RESULTS`].
    #[must_use]
    pub const fn size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the offset of the first result.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the sort direction.
    #[must_use]
    pub const fn sort(mut self, sort: SortDirection) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Adds a search-type specific parameter. Setting a name twice replaces
    /// the earlier value.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.set_extra(name.into(), vec![value.into()]);
        self
    }

    /// Adds a search-type specific parameter sent as repeated keys.
    #[must_use]
    pub fn param_values<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.set_extra(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    fn set_extra(&mut self, name: String, values: Vec<Scalar>) {
        match self.extra.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = values,
            None => self.extra.push((name, values)),
        }
    }

    /// Builds the [`SearchQuery`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the search type is empty, no size was
    /// given, or the size is negative and not [`ALL_RESULTS`].
    pub fn build(self) -> Result<SearchQuery, ValidationError> {
        if self.search_type.trim().is_empty() {
            return Err(ValidationError::new("A search type must be specified"));
        }
        let size = self
            .size
            .ok_or_else(|| ValidationError::new("A size must be specified"))?;
        if size < ALL_RESULTS {
            return Err(ValidationError::new(format!(
                "Invalid size {size}. Use a non-negative size or -1 for all results."
            )));
        }

        Ok(SearchQuery {
            search_type: self.search_type,
            path_params: self.path_params,
            term: self.term.unwrap_or_else(|| DEFAULT_TERM.to_string()),
            size,
            offset: self.offset,
            sort: self.sort,
            extra: self.extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::resolve;

    fn wire_pairs(request: ApiRequest) -> Vec<(String, String)> {
        resolve(request.params).describe()
    }

    #[test]
    fn test_missing_size_is_rejected() {
        let result = SearchQuery::builder("general").build();
        assert!(matches!(result, Err(ValidationError { message }) if message == "A size must be specified"));
    }

    #[test]
    fn test_invalid_size_and_type_are_rejected() {
        assert!(SearchQuery::builder("general").size(-2).build().is_err());
        assert!(SearchQuery::builder(" ").size(10).build().is_err());
    }

    #[test]
    fn test_defaults() {
        let query = SearchQuery::builder("general").size(10).build().unwrap();

        assert_eq!(query.term(), "*");
        assert_eq!(query.offset(), 0);
        assert!(query.sort().is_none());
        assert!(!query.wants_all());
        assert_eq!(query.path(), "/api/search/general");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let query = SearchQuery::builder("memberships")
            .path_param("u:cam:a b/c")
            .size(ALL_RESULTS)
            .build()
            .unwrap();

        assert_eq!(query.path(), "/api/search/memberships/u%3Acam%3Aa%20b%2Fc");
    }

    #[test]
    fn test_request_carries_paging_and_extra_params() {
        let query = SearchQuery::builder("general")
            .term("report")
            .size(25)
            .offset(50)
            .sort(SortDirection::Asc)
            .param("resourceTypes", "content")
            .param_values("scope", vec!["_network", "_tenant"])
            .build()
            .unwrap();

        let request = query.to_request(query.size()).unwrap();
        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.path, "/api/search/general");

        let pairs = wire_pairs(request);
        let get = |name: &str| {
            pairs
                .iter()
                .filter(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(get("q"), vec!["report"]);
        assert_eq!(get("start"), vec!["50"]);
        assert_eq!(get("limit"), vec!["25"]);
        assert_eq!(get("sort"), vec!["asc"]);
        assert_eq!(get("resourceTypes"), vec!["content"]);
        assert_eq!(get("scope"), vec!["_network", "_tenant"]);
    }

    #[test]
    fn test_repeated_param_replaces_earlier_value() {
        let query = SearchQuery::builder("general")
            .size(1)
            .param("resourceTypes", "user")
            .param("resourceTypes", "group")
            .build()
            .unwrap();

        let pairs = wire_pairs(query.to_request(1).unwrap());
        let types: Vec<_> = pairs.iter().filter(|(key, _)| key == "resourceTypes").collect();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].1, "group");
    }
}
