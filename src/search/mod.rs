//! Exhaustive search over an eventually consistent index.
//!
//! The search index is updated asynchronously after writes and serves at most
//! one page per call. [`RestClient::search`] hides both:
//!
//! 1. **Refresh**: after a short delay, asks the server to make the index
//!    consistent. A failure aborts the search.
//! 2. **Count** or **fetch**: when every result is wanted
//!    ([`ALL_RESULTS`]), a `limit=1` count request learns the total; otherwise the
//!    requested page is fetched and returned as-is.
//! 3. **Refetch**: if the count request reported more than one result, the same
//!    search is issued again with `limit` set to that total.
//!
//! The guarantee is best effort. Results written or removed between the count
//! request and the refetch may or may not be reflected in the final page.
//!
//! # Example
//!
//! ```rust,ignore
//! use tenant_rest::search::{SearchQuery, SearchResults, ALL_RESULTS};
//!
//! let query = SearchQuery::builder("general").term("report").size(ALL_RESULTS).build()?;
//! let response = client.search(&ctx, &query).await?;
//! let results: SearchResults = response.json()?;
//! assert_eq!(results.results.len() as u64, results.total);
//! ```

mod query;

pub use query::{SearchQuery, SearchQueryBuilder, SortDirection, ALL_RESULTS, DEFAULT_TERM};

use serde::{Deserialize, Serialize};

use crate::auth::RestContext;
use crate::clients::{ApiRequest, ApiResponse, HttpMethod, RestError};
use crate::RestClient;

/// Typed view of a search response body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Number of results matching the query, across all pages.
    #[serde(default)]
    pub total: u64,
    /// The results on this page.
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// Reads `total` from a search response, treating a missing or malformed
/// value as zero.
fn total_of(response: &ApiResponse) -> u64 {
    response
        .body
        .get("total")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0)
}

impl RestClient {
    /// Makes the search index consistent with recent writes.
    ///
    /// Waits for the configured refresh delay, then POSTs the configured
    /// refresh path with no parameters.
    ///
    /// # Errors
    ///
    /// Returns any error produced by [`RestClient::request`].
    pub async fn refresh_search_index(&self, ctx: &RestContext) -> Result<(), RestError> {
        tokio::time::sleep(self.config().refresh_delay()).await;
        let request = ApiRequest::builder(HttpMethod::Post, self.config().refresh_path()).build();
        self.send(ctx, request).await?;
        Ok(())
    }

    /// Runs `query` against a freshly refreshed index.
    ///
    /// Returns the requested page, or when `query` asks for
    /// [`ALL_RESULTS`], a single page holding every result.
    ///
    /// Transient headers set on `ctx` before this call are sent with the
    /// index refresh, the first request of the sequence, and not with the
    /// search requests.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. A failed refresh aborts the
    /// search before any search call is made.
    pub async fn search(
        &self,
        ctx: &RestContext,
        query: &SearchQuery,
    ) -> Result<ApiResponse, RestError> {
        tracing::debug!("Refreshing search index before searching '{}'", query.path());
        self.refresh_search_index(ctx).await?;

        if !query.wants_all() {
            tracing::debug!("Fetching {} results from '{}'", query.size(), query.path());
            return self.search_page(ctx, query, query.size()).await;
        }

        tracing::debug!("Counting results of '{}'", query.path());
        let first = self.search_page(ctx, query, 1).await?;
        let total = total_of(&first);
        if total <= 1 {
            return Ok(first);
        }

        tracing::debug!("Refetching all {} results from '{}'", total, query.path());
        let limit = i64::try_from(total).unwrap_or(i64::MAX);
        self.search_page(ctx, query, limit).await
    }

    async fn search_page(
        &self,
        ctx: &RestContext,
        query: &SearchQuery,
        limit: i64,
    ) -> Result<ApiResponse, RestError> {
        self.send(ctx, query.to_request(limit)).await
    }
}
