use anyhow::Result;
use serde_json::json;
use venvx_domain::{SearchHit, MAX_SEARCH_RESULTS};

use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug)]
pub struct PkgSearchRequest {
    pub query: String,
}

/// Searches the index. Scraping failures degrade to an empty result.
///
/// # Errors
/// Never fails today; the signature matches the other handlers.
pub fn pkg_search(ctx: &CommandContext, request: &PkgSearchRequest) -> Result<ExecutionOutcome> {
    let query = request.query.trim();
    if query.is_empty() {
        return Ok(ExecutionOutcome::user_error(
            "search query is empty",
            json!({ "reason": "empty_query", "hint": "pass a package name or keyword" }),
        ));
    }
    let network = ctx.config().network();
    let names = ctx.index().search_names(network, query).unwrap_or_else(|err| {
        tracing::debug!(%err, "search failed");
        Vec::new()
    });
    let hits: Vec<SearchHit> = names
        .iter()
        .take(MAX_SEARCH_RESULTS)
        .filter_map(|name| match ctx.index().project(network, name) {
            Ok(Some(metadata)) => Some(SearchHit::from_metadata(&metadata)),
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(name, %err, "dropping search hit without metadata");
                None
            }
        })
        .collect();
    let message = match hits.len() {
        0 => format!("no packages found for {query}"),
        1 => format!("1 package found for {query}"),
        count => format!("{count} packages found for {query}"),
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({ "query": query, "results": hits }),
    ))
}
