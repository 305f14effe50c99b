//! Symbol selection
//!
//! Narrows a provider's full instrument list down to the pairs a run should
//! touch: an optional quote-currency suffix filter (e.g. only `*USDT` pairs)
//! and an optional operator allow list.

use tracing::info;

use crate::fetcher::{ExchangeFetcher, FetcherResult};

/// List tradable symbols and apply the suffix and allow-list filters.
///
/// The allow list wins over the suffix filter: a symbol must pass both when
/// both are given. Provider order is preserved.
pub async fn select_symbols(
    fetcher: &dyn ExchangeFetcher,
    quote_suffix: Option<&str>,
    allow_list: Option<&[String]>,
) -> FetcherResult<Vec<String>> {
    let all = fetcher.list_symbols().await?;
    let total = all.len();

    let selected: Vec<String> = all
        .into_iter()
        .filter(|symbol| {
            quote_suffix
                .map(|suffix| symbol.ends_with(suffix))
                .unwrap_or(true)
        })
        .filter(|symbol| {
            allow_list
                .map(|list| list.iter().any(|allowed| allowed == symbol))
                .unwrap_or(true)
        })
        .collect();

    info!(
        provider = %fetcher.provider(),
        total,
        selected = selected.len(),
        "symbol selection"
    );
    Ok(selected)
}
