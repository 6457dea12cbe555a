use anyhow::Result;
use rivalwatch_ai::{generate_landscape, generate_positioning};
use rivalwatch_common::types::{Company, MarketPositioning};

use crate::state::AppState;

/// Returns the cached competitive landscape, generating and storing it on
/// first use. Caching is presence-based: a stored placeholder is kept too.
pub async fn ensure_landscape(state: &AppState, company: &Company) -> Result<String> {
    if let Some(text) = company
        .competitive_landscape
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    {
        return Ok(text.to_string());
    }

    let competitors = state.store.list_competitors(&company.id).await?;
    let text = generate_landscape(state.generator(), company, &competitors).await;
    state
        .store
        .set_competitive_landscape(&company.id, &text)
        .await?;
    Ok(text)
}

/// Returns the cached market positioning, generating it on first use.
pub async fn ensure_positioning(state: &AppState, company: &Company) -> Result<MarketPositioning> {
    if let Some(cached) = state.store.get_market_positioning(&company.id).await? {
        return Ok(cached);
    }

    let competitors = state.store.list_competitors(&company.id).await?;
    let positioning = generate_positioning(state.generator(), company, &competitors).await;
    state
        .store
        .save_market_positioning(&company.id, &positioning)
        .await?;
    Ok(positioning)
}
