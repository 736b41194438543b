// Request orchestration over the upstream and advisory clients.
//
// Every operation is request-scoped: fetch fresh resources, join, act,
// discard. Resources with no data dependency between them are fetched
// concurrently; picks and live stats wait for a resolved event id. There
// is no shared mutable state beyond the stateless clients in `AppState`.

use serde::Serialize;
use tracing::{info, warn};

use crate::advisory::client::{AdvisoryClient, RecommendationResponse};
use crate::advisory::prompt::RecommendationRequest;
use crate::advisory::validate;
use crate::error::CoreError;
use crate::fpl::client::FplClient;
use crate::squad::enrich::{self, EnrichedFixture, EnrichedSquadEntry};
use crate::squad::gameweek;
use crate::squad::relevance;

/// Clients constructed once at startup and shared by reference across
/// requests.
pub struct AppState {
    pub fpl: FplClient,
    pub advisory: AdvisoryClient,
}

// ---------------------------------------------------------------------------
// Enriched team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedTeam {
    pub team: Vec<EnrichedSquadEntry>,
    pub event: u32,
}

/// Fetch and join a manager's squad for one gameweek.
///
/// The catalog comes first because gameweek resolution needs the event
/// list; picks and live stats both depend on the resolved event id and are
/// fetched concurrently once it is known.
pub async fn enriched_team(
    state: &AppState,
    manager_id: u64,
    event_override: Option<u32>,
) -> Result<EnrichedTeam, CoreError> {
    let catalog = state.fpl.bootstrap().await?;
    let event = gameweek::resolve_event(&catalog.events, event_override)?;

    let (picks, live) = tokio::try_join!(
        state.fpl.picks(manager_id, event),
        state.fpl.live(event),
    )?;

    let team = enrich::enrich_squad(&catalog, &picks.picks, Some(&live))?;
    if let Some(issue) = enrich::check_squad_shape(&team) {
        warn!(manager_id, event, %issue, "squad shape violates the 15-pick rule");
    }
    info!(manager_id, event, entries = team.len(), "enriched team assembled");

    Ok(EnrichedTeam { team, event })
}

// ---------------------------------------------------------------------------
// Enriched fixtures
// ---------------------------------------------------------------------------

/// Fetch the season fixture list with both sides resolved to team names
/// and badge URLs.
pub async fn enriched_fixtures(state: &AppState) -> Result<Vec<EnrichedFixture>, CoreError> {
    let (catalog, fixtures) = tokio::try_join!(state.fpl.bootstrap(), state.fpl.fixtures())?;
    Ok(enrich::enrich_fixtures(&catalog, &fixtures))
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecommendationParams {
    pub manager_id: u64,
    /// The gameweek the manager just played; advice targets the one after.
    pub last_event: u32,
    /// Bank override in tenths. Falls back to the picks bookkeeping, then
    /// the manager entry, then zero.
    pub bank: Option<i64>,
    pub free_transfers: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationOutcome {
    pub recommendations: RecommendationResponse,
    pub next_gw: u32,
    /// Legality findings from the validator. The advice is returned either
    /// way so the caller can show both the recommendation and its problems.
    pub warnings: Vec<String>,
}

/// Build the enriched view, ask the advisory service for next-gameweek
/// advice, and validate what comes back.
pub async fn recommendation(
    state: &AppState,
    params: RecommendationParams,
) -> Result<RecommendationOutcome, CoreError> {
    // Catalog, fixture list, and manager entry have no dependency on each
    // other; picks need the caller-supplied event id and follow.
    let (catalog, all_fixtures, entry) = tokio::try_join!(
        state.fpl.bootstrap(),
        state.fpl.fixtures(),
        state.fpl.entry(params.manager_id),
    )?;
    let picks = state.fpl.picks(params.manager_id, params.last_event).await?;

    let squad = enrich::enrich_squad(&catalog, &picks.picks, None)?;
    let mut warnings = Vec::new();
    if let Some(issue) = enrich::check_squad_shape(&squad) {
        warn!(
            manager_id = params.manager_id,
            event = params.last_event,
            %issue,
            "squad shape violates the 15-pick rule"
        );
        warnings.push(format!("squad shape: {issue}"));
    }

    let next_gw = params.last_event + 1;
    let next_fixtures: Vec<EnrichedFixture> = enrich::enrich_fixtures(&catalog, &all_fixtures)
        .into_iter()
        .filter(|f| f.event == Some(next_gw))
        .collect();

    let relevant = relevance::relevant_players(&catalog.elements, &squad, &next_fixtures);

    let bank = params
        .bank
        .or(picks.entry_history.as_ref().map(|h| h.bank))
        .or(entry.last_deadline_bank)
        .unwrap_or(0);
    let free_transfers = params.free_transfers.unwrap_or(1);

    let request = RecommendationRequest::build(
        squad,
        next_fixtures,
        relevant,
        bank,
        free_transfers,
        params.notes,
    )?;

    info!(
        manager_id = params.manager_id,
        next_gw,
        squad = request.squad.len(),
        pool = request.relevant_players.len(),
        bank,
        "invoking advisory service"
    );

    let response = state.advisory.invoke(&request).await?;

    if let Err(faults) = validate::validate(
        &response,
        &request.squad,
        &request.relevant_players,
        bank,
    ) {
        for fault in &faults {
            warn!(%fault, "advisory recommendation failed validation");
        }
        warnings.extend(faults.iter().map(|f| f.to_string()));
    }

    Ok(RecommendationOutcome {
        recommendations: response,
        next_gw,
        warnings,
    })
}
