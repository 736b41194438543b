// Budget and squad-membership validation of advisory recommendations.
//
// The advisory service is instructed to stay legal, but instructions are
// not verification: every returned transfer is checked here against the
// same squad, pool, and bank that built the request. Checks accumulate
// faults instead of short-circuiting so the caller can surface every
// issue at once.

use std::collections::HashMap;

use thiserror::Error;

use crate::advisory::client::RecommendationResponse;
use crate::fpl::types::Player;
use crate::squad::enrich::EnrichedSquadEntry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFault {
    #[error("transfer out `{0}` is not in the current squad")]
    TransferOutNotInSquad(String),

    #[error("transfer in `{0}` is not among the relevant players")]
    TransferInNotRelevant(String),

    #[error("transfer in `{0}` is already in the squad")]
    TransferInAlreadyInSquad(String),

    #[error("captain `{0}` is not in the squad")]
    CaptainNotInSquad(String),

    #[error("vice-captain `{0}` is not in the squad")]
    ViceCaptainNotInSquad(String),

    #[error("captain and vice-captain are both `{0}`")]
    CaptainViceIdentical(String),

    #[error("transfers cost {buy_tenths} tenths but only {available_tenths} available (bank plus sales)")]
    BudgetExceeded {
        buy_tenths: i64,
        available_tenths: i64,
    },
}

/// A recommendation that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecommendation {
    pub response: RecommendationResponse,
}

/// Check an advisory response against the squad, the relevant-player pool,
/// and the bank (tenths of a million). Returns every violated rule.
///
/// Transfers out must come from the squad; transfers in must come from the
/// relevant pool and not already be owned; captain and vice-captain must
/// be distinct squad members; and the total buy price must fit within bank
/// plus sale proceeds, with exact equality legal.
pub fn validate(
    response: &RecommendationResponse,
    squad: &[EnrichedSquadEntry],
    relevant: &[Player],
    bank_tenths: i64,
) -> Result<ValidatedRecommendation, Vec<ValidationFault>> {
    let mut faults = Vec::new();

    let squad_costs: HashMap<&str, i64> = squad
        .iter()
        .map(|entry| (entry.name.as_str(), entry.now_cost))
        .collect();
    let pool_costs: HashMap<String, i64> = relevant
        .iter()
        .map(|player| (player.display_name(), player.now_cost))
        .collect();

    let mut sell_tenths: i64 = 0;
    for name in &response.transfers_out {
        match squad_costs.get(name.as_str()) {
            Some(cost) => sell_tenths += cost,
            None => faults.push(ValidationFault::TransferOutNotInSquad(name.clone())),
        }
    }

    let mut buy_tenths: i64 = 0;
    for name in &response.transfers_in {
        if squad_costs.contains_key(name.as_str()) {
            faults.push(ValidationFault::TransferInAlreadyInSquad(name.clone()));
            continue;
        }
        match pool_costs.get(name) {
            Some(cost) => buy_tenths += cost,
            None => faults.push(ValidationFault::TransferInNotRelevant(name.clone())),
        }
    }

    if let Some(captain) = &response.captain {
        if !squad_costs.contains_key(captain.as_str()) {
            faults.push(ValidationFault::CaptainNotInSquad(captain.clone()));
        }
    }
    if let Some(vice) = &response.vice_captain {
        if !squad_costs.contains_key(vice.as_str()) {
            faults.push(ValidationFault::ViceCaptainNotInSquad(vice.clone()));
        }
    }
    if let (Some(captain), Some(vice)) = (&response.captain, &response.vice_captain) {
        if captain == vice {
            faults.push(ValidationFault::CaptainViceIdentical(captain.clone()));
        }
    }

    let available_tenths = bank_tenths + sell_tenths;
    if buy_tenths > available_tenths {
        faults.push(ValidationFault::BudgetExceeded {
            buy_tenths,
            available_tenths,
        });
    }

    if faults.is_empty() {
        Ok(ValidatedRecommendation {
            response: response.clone(),
        })
    } else {
        Err(faults)
    }
}
