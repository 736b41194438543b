// Recommendation request construction.
//
// Renders the enriched view into a compact, sectioned prompt for the
// advisory service. Each line carries pre-computed numbers (prices in
// millions, points, form) so the model reasons about trade-offs rather
// than arithmetic, and the whole payload stays bounded: only the squad,
// the next gameweek's fixtures, and the relevance-filtered player pool
// are included.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::fpl::types::Player;
use crate::squad::enrich::{EnrichedFixture, EnrichedSquadEntry};

// ---------------------------------------------------------------------------
// RecommendationRequest
// ---------------------------------------------------------------------------

/// Everything the advisory service is allowed to see for one call. Built
/// fresh per request, never persisted.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub squad: Vec<EnrichedSquadEntry>,
    pub fixtures: Vec<EnrichedFixture>,
    pub relevant_players: Vec<Player>,
    /// Bank in tenths of a million.
    pub bank: i64,
    pub free_transfers: u32,
    pub notes: Option<String>,
}

impl RecommendationRequest {
    /// Assemble a request, rejecting inputs there is nothing to reason
    /// about: an empty squad or an empty next-gameweek fixture list.
    pub fn build(
        squad: Vec<EnrichedSquadEntry>,
        fixtures: Vec<EnrichedFixture>,
        relevant_players: Vec<Player>,
        bank: i64,
        free_transfers: u32,
        notes: Option<String>,
    ) -> Result<Self, CoreError> {
        if squad.is_empty() {
            return Err(CoreError::InvalidRequest(
                "squad is empty; nothing to advise on".to_string(),
            ));
        }
        if fixtures.is_empty() {
            return Err(CoreError::InvalidRequest(
                "no fixtures scheduled for the next gameweek".to_string(),
            ));
        }
        Ok(Self {
            squad,
            fixtures,
            relevant_players,
            bank,
            free_transfers,
            notes,
        })
    }

    /// Static system prompt: the advisory role, the hard constraints, and
    /// the exact output schema.
    pub fn system_prompt(&self) -> String {
        "You are a Fantasy Premier League transfer advisor.\n\
         \n\
         Scope every recommendation to the single next gameweek.\n\
         Hard constraints:\n\
         1. Recommend transfers only among players listed in the AVAILABLE PLAYERS \
         section; never invent a name, and copy names exactly as written.\n\
         2. The combined price of players bought must not exceed the bank plus the \
         sale price of players sold.\n\
         3. Captain and vice-captain must be squad members and must differ.\n\
         \n\
         Consider injuries and suspensions (status flags: a=available, d=doubtful, \
         i=injured, s=suspended, u=unavailable), fixture difficulty, and form.\n\
         \n\
         Respond with a single JSON object and nothing else, exactly this shape:\n\
         {\"transfers_out\": [\"name\"], \"transfers_in\": [\"name\"], \
         \"captain\": \"name\", \"vice_captain\": \"name\", \
         \"chips\": [\"wildcard|freehit|bench_boost|triple_captain\"], \
         \"notes\": \"short reasoning\"}\n\
         Use empty arrays when nothing is advised and an empty string for notes \
         you do not need."
            .to_string()
    }

    /// Render the enriched view as sectioned plain text.
    pub fn user_prompt(&self) -> String {
        let team_names = self.team_names();
        let mut prompt = String::with_capacity(4096);

        // Section 1: the squad from the gameweek just played.
        prompt.push_str("## MY SQUAD (last gameweek)\n");
        for entry in &self.squad {
            let role = if entry.is_captain {
                " (C)"
            } else if entry.is_vice_captain {
                " (V)"
            } else {
                ""
            };
            let bench = if entry.multiplier == 0 { " [bench]" } else { "" };
            prompt.push_str(&format!(
                "  {} ({}, {}) £{:.1}m | GW {} pts | season {} | form {} | status {}{}{}\n",
                entry.name,
                entry.position,
                entry.team,
                entry.now_cost as f64 / 10.0,
                entry.event_points,
                entry.total_points,
                entry.form,
                entry.status,
                role,
                bench,
            ));
        }
        prompt.push('\n');

        // Section 2: next gameweek fixtures.
        prompt.push_str("## NEXT GAMEWEEK FIXTURES\n");
        for fixture in &self.fixtures {
            prompt.push_str(&format!(
                "  {} vs {} (difficulty {} v {})\n",
                fixture.home_team, fixture.away_team, fixture.home_difficulty, fixture.away_difficulty,
            ));
        }
        prompt.push('\n');

        // Section 3: the bounded transfer pool.
        prompt.push_str("## AVAILABLE PLAYERS (transfers allowed only from this list)\n");
        for player in &self.relevant_players {
            let team = team_names
                .get(&player.team)
                .map(String::as_str)
                .unwrap_or("Unknown");
            prompt.push_str(&format!(
                "  {} ({}) £{:.1}m | season {} | form {} | selected {}% | status {}\n",
                player.display_name(),
                team,
                player.cost_millions(),
                player.total_points,
                player.form,
                player.selected_by_percent,
                player.status,
            ));
        }
        prompt.push('\n');

        // Section 4: budget.
        prompt.push_str(&format!(
            "## BUDGET\n  Bank: £{:.1}m | Free transfers: {}\n\n",
            self.bank as f64 / 10.0,
            self.free_transfers,
        ));

        // Section 5: caller notes, when present.
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.is_empty()) {
            prompt.push_str(&format!("## NOTES FROM THE MANAGER\n  {notes}\n\n"));
        }

        prompt.push_str(
            "## WHAT SHOULD I DO?\n\
             Recommend transfers, captain, and vice-captain for the next gameweek.",
        );

        prompt
    }

    /// Team names keyed by id, recovered from the fixture sides. Every
    /// relevant player's team either plays next gameweek or carries a squad
    /// member, so this map covers nearly all of the pool.
    fn team_names(&self) -> HashMap<u32, String> {
        let mut names = HashMap::new();
        for fixture in &self.fixtures {
            names.insert(fixture.team_h, fixture.home_team.clone());
            names.insert(fixture.team_a, fixture.away_team.clone());
        }
        names
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
