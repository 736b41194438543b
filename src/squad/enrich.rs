// Join/enrichment of raw resources into denormalized records.
//
// Resolves the catalog's foreign keys (pick -> player, player -> team,
// player -> position, fixture -> team) into self-contained entries. A pick
// pointing at a player the catalog does not know is a data-consistency
// fault and fails loudly; a missing team or position name falls back to a
// sentinel, since the team catalog may lag the player catalog.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::fpl::types::{Catalog, Fixture, LiveEvent, Pick};

/// Sentinel name for references the catalog snapshot cannot resolve.
pub const UNKNOWN_NAME: &str = "Unknown";

// ---------------------------------------------------------------------------
// Squad enrichment
// ---------------------------------------------------------------------------

/// One squad slot joined with its player, team, and position. Immutable
/// snapshot for a single gameweek.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSquadEntry {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub team: String,
    /// Price in tenths of a million.
    pub now_cost: i64,
    pub total_points: i32,
    pub event_points: i32,
    pub form: String,
    pub minutes: i32,
    pub selected_by_percent: String,
    pub status: String,
    pub is_captain: bool,
    pub is_vice_captain: bool,
    pub multiplier: u8,
}

/// Join each pick with the catalog, preserving pick order.
///
/// When live stats are supplied, the live per-player total replaces the
/// catalog snapshot's event points (the live feed is fresher during an
/// in-progress gameweek); a player with no live record has not played and
/// scores 0.
pub fn enrich_squad(
    catalog: &Catalog,
    picks: &[Pick],
    live: Option<&LiveEvent>,
) -> Result<Vec<EnrichedSquadEntry>, CoreError> {
    let mut squad = Vec::with_capacity(picks.len());

    for pick in picks {
        let player = catalog
            .player_by_id(pick.element)
            .ok_or(CoreError::UnknownPlayerReference(pick.element))?;

        let team = catalog
            .team_by_id(player.team)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let position = catalog
            .position_by_id(player.element_type)
            .map(|p| p.singular_name.clone())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let event_points = match live {
            Some(live) => live.points_for(player.id).unwrap_or(0),
            None => player.event_points,
        };

        squad.push(EnrichedSquadEntry {
            id: player.id,
            name: player.display_name(),
            position,
            team,
            now_cost: player.now_cost,
            total_points: player.total_points,
            event_points,
            form: player.form.clone(),
            minutes: player.minutes,
            selected_by_percent: player.selected_by_percent.clone(),
            status: player.status.clone(),
            is_captain: pick.is_captain,
            is_vice_captain: pick.is_vice_captain,
            multiplier: pick.multiplier,
        });
    }

    Ok(squad)
}

/// Gameweek score for a squad: starters only, pick multiplier applied
/// (captain doubling included, bench excluded).
pub fn total_event_points(squad: &[EnrichedSquadEntry]) -> i32 {
    squad
        .iter()
        .filter(|e| e.multiplier > 0)
        .map(|e| e.event_points * e.multiplier as i32)
        .sum()
}

/// A squad whose shape breaks the 15-pick rule (11 starters, 4 bench).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadShapeIssue {
    pub entries: usize,
    pub starters: usize,
    pub bench: usize,
}

impl fmt::Display for SquadShapeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries ({} starters, {} bench); expected 15 (11 starters, 4 bench)",
            self.entries, self.starters, self.bench
        )
    }
}

/// Check the 15/11/4 squad shape. Returns the observed shape when it is
/// wrong; callers report it rather than rejecting the squad.
pub fn check_squad_shape(squad: &[EnrichedSquadEntry]) -> Option<SquadShapeIssue> {
    let starters = squad.iter().filter(|e| e.multiplier > 0).count();
    let bench = squad.len() - starters;
    if squad.len() == 15 && starters == 11 && bench == 4 {
        None
    } else {
        Some(SquadShapeIssue {
            entries: squad.len(),
            starters,
            bench,
        })
    }
}

// ---------------------------------------------------------------------------
// Fixture enrichment
// ---------------------------------------------------------------------------

/// A fixture joined with both team records: names and badge URLs resolved,
/// raw side ids kept for downstream filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedFixture {
    pub id: u32,
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub home_team: String,
    pub away_team: String,
    pub home_badge: String,
    pub away_badge: String,
    pub home_difficulty: u8,
    pub away_difficulty: u8,
    pub kickoff_time: Option<chrono::DateTime<chrono::Utc>>,
    pub started: bool,
    pub finished: bool,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl EnrichedFixture {
    /// Match state label: FT once finished, LIVE while in play, UPCOMING
    /// before kickoff.
    pub fn status_label(&self) -> &'static str {
        if self.finished {
            "FT"
        } else if self.started {
            "LIVE"
        } else {
            "UPCOMING"
        }
    }
}

/// Resolve both sides of each fixture against the team catalog. Missing
/// teams get the sentinel name and an empty badge URL.
pub fn enrich_fixtures(catalog: &Catalog, fixtures: &[Fixture]) -> Vec<EnrichedFixture> {
    fixtures
        .iter()
        .map(|fixture| {
            let home = catalog.team_by_id(fixture.team_h);
            let away = catalog.team_by_id(fixture.team_a);
            EnrichedFixture {
                id: fixture.id,
                event: fixture.event,
                team_h: fixture.team_h,
                team_a: fixture.team_a,
                home_team: home
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                away_team: away
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                home_badge: home.map(|t| t.badge_url()).unwrap_or_default(),
                away_badge: away.map(|t| t.badge_url()).unwrap_or_default(),
                home_difficulty: fixture.team_h_difficulty,
                away_difficulty: fixture.team_a_difficulty,
                kickoff_time: fixture.kickoff_time,
                started: fixture.started.unwrap_or(false),
                finished: fixture.finished,
                home_score: fixture.team_h_score,
                away_score: fixture.team_a_score,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
