// Raw upstream resource records.
//
// These mirror the JSON shapes of the Fantasy Premier League endpoints
// (bootstrap-static, fixtures, picks, entry, event live). Only the fields
// the assistant reads are modeled; serde skips the rest of each payload.
// Lookups over the catalog are total: a missing reference is an explicit
// `None`, never a silent default.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Catalog (bootstrap-static)
// ---------------------------------------------------------------------------

/// The global catalog resource: players, teams, positions, and the season's
/// event (gameweek) list. Refetched per request, never cached.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub events: Vec<Event>,
    pub elements: Vec<Player>,
    pub teams: Vec<Team>,
    pub element_types: Vec<PositionType>,
}

impl Catalog {
    pub fn player_by_id(&self, id: u32) -> Option<&Player> {
        self.elements.iter().find(|p| p.id == id)
    }

    pub fn team_by_id(&self, id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn position_by_id(&self, id: u32) -> Option<&PositionType> {
        self.element_types.iter().find(|p| p.id == id)
    }
}

/// One gameweek in the season schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub finished: bool,
}

/// A catalog player. `now_cost` is in tenths of a million, as on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct Player {
    pub id: u32,
    pub first_name: String,
    pub second_name: String,
    #[serde(default)]
    pub web_name: String,
    pub team: u32,
    pub element_type: u32,
    pub now_cost: i64,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub event_points: i32,
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub minutes: i32,
    #[serde(default)]
    pub selected_by_percent: String,
    /// Availability flag: a=available, d=doubtful, i=injured, s=suspended,
    /// u=unavailable.
    #[serde(default)]
    pub status: String,
}

impl Player {
    /// Full display name. Squads and advisory responses refer to players by
    /// this form.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }

    /// Price in millions for human-facing output.
    pub fn cost_millions(&self) -> f64 {
        self.now_cost as f64 / 10.0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: u32,
    /// Stable badge code; distinct from the season-scoped `id`.
    #[serde(default)]
    pub code: u32,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
}

impl Team {
    /// Crest image URL served by the league's CDN.
    pub fn badge_url(&self) -> String {
        format!(
            "https://resources.premierleague.com/premierleague/badges/70/t{}.png",
            self.code
        )
    }
}

/// A position (element type): Goalkeeper, Defender, Midfielder, Forward.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionType {
    pub id: u32,
    pub singular_name: String,
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// One scheduled match. `event` is None for fixtures not yet assigned to a
/// gameweek; scores are None until kickoff.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub id: u32,
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    #[serde(default)]
    pub team_h_difficulty: u8,
    #[serde(default)]
    pub team_a_difficulty: u8,
    pub kickoff_time: Option<DateTime<Utc>>,
    pub started: Option<bool>,
    #[serde(default)]
    pub finished: bool,
    pub team_h_score: Option<i32>,
    pub team_a_score: Option<i32>,
}

// ---------------------------------------------------------------------------
// Picks (entry/{id}/event/{event}/picks)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PicksResponse {
    #[serde(default)]
    pub picks: Vec<Pick>,
    pub entry_history: Option<EntryHistory>,
}

/// One squad slot for a gameweek. Multiplier 0 = bench, 1 = starter,
/// 2+ = captain boost.
#[derive(Debug, Clone, Deserialize)]
pub struct Pick {
    pub element: u32,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
    pub multiplier: u8,
}

/// Per-event manager bookkeeping attached to the picks payload. `bank` is
/// in tenths of a million.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryHistory {
    pub bank: i64,
    #[serde(default)]
    pub event_transfers: u32,
}

// ---------------------------------------------------------------------------
// Manager entry (entry/{id})
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub last_deadline_bank: Option<i64>,
    pub last_deadline_value: Option<i64>,
}

// ---------------------------------------------------------------------------
// Live event stats (event/{id}/live)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LiveEvent {
    #[serde(default)]
    pub elements: Vec<LiveElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveElement {
    pub id: u32,
    pub stats: LiveStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveStats {
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub minutes: i32,
}

impl LiveEvent {
    /// Live point total for a player, or None if the player has no live
    /// record for this event.
    pub fn points_for(&self, player_id: u32) -> Option<i32> {
        self.elements
            .iter()
            .find(|e| e.id == player_id)
            .map(|e| e.stats.total_points)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
