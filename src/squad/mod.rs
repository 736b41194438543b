// Squad-level logic: gameweek resolution, join/enrichment, and relevance
// filtering.

pub mod enrich;
pub mod gameweek;
pub mod relevance;
