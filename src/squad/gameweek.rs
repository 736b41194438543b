// Gameweek resolution.

use crate::error::CoreError;
use crate::fpl::types::Event;

pub const FIRST_GAMEWEEK: u32 = 1;
pub const LAST_GAMEWEEK: u32 = 38;

/// Determine the gameweek to operate on.
///
/// An explicit override wins as long as it is a valid gameweek id.
/// Otherwise the event flagged current is used; when the feed has no
/// current event (between deadlines, or data lag), the latest finished
/// event stands in. An event list with neither is the empty-season edge
/// case and is unresolvable.
pub fn resolve_event(events: &[Event], override_id: Option<u32>) -> Result<u32, CoreError> {
    if let Some(id) = override_id {
        if !(FIRST_GAMEWEEK..=LAST_GAMEWEEK).contains(&id) {
            return Err(CoreError::InvalidRequest(format!(
                "event id {id} outside valid gameweek range {FIRST_GAMEWEEK}-{LAST_GAMEWEEK}"
            )));
        }
        return Ok(id);
    }

    if let Some(current) = events.iter().find(|e| e.is_current) {
        return Ok(current.id);
    }

    events
        .iter()
        .filter(|e| e.finished)
        .map(|e| e.id)
        .max()
        .ok_or(CoreError::NoResolvableGameweek)
}
