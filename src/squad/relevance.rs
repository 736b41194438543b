// Relevance filtering for advisory requests.

use std::collections::HashSet;

use crate::fpl::types::Player;
use crate::squad::enrich::{EnrichedFixture, EnrichedSquadEntry};

/// Reduce the full catalog to the players worth sending to the advisory
/// service: the manager's squad plus everyone on a team appearing in the
/// supplied fixtures. The advisory request has a hard size ceiling; the
/// full catalog does not fit under it.
///
/// Output follows catalog order and always contains every squad member,
/// whether or not their team plays.
pub fn relevant_players(
    players: &[Player],
    squad: &[EnrichedSquadEntry],
    fixtures: &[EnrichedFixture],
) -> Vec<Player> {
    let squad_ids: HashSet<u32> = squad.iter().map(|e| e.id).collect();
    let fixture_teams: HashSet<u32> = fixtures
        .iter()
        .flat_map(|f| [f.team_h, f.team_a])
        .collect();

    players
        .iter()
        .filter(|p| squad_ids.contains(&p.id) || fixture_teams.contains(&p.team))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpl::types::{Catalog, Event, PositionType, Team};
    use crate::squad::enrich::enrich_squad;
    use crate::fpl::types::Pick;

    fn player(id: u32, team: u32) -> Player {
        Player {
            id,
            first_name: format!("F{id}"),
            second_name: format!("S{id}"),
            web_name: format!("W{id}"),
            team,
            element_type: 3,
            now_cost: 50,
            total_points: 10,
            event_points: 2,
            form: String::new(),
            minutes: 450,
            selected_by_percent: String::new(),
            status: "a".to_string(),
        }
    }

    fn fixture(team_h: u32, team_a: u32) -> EnrichedFixture {
        EnrichedFixture {
            id: team_h * 100 + team_a,
            event: Some(2),
            team_h,
            team_a,
            home_team: format!("Team {team_h}"),
            away_team: format!("Team {team_a}"),
            home_badge: String::new(),
            away_badge: String::new(),
            home_difficulty: 2,
            away_difficulty: 3,
            kickoff_time: None,
            started: false,
            finished: false,
            home_score: None,
            away_score: None,
        }
    }

    fn catalog_with(players: Vec<Player>) -> Catalog {
        Catalog {
            events: vec![Event {
                id: 1,
                is_current: true,
                finished: false,
            }],
            elements: players,
            teams: (1..=5)
                .map(|id| Team {
                    id,
                    code: id,
                    name: format!("Team {id}"),
                    short_name: format!("T{id}"),
                })
                .collect(),
            element_types: vec![PositionType {
                id: 3,
                singular_name: "Midfielder".to_string(),
            }],
        }
    }

    fn squad_of(catalog: &Catalog, ids: &[u32]) -> Vec<EnrichedSquadEntry> {
        let picks: Vec<Pick> = ids
            .iter()
            .map(|&element| Pick {
                element,
                is_captain: false,
                is_vice_captain: false,
                multiplier: 1,
            })
            .collect();
        enrich_squad(catalog, &picks, None).unwrap()
    }

    #[test]
    fn output_is_superset_of_squad_ids() {
        // Player 1 sits on team 5, which has no fixture; they stay relevant
        // because the squad owns them.
        let catalog = catalog_with(vec![player(1, 5), player(2, 1), player(3, 2)]);
        let squad = squad_of(&catalog, &[1]);
        let relevant = relevant_players(&catalog.elements, &squad, &[fixture(1, 2)]);

        let ids: HashSet<u32> = relevant.iter().map(|p| p.id).collect();
        assert!(ids.contains(&1), "squad member must always be relevant");
    }

    #[test]
    fn fixture_side_teams_are_relevant() {
        let catalog = catalog_with(vec![
            player(1, 1),
            player(2, 2),
            player(3, 3),
            player(4, 4),
        ]);
        let squad = squad_of(&catalog, &[1]);
        let relevant = relevant_players(&catalog.elements, &squad, &[fixture(2, 3)]);

        let ids: Vec<u32> = relevant.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3], "team 4 has no fixture and is excluded");
    }

    #[test]
    fn empty_fixture_list_keeps_only_the_squad() {
        let catalog = catalog_with(vec![player(1, 1), player(2, 2)]);
        let squad = squad_of(&catalog, &[2]);
        let relevant = relevant_players(&catalog.elements, &squad, &[]);
        let ids: Vec<u32> = relevant.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn catalog_order_is_preserved() {
        let catalog = catalog_with(vec![player(3, 1), player(1, 1), player(2, 1)]);
        let squad = squad_of(&catalog, &[]);
        let relevant = relevant_players(&catalog.elements, &squad, &[fixture(1, 2)]);
        let ids: Vec<u32> = relevant.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
