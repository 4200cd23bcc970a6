//! Integration tests for bracket progression and stage reset
//!
//! These exercise the pure engine end to end: seeding a double-elimination
//! graph, playing it through, deriving placement, and resetting back to the
//! seeded skeleton.

#[cfg(test)]
mod bracket_tests {
    use beer_olympics::bracket::{
        BracketTag, Match, SlotRef, apply_result, apply_slot_write, reset_plan,
    };
    use beer_olympics::errors::EngineError;
    use beer_olympics::ranking::{BracketPlacement, RankMetric, RankingStrategy};
    use chrono::Utc;
    use std::collections::HashMap;

    /// Play one match in place and fan its result out to the other matches.
    fn play(matches: &mut HashMap<i64, Match>, id: i64, winner: i64, loser: i64) {
        let mut m = matches.remove(&id).expect("match exists");
        let progression = apply_result(&mut m, winner, loser, Utc::now()).expect("valid result");
        matches.insert(id, m);
        for write in progression.writes() {
            let dest = matches.get_mut(&write.target.match_id).expect("destination exists");
            apply_slot_write(dest, write).expect("slot in range");
        }
    }

    /// Four-team double elimination skeleton. Only matches 1 and 2 carry
    /// seeded teams; everything downstream starts TBD.
    fn seed_bracket() -> HashMap<i64, Match> {
        let matches = vec![
            Match::head_to_head(1, 10, 1, 1, BracketTag::Winner)
                .with_teams(101, 102)
                .advances_to(SlotRef::new(3, 0))
                .drops_to(SlotRef::new(4, 0)),
            Match::head_to_head(2, 10, 1, 2, BracketTag::Winner)
                .with_teams(103, 104)
                .advances_to(SlotRef::new(3, 1))
                .drops_to(SlotRef::new(4, 1)),
            Match::head_to_head(3, 10, 2, 1, BracketTag::Winner)
                .advances_to(SlotRef::new(6, 0))
                .drops_to(SlotRef::new(5, 0)),
            Match::head_to_head(4, 10, -1, 1, BracketTag::Loser)
                .advances_to(SlotRef::new(5, 1)),
            Match::head_to_head(5, 10, -2, 1, BracketTag::Loser)
                .advances_to(SlotRef::new(6, 1)),
            Match::head_to_head(6, 10, 3, 1, BracketTag::GrandFinal),
        ];
        matches.into_iter().map(|m| (m.id, m)).collect()
    }

    #[test]
    fn test_propagation_is_local() {
        // Match 7 feeds its winner to match 9 slot 1 and its loser to
        // match 12 slot 2 (1-based); nothing else may change.
        let mut m7 = Match::head_to_head(7, 10, 2, 1, BracketTag::Winner)
            .with_teams(201, 202)
            .advances_to(SlotRef::new(9, 0))
            .drops_to(SlotRef::new(12, 1));
        let mut m9 = Match::head_to_head(9, 10, 3, 1, BracketTag::Winner);
        let mut m12 = Match::head_to_head(12, 10, -2, 1, BracketTag::Loser);
        let m8 = Match::head_to_head(8, 10, 2, 2, BracketTag::Winner).with_teams(203, 204);
        let m8_before = m8.clone();

        let progression = apply_result(&mut m7, 201, 202, Utc::now()).unwrap();
        let writes: Vec<_> = progression.writes().collect();
        assert_eq!(writes.len(), 2);
        for write in writes {
            match write.target.match_id {
                9 => apply_slot_write(&mut m9, write).unwrap(),
                12 => apply_slot_write(&mut m12, write).unwrap(),
                other => panic!("unexpected destination {other}"),
            }
        }

        assert_eq!(m9.slots[0].team_id, Some(201));
        assert_eq!(m9.slots[1].team_id, None);
        assert_eq!(m12.slots[1].team_id, Some(202));
        assert_eq!(m12.slots[0].team_id, None);
        assert_eq!(m8, m8_before);
    }

    #[test]
    fn test_downstream_match_playable_only_when_both_slots_filled() {
        let mut matches = seed_bracket();
        play(&mut matches, 1, 101, 102);

        // Match 3 has only one slot filled; completing it must fail.
        let mut m3 = matches[&3].clone();
        let err = apply_result(&mut m3, 101, 103, Utc::now()).unwrap_err();
        assert_eq!(err, EngineError::MissingParticipant(3));

        play(&mut matches, 2, 103, 104);
        let mut m3 = matches.remove(&3).unwrap();
        assert!(apply_result(&mut m3, 101, 103, Utc::now()).is_ok());
    }

    #[test]
    fn test_full_double_elimination_run() {
        let mut matches = seed_bracket();
        play(&mut matches, 1, 101, 102);
        play(&mut matches, 2, 103, 104);
        play(&mut matches, 3, 101, 103); // winner final
        play(&mut matches, 4, 104, 102); // loser round 1
        play(&mut matches, 5, 103, 104); // loser round 2
        play(&mut matches, 6, 101, 103); // grand final

        let all: Vec<Match> = {
            let mut v: Vec<Match> = matches.into_values().collect();
            v.sort_by_key(|m| m.id);
            v
        };
        let standings = BracketPlacement.standings(&all).unwrap();
        let order: Vec<_> = standings.iter().map(|e| (e.team_id, e.rank)).collect();
        assert_eq!(order, vec![(101, 1), (103, 2), (104, 3), (102, 4)]);
        assert_eq!(standings[2].metric, RankMetric::Placement(3));
    }

    #[test]
    fn test_reset_restores_seeded_skeleton() {
        let mut matches = seed_bracket();
        let seeded: Vec<Match> = {
            let mut v: Vec<Match> = matches.values().cloned().collect();
            v.sort_by_key(|m| m.id);
            v
        };

        play(&mut matches, 1, 101, 102);
        play(&mut matches, 2, 103, 104);
        play(&mut matches, 3, 101, 103);
        play(&mut matches, 4, 104, 102);

        let played: Vec<Match> = matches.values().cloned().collect();
        let plan = reset_plan(&played);
        assert_eq!(plan.clear_results.len(), 4);
        assert!(plan.delete_matches.is_empty());

        // Apply the plan the way a store would.
        for id in &plan.clear_results {
            let m = matches.get_mut(id).unwrap();
            m.winner_id = None;
            m.loser_id = None;
            m.completed_at = None;
            for slot in &mut m.slots {
                slot.measure = None;
            }
        }
        for target in &plan.clear_slots {
            let m = matches.get_mut(&target.match_id).unwrap();
            m.slots[target.slot].team_id = None;
        }

        let mut restored: Vec<Match> = matches.into_values().collect();
        restored.sort_by_key(|m| m.id);
        assert_eq!(restored, seeded);
    }
}
