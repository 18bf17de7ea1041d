/*!
Resolution engine for ranked polls between routes (or any other candidates).

Two methods are available:
- instant-runoff voting: the candidate with the fewest first preferences is
  eliminated until one candidate holds a strict majority.
- the Tideman alternative method: the election is restricted to its Smith set,
  then the weakest member is eliminated, until the Smith set has one member.

```
use route_voting::*;

let election = ElectionState::new(
    vec!["north".to_string(), "ridge".to_string(), "coast".to_string()],
    vec![
        Voter::new("Ana", &["north", "ridge", "coast"]),
        Voter::new("Ben", &["ridge", "north"]),
        Voter::new("Cem", &["coast", "north", "ridge"]),
    ],
)?;

assert_eq!(resolve_by_irv(&election, &VoteRules::DEFAULT_RULES)?, "north");
assert_eq!(resolve_by_tideman(&election, &VoteRules::DEFAULT_RULES)?, "north");
# Ok::<(), VotingErrors>(())
```
*/

pub mod builder;
mod config;
pub mod manual;
mod pairwise;
mod state;
mod tiebreak;

use log::{debug, info};

pub use crate::config::*;
pub use crate::pairwise::{copeland_scores, smith_set, transitive_closure, PairwiseMatrix};
pub use crate::state::{ElectionState, Tally};
pub use crate::tiebreak::{find_last_place, tie_breaker, NoDraw, SeededDraw, TieBreaker};

/// First-preference counts of the running candidates, for reporting between rounds.
pub fn interim_tally(state: &ElectionState) -> Result<Tally, VotingErrors> {
    state.tally()
}

/// Returns the instant-runoff winner of the election.
pub fn resolve_by_irv(state: &ElectionState, rules: &VoteRules) -> Result<String, VotingErrors> {
    run_irv(state, rules).map(|res| res.winner)
}

/// Returns the winner of the election under the Tideman alternative method.
pub fn resolve_by_tideman(
    state: &ElectionState,
    rules: &VoteRules,
) -> Result<String, VotingErrors> {
    run_tideman(state, rules).map(|res| res.winner)
}

/// Runs instant-runoff voting with the rules, and keeps the statistics of every round.
pub fn run_irv(state: &ElectionState, rules: &VoteRules) -> Result<VotingResult, VotingErrors> {
    let mut tb = tie_breaker(rules.tiebreak_mode);
    run_irv_with(state, tb.as_mut())
}

/// Runs the Tideman alternative method with the rules, and keeps the statistics of every round.
pub fn run_tideman(state: &ElectionState, rules: &VoteRules) -> Result<VotingResult, VotingErrors> {
    let mut tb = tie_breaker(rules.tiebreak_mode);
    run_tideman_with(state, tb.as_mut())
}

/// Instant-runoff voting with an explicit tie breaker.
///
/// Every round either finds a candidate with a strict majority of the voters,
/// or eliminates exactly one candidate. The loop is therefore bounded by the
/// number of candidates.
pub fn run_irv_with(
    state: &ElectionState,
    tie_breaker: &mut dyn TieBreaker,
) -> Result<VotingResult, VotingErrors> {
    check_election(state)?;
    info!(
        "run_irv: {} voters, candidates: {:?}",
        state.num_voters(),
        state.candidates()
    );

    let max_rounds = state.candidates().len() as u32;
    let mut cur_state = state.clone();
    let mut round_stats: Vec<RoundStats> = Vec::new();

    for round in 1..=max_rounds {
        let tally = cur_state.tally()?;
        info!("Round {} tally: {:?}", round, tally.to_vec());

        if let Some(winner) = tally.majority_winner(cur_state.num_voters())? {
            info!("Round {}: {} holds a majority and is elected", round, winner);
            round_stats.push(RoundStats {
                round,
                tally: tally.to_vec(),
                smith_set: None,
                eliminated: vec![],
                elected: Some(winner.clone()),
            });
            return Ok(VotingResult {
                method: VotingMethod::InstantRunoff,
                winner,
                round_stats,
            });
        }

        let elimination = find_last_place(&cur_state, tie_breaker, round)?;
        info!(
            "Round {}: eliminating {} ({})",
            round, elimination.candidate, elimination.tier
        );
        cur_state = cur_state.without_candidate(&elimination.candidate)?;
        round_stats.push(RoundStats {
            round,
            tally: tally.to_vec(),
            smith_set: None,
            eliminated: vec![elimination],
            elected: None,
        });
    }
    Err(VotingErrors::NoConvergence)
}

/// Tideman alternative method with an explicit tie breaker.
///
/// Each round computes the Smith set of the running candidates. A single
/// member is the winner. Otherwise every candidate outside of the set is
/// removed at once, and one more candidate is eliminated with the same rule as
/// instant-runoff voting.
pub fn run_tideman_with(
    state: &ElectionState,
    tie_breaker: &mut dyn TieBreaker,
) -> Result<VotingResult, VotingErrors> {
    check_election(state)?;
    info!(
        "run_tideman: {} voters, candidates: {:?}",
        state.num_voters(),
        state.candidates()
    );

    let max_rounds = state.candidates().len() as u32;
    let mut cur_state = state.clone();
    let mut round_stats: Vec<RoundStats> = Vec::new();

    for round in 1..=max_rounds {
        let tally = cur_state.tally()?;
        let smith = smith_set(&cur_state);
        info!(
            "Round {} tally: {:?} smith set: {:?}",
            round,
            tally.to_vec(),
            smith
        );

        if let [winner] = smith.as_slice() {
            let winner = winner.clone();
            info!("Round {}: {} is alone in the smith set", round, winner);
            round_stats.push(RoundStats {
                round,
                tally: tally.to_vec(),
                smith_set: Some(smith),
                eliminated: vec![],
                elected: Some(winner.clone()),
            });
            return Ok(VotingResult {
                method: VotingMethod::Tideman,
                winner,
                round_stats,
            });
        }
        if smith.is_empty() {
            return Err(VotingErrors::IntegrityViolation(
                "the smith set is empty".to_string(),
            ));
        }

        let outside: Vec<String> = cur_state
            .candidates()
            .iter()
            .filter(|c| !smith.contains(c))
            .cloned()
            .collect();
        debug!("Round {}: outside of the smith set: {:?}", round, outside);
        cur_state = cur_state.without_candidates(&outside)?;

        let last_place = find_last_place(&cur_state, tie_breaker, round)?;
        info!(
            "Round {}: eliminating {:?} outside of the smith set, then {} ({})",
            round, outside, last_place.candidate, last_place.tier
        );
        cur_state = cur_state.without_candidate(&last_place.candidate)?;

        let mut eliminated: Vec<Elimination> = outside
            .into_iter()
            .map(|candidate| Elimination {
                candidate,
                tier: EliminationTier::OutsideSmithSet,
            })
            .collect();
        eliminated.push(last_place);
        round_stats.push(RoundStats {
            round,
            tally: tally.to_vec(),
            smith_set: Some(smith),
            eliminated,
            elected: None,
        });
    }
    Err(VotingErrors::NoConvergence)
}

fn check_election(state: &ElectionState) -> Result<(), VotingErrors> {
    if state.candidates().is_empty() || state.voters().is_empty() {
        return Err(VotingErrors::EmptyElection);
    }
    Ok(())
}
