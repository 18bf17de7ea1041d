use log::debug;

use crate::state::ElectionState;

/// Head-to-head counts between all the running candidates.
///
/// `votes[a][b]` is the number of voters preferring candidate `a` over
/// candidate `b`, where indices follow the candidate order of the state.
/// Always computed from scratch from the voters.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseMatrix {
    candidates: Vec<String>,
    votes: Vec<Vec<u64>>,
}

impl PairwiseMatrix {
    pub fn new(state: &ElectionState) -> PairwiseMatrix {
        let candidates = state.candidates().to_vec();
        let n = candidates.len();
        let mut votes = vec![vec![0u64; n]; n];
        for (i, a) in candidates.iter().enumerate() {
            for (j, b) in candidates.iter().enumerate() {
                if i == j {
                    continue;
                }
                votes[i][j] = state.voters().iter().filter(|v| v.prefers(a, b)).count() as u64;
            }
        }
        debug!("PairwiseMatrix::new: {:?} {:?}", candidates, votes);
        PairwiseMatrix { candidates, votes }
    }

    /// Number of voters preferring `first` over `second`.
    pub fn get(&self, first: &str, second: &str) -> Option<u64> {
        let i = self.index_of(first)?;
        let j = self.index_of(second)?;
        Some(self.votes[i][j])
    }

    fn index_of(&self, candidate: &str) -> Option<usize> {
        self.candidates.iter().position(|c| c == candidate)
    }

    /// R(a, b): a and b are distinct and a gets at least as many votes as b
    /// in their head-to-head contest.
    pub fn beats_or_ties(&self) -> Vec<Vec<bool>> {
        let n = self.candidates.len();
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| i != j && self.votes[i][j] >= self.votes[j][i])
                    .collect()
            })
            .collect()
    }

    /// Copeland score of each candidate: head-to-head wins minus losses.
    pub fn copeland_scores(&self) -> Vec<(String, i64)> {
        let n = self.candidates.len();
        let mut res: Vec<(String, i64)> = Vec::with_capacity(n);
        for i in 0..n {
            let mut score: i64 = 0;
            for j in 0..n {
                if i == j {
                    continue;
                }
                if self.votes[i][j] > self.votes[j][i] {
                    score += 1;
                } else if self.votes[i][j] < self.votes[j][i] {
                    score -= 1;
                }
            }
            res.push((self.candidates[i].clone(), score));
        }
        debug!("copeland_scores: {:?}", res);
        res
    }

    /// The Smith set, in candidate order.
    pub fn smith_set(&self) -> Vec<String> {
        let closure = transitive_closure(&self.beats_or_ties());
        let n = self.candidates.len();
        // dominates(a, b): a == b or b is reachable from a.
        let dominates = |a: usize, b: usize| a == b || closure[a][b];
        let res: Vec<String> = (0..n)
            .filter(|&a| (0..n).all(|b| dominates(a, b) || !dominates(b, a)))
            .map(|a| self.candidates[a].clone())
            .collect();
        debug!("smith_set: {:?}", res);
        res
    }
}

/// Reachability over a boolean relation: `res[a][b]` holds when a chain of
/// one or more steps of `relation` leads from `a` to `b`.
pub fn transitive_closure(relation: &[Vec<bool>]) -> Vec<Vec<bool>> {
    let n = relation.len();
    let mut res: Vec<Vec<bool>> = relation.to_vec();
    for k in 0..n {
        for i in 0..n {
            if !res[i][k] {
                continue;
            }
            for j in 0..n {
                if res[k][j] {
                    res[i][j] = true;
                }
            }
        }
    }
    res
}

/// Copeland scores over the candidates of a state.
pub fn copeland_scores(state: &ElectionState) -> Vec<(String, i64)> {
    PairwiseMatrix::new(state).copeland_scores()
}

/// The Smith set of a state: the smallest non-empty group of candidates that
/// beat or tie every candidate outside of it, transitively.
pub fn smith_set(state: &ElectionState) -> Vec<String> {
    PairwiseMatrix::new(state).smith_set()
}
