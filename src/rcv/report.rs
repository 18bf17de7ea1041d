// Printing of the rounds and JSON summary of a count.

use std::thread;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::rcv::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct SummaryConfig {
    pub input: String,
    pub seed: Option<u32>,
    pub tiebreak: String,
}

// Most votes first, then the candidate order.
fn sorted_tally(tally: &[(String, u64)]) -> Vec<(String, u64)> {
    let mut res = tally.to_vec();
    res.sort_by(|a, b| b.1.cmp(&a.1));
    res
}

pub fn print_tally(title: &str, tally: &Tally) {
    println!("{}:", title);
    for (name, count) in sorted_tally(&tally.to_vec()) {
        println!("{:>8} {}", count, name);
    }
}

pub fn print_result(res: &VotingResult, pause: Duration) {
    println!();
    println!("=== {} ===", res.method);
    for round in res.round_stats.iter() {
        thread::sleep(pause);
        println!("Round {}", round.round);
        for (name, count) in sorted_tally(&round.tally) {
            println!("{:>8} {}", count, name);
        }
        if let Some(smith) = round.smith_set.as_ref() {
            println!("  smith set: {}", smith.join(", "));
        }
        for e in round.eliminated.iter() {
            println!("  eliminated: {} ({})", e.candidate, e.tier);
        }
    }
    println!("{} wins the {} count!", res.winner, res.method);
}

fn tier_name(tier: EliminationTier) -> &'static str {
    match tier {
        EliminationTier::RawCount => "count",
        EliminationTier::Copeland => "copeland",
        EliminationTier::Random => "random",
        EliminationTier::OutsideSmithSet => "smithSet",
    }
}

fn result_stats_to_json(res: &VotingResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in res.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let eliminated: Vec<JSValue> = round_stat
            .eliminated
            .iter()
            .map(|e| json!({"name": e.candidate, "tier": tier_name(e.tier)}))
            .collect();

        let mut js = json!({
            "round": round_stat.round,
            "tally": tally,
            "eliminated": eliminated,
        });
        if let Some(smith) = round_stat.smith_set.as_ref() {
            js["smithSet"] = json!(smith);
        }
        if let Some(elected) = round_stat.elected.as_ref() {
            js["elected"] = json!(elected);
        }
        l.push(js);
    }
    l
}

pub fn build_summary_js(config: &SummaryConfig, results: &[VotingResult]) -> JSValue {
    let results_js: Vec<JSValue> = results
        .iter()
        .map(|res| {
            json!({
                "method": res.method.to_string(),
                "winner": res.winner,
                "rounds": result_stats_to_json(res),
            })
        })
        .collect();
    json!({
        "config": config,
        "results": results_js,
    })
}
