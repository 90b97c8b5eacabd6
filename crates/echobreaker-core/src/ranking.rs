//! Leaderboard ordering and rank lookup.
//!
//! The global leaderboard uses ordinal positions over a deterministic sort:
//! score descending, then earliest account creation, then input order.
//! Daily rankings use competition ranking instead, where tied players share
//! the best position ("1224").

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{DailyScore, LeaderboardEntry, Party, QuestionScore, ScoredAnswer, ScoredGuess};

/// Where a player sits on the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// 1-based position.
    pub position: u32,
    /// Number of ranked players.
    pub total: u32,
}

impl Placement {
    /// Share of ranked players at or below this placement, in percent.
    /// First of ten is 100, last of ten is 10.
    pub fn percentile(&self) -> f64 {
        if self.total == 0 || self.position == 0 || self.position > self.total {
            return 0.0;
        }
        100.0 * f64::from(self.total - self.position + 1) / f64::from(self.total)
    }
}

/// Result of looking a player up. Not being ranked yet is a normal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RankLookup {
    Ranked(Placement),
    NotRanked,
}

impl RankLookup {
    pub fn placement(&self) -> Option<Placement> {
        match self {
            RankLookup::Ranked(p) => Some(*p),
            RankLookup::NotRanked => None,
        }
    }
}

impl fmt::Display for RankLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankLookup::Ranked(p) => write!(f, "#{} of {}", p.position, p.total),
            RankLookup::NotRanked => write!(f, "not yet ranked"),
        }
    }
}

fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Sort entries for display. The sort is stable, so fully tied entries keep
/// their input order.
pub fn sort_entries(entries: &[LeaderboardEntry]) -> Vec<&LeaderboardEntry> {
    let mut sorted: Vec<&LeaderboardEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| leaderboard_order(a, b));
    sorted
}

/// Look up a player's position.
pub fn rank(user_id: &str, entries: &[LeaderboardEntry]) -> RankLookup {
    let total = entries.len() as u32;
    sort_entries(entries)
        .iter()
        .position(|e| e.user_id == user_id)
        .map_or(RankLookup::NotRanked, |idx| {
            RankLookup::Ranked(Placement {
                position: idx as u32 + 1,
                total,
            })
        })
}

/// A leaderboard row with its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedEntry<'a> {
    pub position: u32,
    pub entry: &'a LeaderboardEntry,
}

/// The first `n` rows of the sorted leaderboard.
pub fn top_n(entries: &[LeaderboardEntry], n: usize) -> Vec<RankedEntry<'_>> {
    sort_entries(entries)
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, entry)| RankedEntry {
            position: idx as u32 + 1,
            entry,
        })
        .collect()
}

/// Which daily average to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Overall,
    Party(Party),
}

impl Metric {
    const ALL: [Metric; 3] = [
        Metric::Overall,
        Metric::Party(Party::Dem),
        Metric::Party(Party::Rep),
    ];

    pub fn of(&self, score: &DailyScore) -> f64 {
        match self {
            Metric::Overall => score.avg_score,
            Metric::Party(Party::Dem) => score.avg_score_dem,
            Metric::Party(Party::Rep) => score.avg_score_rep,
        }
    }

    /// The same metric over a single question's scores.
    pub fn of_question(&self, scores: &ScoredGuess) -> f64 {
        match self {
            Metric::Overall => scores.total_score,
            Metric::Party(party) => scores.party(*party),
        }
    }
}

/// Standard competition ranking over `(user_id, value)` pairs.
fn competition_order<'a>(values: impl IntoIterator<Item = (&'a str, f64)>) -> HashMap<String, u32> {
    let mut sorted: Vec<(&str, f64)> = values.into_iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut ranks = HashMap::with_capacity(sorted.len());
    let mut current = 0u32;
    let mut prev: Option<f64> = None;

    for (idx, (user_id, value)) in sorted.into_iter().enumerate() {
        if prev.map_or(true, |p| value < p) {
            current = idx as u32 + 1;
        }
        ranks.insert(user_id.to_string(), current);
        prev = Some(value);
    }

    ranks
}

/// Competition ranks for one day's scores, keyed by user id.
///
/// Tied players share the best position and the next distinct score skips
/// ahead: scores `[90, 80, 80, 70]` rank `1, 2, 2, 4`.
pub fn competition_ranks(scores: &[DailyScore], metric: Metric) -> HashMap<String, u32> {
    competition_order(scores.iter().map(|s| (s.user_id.as_str(), metric.of(s))))
}

/// Competition ranks on one question among every player who answered it.
/// `scores` may hold other questions; they are ignored.
pub fn question_competition_ranks(
    question_id: &str,
    scores: &[QuestionScore],
    metric: Metric,
) -> HashMap<String, u32> {
    competition_order(
        scores
            .iter()
            .filter(|s| s.question_id == question_id)
            .map(|s| (s.user_id.as_str(), metric.of_question(&s.scores))),
    )
}

/// A player's competition ranks for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRank {
    pub overall: u32,
    pub dem: u32,
    pub rep: u32,
}

impl DailyRank {
    fn lookup(user_id: &str, ranks: impl Fn(Metric) -> HashMap<String, u32>) -> Option<Self> {
        let [overall, dem, rep] = Metric::ALL.map(|m| ranks(m).get(user_id).copied());
        Some(DailyRank {
            overall: overall?,
            dem: dem?,
            rep: rep?,
        })
    }
}

/// Look up a player's daily ranks, `None` if they have no score that day.
pub fn daily_rank(user_id: &str, scores: &[DailyScore]) -> Option<DailyRank> {
    DailyRank::lookup(user_id, |metric| competition_ranks(scores, metric))
}

/// A player's competition ranks on one question of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRank {
    pub question_id: String,
    pub rank: DailyRank,
}

/// The player's ranks on each of their scored answers, in answer order.
/// Answers with no matching entry in `scores` are left out.
pub fn question_ranks(
    user_id: &str,
    answers: &[ScoredAnswer],
    scores: &[QuestionScore],
) -> Vec<QuestionRank> {
    answers
        .iter()
        .filter_map(|a| {
            let rank = DailyRank::lookup(user_id, |metric| {
                question_competition_ranks(&a.question_id, scores, metric)
            })?;
            Some(QuestionRank {
                question_id: a.question_id.clone(),
                rank,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn entry(user_id: &str, score: f64, created_secs: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: user_id.into(),
            display_name: Some(user_id.to_uppercase()),
            score,
            games_played: 1,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    fn daily(user_id: &str, overall: f64, dem: f64, rep: f64) -> DailyScore {
        DailyScore {
            user_id: user_id.into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            avg_score: overall,
            avg_score_dem: dem,
            avg_score_rep: rep,
        }
    }

    #[test]
    fn rank_by_score_descending() {
        let entries = vec![
            entry("u1", 120.0, 10),
            entry("u2", 300.0, 20),
            entry("u3", 200.0, 30),
        ];
        assert_eq!(
            rank("u3", &entries),
            RankLookup::Ranked(Placement {
                position: 2,
                total: 3
            })
        );
        assert_eq!(rank("u2", &entries).placement().unwrap().position, 1);
        assert_eq!(rank("u1", &entries).placement().unwrap().position, 3);
    }

    #[test]
    fn absent_user_is_not_ranked() {
        let entries = vec![entry("u1", 10.0, 0)];
        assert_eq!(rank("u9", &entries), RankLookup::NotRanked);
        assert_eq!(rank("u9", &[]), RankLookup::NotRanked);
        assert_eq!(RankLookup::NotRanked.to_string(), "not yet ranked");
    }

    #[test]
    fn ties_break_on_earliest_account_then_input_order() {
        let entries = vec![
            entry("late", 100.0, 50),
            entry("early", 100.0, 5),
            entry("same_a", 80.0, 7),
            entry("same_b", 80.0, 7),
        ];
        let order: Vec<&str> = sort_entries(&entries)
            .iter()
            .map(|e| e.user_id.as_str())
            .collect();
        assert_eq!(order, vec!["early", "late", "same_a", "same_b"]);
        assert_eq!(rank("same_b", &entries).placement().unwrap().position, 4);
    }

    #[test]
    fn top_n_is_bounded_view() {
        let entries: Vec<LeaderboardEntry> = (0..60)
            .map(|i| entry(&format!("u{i}"), i as f64, i))
            .collect();
        let top = top_n(&entries, 50);
        assert_eq!(top.len(), 50);
        assert_eq!(top[0].entry.user_id, "u59");
        assert_eq!(top[0].position, 1);
        assert_eq!(top[49].position, 50);

        // Players outside the view are still ranked against everyone.
        assert_eq!(
            rank("u0", &entries),
            RankLookup::Ranked(Placement {
                position: 60,
                total: 60
            })
        );
        assert_eq!(top_n(&entries[..3], 50).len(), 3);
    }

    #[test]
    fn percentile() {
        let first = Placement {
            position: 1,
            total: 10,
        };
        let last = Placement {
            position: 10,
            total: 10,
        };
        assert_eq!(first.percentile(), 100.0);
        assert_eq!(last.percentile(), 10.0);
    }

    #[test]
    fn percentile_of_out_of_range_placement_is_zero() {
        let beyond: Placement = serde_json::from_str(r#"{"position":5,"total":3}"#).unwrap();
        assert_eq!(beyond.percentile(), 0.0);
        let zeroth = Placement {
            position: 0,
            total: 3,
        };
        assert_eq!(zeroth.percentile(), 0.0);
    }

    fn question_score(user_id: &str, question_id: &str, dem: f64, rep: f64) -> QuestionScore {
        QuestionScore {
            user_id: user_id.into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            question_id: question_id.into(),
            scores: ScoredGuess {
                dem_score: dem,
                rep_score: rep,
                total_score: (dem + rep) / 2.0,
            },
        }
    }

    #[test]
    fn question_ranks_share_ties_per_question() {
        let scores = vec![
            question_score("a", "q1", 90.0, 90.0),
            question_score("b", "q1", 90.0, 70.0),
            question_score("c", "q1", 80.0, 100.0),
            question_score("a", "q2", 50.0, 50.0),
            question_score("b", "q2", 50.0, 50.0),
            question_score("c", "q2", 60.0, 40.0),
        ];

        let q1 = question_competition_ranks("q1", &scores, Metric::Overall);
        assert_eq!(q1["a"], 1);
        assert_eq!(q1["c"], 1);
        assert_eq!(q1["b"], 3);
        let q1_dem = question_competition_ranks("q1", &scores, Metric::Party(Party::Dem));
        assert_eq!((q1_dem["a"], q1_dem["b"], q1_dem["c"]), (1, 1, 3));

        let answer = |id: &str| ScoredAnswer {
            question_id: id.into(),
            guess: crate::model::Pct::new(50.0, 50.0).unwrap(),
            actual: crate::model::Pct::new(50.0, 50.0).unwrap(),
            scores: scores[0].scores,
        };
        let ranks = question_ranks("b", &[answer("q1"), answer("q2"), answer("q9")], &scores);
        assert_eq!(
            ranks,
            vec![
                QuestionRank {
                    question_id: "q1".into(),
                    rank: DailyRank {
                        overall: 3,
                        dem: 1,
                        rep: 3
                    },
                },
                QuestionRank {
                    question_id: "q2".into(),
                    rank: DailyRank {
                        overall: 1,
                        dem: 2,
                        rep: 1
                    },
                },
            ]
        );
    }

    #[test]
    fn competition_ranks_share_ties() {
        let scores = vec![
            daily("a", 90.0, 80.0, 70.0),
            daily("b", 80.0, 95.0, 70.0),
            daily("c", 80.0, 60.0, 75.0),
            daily("d", 70.0, 60.0, 50.0),
        ];

        let overall = competition_ranks(&scores, Metric::Overall);
        assert_eq!(overall["a"], 1);
        assert_eq!(overall["b"], 2);
        assert_eq!(overall["c"], 2);
        assert_eq!(overall["d"], 4);

        let dem = competition_ranks(&scores, Metric::Party(Party::Dem));
        assert_eq!(dem["b"], 1);
        assert_eq!(dem["a"], 2);
        assert_eq!(dem["c"], 3);
        assert_eq!(dem["d"], 3);

        let rep = competition_ranks(&scores, Metric::Party(Party::Rep));
        assert_eq!(rep["c"], 1);
        assert_eq!(rep["a"], 2);
        assert_eq!(rep["b"], 2);
        assert_eq!(rep["d"], 4);
    }

    #[test]
    fn daily_rank_per_metric() {
        let scores = vec![
            daily("a", 90.0, 80.0, 70.0),
            daily("b", 80.0, 95.0, 70.0),
        ];
        assert_eq!(
            daily_rank("b", &scores),
            Some(DailyRank {
                overall: 2,
                dem: 1,
                rep: 1
            })
        );
        assert_eq!(daily_rank("zz", &scores), None);
    }

    #[test]
    fn rank_lookup_serializes_with_status() {
        let json = serde_json::to_string(&RankLookup::Ranked(Placement {
            position: 2,
            total: 7,
        }))
        .unwrap();
        assert_eq!(json, r#"{"status":"ranked","position":2,"total":7}"#);
        let back: RankLookup = serde_json::from_str(r#"{"status":"not_ranked"}"#).unwrap();
        assert_eq!(back, RankLookup::NotRanked);
    }
}
