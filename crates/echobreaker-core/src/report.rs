//! Results report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{HistoricalAverage, ScoredAnswer};
use crate::ranking::{DailyRank, QuestionRank, RankLookup};
use crate::statistics::{PartyStats, SessionSummary};

/// Everything the results page shows after a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub date: NaiveDate,
    pub summary: SessionSummary,
    /// Scored answers in question order.
    pub answers: Vec<ScoredAnswer>,
    /// Placement on the global leaderboard.
    pub rank: RankLookup,
    /// Competition ranks among today's players.
    pub daily_rank: Option<DailyRank>,
    /// Competition ranks on each scored answer among today's players.
    #[serde(default)]
    pub question_ranks: Vec<QuestionRank>,
    pub total_users_today: usize,
    /// Averages over previous days, `None` on a first game.
    pub historical_average: Option<HistoricalAverage>,
    /// Today's overall average minus the historical one.
    pub delta_from_historical: Option<f64>,
}

impl ResultsReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ResultsReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// The player's ranks on one question, if it was scored.
    pub fn question_rank(&self, question_id: &str) -> Option<DailyRank> {
        self.question_ranks
            .iter()
            .find(|q| q.question_id == question_id)
            .map(|q| q.rank)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Results for {}\n\n", self.date));
        md.push_str(&format!(
            "**Overall:** {:.2} across {} question(s)\n\n",
            self.summary.overall_average, self.summary.question_count
        ));

        md.push_str("| | Average | Best | Worst |\n");
        md.push_str("|---|---|---|---|\n");
        for (label, stats) in [
            ("Democrats", &self.summary.dem),
            ("Republicans", &self.summary.rep),
            ("Combined", &self.summary.combined),
        ] {
            md.push_str(&stats_row(label, stats));
        }
        md.push('\n');

        if !self.answers.is_empty() {
            md.push_str("| # | Question | Guess | Actual | Score | Rank today |\n");
            md.push_str("|---|---|---|---|---|---|\n");
            for (idx, a) in self.answers.iter().enumerate() {
                let rank = self
                    .question_rank(&a.question_id)
                    .map_or_else(|| "-".to_string(), |r| format!("#{}", r.overall));
                md.push_str(&format!(
                    "| {} | {} | {:.0}/{:.0} | {:.0}/{:.0} | {:.1} | {} |\n",
                    idx + 1,
                    a.question_id,
                    a.guess.dem(),
                    a.guess.rep(),
                    a.actual.dem(),
                    a.actual.rep(),
                    a.scores.total_score,
                    rank
                ));
            }
            md.push('\n');
        }

        for s in &self.summary.skipped {
            md.push_str(&format!("Skipped {}: {}\n", s.question_id, s.reason));
        }

        md.push_str(&format!("**Leaderboard:** {}\n", self.rank));
        if let Some(daily) = self.daily_rank {
            md.push_str(&format!(
                "**Today:** #{} of {} (Democrats #{}, Republicans #{})\n",
                daily.overall, self.total_users_today, daily.dem, daily.rep
            ));
        }
        if let (Some(hist), Some(delta)) = (&self.historical_average, self.delta_from_historical) {
            md.push_str(&format!(
                "**Historical average:** {:.2} ({:+.2} today)\n",
                hist.overall, delta
            ));
        }

        md
    }
}

fn stats_row(label: &str, stats: &PartyStats) -> String {
    let idx = |i: Option<usize>| i.map_or_else(|| "-".to_string(), |i| format!("Q{i}"));
    format!(
        "| {label} | {:.2} | {} | {} |\n",
        stats.average,
        idx(stats.best_question),
        idx(stats.worst_question)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pct, ScoredGuess};
    use crate::ranking::Placement;
    use crate::statistics::aggregate;

    fn make_report() -> ResultsReport {
        let scores = ScoredGuess {
            dem_score: 95.0,
            rep_score: 95.0,
            total_score: 95.0,
        };
        ResultsReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            user_id: "u1".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            summary: aggregate(&[scores]),
            answers: vec![ScoredAnswer {
                question_id: "q1".into(),
                guess: Pct::new(60.0, 40.0).unwrap(),
                actual: Pct::new(65.0, 35.0).unwrap(),
                scores,
            }],
            rank: RankLookup::Ranked(Placement {
                position: 3,
                total: 12,
            }),
            daily_rank: Some(DailyRank {
                overall: 2,
                dem: 1,
                rep: 3,
            }),
            question_ranks: vec![QuestionRank {
                question_id: "q1".into(),
                rank: DailyRank {
                    overall: 2,
                    dem: 2,
                    rep: 1,
                },
            }],
            total_users_today: 4,
            historical_average: Some(HistoricalAverage {
                overall: 90.0,
                dem: 88.0,
                rep: 92.0,
            }),
            delta_from_historical: Some(5.0),
        }
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = ResultsReport::load_json(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn markdown_output() {
        let md = make_report().to_markdown();
        assert!(md.contains("Results for 2025-03-01"));
        assert!(md.contains("| Democrats | 95.00 | Q1 | Q1 |"));
        assert!(md.contains("| 95.0 | #2 |"));
        assert!(md.contains("#3 of 12"));
        assert!(md.contains("#2 of 4 (Democrats #1, Republicans #3)"));
        assert!(md.contains("+5.00 today"));
    }

    #[test]
    fn markdown_for_unranked_first_game() {
        let mut report = make_report();
        report.rank = RankLookup::NotRanked;
        report.historical_average = None;
        report.delta_from_historical = None;
        let md = report.to_markdown();
        assert!(md.contains("not yet ranked"));
        assert!(!md.contains("Historical"));
    }
}
