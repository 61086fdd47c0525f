//! # Risk Rollup
//!
//! A thin summary over the per-file risk and hotspot scores: the
//! churn-weighted overall risk plus the files a reviewer should look at
//! first.

use serde::{Deserialize, Serialize};

use crate::analysis::files::FileStats;

/// How many entries the top lists carry.
const TOP_FILES: usize = 10;

/// One entry in a ranked file list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFile {
    pub path: String,
    /// The score the ranking was built from
    pub score: f64,
    pub churn: u64,
    pub commits: u64,
    pub authors: u64,
}

/// Cross-cutting risk picture for one history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// Churn-weighted mean of per-file risk scores, in [0, 1]
    pub overall_risk: f64,
    /// Files ranked by risk score, highest first (top 10)
    pub high_risk_files: Vec<RankedFile>,
    /// Files ranked by hotspot score, highest first (top 10)
    pub hotspots: Vec<RankedFile>,
}

/// Build the rollup from the closed file pass.
pub fn risk_analysis(files: &[FileStats]) -> RiskAnalysis {
    let total_churn: u64 = files.iter().map(|f| f.churn).sum();
    let overall_risk = if total_churn > 0 {
        files
            .iter()
            .map(|f| f.risk_score * f.churn as f64)
            .sum::<f64>()
            / total_churn as f64
    } else {
        0.0
    };

    RiskAnalysis {
        overall_risk,
        high_risk_files: ranked(files, |f| f.risk_score),
        hotspots: ranked(files, |f| f.hotspot_score),
    }
}

fn ranked(files: &[FileStats], score: impl Fn(&FileStats) -> f64) -> Vec<RankedFile> {
    let mut entries: Vec<RankedFile> = files
        .iter()
        .map(|f| RankedFile {
            path: f.path.clone(),
            score: score(f),
            churn: f.churn,
            commits: f.commits,
            authors: f.authors.len() as u64,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    entries.truncate(TOP_FILES);
    entries
}
