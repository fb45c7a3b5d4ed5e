//! Moat classification
//!
//! Five boolean proxies for durable competitive advantage, derived from the
//! metrics record and a set of company lists that are supplied as data.

use crate::error::Result;
use crate::model::MetricsRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

const INTANGIBLE_MARGIN: f64 = 0.25;
const COST_ADVANTAGE_MARGIN: f64 = 0.35;
const SWITCHING_COST_ROIC: f64 = 0.20;

/// Company lists consulted by the classifier and the risk columns.
///
/// Symbols are compared after uppercasing, so lists may be written in any case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoatLists {
    /// Platform companies credited with a network effect
    pub network_effect: BTreeSet<String>,
    /// Companies credited with switching costs regardless of ROIC
    pub switching_cost: BTreeSet<String>,
    /// Companies flagged for policy risk
    pub policy_risk: BTreeSet<String>,
}

impl Default for MoatLists {
    fn default() -> Self {
        Self {
            network_effect: ["AAPL", "NVDA", "MSFT", "GOOGL", "META", "AMZN"]
                .into_iter()
                .map(String::from)
                .collect(),
            switching_cost: BTreeSet::new(),
            policy_risk: BTreeSet::from(["NVDA".to_string()]),
        }
    }
}

impl MoatLists {
    /// Parse lists from JSON; omitted lists keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let lists: Self = serde_json::from_str(json)?;
        Ok(lists.normalized())
    }

    /// Load lists from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let lists = Self::from_json(&json)?;
        tracing::debug!(
            "Loaded moat lists from {}: {} network, {} switching, {} policy",
            path.display(),
            lists.network_effect.len(),
            lists.switching_cost.len(),
            lists.policy_risk.len()
        );
        Ok(lists)
    }

    pub fn has_network_effect(&self, symbol: &str) -> bool {
        self.network_effect.contains(symbol)
    }

    pub fn has_listed_switching_cost(&self, symbol: &str) -> bool {
        self.switching_cost.contains(symbol)
    }

    pub fn has_policy_risk(&self, symbol: &str) -> bool {
        self.policy_risk.contains(symbol)
    }

    fn normalized(self) -> Self {
        fn upper(set: BTreeSet<String>) -> BTreeSet<String> {
            set.into_iter()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        }

        Self {
            network_effect: upper(self.network_effect),
            switching_cost: upper(self.switching_cost),
            policy_risk: upper(self.policy_risk),
        }
    }
}

/// Moat flags for one symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoatAssessment {
    pub intangible_assets: bool,
    pub cost_advantage: bool,
    pub network_effect: bool,
    pub switching_cost: bool,
    /// Reserved for manual judgment; never set by the classifier
    pub niche_market: bool,
}

impl MoatAssessment {
    /// Number of flags set, 0 to 5
    pub fn count(&self) -> u8 {
        [
            self.intangible_assets,
            self.cost_advantage,
            self.network_effect,
            self.switching_cost,
            self.niche_market,
        ]
        .into_iter()
        .map(u8::from)
        .sum()
    }

    /// Bucket shown in the "Moat 總計" column
    pub fn display_bucket(&self) -> String {
        match self.count() {
            count @ 0..=2 => format!("{count}個"),
            _ => "3個以上".to_string(),
        }
    }

    /// Two-valued confidence heuristic: 8 with three or more flags, else 7
    pub fn confidence_score(&self) -> u8 {
        if self.count() >= 3 { 8 } else { 7 }
    }
}

/// Classify the moat of `symbol` from its metrics.
///
/// Every threshold is a strict comparison: a value sitting exactly on a
/// threshold does not set the flag.
pub fn classify(symbol: &str, metrics: &MetricsRecord, lists: &MoatLists) -> MoatAssessment {
    MoatAssessment {
        intangible_assets: metrics.net_margin > INTANGIBLE_MARGIN,
        cost_advantage: metrics.net_margin > COST_ADVANTAGE_MARGIN,
        network_effect: lists.has_network_effect(symbol),
        switching_cost: metrics.roic > SWITCHING_COST_ROIC
            || lists.has_listed_switching_cost(symbol),
        niche_market: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(net_margin: f64, roic: f64) -> MetricsRecord {
        MetricsRecord {
            net_margin,
            roic,
            ..Default::default()
        }
    }

    #[test]
    fn test_margin_threshold_is_strict() {
        let lists = MoatLists::default();

        let at = classify("ZZZZ", &metrics(0.25, 0.0), &lists);
        assert!(!at.intangible_assets);

        let above = classify("ZZZZ", &metrics(0.2501, 0.0), &lists);
        assert!(above.intangible_assets);
        assert!(!above.cost_advantage);
    }

    #[test]
    fn test_roic_threshold_is_strict() {
        let lists = MoatLists::default();
        assert!(!classify("ZZZZ", &metrics(0.0, 0.20), &lists).switching_cost);
        assert!(classify("ZZZZ", &metrics(0.0, 0.2001), &lists).switching_cost);
    }

    #[test]
    fn test_platform_company_scores_four() {
        let moat = classify("NVDA", &metrics(0.36, 0.21), &MoatLists::default());

        assert!(moat.intangible_assets);
        assert!(moat.cost_advantage);
        assert!(moat.network_effect);
        assert!(moat.switching_cost);
        assert!(!moat.niche_market);
        assert_eq!(moat.count(), 4);
        assert_eq!(moat.display_bucket(), "3個以上");
        assert_eq!(moat.confidence_score(), 8);
    }

    #[test]
    fn test_unlisted_low_margin_scores_zero() {
        let moat = classify("ZZZZ", &metrics(0.1, 0.05), &MoatLists::default());

        assert_eq!(moat.count(), 0);
        assert_eq!(moat.display_bucket(), "0個");
        assert_eq!(moat.confidence_score(), 7);
    }

    #[test]
    fn test_display_bucket_small_counts() {
        let lists = MoatLists::default();
        assert_eq!(classify("AAPL", &metrics(0.1, 0.0), &lists).display_bucket(), "1個");
        assert_eq!(classify("AAPL", &metrics(0.26, 0.0), &lists).display_bucket(), "2個");
        assert_eq!(classify("AAPL", &metrics(0.26, 0.0), &lists).confidence_score(), 7);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let lists = MoatLists::default();
        let input = metrics(0.3, 0.22);
        assert_eq!(classify("MSFT", &input, &lists), classify("MSFT", &input, &lists));
    }

    #[test]
    fn test_switching_cost_list() {
        let lists = MoatLists::from_json(r#"{"switching_cost": ["adbe"]}"#).unwrap();

        assert!(classify("ADBE", &metrics(0.0, 0.0), &lists).switching_cost);
        // network list untouched by a partial document
        assert!(lists.has_network_effect("META"));
    }

    #[test]
    fn test_injected_network_list_replaces_default() {
        let lists = MoatLists::from_json(r#"{"network_effect": ["V", " ma "]}"#).unwrap();

        assert!(classify("MA", &metrics(0.0, 0.0), &lists).network_effect);
        assert!(!classify("NVDA", &metrics(0.0, 0.0), &lists).network_effect);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists.json");
        std::fs::write(&path, r#"{"policy_risk": ["TSM", "NVDA"]}"#).unwrap();

        let lists = MoatLists::load(&path).unwrap();
        assert!(lists.has_policy_risk("TSM"));
        assert!(lists.has_policy_risk("NVDA"));
    }

    #[test]
    fn test_malformed_lists_rejected() {
        assert!(MoatLists::from_json("[1, 2").is_err());
    }
}
