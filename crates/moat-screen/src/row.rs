//! Result row assembly
//!
//! A row is a flat set of display strings whose column names and order match
//! the downstream spreadsheet template.

use crate::model::{MetricsRecord, ProfileRecord, UNAVAILABLE};
use crate::moat::{MoatAssessment, MoatLists, classify};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Fixed haircut applied to the current price
const MARGIN_OF_SAFETY: f64 = 0.8;

const NET_MARGIN_BAR: f64 = 0.20;
const DEBT_TO_EQUITY_CEILING: f64 = 0.5;
const ROIC_BAR: f64 = 0.10;
const ROE_BAR: f64 = 0.15;
const ROIC_DOUBLE_WACC: f64 = 0.25;

/// Export columns, in spreadsheet order
pub const COLUMNS: [&str; 26] = [
    "股票代碼",
    "信心分數",
    "現在股價",
    "合理價",
    "EPS 10Y穩定成長",
    "EPS",
    "FCF 10Y皆正數",
    "Dividends 10Y穩定成長",
    "Net Margin > 20%",
    "Debt < 0.5 IC > 10",
    "ROIC > 10% ROE > 15%",
    "EPS 10Y Growth",
    "ROIC>WACC",
    "EPV>BVPS",
    "Piotroski F-Score",
    "Altman Z-Score",
    "Beneish M-Score",
    "護城河：無形資產",
    "成本優勢",
    "網路效應",
    "高轉換成本",
    "利基市場",
    "Moat 總計",
    "風險：政策",
    "科技",
    "人物",
];

/// One screened symbol, formatted for display and export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub symbol: String,
    pub confidence_score: u8,
    pub price: String,
    pub reasonable_price: String,
    pub eps_stable_growth: String,
    pub eps: String,
    pub fcf_positive: String,
    pub dividend_growth: String,
    pub net_margin: String,
    pub debt_coverage: String,
    pub returns: String,
    pub eps_growth: String,
    pub roic_vs_wacc: String,
    pub epv_vs_bvps: String,
    pub piotroski_score: String,
    pub altman_z_score: String,
    pub beneish_m_score: String,
    pub intangible_assets: String,
    pub cost_advantage: String,
    pub network_effect: String,
    pub switching_cost: String,
    pub niche_market: String,
    pub moat_total: String,
    pub policy_risk: String,
    pub technology_risk: String,
    pub key_person_risk: String,
}

impl ResultRow {
    /// Cell values in [`COLUMNS`] order
    pub fn cells(&self) -> [String; 26] {
        [
            self.symbol.clone(),
            self.confidence_score.to_string(),
            self.price.clone(),
            self.reasonable_price.clone(),
            self.eps_stable_growth.clone(),
            self.eps.clone(),
            self.fcf_positive.clone(),
            self.dividend_growth.clone(),
            self.net_margin.clone(),
            self.debt_coverage.clone(),
            self.returns.clone(),
            self.eps_growth.clone(),
            self.roic_vs_wacc.clone(),
            self.epv_vs_bvps.clone(),
            self.piotroski_score.clone(),
            self.altman_z_score.clone(),
            self.beneish_m_score.clone(),
            self.intangible_assets.clone(),
            self.cost_advantage.clone(),
            self.network_effect.clone(),
            self.switching_cost.clone(),
            self.niche_market.clone(),
            self.moat_total.clone(),
            self.policy_risk.clone(),
            self.technology_risk.clone(),
            self.key_person_risk.clone(),
        ]
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(COLUMNS.len()))?;
        for (column, cell) in COLUMNS.iter().zip(self.cells()) {
            map.serialize_entry(column, &cell)?;
        }
        map.end()
    }
}

/// Build a row for `symbol`, or `None` when either record is missing.
pub fn assemble(
    symbol: &str,
    profile: Option<&ProfileRecord>,
    metrics: Option<&MetricsRecord>,
    lists: &MoatLists,
) -> Option<ResultRow> {
    let (profile, metrics) = (profile?, metrics?);
    let moat = classify(symbol, metrics, lists);
    Some(build_row(symbol, profile, metrics, &moat, lists))
}

fn build_row(
    symbol: &str,
    profile: &ProfileRecord,
    metrics: &MetricsRecord,
    moat: &MoatAssessment,
    lists: &MoatLists,
) -> ResultRow {
    ResultRow {
        symbol: symbol.to_string(),
        confidence_score: moat.confidence_score(),
        price: dollars(profile.price),
        reasonable_price: dollars(reasonable_price(profile.price)),
        eps_stable_growth: UNAVAILABLE.to_string(),
        eps: format!("{:.2}", profile.eps),
        fcf_positive: UNAVAILABLE.to_string(),
        dividend_growth: yes_no(profile.pays_dividend()),
        net_margin: net_margin_cell(metrics.net_margin),
        debt_coverage: if metrics.debt_to_equity < DEBT_TO_EQUITY_CEILING {
            "<0.5 (Yes)".to_string()
        } else {
            "No".to_string()
        },
        returns: yes_no(metrics.roic > ROIC_BAR && metrics.roe > ROE_BAR),
        eps_growth: UNAVAILABLE.to_string(),
        roic_vs_wacc: if metrics.roic > ROIC_DOUBLE_WACC {
            "ROIC>2WACC".to_string()
        } else {
            "Yes".to_string()
        },
        epv_vs_bvps: UNAVAILABLE.to_string(),
        piotroski_score: metrics.piotroski_score.to_string(),
        altman_z_score: format!("{:.2}", metrics.altman_z_score),
        beneish_m_score: format!("{:.2}", metrics.beneish_m_score),
        intangible_assets: yes_no(moat.intangible_assets),
        cost_advantage: yes_no(moat.cost_advantage),
        network_effect: yes_no(moat.network_effect),
        switching_cost: yes_no(moat.switching_cost),
        niche_market: yes_no(moat.niche_market),
        moat_total: moat.display_bucket(),
        policy_risk: yes_no(lists.has_policy_risk(symbol)),
        technology_risk: "Yes".to_string(),
        key_person_risk: "No".to_string(),
    }
}

/// Current price less the margin of safety
pub fn reasonable_price(price: f64) -> f64 {
    price * MARGIN_OF_SAFETY
}

fn dollars(value: f64) -> String {
    format!("${value:.2}")
}

fn yes_no(flag: bool) -> String {
    let answer = if flag { "Yes" } else { "No" };
    answer.to_string()
}

fn net_margin_cell(net_margin: f64) -> String {
    let percent = net_margin * 100.0;
    if net_margin > NET_MARGIN_BAR {
        format!(">20% ({percent:.1}%)")
    } else {
        format!("No ({percent:.1}%)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metric;

    fn profile(price: f64) -> ProfileRecord {
        ProfileRecord::new(price, 2.5, Some(0.01))
    }

    fn metrics() -> MetricsRecord {
        MetricsRecord {
            net_margin: 0.234,
            roic: 0.21,
            roe: 0.30,
            debt_to_equity: 0.4,
            piotroski_score: Metric::Reported(7),
            altman_z_score: Metric::Reported(12.3456),
            beneish_m_score: Metric::Unavailable,
        }
    }

    #[test]
    fn test_reasonable_price() {
        let row = assemble("AAPL", Some(&profile(100.0)), Some(&metrics()), &MoatLists::default())
            .unwrap();
        assert_eq!(row.price, "$100.00");
        assert_eq!(row.reasonable_price, "$80.00");
    }

    #[test]
    fn test_missing_record_drops_row() {
        let lists = MoatLists::default();
        assert!(assemble("AAPL", Some(&profile(10.0)), None, &lists).is_none());
        assert!(assemble("AAPL", None, Some(&metrics()), &lists).is_none());
        assert!(assemble("AAPL", None, None, &lists).is_none());
    }

    #[test]
    fn test_derived_cells() {
        let row = assemble("NVDA", Some(&profile(50.0)), Some(&metrics()), &MoatLists::default())
            .unwrap();

        assert_eq!(row.net_margin, ">20% (23.4%)");
        assert_eq!(row.debt_coverage, "<0.5 (Yes)");
        assert_eq!(row.returns, "Yes");
        assert_eq!(row.roic_vs_wacc, "Yes");
        assert_eq!(row.dividend_growth, "Yes");
        assert_eq!(row.eps, "2.50");
        assert_eq!(row.piotroski_score, "7");
        assert_eq!(row.altman_z_score, "12.35");
        assert_eq!(row.policy_risk, "Yes");
    }

    #[test]
    fn test_weak_fundamentals_cells() {
        let weak = MetricsRecord {
            net_margin: 0.151,
            roic: 0.08,
            roe: 0.2,
            debt_to_equity: 0.5,
            ..Default::default()
        };
        let row = assemble(
            "ZZZZ",
            Some(&ProfileRecord::new(10.0, -0.5, None)),
            Some(&weak),
            &MoatLists::default(),
        )
        .unwrap();

        assert_eq!(row.net_margin, "No (15.1%)");
        assert_eq!(row.debt_coverage, "No");
        assert_eq!(row.returns, "No");
        assert_eq!(row.dividend_growth, "No");
        assert_eq!(row.policy_risk, "No");
        assert_eq!(row.moat_total, "0個");
        assert_eq!(row.confidence_score, 7);
    }

    #[test]
    fn test_high_roic_beats_double_wacc() {
        let strong = MetricsRecord {
            roic: 0.26,
            ..metrics()
        };
        let row = assemble("ZZZZ", Some(&profile(1.0)), Some(&strong), &MoatLists::default())
            .unwrap();
        assert_eq!(row.roic_vs_wacc, "ROIC>2WACC");
    }

    #[test]
    fn test_uncomputed_fields_marked_unavailable() {
        let row = assemble("AAPL", Some(&profile(1.0)), Some(&metrics()), &MoatLists::default())
            .unwrap();

        assert_eq!(row.beneish_m_score, "N/A");
        assert_eq!(row.eps_stable_growth, "N/A");
        assert_eq!(row.fcf_positive, "N/A");
        assert_eq!(row.eps_growth, "N/A");
        assert_eq!(row.epv_vs_bvps, "N/A");
    }

    #[test]
    fn test_dividend_reported_without_price() {
        let unpriced = ProfileRecord::new(0.0, 1.0, None).with_dividend_per_share(Some(0.96));
        let row = assemble("KO", Some(&unpriced), Some(&metrics()), &MoatLists::default())
            .unwrap();

        assert_eq!(row.dividend_growth, "Yes");
        assert_eq!(row.price, "$0.00");
    }

    #[test]
    fn test_moat_columns() {
        let row = assemble("NVDA", Some(&profile(1.0)), Some(&metrics()), &MoatLists::default())
            .unwrap();

        // margin 23.4% clears neither margin flag
        assert_eq!(row.intangible_assets, "No");
        assert_eq!(row.cost_advantage, "No");
        assert_eq!(row.network_effect, "Yes");
        assert_eq!(row.switching_cost, "Yes");
        assert_eq!(row.niche_market, "No");
        assert_eq!(row.moat_total, "2個");
    }

    #[test]
    fn test_serialize_uses_column_names() {
        let row = assemble("AAPL", Some(&profile(100.0)), Some(&metrics()), &MoatLists::default())
            .unwrap();
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["股票代碼"], "AAPL");
        assert_eq!(value["合理價"], "$80.00");
        assert_eq!(value["信心分數"], "7");
        assert_eq!(value.as_object().unwrap().len(), COLUMNS.len());
    }
}
