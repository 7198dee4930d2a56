//! Chart feeds derived from the trade list
//!
//! Charts bound to a feed are redrawn after every refresh that replaced the
//! table, from the same trades the table was rendered from.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::charts::{ChartData, Dataset};
use crate::table::parse_timestamp;
use crate::types::{Route, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartFeed {
    /// Trades per route
    RouteCount,
    /// Input volume per route
    RouteVolume,
    /// Executed (and aggregator-quoted) slippage over time
    Slippage,
    /// Per-trade and cumulative savings over time
    CostSavings,
}

impl ChartFeed {
    pub fn derive(self, trades: &[Trade]) -> ChartData {
        match self {
            ChartFeed::RouteCount => by_route(trades, "Trades", |_| 1.0),
            ChartFeed::RouteVolume => by_route(trades, "Volume", |t| t.input_amount),
            ChartFeed::Slippage => slippage_series(trades),
            ChartFeed::CostSavings => savings_series(trades),
        }
    }
}

/// OTC first, then other routes in order of appearance
fn by_route(trades: &[Trade], label: &str, value: impl Fn(&Trade) -> f64) -> ChartData {
    let mut routes: Vec<Route> = vec![Route::Otc];
    let mut totals: Vec<f64> = vec![0.0];

    for trade in trades {
        match routes.iter().position(|r| *r == trade.route) {
            Some(idx) => totals[idx] += value(trade),
            None => {
                routes.push(trade.route.clone());
                totals.push(value(trade));
            }
        }
    }

    ChartData {
        labels: routes.iter().map(ToString::to_string).collect(),
        datasets: vec![Dataset::new(label, totals)],
    }
}

/// The API lists newest first; series read oldest to newest
fn chronological(trades: &[Trade]) -> impl Iterator<Item = &Trade> {
    trades.iter().rev()
}

fn time_label(trade: &Trade) -> String {
    parse_timestamp(&trade.created_at)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| format!("#{}", trade.id))
}

fn slippage_series(trades: &[Trade]) -> ChartData {
    let labels = chronological(trades).map(time_label).collect();
    let executed = chronological(trades).map(|t| t.slippage).collect();
    let mut datasets = vec![Dataset::new("Slippage %", executed)];

    let quoted: Option<Vec<f64>> = chronological(trades).map(|t| t.jupiter_slippage).collect();
    if let Some(quoted) = quoted.filter(|q| !q.is_empty()) {
        datasets.push(Dataset::new("Aggregator slippage %", quoted));
    }

    ChartData { labels, datasets }
}

fn savings_series(trades: &[Trade]) -> ChartData {
    let labels = chronological(trades).map(time_label).collect();
    let per_trade: Vec<f64> = chronological(trades).map(|t| t.cost_savings.max(0.0)).collect();
    let cumulative = per_trade
        .iter()
        .scan(0.0, |acc, s| {
            *acc += s;
            Some(*acc)
        })
        .collect();

    ChartData {
        labels,
        datasets: vec![
            Dataset::new("Savings", per_trade),
            Dataset::new("Cumulative savings", cumulative),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_trade;

    fn dex(id: u64, amount: f64) -> Trade {
        let mut t = sample_trade(id);
        t.route = Route::Other("DEX".into());
        t.input_amount = amount;
        t.cost_savings = 0.0;
        t
    }

    #[test]
    fn test_route_count_otc_first() {
        let trades = vec![dex(3, 10.0), sample_trade(2), dex(1, 5.0)];
        let data = ChartFeed::RouteCount.derive(&trades);

        assert_eq!(data.labels, vec!["OTC", "DEX"]);
        assert_eq!(data.datasets[0].data, vec![1.0, 2.0]);
    }

    #[test]
    fn test_route_volume() {
        let trades = vec![dex(3, 10.0), sample_trade(2), dex(1, 5.0)];
        let data = ChartFeed::RouteVolume.derive(&trades);
        assert_eq!(data.datasets[0].data, vec![1000.0, 15.0]);
    }

    #[test]
    fn test_slippage_series_oldest_first() {
        let mut newest = sample_trade(2);
        newest.slippage = 1.5;
        let oldest = sample_trade(1);

        let data = ChartFeed::Slippage.derive(&[newest, oldest]);
        assert_eq!(data.datasets.len(), 1);
        assert_eq!(data.datasets[0].data, vec![0.25, 1.5]);
    }

    #[test]
    fn test_slippage_includes_aggregator_quote_when_complete() {
        let mut a = sample_trade(1);
        a.jupiter_slippage = Some(2.0);
        let mut b = sample_trade(2);
        b.jupiter_slippage = Some(3.0);

        let data = ChartFeed::Slippage.derive(&[b, a]);
        assert_eq!(data.datasets[1].data, vec![2.0, 3.0]);
    }

    #[test]
    fn test_cumulative_savings_ignores_losses() {
        let mut loss = sample_trade(3);
        loss.cost_savings = -4.0;
        let trades = vec![loss, sample_trade(2), sample_trade(1)];

        let data = ChartFeed::CostSavings.derive(&trades);
        assert_eq!(data.datasets[0].data, vec![12.5, 12.5, 0.0]);
        assert_eq!(data.datasets[1].data, vec![12.5, 25.0, 25.0]);
    }

    #[test]
    fn test_empty_trades() {
        let data = ChartFeed::RouteCount.derive(&[]);
        assert_eq!(data.labels, vec!["OTC"]);
        assert_eq!(data.datasets[0].data, vec![0.0]);
        assert!(ChartFeed::Slippage.derive(&[]).datasets.len() == 1);
    }
}
