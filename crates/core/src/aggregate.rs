use crate::domain::analysis::SectorAnalysis;
use crate::domain::signal::{Signal, SignalType};
use std::collections::HashMap;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct TopPick {
    /// 1-based.
    pub rank: usize,
    pub signal: Signal,
}

/// First `n` signals in source order. The source ranks; this never re-sorts.
pub fn top_picks(signals: &[Signal], n: usize) -> Vec<TopPick> {
    signals
        .iter()
        .take(n)
        .enumerate()
        .map(|(idx, signal)| TopPick {
            rank: idx + 1,
            signal: signal.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeBucket {
    pub signal_type: SignalType,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDistribution {
    pub total: usize,
    /// BUY, HOLD, SELL in that order; empty when `total == 0`.
    pub buckets: Vec<TypeBucket>,
}

impl TypeDistribution {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn count(&self, signal_type: SignalType) -> usize {
        self.buckets
            .iter()
            .find(|b| b.signal_type == signal_type)
            .map(|b| b.count)
            .unwrap_or(0)
    }
}

pub fn type_distribution(signals: &[Signal]) -> TypeDistribution {
    let total = signals.len();
    if total == 0 {
        return TypeDistribution::default();
    }

    let buckets = SignalType::ALL
        .into_iter()
        .map(|signal_type| {
            let count = signals
                .iter()
                .filter(|s| s.signal_type == signal_type)
                .count();
            TypeBucket {
                signal_type,
                count,
                percent: count as f64 / total as f64 * 100.0,
            }
        })
        .collect();

    TypeDistribution { total, buckets }
}

/// Per-sector average YoY/MoM growth and member count, in first-seen order.
pub fn aggregate_sectors(signals: &[Signal]) -> Vec<SectorAnalysis> {
    struct Acc {
        sector: String,
        sector_name: String,
        yoy_sum: f64,
        mom_sum: f64,
        count: u64,
    }

    let mut order: Vec<Acc> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for signal in signals {
        let slot = *index.entry(signal.sector.as_str()).or_insert_with(|| {
            order.push(Acc {
                sector: signal.sector.clone(),
                sector_name: signal.sector_name.clone(),
                yoy_sum: 0.0,
                mom_sum: 0.0,
                count: 0,
            });
            order.len() - 1
        });
        let acc = &mut order[slot];
        acc.yoy_sum += signal.yoy_growth;
        acc.mom_sum += signal.mom_growth;
        acc.count += 1;
    }

    order
        .into_iter()
        .map(|acc| SectorAnalysis {
            sector: acc.sector,
            sector_name: acc.sector_name,
            avg_yoy_growth: acc.yoy_sum / acc.count as f64,
            avg_mom_growth: acc.mom_sum / acc.count as f64,
            signal_count: acc.count,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::signal::Confidence;

    pub(crate) fn signal(symbol: &str, sector: &str, signal_type: SignalType, yoy: f64, mom: f64) -> Signal {
        Signal {
            id: format!("signal-{symbol}"),
            symbol: symbol.to_string(),
            company_name: symbol.to_string(),
            sector: sector.to_string(),
            sector_name: sector.to_string(),
            signal_type,
            yoy_growth: yoy,
            mom_growth: mom,
            expected_return: 0.0,
            confidence: Confidence::default(),
            surprise_z: None,
            vs_benchmark: None,
            benchmark_return: None,
            period: None,
        }
    }

    #[test]
    fn top_picks_keeps_source_order_and_ranks_from_one() {
        let signals = vec![
            signal("C", "A", SignalType::Buy, 1.0, 0.0),
            signal("A", "A", SignalType::Buy, 9.0, 0.0),
            signal("B", "A", SignalType::Sell, 5.0, 0.0),
        ];
        let picks = top_picks(&signals, 2);
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].rank, 1);
        assert_eq!(picks[0].signal.symbol, "C");
        assert_eq!(picks[1].signal.symbol, "A");

        assert_eq!(top_picks(&signals, DEFAULT_TOP_N).len(), 3);
    }

    #[test]
    fn distribution_of_empty_set_is_empty() {
        let d = type_distribution(&[]);
        assert!(d.is_empty());
        assert_eq!(d.total, 0);
    }

    #[test]
    fn distribution_counts_and_percentages() {
        let signals = vec![
            signal("A", "X", SignalType::Buy, 0.0, 0.0),
            signal("B", "X", SignalType::Buy, 0.0, 0.0),
            signal("C", "X", SignalType::Hold, 0.0, 0.0),
            signal("D", "X", SignalType::Buy, 0.0, 0.0),
        ];
        let d = type_distribution(&signals);
        assert_eq!(d.count(SignalType::Buy), 3);
        assert_eq!(d.count(SignalType::Hold), 1);
        assert_eq!(d.count(SignalType::Sell), 0);
        assert_eq!(d.buckets[0].percent, 75.0);
        let sum: f64 = d.buckets.iter().map(|b| b.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn sectors_group_in_first_seen_order() {
        let signals = vec![
            signal("a1", "A", SignalType::Buy, 10.0, 1.0),
            signal("b1", "B", SignalType::Buy, 4.0, 2.0),
            signal("a2", "A", SignalType::Hold, 20.0, 3.0),
            signal("b2", "B", SignalType::Sell, 6.0, 4.0),
            signal("a3", "A", SignalType::Sell, 30.0, 5.0),
        ];
        let sectors = aggregate_sectors(&signals);
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].sector, "A");
        assert_eq!(sectors[0].signal_count, 3);
        assert_eq!(sectors[0].avg_yoy_growth, 20.0);
        assert_eq!(sectors[0].avg_mom_growth, 3.0);
        assert_eq!(sectors[1].sector, "B");
        assert_eq!(sectors[1].signal_count, 2);
        assert_eq!(sectors[1].avg_yoy_growth, 5.0);

        let total: u64 = sectors.iter().map(|s| s.signal_count).sum();
        assert_eq!(total, signals.len() as u64);
    }
}
