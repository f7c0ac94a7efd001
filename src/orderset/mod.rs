pub mod rat;

use crate::errors::RatError;
use crate::models::OrderRecord;
use crate::stats::{self, Quartiles, Summary};
use ordered_float::OrderedFloat;
use rat::ParsePolicy;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Non-empty list of records sorted ascending by price. Frozen once built.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSet {
    records: Vec<OrderRecord>,
    // cached ascending prices, same order as `records`
    prices: Vec<f64>,
}

impl OrderSet {
    /// Sorts `records` by price. Returns `None` for an empty list.
    pub fn new(mut records: Vec<OrderRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        records.sort_by_key(|r| OrderedFloat(r.price));
        let prices = records.iter().map(|r| r.price).collect();

        Some(Self { records, prices })
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn total_amount(&self) -> f64 {
        self.records.iter().map(|r| r.amount).sum()
    }

    pub fn average_price(&self) -> f64 {
        stats::mean(&self.prices)
    }

    pub fn median_price(&self) -> f64 {
        stats::median(&self.prices)
    }

    /// Nearest-rank percentile; always one of the loaded prices.
    pub fn percentile_price(&self, p: f64) -> f64 {
        stats::nearest_rank(&self.prices, p)
    }

    /// Interpolated quartiles; not the same as `percentile_price(25.0)` etc.
    pub fn quartiles(&self) -> Quartiles {
        stats::quartiles(&self.prices)
    }

    pub fn min_price(&self) -> f64 {
        self.prices[0]
    }

    pub fn max_price(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    /// Nearest-rank prices at 10, 20, ..., 90.
    pub fn deciles(&self) -> Vec<(u8, f64)> {
        (1..=9u8)
            .map(|d| {
                let p = d * 10;
                (p, self.percentile_price(f64::from(p)))
            })
            .collect()
    }

    pub fn summary(&self) -> Summary {
        let Quartiles { q1, q3, .. } = self.quartiles();
        let median = self.median_price();

        Summary {
            median,
            total_volume: self.total_amount(),
            q1,
            q2: median,
            q3,
            min: self.min_price(),
            max: self.max_price(),
        }
    }
}

/// Either nothing usable was loaded, or a sorted [`OrderSet`].
/// Every query on `Unloaded` returns `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrderSetState {
    #[default]
    Unloaded,
    Loaded(OrderSet),
}

impl OrderSetState {
    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        match OrderSet::new(records) {
            Some(set) => Self::Loaded(set),
            None => Self::Unloaded,
        }
    }

    /// Loads a `.rat` file. A missing or unreadable file, or one without a
    /// single valid row, logs a warning and yields `Unloaded`. Only
    /// [`ParsePolicy::Strict`] turns a bad row into an error.
    pub fn load(path: &Path, policy: ParsePolicy) -> Result<Self, RatError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("cannot open {}: {e}", path.display());
                return Ok(Self::Unloaded);
            }
        };

        let records = match rat::parse(BufReader::new(file), policy) {
            Ok(records) => records,
            Err(RatError::Io(e)) => {
                tracing::warn!("cannot read {}: {e}", path.display());
                return Ok(Self::Unloaded);
            }
            Err(e) => return Err(e),
        };

        let state = Self::from_records(records);
        match &state {
            Self::Unloaded => tracing::warn!("no valid records in {}", path.display()),
            Self::Loaded(set) => {
                tracing::debug!("loaded {} records from {}", set.len(), path.display())
            }
        }
        Ok(state)
    }

    pub fn as_loaded(&self) -> Option<&OrderSet> {
        match self {
            Self::Loaded(set) => Some(set),
            Self::Unloaded => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn total_amount(&self) -> Option<f64> {
        self.as_loaded().map(OrderSet::total_amount)
    }

    pub fn average_price(&self) -> Option<f64> {
        self.as_loaded().map(OrderSet::average_price)
    }

    pub fn median_price(&self) -> Option<f64> {
        self.as_loaded().map(OrderSet::median_price)
    }

    pub fn percentile_price(&self, p: f64) -> Option<f64> {
        self.as_loaded().map(|set| set.percentile_price(p))
    }

    pub fn quartiles(&self) -> Option<Quartiles> {
        self.as_loaded().map(OrderSet::quartiles)
    }

    pub fn min_price(&self) -> Option<f64> {
        self.as_loaded().map(OrderSet::min_price)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.as_loaded().map(OrderSet::max_price)
    }

    pub fn summary(&self) -> Option<Summary> {
        self.as_loaded().map(OrderSet::summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rec(price: f64, amount: f64) -> OrderRecord {
        OrderRecord { price, amount }
    }

    #[test]
    fn new_sorts_by_price() {
        let set = OrderSet::new(vec![rec(3.0, 1.0), rec(1.0, 2.0), rec(2.0, 3.0)]).unwrap();
        let prices: Vec<f64> = set.records().iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![1.0, 2.0, 3.0]);
        assert_eq!(set.min_price(), 1.0);
        assert_eq!(set.max_price(), 3.0);
    }

    #[test]
    fn empty_records_are_unloaded() {
        assert!(OrderSet::new(Vec::new()).is_none());
        assert_eq!(OrderSetState::from_records(Vec::new()), OrderSetState::Unloaded);
    }

    #[test]
    fn total_amount_ignores_input_order() {
        let rows = vec![rec(5.0, 1.5), rec(1.0, 2.25), rec(3.0, 0.25), rec(2.0, 4.0)];
        let mut reversed = rows.clone();
        reversed.reverse();

        let a = OrderSet::new(rows).unwrap().total_amount();
        let b = OrderSet::new(reversed).unwrap().total_amount();
        assert_eq!(a, 8.0);
        assert_eq!(b, 8.0);
    }

    #[test]
    fn median_and_average() {
        let odd = OrderSet::new(vec![rec(1.0, 1.0), rec(2.0, 1.0), rec(3.0, 1.0)]).unwrap();
        assert_eq!(odd.median_price(), 2.0);
        assert_eq!(odd.average_price(), 2.0);

        let even = OrderSet::new(vec![rec(4.0, 1.0), rec(2.0, 1.0), rec(3.0, 1.0), rec(1.0, 1.0)])
            .unwrap();
        assert_eq!(even.median_price(), 2.5);
        assert_eq!(even.percentile_price(50.0), 3.0);
    }

    #[test]
    fn summary_uses_median_for_q2() {
        let set = OrderSet::new((1..=10).map(|p| rec(f64::from(p), 1.0)).collect()).unwrap();
        let summary = set.summary();
        assert_eq!(summary.median, 5.5);
        assert_eq!(summary.q2, 5.5);
        assert!((summary.q1 - 2.75).abs() < 1e-12);
        assert!((summary.q3 - 8.25).abs() < 1e-12);
        assert_eq!(summary.total_volume, 10.0);
        assert_eq!((summary.min, summary.max), (1.0, 10.0));
    }

    #[test]
    fn deciles_are_nearest_rank() {
        let set = OrderSet::new((1..=20).map(|p| rec(f64::from(p), 1.0)).collect()).unwrap();
        let deciles = set.deciles();
        assert_eq!(deciles.len(), 9);
        assert_eq!(deciles[0], (10, 3.0));
        assert_eq!(deciles[8], (90, 19.0));
    }

    #[test]
    fn load_skips_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1.0,2.0\nabc,1.0\n3.0,4.0\n").unwrap();

        let state = OrderSetState::load(file.path(), ParsePolicy::Lenient).unwrap();
        let set = state.as_loaded().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(state.total_amount(), Some(6.0));
    }

    #[test]
    fn load_keeps_valid_rows_around_non_utf8_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1.0,2.0\n\xff\xfe,1.0\n3.0,4.0\n").unwrap();

        let state = OrderSetState::load(file.path(), ParsePolicy::Lenient).unwrap();
        assert_eq!(state.as_loaded().map(OrderSet::len), Some(2));

        let err = OrderSetState::load(file.path(), ParsePolicy::Strict).unwrap_err();
        assert!(matches!(err, RatError::Malformed { line: 2, .. }));
    }

    #[test]
    fn load_strict_fails_on_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1.0,2.0\nabc,1.0\n").unwrap();

        assert!(OrderSetState::load(file.path(), ParsePolicy::Strict).is_err());
    }

    #[test]
    fn missing_file_is_unloaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = OrderSetState::load(&dir.path().join("nope.rat"), ParsePolicy::Lenient).unwrap();

        assert!(!state.is_loaded());
        assert_eq!(state.total_amount(), None);
        assert_eq!(state.average_price(), None);
        assert_eq!(state.median_price(), None);
        assert_eq!(state.percentile_price(50.0), None);
        assert_eq!(state.quartiles(), None);
        assert_eq!(state.min_price(), None);
        assert_eq!(state.max_price(), None);
        assert_eq!(state.summary(), None);
    }

    #[test]
    fn file_without_valid_rows_is_unloaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "price,amount\n\n").unwrap();

        let state = OrderSetState::load(file.path(), ParsePolicy::Lenient).unwrap();
        assert_eq!(state, OrderSetState::Unloaded);
    }

    #[test]
    fn write_and_reload_matches_after_sort() {
        let rows = vec![rec(7.5, 1.0), rec(2.25, 3.5), rec(4.0, 0.0), rec(2.25, 1.25)];
        let file = tempfile::NamedTempFile::new().unwrap();
        rat::write_file(file.path(), &rows).unwrap();

        let reloaded = OrderSetState::load(file.path(), ParsePolicy::Strict).unwrap();
        let expected = OrderSet::new(rows).unwrap();
        assert_eq!(reloaded.as_loaded().unwrap().records(), expected.records());
    }
}
