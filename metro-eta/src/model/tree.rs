//! Regression trees grown leaf-wise on residual histograms.

use rayon::prelude::*;

use super::bins::BinnedData;
use super::config::BoostConfig;
use super::feature::{EncodedRow, Feature};

/// Gains at or below this are treated as "no useful split".
const MIN_GAIN: f64 = 1e-12;

/// How a split node routes a row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Rule {
    /// Continuous feature: `value <= threshold` goes left.
    LessOrEqual(f64),
    /// Categorical feature: codes in the (sorted) set go left; everything
    /// else, unseen categories included, goes right.
    InSet(Vec<u32>),
}

impl Rule {
    fn goes_left(&self, row: &EncodedRow, feature: Feature) -> bool {
        match self {
            Rule::LessOrEqual(threshold) => row.value(feature) <= *threshold,
            Rule::InSet(codes) => row
                .category(feature)
                .is_some_and(|code| codes.binary_search(&code).is_ok()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf(f64),
    Split {
        feature: Feature,
        rule: Rule,
        left: usize,
        right: usize,
    },
}

/// One tree of the ensemble. Node 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn predict(&self, row: &EncodedRow) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    rule,
                    left,
                    right,
                } => {
                    index = if rule.goes_left(row, *feature) {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf(_)))
            .count()
    }
}

/// Residual sum and row count of one histogram bin.
#[derive(Debug, Clone, Copy, Default)]
struct BinStat {
    sum: f64,
    count: usize,
}

impl BinStat {
    fn add(&mut self, other: BinStat) {
        self.sum += other.sum;
        self.count += other.count;
    }

    fn minus(self, other: BinStat) -> BinStat {
        BinStat {
            sum: self.sum - other.sum,
            count: self.count - other.count,
        }
    }
}

type Histogram = Vec<BinStat>;

/// Partition of a leaf's rows found by the split search.
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature: Feature,
    /// Continuous: highest bin on the left. Categorical: left codes.
    left_bins: LeftBins,
    gain: f64,
    left: BinStat,
    right: BinStat,
}

#[derive(Debug, Clone)]
enum LeftBins {
    UpTo(u32),
    Codes(Vec<u32>),
}

impl LeftBins {
    fn contains(&self, bin: u32) -> bool {
        match self {
            LeftBins::UpTo(last) => bin <= *last,
            LeftBins::Codes(codes) => codes.binary_search(&bin).is_ok(),
        }
    }
}

/// A leaf that may still be split.
struct OpenLeaf {
    node: usize,
    rows: Vec<usize>,
    histograms: Vec<Histogram>,
    best: Option<SplitCandidate>,
}

/// Fit one tree to the residuals, best-first, up to `num_leaves` leaves.
///
/// Leaf values are the mean residual of their rows scaled by the learning
/// rate.
pub(crate) fn grow(data: &BinnedData, residuals: &[f64], config: &BoostConfig) -> RegressionTree {
    let min_leaf = config.min_data_in_leaf.max(1);
    let rows: Vec<usize> = (0..data.len()).collect();
    let histograms = build_histograms(data, residuals, &rows);
    let total = total_of(&histograms);

    let mut nodes = vec![Node::Leaf(leaf_value(total, config.learning_rate))];
    let best = find_best_split(&histograms, total, min_leaf, config);
    let mut leaves = vec![OpenLeaf {
        node: 0,
        rows,
        histograms,
        best,
    }];

    while leaves.len() < config.num_leaves {
        let Some(position) = best_leaf(&leaves) else {
            break;
        };
        let leaf = leaves.swap_remove(position);
        let Some(split) = leaf.best else {
            break;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = leaf
            .rows
            .iter()
            .partition(|&&row| split.left_bins.contains(data.bin(row, split.feature)));

        // Build the smaller child directly, derive the larger from the parent.
        let (left_histograms, right_histograms) = if left_rows.len() <= right_rows.len() {
            let left = build_histograms(data, residuals, &left_rows);
            let right = subtract(&leaf.histograms, &left);
            (left, right)
        } else {
            let right = build_histograms(data, residuals, &right_rows);
            let left = subtract(&leaf.histograms, &right);
            (left, right)
        };

        let left_node = nodes.len();
        nodes.push(Node::Leaf(leaf_value(split.left, config.learning_rate)));
        let right_node = nodes.len();
        nodes.push(Node::Leaf(leaf_value(split.right, config.learning_rate)));

        let rule = match &split.left_bins {
            LeftBins::UpTo(bin) => Rule::LessOrEqual(data.threshold(split.feature, *bin)),
            LeftBins::Codes(codes) => Rule::InSet(codes.clone()),
        };
        nodes[leaf.node] = Node::Split {
            feature: split.feature,
            rule,
            left: left_node,
            right: right_node,
        };

        let left_best = find_best_split(&left_histograms, split.left, min_leaf, config);
        let right_best = find_best_split(&right_histograms, split.right, min_leaf, config);
        leaves.push(OpenLeaf {
            node: left_node,
            rows: left_rows,
            histograms: left_histograms,
            best: left_best,
        });
        leaves.push(OpenLeaf {
            node: right_node,
            rows: right_rows,
            histograms: right_histograms,
            best: right_best,
        });
    }

    RegressionTree { nodes }
}

fn leaf_value(stat: BinStat, learning_rate: f64) -> f64 {
    if stat.count == 0 {
        return 0.0;
    }
    learning_rate * stat.sum / stat.count as f64
}

fn best_leaf(leaves: &[OpenLeaf]) -> Option<usize> {
    leaves
        .iter()
        .enumerate()
        .filter_map(|(i, leaf)| leaf.best.as_ref().map(|split| (i, split.gain)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn total_of(histograms: &[Histogram]) -> BinStat {
    let mut total = BinStat::default();
    if let Some(first) = histograms.first() {
        for stat in first {
            total.add(*stat);
        }
    }
    total
}

fn build_histograms(data: &BinnedData, residuals: &[f64], rows: &[usize]) -> Vec<Histogram> {
    Feature::ALL
        .par_iter()
        .map(|&feature| {
            let mut histogram = vec![BinStat::default(); data.num_bins(feature)];
            for &row in rows {
                let stat = &mut histogram[data.bin(row, feature) as usize];
                stat.sum += residuals[row];
                stat.count += 1;
            }
            histogram
        })
        .collect()
}

fn subtract(parent: &[Histogram], child: &[Histogram]) -> Vec<Histogram> {
    parent
        .iter()
        .zip(child)
        .map(|(p, c)| p.iter().zip(c).map(|(p, c)| p.minus(*c)).collect())
        .collect()
}

/// Variance reduction of splitting `total` into `left` and its complement.
fn gain(left: BinStat, right: BinStat, total: BinStat) -> f64 {
    let score = |s: BinStat| s.sum * s.sum / s.count as f64;
    score(left) + score(right) - score(total)
}

fn find_best_split(
    histograms: &[Histogram],
    total: BinStat,
    min_leaf: usize,
    config: &BoostConfig,
) -> Option<SplitCandidate> {
    if total.count < 2 * min_leaf {
        return None;
    }

    Feature::ALL
        .par_iter()
        .filter_map(|&feature| {
            let histogram = &histograms[feature.index()];
            if feature.is_categorical() {
                best_categorical_split(feature, histogram, total, min_leaf, config)
            } else {
                best_threshold_split(feature, histogram, total, min_leaf)
            }
        })
        .filter(|split| split.gain > MIN_GAIN)
        // Ties resolve to the earlier feature so growth is deterministic.
        .max_by(|a, b| {
            a.gain
                .total_cmp(&b.gain)
                .then_with(|| b.feature.index().cmp(&a.feature.index()))
        })
}

fn best_threshold_split(
    feature: Feature,
    histogram: &[BinStat],
    total: BinStat,
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let mut best: Option<SplitCandidate> = None;
    let mut left = BinStat::default();

    for (bin, stat) in histogram.iter().enumerate().take(histogram.len().saturating_sub(1)) {
        left.add(*stat);
        let right = total.minus(left);
        if left.count < min_leaf || right.count < min_leaf {
            continue;
        }
        let gain = gain(left, right, total);
        if best.as_ref().is_none_or(|b| gain > b.gain) {
            best = Some(SplitCandidate {
                feature,
                left_bins: LeftBins::UpTo(bin as u32),
                gain,
                left,
                right,
            });
        }
    }

    best
}

/// Many-vs-many categorical split.
///
/// Categories present at the node are ordered by mean residual; the best
/// prefix of that order (scanned from either end) becomes the left set.
fn best_categorical_split(
    feature: Feature,
    histogram: &[BinStat],
    total: BinStat,
    min_leaf: usize,
    config: &BoostConfig,
) -> Option<SplitCandidate> {
    let mut eligible: Vec<(u32, BinStat)> = histogram
        .iter()
        .enumerate()
        .filter(|(_, stat)| stat.count > 0 && stat.count >= config.min_data_per_category)
        .map(|(code, stat)| (code as u32, *stat))
        .collect();
    if eligible.len() < 2 {
        return None;
    }

    eligible.sort_by(|a, b| {
        let mean_a = a.1.sum / a.1.count as f64;
        let mean_b = b.1.sum / b.1.count as f64;
        mean_a
            .total_cmp(&mean_b)
            .then_with(|| a.0.cmp(&b.0))
    });

    let max_left = config.max_cat_threshold.max(1).min(eligible.len());
    let mut best: Option<(f64, bool, usize, BinStat)> = None;

    for descending in [false, true] {
        let mut left = BinStat::default();
        for k in 0..max_left {
            let index = if descending { eligible.len() - 1 - k } else { k };
            left.add(eligible[index].1);
            let right = total.minus(left);
            if left.count < min_leaf || right.count < min_leaf {
                continue;
            }
            let gain = gain(left, right, total);
            if best.as_ref().is_none_or(|(best_gain, ..)| gain > *best_gain) {
                best = Some((gain, descending, k + 1, left));
            }
        }
    }

    let (gain, descending, size, left) = best?;
    let mut codes: Vec<u32> = if descending {
        eligible.iter().rev().take(size).map(|(code, _)| *code).collect()
    } else {
        eligible.iter().take(size).map(|(code, _)| *code).collect()
    };
    codes.sort_unstable();

    Some(SplitCandidate {
        feature,
        left_bins: LeftBins::Codes(codes),
        gain,
        left,
        right: total.minus(left),
    })
}
