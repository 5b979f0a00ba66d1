//! Histogram binning of training data.

use super::feature::{EncodedRow, Feature};

/// Bin boundaries for one continuous feature.
///
/// Bin `i` holds the values in `(bounds[i - 1], bounds[i]]`; the last bound
/// is `+inf` so every value has a bin.
#[derive(Debug, Clone)]
pub(crate) struct BinMapper {
    upper_bounds: Vec<f64>,
}

impl BinMapper {
    /// Choose at most `max_bins` bins for the given values.
    ///
    /// Few distinct values get one bin each, split at the midpoints.
    /// Otherwise the bounds are taken at evenly spaced quantiles.
    pub fn fit(values: &[f64], max_bins: usize) -> Self {
        let max_bins = max_bins.max(2);
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut distinct = sorted.clone();
        distinct.dedup();

        let mut upper_bounds = Vec::new();
        if distinct.len() <= max_bins {
            upper_bounds.extend(distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0));
        } else {
            for q in 1..max_bins {
                let bound = sorted[q * sorted.len() / max_bins];
                if upper_bounds.last().is_none_or(|&last| bound > last) {
                    upper_bounds.push(bound);
                }
            }
        }
        upper_bounds.push(f64::INFINITY);

        Self { upper_bounds }
    }

    pub fn bin(&self, value: f64) -> u32 {
        self.upper_bounds.partition_point(|&bound| bound < value) as u32
    }

    pub fn num_bins(&self) -> usize {
        self.upper_bounds.len()
    }

    /// Largest value that falls into `bin` or below.
    pub fn threshold(&self, bin: u32) -> f64 {
        self.upper_bounds[bin as usize]
    }
}

/// Training rows reduced to per-feature bin indices.
///
/// Categorical features use the category code as their bin.
pub(crate) struct BinnedData {
    bins: Vec<[u32; 4]>,
    num_bins: [usize; 4],
    mappers: [Option<BinMapper>; 4],
}

impl BinnedData {
    pub fn new(rows: &[EncodedRow], num_categories: usize, max_bins: usize) -> Self {
        let mut mappers: [Option<BinMapper>; 4] = [None, None, None, None];
        let mut num_bins = [0usize; 4];

        for feature in Feature::ALL {
            if feature.is_categorical() {
                num_bins[feature.index()] = num_categories.max(1);
            } else {
                let values: Vec<f64> = rows.iter().map(|r| r.value(feature)).collect();
                let mapper = BinMapper::fit(&values, max_bins);
                num_bins[feature.index()] = mapper.num_bins();
                mappers[feature.index()] = Some(mapper);
            }
        }

        let bins = rows
            .iter()
            .map(|row| {
                Feature::ALL.map(|feature| match &mappers[feature.index()] {
                    Some(mapper) => mapper.bin(row.value(feature)),
                    // Training rows always carry a code: the encoder was fitted on them.
                    None => row.category(feature).unwrap_or(0),
                })
            })
            .collect();

        Self {
            bins,
            num_bins,
            mappers,
        }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn bin(&self, row: usize, feature: Feature) -> u32 {
        self.bins[row][feature.index()]
    }

    pub fn num_bins(&self, feature: Feature) -> usize {
        self.num_bins[feature.index()]
    }

    /// Raw threshold of a continuous split at `bin`.
    pub fn threshold(&self, feature: Feature, bin: u32) -> f64 {
        self.mappers[feature.index()]
            .as_ref()
            .map_or(f64::INFINITY, |mapper| mapper.threshold(bin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_distinct_values_split_at_midpoints() {
        let mapper = BinMapper::fit(&[1.0, 3.0, 3.0, 5.0], 255);
        assert_eq!(mapper.num_bins(), 3);
        assert_eq!(mapper.bin(1.0), 0);
        assert_eq!(mapper.bin(2.0), 0);
        assert_eq!(mapper.bin(3.0), 1);
        assert_eq!(mapper.bin(5.0), 2);
        assert_eq!(mapper.bin(100.0), 2);
        assert_eq!(mapper.threshold(0), 2.0);
    }

    #[test]
    fn many_values_are_capped() {
        let values: Vec<f64> = (0..1000).map(f64::from).collect();
        let mapper = BinMapper::fit(&values, 16);
        assert!(mapper.num_bins() <= 16);
        assert!(mapper.num_bins() > 1);

        // Bins are monotone in the value
        let mut previous = 0;
        for v in &values {
            let bin = mapper.bin(*v);
            assert!(bin >= previous);
            previous = bin;
        }
    }

    #[test]
    fn bin_agrees_with_threshold() {
        let values: Vec<f64> = (0..500).map(|i| f64::from(i) * 0.37).collect();
        let mapper = BinMapper::fit(&values, 32);
        for v in &values {
            let bin = mapper.bin(*v);
            assert!(*v <= mapper.threshold(bin));
            if bin > 0 {
                assert!(*v > mapper.threshold(bin - 1));
            }
        }
    }

    #[test]
    fn empty_input_has_one_bin() {
        let mapper = BinMapper::fit(&[], 255);
        assert_eq!(mapper.num_bins(), 1);
        assert_eq!(mapper.bin(42.0), 0);
    }
}
