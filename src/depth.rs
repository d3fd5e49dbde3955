#[allow(unused_imports)]
use crate::Llrb;

/// Histogram of leaf depths collected by [`Llrb::validate`]. Depth is
/// the number of edges from root, a single entry tree has one leaf at
/// depth 0.
#[derive(Clone, Debug, Default)]
pub struct Depth {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    histogram: Vec<u64>, // leaf count, indexed by depth.
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        if self.samples == 0 || depth < self.min {
            self.min = depth;
        }
        self.max = self.max.max(depth);
        self.samples += 1;
        self.total += depth;
        if self.histogram.len() <= depth {
            self.histogram.resize(depth + 1, 0);
        }
        self.histogram[depth] += 1;
    }

    /// Number of leaves sampled.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Depth of the shallowest leaf.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Depth of the deepest leaf.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Average leaf depth, rounded down.
    pub fn mean(&self) -> usize {
        self.total.checked_div(self.samples).unwrap_or(0)
    }

    /// Return (percentile, depth) pairs for every depth at which the
    /// cumulative share of leaves crosses into 90..=100 percent.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut acc = 0_u64;
        let mut floor = 90_u8;
        let mut out = vec![];
        for (depth, &count) in self.histogram.iter().enumerate() {
            if count == 0 {
                continue;
            }
            acc += count;
            let perc = (acc * 100 / self.samples as u64) as u8;
            if perc >= floor {
                out.push((perc, depth));
                floor = perc;
            }
        }
        out
    }

    /// Log the histogram summary through `log`, one line per percentile.
    pub fn pretty_print(&self, prefix: &str) {
        log::info!(
            "{}depth (min, mean, max): ({}, {}, {})",
            prefix,
            self.min,
            self.mean(),
            self.max
        );
        self.percentiles()
            .into_iter()
            .for_each(|(perc, depth)| log::info!("{}  {}th percentile at {}", prefix, perc, depth));
    }

    /// Single line JSON object, percentiles keyed by percent.
    pub fn json(&self) -> String {
        let percentiles: Vec<String> = self
            .percentiles()
            .into_iter()
            .map(|(perc, depth)| format!("\"{}\": {}", perc, depth))
            .collect();
        format!(
            "{{ \"min\": {}, \"mean\": {}, \"max\": {}, \"percentiles\": {{ {} }} }}",
            self.min,
            self.mean(),
            self.max,
            percentiles.join(", ")
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_depth_empty() {
        let depth = Depth::new();
        assert_eq!(depth.samples(), 0);
        assert_eq!(depth.mean(), 0);
        assert_eq!(depth.percentiles(), Vec::<(u8, usize)>::new());
        assert_eq!(
            depth.json(),
            "{ \"min\": 0, \"mean\": 0, \"max\": 0, \"percentiles\": {  } }"
        );
    }

    #[test]
    fn test_depth_samples() {
        let mut depth = Depth::new();
        for d in [3, 4, 4, 5, 2].iter() {
            depth.sample(*d);
        }
        assert_eq!(depth.samples(), 5);
        assert_eq!(depth.min(), 2);
        assert_eq!(depth.max(), 5);
        assert_eq!(depth.mean(), 3);
        // 2 -> 20%, 3 -> 40%, 4 -> 80%, 5 -> 100%
        assert_eq!(depth.percentiles(), vec![(100, 5)]);
        assert_eq!(
            depth.json(),
            "{ \"min\": 2, \"mean\": 3, \"max\": 5, \"percentiles\": { \"100\": 5 } }"
        );

        let mut depth = Depth::new();
        depth.sample(0);
        assert_eq!(depth.min(), 0);
        assert_eq!(depth.max(), 0);
        assert_eq!(depth.percentiles(), vec![(100, 0)]);

        let mut depth = Depth::new();
        (0..9).for_each(|_| depth.sample(1));
        depth.sample(300);
        assert_eq!(depth.percentiles(), vec![(90, 1), (100, 300)]);
    }
}
