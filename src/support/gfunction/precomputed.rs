use super::GFunctionError;

/// Precomputed g-function curves for one borefield and ground.
///
/// Every curve is sampled on the same time axis. With the `serde` feature the
/// dataset reads and writes the mapping
/// `{"Data": {"<depth>": [g, ...]}, "Time": [t, ...]}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "wire::Dataset", into = "wire::Dataset")
)]
pub struct PrecomputedGFunctions {
    time: Vec<f64>,
    /// `(depth, curve)` pairs sorted by depth.
    curves: Vec<(f64, Vec<f64>)>,
}

impl PrecomputedGFunctions {
    /// # Errors
    ///
    /// Returns [`GFunctionError::Dataset`] unless the time axis is strictly
    /// increasing and positive, depths are positive and distinct, and every
    /// curve is finite with one value per time.
    pub fn new(time: Vec<f64>, mut curves: Vec<(f64, Vec<f64>)>) -> Result<Self, GFunctionError> {
        let invalid = |msg: &str| Err(GFunctionError::Dataset(msg.to_owned()));

        if time.is_empty() || curves.is_empty() {
            return invalid("dataset is empty");
        }
        if !(time[0] > 0.0 && time.iter().all(|t| t.is_finite())) {
            return invalid("times must be positive and finite");
        }
        if time.windows(2).any(|w| w[0] >= w[1]) {
            return invalid("times must be strictly increasing");
        }

        curves.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (depth, curve) in &curves {
            if !(depth.is_finite() && *depth > 0.0) {
                return invalid("depths must be positive and finite");
            }
            if curve.len() != time.len() {
                return invalid("every curve needs one value per time");
            }
            if curve.iter().any(|g| !g.is_finite()) {
                return invalid("g-values must be finite");
            }
        }
        if curves.windows(2).any(|w| w[0].0 == w[1].0) {
            return invalid("depths must be distinct");
        }

        Ok(Self { time, curves })
    }

    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Stored depths in increasing order.
    pub fn depths(&self) -> impl Iterator<Item = f64> + '_ {
        self.curves.iter().map(|(depth, _)| *depth)
    }

    /// Smallest and largest stored depth.
    #[must_use]
    pub fn depth_range(&self) -> (f64, f64) {
        let first = self.curves.first().map_or(0.0, |c| c.0);
        let last = self.curves.last().map_or(0.0, |c| c.0);
        (first, last)
    }

    pub(super) fn into_parts(self) -> (Vec<f64>, Vec<(f64, Vec<f64>)>) {
        (self.time, self.curves)
    }
}

#[cfg(feature = "serde")]
mod wire {
    use std::collections::BTreeMap;

    use super::{GFunctionError, PrecomputedGFunctions};

    #[derive(serde::Serialize, serde::Deserialize)]
    pub(super) struct Dataset {
        #[serde(rename = "Data")]
        data: BTreeMap<String, Vec<f64>>,
        #[serde(rename = "Time")]
        time: Vec<f64>,
    }

    impl TryFrom<Dataset> for PrecomputedGFunctions {
        type Error = GFunctionError;

        fn try_from(wire: Dataset) -> Result<Self, Self::Error> {
            let curves = wire
                .data
                .into_iter()
                .map(|(depth, curve)| {
                    depth
                        .trim()
                        .parse::<f64>()
                        .map(|depth| (depth, curve))
                        .map_err(|_| GFunctionError::Dataset(format!("bad depth key {depth:?}")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            PrecomputedGFunctions::new(wire.time, curves)
        }
    }

    impl From<PrecomputedGFunctions> for Dataset {
        fn from(dataset: PrecomputedGFunctions) -> Self {
            let (time, curves) = dataset.into_parts();
            let data = curves
                .into_iter()
                .map(|(depth, curve)| (depth.to_string(), curve))
                .collect();
            Self { data, time }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_are_sorted_by_depth() {
        let dataset = PrecomputedGFunctions::new(
            vec![3600.0, 7200.0],
            vec![(100.0, vec![1.0, 1.2]), (50.0, vec![1.1, 1.3])],
        )
        .unwrap();
        assert_eq!(dataset.depths().collect::<Vec<_>>(), vec![50.0, 100.0]);
        assert_eq!(dataset.depth_range(), (50.0, 100.0));
    }

    #[test]
    fn rejects_inconsistent_data() {
        let short = PrecomputedGFunctions::new(vec![3600.0, 7200.0], vec![(50.0, vec![1.0])]);
        assert!(matches!(short, Err(GFunctionError::Dataset(_))));

        let unordered = PrecomputedGFunctions::new(vec![7200.0, 3600.0], vec![(50.0, vec![1.0, 2.0])]);
        assert!(unordered.is_err());

        let duplicate = PrecomputedGFunctions::new(
            vec![3600.0],
            vec![(50.0, vec![1.0]), (50.0, vec![1.1])],
        );
        assert!(duplicate.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn reads_depth_keyed_json() {
        let json = r#"{"Data": {"50": [1.0, 1.2], "75.5": [0.9, 1.1]}, "Time": [3600.0, 7200.0]}"#;
        let dataset: PrecomputedGFunctions = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.depth_range(), (50.0, 75.5));

        let text = serde_json::to_string(&dataset).unwrap();
        let again: PrecomputedGFunctions = serde_json::from_str(&text).unwrap();
        assert_eq!(again, dataset);
    }
}
