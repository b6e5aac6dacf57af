use std::collections::VecDeque;

/// The most recent requested depths, oldest first.
///
/// A depth that comes back after other depths were requested (and is not
/// the latest entry) signals a fixed-point iteration bouncing between trial
/// depths. The cache then computes that depth exactly instead of
/// interpolating, which breaks the cycle.
#[derive(Debug, Clone, Default)]
pub(super) struct DepthHistory {
    depths: VecDeque<f64>,
}

impl DepthHistory {
    pub(super) const CAPACITY: usize = 8;

    /// Whether `depth` appears in the history other than as the latest entry.
    pub(super) fn revisits(&self, depth: f64) -> bool {
        let older = self.depths.len().saturating_sub(1);
        self.depths.iter().take(older).any(|&d| d == depth)
    }

    /// Records a request; repeats of the latest depth are not recorded again.
    pub(super) fn push(&mut self, depth: f64) {
        if self.depths.back() == Some(&depth) {
            return;
        }
        if self.depths.len() == Self::CAPACITY {
            self.depths.pop_front();
        }
        self.depths.push_back(depth);
    }

    pub(super) fn clear(&mut self) {
        self.depths.clear();
    }
}
