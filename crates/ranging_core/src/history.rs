//! Janela deslizante de medições para o monitor.

use std::collections::VecDeque;

/// Uma medição com o instante (segundos desde o início do monitor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    pub time_secs: f64,
    pub distance: f64,
}

/// Últimas `capacity` medições, da mais antiga para a mais recente.
#[derive(Debug, Clone)]
pub struct DistanceHistory {
    samples: VecDeque<DistanceSample>,
    capacity: usize,
}

impl DistanceHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, time_secs: f64, distance: f64) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(DistanceSample {
            time_secs,
            distance,
        });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<DistanceSample> {
        self.samples.back().copied()
    }

    /// Menor e maior distância da janela.
    pub fn range(&self) -> Option<(f64, f64)> {
        let mut iter = self.samples.iter().map(|s| s.distance);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Pontos `[tempo, distância]` prontos para plotagem.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .map(|s| [s.time_secs, s.distance])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_latest_samples() {
        let mut h = DistanceHistory::new(3);
        for i in 0..5 {
            h.push(i as f64, i as f64 * 10.0);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.points(), vec![[2.0, 20.0], [3.0, 30.0], [4.0, 40.0]]);
        assert_eq!(h.last().map(|s| s.distance), Some(40.0));
    }

    #[test]
    fn range_tracks_min_and_max() {
        let mut h = DistanceHistory::new(50);
        assert_eq!(h.range(), None);
        for d in [3.5, 1.25, 7.0, 2.0] {
            h.push(0.0, d);
        }
        assert_eq!(h.range(), Some((1.25, 7.0)));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut h = DistanceHistory::new(0);
        h.push(0.0, 1.0);
        h.push(1.0, 2.0);
        assert_eq!(h.len(), 1);
        assert!(!h.is_empty());
    }
}
