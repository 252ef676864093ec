//! Early stopping on a monitored evaluation metric.

/// Tracks a lower-is-better metric and signals when it stops improving.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Rounds without improvement tolerated before stopping.
    patience: usize,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
        }
    }

    /// Record this round's value; `true` once `patience` rounds passed without
    /// a strict improvement.
    pub fn should_stop(&mut self, value: f64) -> bool {
        let improved = match self.best_value {
            None => true,
            Some(best) => value < best,
        };
        if improved {
            self.best_value = Some(value);
            self.best_round = self.current_round;
        }
        self.current_round += 1;
        self.current_round - self.best_round > self.patience
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Zero-based round of the best value.
    pub fn best_round(&self) -> usize {
        self.best_round
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_going_while_improving() {
        let mut stop = EarlyStopping::new(2);
        for value in [1.0, 0.9, 0.8, 0.7] {
            assert!(!stop.should_stop(value));
        }
        assert_eq!(stop.best_round(), 3);
        assert_eq!(stop.best_value(), Some(0.7));
    }

    #[test]
    fn test_stops_after_patience() {
        let mut stop = EarlyStopping::new(2);
        assert!(!stop.should_stop(0.5));
        assert!(!stop.should_stop(0.6));
        assert!(stop.should_stop(0.5));
        assert_eq!(stop.best_round(), 0);
        assert_eq!(stop.current_round(), 3);
    }

    #[test]
    fn test_improvement_resets_window() {
        let mut stop = EarlyStopping::new(1);
        assert!(!stop.should_stop(1.0));
        assert!(!stop.should_stop(0.9));
        assert!(stop.should_stop(0.95));
        assert_eq!(stop.best_round(), 1);
    }
}
