// src/core/analysis/cycle.rs
//
// Manual step-through over a fixed set of probe frequencies. The state is a
// plain value owned by one session; callers pass it explicitly.

use serde::{Deserialize, Serialize};

/// One of the fixed step-through targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTarget {
    #[default]
    Low,
    Mid,
    High,
}

impl CycleTarget {
    pub const ALL: [CycleTarget; 3] = [CycleTarget::Low, CycleTarget::Mid, CycleTarget::High];

    pub fn frequency_hz(&self) -> f64 {
        match self {
            CycleTarget::Low => 250.0,
            CycleTarget::Mid => 1000.0,
            CycleTarget::High => 1750.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CycleTarget::Low => "low",
            CycleTarget::Mid => "mid",
            CycleTarget::High => "high",
        }
    }

    fn next(&self) -> CycleTarget {
        match self {
            CycleTarget::Low => CycleTarget::Mid,
            CycleTarget::Mid => CycleTarget::High,
            CycleTarget::High => CycleTarget::Low,
        }
    }
}

/// Session-scoped rotation 250 Hz -> 1000 Hz -> 1750 Hz -> 250 Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrequencyCycle {
    current: CycleTarget,
}

impl FrequencyCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(target: CycleTarget) -> Self {
        Self { current: target }
    }

    pub fn current(&self) -> CycleTarget {
        self.current
    }

    pub fn frequency_hz(&self) -> f64 {
        self.current.frequency_hz()
    }

    /// Move to the next target and return it
    pub fn advance(&mut self) -> CycleTarget {
        self.current = self.current.next();
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let mut cycle = FrequencyCycle::new();
        assert_eq!(cycle.frequency_hz(), 250.0);
        assert_eq!(cycle.advance().frequency_hz(), 1000.0);
        assert_eq!(cycle.advance().frequency_hz(), 1750.0);
        assert_eq!(cycle.advance(), CycleTarget::Low);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = FrequencyCycle::new();
        let b = FrequencyCycle::new();
        a.advance();
        assert_eq!(a.current(), CycleTarget::Mid);
        assert_eq!(b.current(), CycleTarget::Low);

        let c = FrequencyCycle::starting_at(CycleTarget::High);
        assert_eq!(c.frequency_hz(), 1750.0);
    }
}
