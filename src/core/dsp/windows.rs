//! Window function implementations

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Rectangular,
    #[default]
    Hann,
    Hamming,
    Blackman,
}

impl WindowType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Some(Self::Rectangular),
            "hann" | "hanning" => Some(Self::Hann),
            "hamming" => Some(Self::Hamming),
            "blackman" => Some(Self::Blackman),
            _ => None,
        }
    }
}

/// Create a symmetric window (endpoints included, period `size - 1`).
///
/// A single-point window is `[1.0]`.
pub fn create_window(size: usize, window_type: WindowType) -> Vec<f64> {
    if size == 0 {
        return Vec::new();
    }
    if size == 1 {
        return vec![1.0];
    }

    let m = (size - 1) as f64;
    (0..size)
        .map(|i| {
            let x = 2.0 * PI * i as f64 / m;
            match window_type {
                WindowType::Rectangular => 1.0,
                WindowType::Hann => 0.5 - 0.5 * x.cos(),
                WindowType::Hamming => 0.54 - 0.46 * x.cos(),
                WindowType::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
            }
        })
        .collect()
}
