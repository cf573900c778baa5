//! Fixed-window moving average
//!
//! Accumulator for rate sampling: the metrics sampler pushes one per-second
//! delta per tick and reads back the mean over the window. Old samples fall
//! out of the window as new ones arrive.

/// Moving average over a fixed number of samples
///
/// Backed by a ring buffer; `push` overwrites the oldest sample once the
/// window is full. `mean` averages only the samples actually present.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    /// Sample storage (ring)
    samples: Vec<f64>,
    /// Next write position
    write_pos: usize,
    /// Number of valid samples (saturates at window size)
    filled: usize,
}

impl MovingAverage {
    /// Create a moving average over `window` samples
    ///
    /// A zero window is clamped to one sample.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            samples: vec![0.0; window],
            write_pos: 0,
            filled: 0,
        }
    }

    /// Push a sample, evicting the oldest if the window is full
    pub fn push(&mut self, value: f64) {
        self.samples[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
        self.filled = (self.filled + 1).min(self.samples.len());
    }

    /// Mean of the samples currently in the window
    ///
    /// Returns 0.0 when no samples have been pushed.
    pub fn mean(&self) -> f64 {
        if self.filled == 0 {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().take(self.filled).sum();
        sum / self.filled as f64
    }

    /// Window size
    pub fn window(&self) -> usize {
        self.samples.len()
    }

    /// Number of samples currently in the window
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Check if no samples have been pushed
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Discard all samples
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
        self.write_pos = 0;
        self.filled = 0;
    }
}

#[cfg(test)]
#[path = "moving_test.rs"]
mod moving_test;
