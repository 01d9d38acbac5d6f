use rand::Rng;
use std::sync::{Arc, Mutex};

/// Source of uniform floats in `[0, 1)` used by the fallback generator
pub trait RandomSource: Send + Sync {
    fn next_float(&self) -> f64;
}

/// Production implementation backed by the thread-local RNG
#[derive(Debug, Clone, Default)]
pub struct ThreadRandomSource;

impl ThreadRandomSource {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRandomSource {
    fn next_float(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Test implementation that replays a fixed sequence of floats
/// When the list is exhausted, it wraps around to the beginning
#[derive(Debug, Clone)]
pub struct FixedRandomSource {
    values: Vec<f64>,
    index: Arc<Mutex<usize>>,
}

impl FixedRandomSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            index: Arc::new(Mutex::new(0)),
        }
    }

    /// Always returns the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values handed out so far
    pub fn draws(&self) -> usize {
        self.index.lock().map(|index| *index).unwrap_or(0)
    }
}

impl RandomSource for FixedRandomSource {
    fn next_float(&self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let mut index = match self.index.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let value = self.values[*index % self.values.len()];
        *index += 1;
        value
    }
}
