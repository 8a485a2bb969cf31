//! Randomness behind the color pick and the win-multiplier draw.
//!
//! Everything that rolls dice takes a `&mut impl RandomSource`, so callers can
//! swap the thread RNG for a fixed sequence when they need repeatable rounds.

use rand::rngs::ThreadRng;
use rand::Rng;

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Thread-local RNG; uses the browser's crypto API when built for wasm.
#[derive(Clone, Debug, Default)]
pub struct ThreadRandom {
    rng: ThreadRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self { rng: rand::thread_rng() }
    }
}

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl<F: FnMut() -> f64> RandomSource for F {
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Draw from `rng`, clamped into `[0, 1)` so a misbehaving source can't pick
/// an out-of-table branch.
pub(crate) fn draw(rng: &mut impl RandomSource) -> f64 {
    let r = rng.next_unit();
    if r.is_nan() {
        return 0.0;
    }
    r.clamp(0.0, 1.0 - f64::EPSILON)
}
