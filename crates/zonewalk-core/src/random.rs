use rand::Rng;

/// Uniform randomness consumed by the generators and the glyph overlay.
///
/// Every `rand::Rng` is a `RandomSource`; tests implement it directly to
/// script exact choices.
pub trait RandomSource {
    /// Uniform index in `0..n`. `n` must be positive.
    fn pick(&mut self, n: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn pick(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "pick requires a non-empty range");
        self.random_range(0..n)
    }

    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Source that replays a fixed script of picks, then repeats its last entry.
///
/// Picks larger than the requested range wrap modulo `n`.
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ScriptedSource {
    picks: Vec<usize>,
    cursor: usize,
    unit: f64,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(picks: Vec<usize>) -> Self {
        assert!(!picks.is_empty(), "script needs at least one pick");
        Self {
            picks,
            cursor: 0,
            unit: 0.5,
        }
    }

    pub(crate) fn constant(pick: usize) -> Self {
        Self::new(vec![pick])
    }

    pub(crate) fn with_unit(mut self, unit: f64) -> Self {
        self.unit = unit;
        self
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn pick(&mut self, n: usize) -> usize {
        let idx = self.cursor.min(self.picks.len() - 1);
        self.cursor += 1;
        self.picks[idx] % n
    }

    fn unit(&mut self) -> f64 {
        self.unit
    }
}
