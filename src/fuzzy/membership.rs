//! Triangular membership functions and the fuzzy variables built from them

/// Triangular membership function `[left, peak, right]`.
///
/// Zero outside `(left, right)`, one at `peak`, linear in between. A
/// shoulder (`left == peak` or `peak == right`) is allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub left: f64,
    pub peak: f64,
    pub right: f64,
}

impl Triangle {
    pub const fn new(left: f64, peak: f64, right: f64) -> Self {
        Self { left, peak, right }
    }

    /// Degree of membership of `x`, in [0, 1]
    pub fn degree(&self, x: f64) -> f64 {
        if x == self.peak {
            1.0
        } else if self.left < x && x < self.peak {
            (x - self.left) / (self.peak - self.left)
        } else if self.peak < x && x < self.right {
            (self.right - x) / (self.right - self.peak)
        } else {
            0.0
        }
    }
}

/// Half-open sampled range `[start, stop)` a variable is defined over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Universe {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Universe {
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.start <= x && x < self.stop
    }

    /// Grid points `start + i * step` below `stop`
    pub fn samples(&self) -> Vec<f64> {
        let count = ((self.stop - self.start) / self.step).ceil().max(0.0) as usize;
        (0..count)
            .map(|i| self.start + i as f64 * self.step)
            .filter(|&x| x < self.stop)
            .collect()
    }
}

/// A named quantity partitioned into labelled membership functions.
///
/// Terms keep their declaration order; lookups and tie-breaks follow it.
#[derive(Debug, Clone)]
pub struct FuzzyVariable<L> {
    name: &'static str,
    universe: Universe,
    terms: Vec<(L, Triangle)>,
}

impl<L: Copy + PartialEq> FuzzyVariable<L> {
    pub fn new(name: &'static str, universe: Universe, terms: Vec<(L, Triangle)>) -> Self {
        Self {
            name,
            universe,
            terms,
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn terms(&self) -> &[(L, Triangle)] {
        &self.terms
    }

    /// Degree of membership of `x` in every term, in declaration order
    pub fn fuzzify(&self, x: f64) -> Memberships<L> {
        if !self.universe.contains(x) {
            log::trace!("{} = {} lies outside its universe", self.name, x);
        }
        Memberships(
            self.terms
                .iter()
                .map(|(label, mf)| (*label, mf.degree(x)))
                .collect(),
        )
    }
}

/// Per-term degrees produced by [`FuzzyVariable::fuzzify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Memberships<L>(Vec<(L, f64)>);

impl<L: Copy + PartialEq> Memberships<L> {
    /// Degree for `label` (zero for a label the variable does not define)
    pub fn degree(&self, label: L) -> f64 {
        self.0
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(0.0, |(_, d)| *d)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(L, f64)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_shape() {
        let mf = Triangle::new(100.0, 250.0, 500.0);

        assert_eq!(mf.degree(50.0), 0.0);
        assert_eq!(mf.degree(100.0), 0.0);
        assert!((mf.degree(175.0) - 0.5).abs() < 1e-12);
        assert_eq!(mf.degree(250.0), 1.0);
        assert!((mf.degree(375.0) - 0.5).abs() < 1e-12);
        assert_eq!(mf.degree(500.0), 0.0);
        assert_eq!(mf.degree(1e9), 0.0);
    }

    #[test]
    fn test_triangle_shoulders() {
        let left_shoulder = Triangle::new(0.0, 0.0, 150.0);
        assert_eq!(left_shoulder.degree(0.0), 1.0);
        assert!((left_shoulder.degree(50.0) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(left_shoulder.degree(-1.0), 0.0);

        let right_shoulder = Triangle::new(60.0, 100.0, 100.0);
        assert_eq!(right_shoulder.degree(100.0), 1.0);
        assert!((right_shoulder.degree(80.0) - 0.5).abs() < 1e-12);
        assert_eq!(right_shoulder.degree(100.5), 0.0);
    }

    #[test]
    fn test_universe_samples() {
        let risk = Universe::new(0.0, 100.0, 1.0);
        let samples = risk.samples();
        assert_eq!(samples.len(), 100);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[99], 99.0);

        let similarity = Universe::new(0.0, 1.01, 0.01);
        let samples = similarity.samples();
        assert_eq!(samples.len(), 101);
        assert!((samples[100] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzify_keeps_declaration_order() {
        let var = FuzzyVariable::new(
            "speed",
            Universe::new(0.0, 15.0, 1.0),
            vec![
                ('s', Triangle::new(0.0, 0.0, 2.0)),
                ('m', Triangle::new(1.0, 4.0, 7.0)),
            ],
        );
        let m = var.fuzzify(1.5);
        let labels: Vec<char> = m.iter().map(|(l, _)| *l).collect();

        assert_eq!(labels, vec!['s', 'm']);
        assert!((m.degree('s') - 0.25).abs() < 1e-12);
        assert!((m.degree('m') - 0.5 / 3.0).abs() < 1e-12);
        assert_eq!(m.degree('x'), 0.0);
    }
}
