//! Numerical solvers: batch minimizers and the MIRA dual QP
//!
//! The minimizer selection is a closed set chosen through
//! `MinimizerKind`, not dynamic loading: batch trainers take a kind (or
//! a boxed `Minimizer` directly) and everything else stays behind the
//! `Minimizer` trait.

pub mod gradient;
pub mod hildreth;
pub mod qn;

pub use self::gradient::GradientDescentMinimizer;
pub use self::hildreth::{hildreth, HildrethConfig};
pub use self::qn::QnMinimizer;

use crate::core::{Minimizer, MinimizerConfig};

/// The closed set of available batch minimizers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinimizerKind {
    /// L-BFGS quasi-Newton (default)
    #[default]
    QuasiNewton,
    /// Steepest descent with backtracking line search
    GradientDescent,
}

/// Instantiate a minimizer of the given kind
pub fn create_minimizer(kind: MinimizerKind, config: MinimizerConfig) -> Box<dyn Minimizer> {
    match kind {
        MinimizerKind::QuasiNewton => Box::new(QnMinimizer::new(config)),
        MinimizerKind::GradientDescent => Box::new(GradientDescentMinimizer::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Evaluation, Objective, Result};
    use approx::assert_relative_eq;

    struct Parabola;

    impl Objective for Parabola {
        fn domain_dimension(&self) -> usize {
            1
        }

        fn calculate(&self, x: &[f64]) -> Result<Evaluation> {
            Ok(Evaluation {
                value: (x[0] - 3.0) * (x[0] - 3.0),
                gradient: vec![2.0 * (x[0] - 3.0)],
            })
        }
    }

    #[test]
    fn test_factory_produces_working_minimizers() {
        for kind in [MinimizerKind::QuasiNewton, MinimizerKind::GradientDescent] {
            let minimizer = create_minimizer(kind, MinimizerConfig::default());
            let result = minimizer.minimize(&Parabola, 1e-8, &[0.0]).unwrap();
            assert_relative_eq!(result[0], 3.0, epsilon = 1e-4);
        }
    }
}
