//! Derivative-free minimisation
//!
//! Nelder–Mead simplex search, used to maximise ARMA likelihoods over
//! unconstrained parameters.

use crate::{MathError, Result};
use tracing::debug;

/// Settings for [`nelder_mead`]
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadOptions {
    /// Maximum number of simplex iterations
    pub max_iterations: usize,
    /// Stop once the spread of objective values in the simplex falls below this
    pub f_tolerance: f64,
    /// Stop once every vertex lies within this distance of the best one
    pub x_tolerance: f64,
    /// Initial step along each coordinate axis
    pub initial_step: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5_000,
            f_tolerance: 1e-10,
            x_tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

/// Location and value of a minimum
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

/// Minimise `objective` starting from `start`.
///
/// Non-finite objective values are treated as +∞ so the simplex moves away
/// from them. Returns [`MathError::NotConverged`] when the iteration budget
/// runs out, and [`MathError::CalculationError`] when no finite value was
/// ever found.
pub fn nelder_mead<F>(objective: F, start: &[f64], options: NelderMeadOptions) -> Result<Minimum>
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let dim = start.len();
    if dim == 0 {
        let value = eval(start);
        if !value.is_finite() {
            return Err(MathError::CalculationError(
                "objective is not finite".to_string(),
            ));
        }
        return Ok(Minimum {
            point: Vec::new(),
            value,
            iterations: 0,
        });
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(start.to_vec());
    for i in 0..dim {
        let mut vertex = start.to_vec();
        vertex[i] += options.initial_step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|x| eval(x)).collect();

    for iteration in 0..options.max_iterations {
        let mut order: Vec<usize> = (0..=dim).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let best = values[0];
        let worst = values[dim];
        let spread = (worst - best).abs();
        let diameter = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);

        // A flat ridge towards the edge of the parameter space never shrinks
        // the simplex, so a vanishing spread alone also counts as converged.
        let f_scale = options.f_tolerance * (1.0 + best.abs());
        let settled = spread <= f_scale && diameter <= options.x_tolerance;
        let flat = spread <= f_scale * 1e-3;
        if best.is_finite() && (settled || flat) {
            debug!(iteration, value = best, "nelder-mead converged");
            return Ok(Minimum {
                point: simplex[0].clone(),
                value: best,
                iterations: iteration,
            });
        }

        let centroid: Vec<f64> = (0..dim)
            .map(|j| simplex[..dim].iter().map(|v| v[j]).sum::<f64>() / dim as f64)
            .collect();
        let towards = |coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(&simplex[dim])
                .map(|(c, w)| c + coef * (c - w))
                .collect()
        };

        let reflected = towards(1.0);
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = towards(2.0);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[dim] = expanded;
                values[dim] = f_expanded;
            } else {
                simplex[dim] = reflected;
                values[dim] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = f_reflected;
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < values[dim] {
            let outside = towards(0.5);
            let f = eval(&outside);
            (outside, f)
        } else {
            let inside = towards(-0.5);
            let f = eval(&inside);
            (inside, f)
        };

        if f_contracted < values[dim].min(f_reflected) {
            simplex[dim] = contracted;
            values[dim] = f_contracted;
            continue;
        }

        let best_vertex = simplex[0].clone();
        for i in 1..=dim {
            simplex[i] = simplex[i]
                .iter()
                .zip(&best_vertex)
                .map(|(x, b)| b + 0.5 * (x - b))
                .collect();
            values[i] = eval(&simplex[i]);
        }
    }

    if values.iter().all(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "objective is not finite anywhere in the search region".to_string(),
        ));
    }
    Err(MathError::NotConverged(options.max_iterations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_minimises_quadratic() {
        let objective = |x: &[f64]| (x[0] - 1.0).powi(2) + 3.0 * (x[1] + 2.0).powi(2);
        let min = nelder_mead(objective, &[0.0, 0.0], NelderMeadOptions::default()).unwrap();

        assert_abs_diff_eq!(min.point[0], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(min.point[1], -2.0, epsilon = 1e-4);
        assert!(min.value < 1e-8);
    }

    #[test]
    fn test_rosenbrock() {
        let objective = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let options = NelderMeadOptions {
            max_iterations: 20_000,
            ..NelderMeadOptions::default()
        };
        let min = nelder_mead(objective, &[-1.2, 1.0], options).unwrap();

        assert_abs_diff_eq!(min.point[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(min.point[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_dimensional_problem() {
        let min = nelder_mead(|_| 4.0, &[], NelderMeadOptions::default()).unwrap();
        assert_eq!(min.value, 4.0);
        assert!(min.point.is_empty());
    }

    #[test]
    fn test_reports_non_convergence() {
        let options = NelderMeadOptions {
            max_iterations: 3,
            ..NelderMeadOptions::default()
        };
        let result = nelder_mead(|x: &[f64]| x[0] * x[0] + x[1].abs(), &[5.0, 5.0], options);
        assert_eq!(result, Err(MathError::NotConverged(3)));
    }
}
