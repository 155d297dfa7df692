use nalgebra::{
    DMatrix,
    DVector
};

use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;

// ─────────────────────────────────────────────
// Knot vector
// ─────────────────────────────────────────────
//
// Interpolating spline (smoothing factor 0) with `degree + 1` coincident boundary
// knots at each end. Interior knots:
//   odd degree : t = x[(k+1)/2 .. m-(k+1)/2]      (cubic → not-a-knot)
//   even degree: t = (x[j] + x[j+1]) / 2, j ∈ [k/2, m-k/2-1)
// which always yields m - k - 1 interior knots, i.e. m coefficients.

pub(crate) fn generate_knots(points: &[Point2D], degree: usize) -> Vec<f64> {
    let m = points.len();
    let lhs = points[0].x();
    let rhs = points[m - 1].x();

    let mut knots = Vec::with_capacity(m + degree + 1);
    knots.extend(std::iter::repeat_n(lhs, degree + 1));
    if degree % 2 == 1 {
        let half = (degree + 1) / 2;
        knots.extend(points[half..(m - half)].iter().map(|pt| pt.x()));
    } else {
        let half = degree / 2;
        knots.extend(
            (half..(m - half - 1)).map(|j| 0.5 * (points[j].x() + points[j + 1].x()))
        );
    }
    knots.extend(std::iter::repeat_n(rhs, degree + 1));
    knots
}

/// Index `s` with `knots[s] <= x < knots[s + 1]`, clamped to `[degree, n_coefs - 1]`
/// so that points beyond either end use the outermost polynomial piece.
pub(crate) fn find_span(knots: &[f64], n_coefs: usize, degree: usize, x: f64) -> usize {
    if x >= knots[n_coefs] {
        n_coefs - 1
    } else if x <= knots[degree] {
        degree
    } else {
        knots[..=n_coefs].partition_point(|&t| t <= x) - 1
    }
}

/// Non-vanishing basis functions `B_{span-degree..=span}(x)` (Cox-de Boor triangle).
fn basis_functions(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    let mut basis = vec![0.0_f64; degree + 1];
    let mut left = vec![0.0_f64; degree + 1];
    let mut right = vec![0.0_f64; degree + 1];
    basis[0] = 1.0;

    for j in 1..=degree {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom == 0.0 { 0.0 } else { basis[r] / denom };
            basis[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        basis[j] = saved;
    }
    basis
}

// ─────────────────────────────────────────────
// Collocation
// ─────────────────────────────────────────────

/// Solves `Σ_j c_j B_j(x_i) = y_i`. `None` when the collocation matrix is singular.
pub(crate) fn solve_coefficients(
    points: &[Point2D],
    knots: &[f64],
    degree: usize,
) -> Option<Vec<f64>> {
    let m = points.len();
    let mut mat = DMatrix::<f64>::zeros(m, m);
    let rhs = DVector::<f64>::from_iterator(m, points.iter().map(|pt| pt.y()));

    for (i, pt) in points.iter().enumerate() {
        let span = find_span(knots, m, degree, pt.x());
        let basis = basis_functions(knots, degree, span, pt.x());
        for (r, b) in basis.into_iter().enumerate() {
            mat[(i, span - degree + r)] = b;
        }
    }

    let coefs = mat.lu().solve(&rhs)?;
    if coefs.iter().all(|c| c.is_finite()) {
        Some(coefs.iter().copied().collect())
    } else {
        None
    }
}

// ─────────────────────────────────────────────
// Evaluation / differentiation
// ─────────────────────────────────────────────

fn de_boor(knots: &[f64], coefs: &[f64], degree: usize, span: usize, x: f64) -> f64 {
    let mut d: Vec<f64> = (0..=degree).map(|j| coefs[j + span - degree]).collect();
    for r in 1..=degree {
        for j in (r..=degree).rev() {
            let lo = knots[j + span - degree];
            let hi = knots[j + 1 + span - r];
            let alpha = if hi == lo { 0.0 } else { (x - lo) / (hi - lo) };
            d[j] = (1.0 - alpha) * d[j - 1] + alpha * d[j];
        }
    }
    d[degree]
}

/// B-spline representation of the derivative: degree drops by one and the outermost
/// knot on each side is removed.
fn derivative_spline(knots: &[f64], coefs: &[f64], degree: usize) -> (Vec<f64>, Vec<f64>) {
    let p = degree as f64;
    let deriv_coefs = (0..(coefs.len() - 1))
        .map(|i| {
            let denom = knots[i + degree + 1] - knots[i + 1];
            if denom == 0.0 {
                0.0
            } else {
                p * (coefs[i + 1] - coefs[i]) / denom
            }
        })
        .collect();
    (knots[1..(knots.len() - 1)].to_vec(), deriv_coefs)
}

/// Converts the spline to one Taylor expansion per knot interval.
///
/// Returns `(lhs_x, coefs)` pairs where `coefs` is in Horner order `[a_k, ..., a_1, a_0]`
/// for `a_0 + a_1 (x - lhs_x) + ... + a_k (x - lhs_x)^k`.
pub(crate) fn taylor_segments(
    knots: &[f64],
    coefs: &[f64],
    degree: usize,
) -> Vec<(f64, Vec<f64>)> {
    let n_coefs = coefs.len();

    // derivative splines of order 0..=degree
    let mut splines = Vec::with_capacity(degree + 1);
    splines.push((knots.to_vec(), coefs.to_vec()));
    for d in 0..degree {
        let (t, c) = &splines[d];
        let next = derivative_spline(t, c, degree - d);
        splines.push(next);
    }

    (degree..n_coefs)
        .map(|span| {
            let lhs_x = knots[span];
            let mut factorial = 1.0;
            let mut taylor: Vec<f64> = splines
                .iter()
                .enumerate()
                .map(|(d, (t, c))| {
                    if d > 1 {
                        factorial *= d as f64;
                    }
                    de_boor(t, c, degree - d, span - d, lhs_x) / factorial
                })
                .collect();
            taylor.reverse();
            (lhs_x, taylor)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Vec<Point2D> {
        (0..n).map(|i| Point2D::new(i as f64, (i * i) as f64)).collect()
    }

    #[test]
    fn test_knot_count_matches_coefficients() {
        for degree in 1..=5 {
            for n in (degree + 1)..12 {
                let knots = generate_knots(&grid(n), degree);
                assert_eq!(knots.len(), n + degree + 1, "degree {degree}, n {n}");
            }
        }
    }

    #[test]
    fn test_cubic_knots_are_not_a_knot() {
        let knots = generate_knots(&grid(6), 3);
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 0.0, 2.0, 3.0, 5.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_quadratic_knots_use_midpoints() {
        let knots = generate_knots(&grid(5), 2);
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 1.5, 2.5, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let knots = generate_knots(&grid(8), 3);
        for &x in &[0.0, 0.3, 2.5, 4.9, 7.0] {
            let span = find_span(&knots, 8, 3, x);
            let sum: f64 = basis_functions(&knots, 3, span, x).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "x = {x}, sum = {sum}");
        }
    }

    #[test]
    fn test_find_span_clamps_outside() {
        let knots = generate_knots(&grid(8), 3);
        assert_eq!(find_span(&knots, 8, 3, -10.0), 3);
        assert_eq!(find_span(&knots, 8, 3, 100.0), 7);
        assert_eq!(find_span(&knots, 8, 3, 7.0), 7);
    }

    #[test]
    fn test_taylor_segments_reproduce_quadratic() {
        let points = grid(6);
        let knots = generate_knots(&points, 3);
        let coefs = solve_coefficients(&points, &knots, 3).unwrap();
        for (lhs_x, taylor) in taylor_segments(&knots, &coefs, 3) {
            // x^2 = lhs^2 + 2 lhs (x - lhs) + (x - lhs)^2
            assert!(taylor[0].abs() < 1e-9);
            assert!((taylor[1] - 1.0).abs() < 1e-9);
            assert!((taylor[2] - 2.0 * lhs_x).abs() < 1e-9);
            assert!((taylor[3] - lhs_x * lhs_x).abs() < 1e-9);
        }
    }
}
