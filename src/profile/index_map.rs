use nalgebra::DMatrix;

use crate::grid::CoordinateSystem;

/// Refractive index sampled on a grid.
///
/// `values` has one row per y sample (row 0 at `y_min`) and one column per x
/// sample (column 0 at `x_min`).
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMap {
    coordinates: CoordinateSystem,
    values: DMatrix<f64>,
}

impl IndexMap {
    pub(crate) fn new(coordinates: CoordinateSystem, values: DMatrix<f64>) -> Self {
        Self {
            coordinates,
            values,
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> &CoordinateSystem {
        &self.coordinates
    }

    #[must_use]
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> DMatrix<f64> {
        self.values
    }

    /// Smallest and largest sampled index.
    #[must_use]
    pub fn index_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), n| {
                (lo.min(*n), hi.max(*n))
            })
    }

    /// Radial derivative of `n^2` about the origin.
    ///
    /// Fourth-order central differences in the interior, second order next
    /// to the edges and one-sided on them, projected on `(cos θ, sin θ)`.
    #[must_use]
    pub fn rho_gradient(&self) -> DMatrix<f64> {
        let n2 = self.values.map(|n| n * n);
        let (rows, cols) = n2.shape();
        let (dx, dy) = (self.coordinates.dx(), self.coordinates.dy());
        let xs = self.coordinates.x_samples();
        let ys = self.coordinates.y_samples();

        DMatrix::from_fn(rows, cols, |j, i| {
            let gx = derivative(|k| n2[(j, k)], i, cols, dx);
            let gy = derivative(|k| n2[(k, i)], j, rows, dy);
            let theta = ys[j].atan2(xs[i]);
            gx * theta.cos() + gy * theta.sin()
        })
    }
}

/// Finite-difference derivative of `f` at `k` on `n` uniform samples.
fn derivative(f: impl Fn(usize) -> f64, k: usize, n: usize, h: f64) -> f64 {
    if k >= 2 && k + 2 < n {
        (f(k - 2) - 8.0 * f(k - 1) + 8.0 * f(k + 1) - f(k + 2)) / (12.0 * h)
    } else if k >= 1 && k + 1 < n {
        (f(k + 1) - f(k - 1)) / (2.0 * h)
    } else if k == 0 {
        (f(1) - f(0)) / h
    } else {
        (f(k) - f(k - 1)) / h
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::Resolution;
    use crate::math::Bounds;
    use approx::assert_relative_eq;

    #[test]
    fn gradient_of_radial_ramp() {
        // n^2 = x + 10 along +x: d/drho = cos(theta).
        let cs = CoordinateSystem::new(Bounds::new(-2.0, 2.0, -2.0, 2.0), Resolution::square(40))
            .unwrap();
        let xs = cs.x_samples();
        let values = DMatrix::from_fn(40, 40, |_, i| (xs[i] + 10.0).sqrt());
        let map = IndexMap::new(cs, values);
        let g = map.rho_gradient();
        let p = cs.sample(30, 20);
        let theta = p.y.atan2(p.x);
        assert_relative_eq!(g[(20, 30)], theta.cos(), epsilon = 1e-9);
        assert_relative_eq!(g[(20, 0)], -1.0, epsilon = 0.1);
    }

    #[test]
    fn uniform_map_has_zero_gradient() {
        let cs = CoordinateSystem::new(Bounds::new(-1.0, 1.0, -1.0, 1.0), Resolution::square(8))
            .unwrap();
        let map = IndexMap::new(cs, DMatrix::from_element(8, 8, 1.444));
        assert!(map.rho_gradient().iter().all(|g| g.abs() < 1e-12));
        assert_eq!(map.index_range(), (1.444, 1.444));
    }
}
