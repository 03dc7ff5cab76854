/// A converged root of a scalar function.
#[derive(Debug, Clone, Copy)]
pub struct Root {
    /// Abscissa of the root.
    pub x: f64,
    /// Function value at `x`.
    pub value: f64,
    /// Number of objective evaluations after the bracket check.
    pub iterations: usize,
}

/// Why a bracketed search did not produce a root.
#[derive(Debug)]
pub enum SolveError<E> {
    /// The objective itself failed.
    Objective(E),
    /// `f(lower)` and `f(upper)` have the same sign.
    NoSignChange { f_lower: f64, f_upper: f64 },
    /// The iteration budget ran out before the bracket shrank below tolerance.
    NotConverged { iterations: usize, x: f64 },
}

/// Brent's method on a validated bracket `[lower, upper]`.
///
/// Combines inverse quadratic interpolation, secant steps and bisection.
/// Stops when the bracket half-width drops below
/// `tolerance * max(|x|, scale)` or when `|f(x)| <= value_tolerance`.
#[derive(Debug, Clone, Copy)]
pub struct Brent {
    lower: f64,
    upper: f64,
    tolerance: f64,
    scale: f64,
    value_tolerance: f64,
    max_iterations: usize,
}

impl Brent {
    /// Creates a solver for the bracket `[lower, upper]`.
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            tolerance: 1e-8,
            scale: 1.0,
            value_tolerance: 0.0,
            max_iterations: 200,
        }
    }

    /// Relative tolerance on the abscissa.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Magnitude below which the abscissa tolerance stops shrinking.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale.abs();
        self
    }

    /// Absolute tolerance on the function value.
    #[must_use]
    pub fn with_value_tolerance(mut self, value_tolerance: f64) -> Self {
        self.value_tolerance = value_tolerance.abs();
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Runs the search.
    ///
    /// # Errors
    ///
    /// - [`SolveError::NoSignChange`] if the bracket does not contain a sign change
    /// - [`SolveError::Objective`] if the objective fails
    /// - [`SolveError::NotConverged`] if the iteration budget is exhausted
    #[allow(clippy::many_single_char_names, clippy::float_cmp)]
    pub fn solve<F, E>(&self, mut f: F) -> Result<Root, SolveError<E>>
    where
        F: FnMut(f64) -> Result<f64, E>,
    {
        let mut a = self.lower;
        let mut b = self.upper;
        let mut fa = f(a).map_err(SolveError::Objective)?;
        let mut fb = f(b).map_err(SolveError::Objective)?;

        if fa == 0.0 {
            return Ok(Root {
                x: a,
                value: fa,
                iterations: 0,
            });
        }
        if fb == 0.0 {
            return Ok(Root {
                x: b,
                value: fb,
                iterations: 0,
            });
        }
        if fa.signum() == fb.signum() {
            return Err(SolveError::NoSignChange {
                f_lower: fa,
                f_upper: fb,
            });
        }

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        for iteration in 1..=self.max_iterations {
            if fb.signum() == fc.signum() {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * self.tolerance * b.abs().max(self.scale);
            let half = 0.5 * (c - b);
            if half.abs() <= tol || fb == 0.0 || fb.abs() <= self.value_tolerance {
                return Ok(Root {
                    x: b,
                    value: fb,
                    iterations: iteration,
                });
            }

            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    // Secant step.
                    (2.0 * half * s, 1.0 - s)
                } else {
                    // Inverse quadratic interpolation.
                    let qa = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * half * qa * (qa - r) - (b - a) * (r - 1.0)),
                        (qa - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                let limit_interp = 3.0 * half * q - (tol * q).abs();
                let limit_prev = (e * q).abs();
                if 2.0 * p < limit_interp.min(limit_prev) {
                    e = d;
                    d = p / q;
                } else {
                    d = half;
                    e = d;
                }
            } else {
                d = half;
                e = d;
            }

            a = b;
            fa = fb;
            b += if d.abs() > tol { d } else { tol.copysign(half) };
            fb = f(b).map_err(SolveError::Objective)?;
        }

        Err(SolveError::NotConverged {
            iterations: self.max_iterations,
            x: b,
        })
    }
}
