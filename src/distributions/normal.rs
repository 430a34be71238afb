use std::f64::consts::PI;
use std::sync::Mutex;

use nalgebra::Matrix2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::Distribution2D;
use crate::error::ConfigError;
use crate::geometry::{Polygon, Vec2};
use crate::quadrature::integrate_polygon;

/// How `BivariateNormal` evaluates `integrate`/`integrate_offset`.
///
/// A closed-set tagged variant rather than a trait object: the
/// integration inner loop is the hottest path in the whole crate, and
/// there are only ever two implementations in play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IntegrationMode {
    /// Exact (for smooth densities, to quadrature order) deterministic
    /// integration via `crate::quadrature`. Requires a convex region.
    Quadrature,
    /// Monte-Carlo integration with a configurable sample count.
    MonteCarlo { samples: usize },
}

/// A bivariate normal distribution `N(mean, cov)` over the plane.
///
/// `sample`/Monte-Carlo integration draw from an internal PRNG; the PRNG
/// is wrapped in a `Mutex` (rather than a `RefCell`) so the trait's
/// `&self` methods can still mutate it while keeping `BivariateNormal`
/// `Sync` — required so a `Game`/`Solver` holding one can be shared
/// across threads for parallel aim evaluation. The observable density
/// never changes; only the sample stream does.
#[derive(Debug)]
pub struct BivariateNormal {
    mean: Vec2,
    cov: Matrix2<f64>,
    mode: IntegrationMode,
    calibration: Vec<Vec2>,
    rng: Mutex<ChaCha8Rng>,
}

/// Floor applied to `cov[0][0]` before taking its square root in the
/// Cholesky factor, so a near-singular covariance degrades gracefully
/// instead of producing NaN samples.
const MIN_VARIANCE: f64 = 1e-12;

impl BivariateNormal {
    /// Construct from explicit parameters. Errors if `cov` is not
    /// (numerically) positive definite.
    pub fn new(mean: Vec2, cov: Matrix2<f64>) -> Result<Self, ConfigError> {
        Self::with_mode(mean, cov, IntegrationMode::Quadrature)
    }

    pub fn with_mode(
        mean: Vec2,
        cov: Matrix2<f64>,
        mode: IntegrationMode,
    ) -> Result<Self, ConfigError> {
        if !is_positive_definite(&cov) {
            return Err(ConfigError::NonPositiveDefiniteCovariance);
        }
        Ok(Self {
            mean,
            cov,
            mode,
            calibration: Vec::new(),
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        })
    }

    /// Seed the internal PRNG deterministically.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(ChaCha8Rng::seed_from_u64(seed));
        self
    }

    pub fn mode(&self) -> IntegrationMode {
        self.mode
    }

    pub fn mean(&self) -> Vec2 {
        self.mean
    }

    pub fn cov(&self) -> Matrix2<f64> {
        self.cov
    }

    /// Estimate parameters from a point set. Uses population covariance
    /// (divide by `n`, no Bessel correction) — see DESIGN.md Open Question
    /// decision 2.
    pub fn from_points(points: &[Vec2], mode: IntegrationMode) -> Result<Self, ConfigError> {
        if points.len() < 2 {
            return Err(ConfigError::InsufficientCalibrationPoints {
                have: points.len(),
                need: 2,
            });
        }
        let (mean, cov) = estimate_population_params(points);
        let mut dist = Self::with_mode(mean, cov, mode)?;
        dist.calibration = points.to_vec();
        Ok(dist)
    }

    fn cholesky(&self) -> (f64, f64, f64) {
        cholesky_2x2(&self.cov)
    }
}

fn is_positive_definite(cov: &Matrix2<f64>) -> bool {
    let a = cov[(0, 0)];
    let d = cov[(1, 1)];
    let det = cov.determinant();
    a > 0.0 && d > 0.0 && det > 0.0 && (cov[(0, 1)] - cov[(1, 0)]).abs() < 1e-9
}

fn cholesky_2x2(cov: &Matrix2<f64>) -> (f64, f64, f64) {
    let a00 = cov[(0, 0)].max(MIN_VARIANCE);
    let l00 = a00.sqrt();
    let l10 = cov[(1, 0)] / l00;
    let l11 = (cov[(1, 1)] - l10 * l10).max(MIN_VARIANCE).sqrt();
    (l00, l10, l11)
}

fn estimate_population_params(points: &[Vec2]) -> (Vec2, Matrix2<f64>) {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;
    let mean = Vec2::new(mean_x, mean_y);

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for p in points {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let cov = Matrix2::new(sxx / n, sxy / n, sxy / n, syy / n);
    (mean, cov)
}

impl Distribution2D for BivariateNormal {
    fn density(&self, p: Vec2) -> f64 {
        let det = self.cov.determinant();
        let inv = self
            .cov
            .try_inverse()
            .expect("covariance validated positive definite at construction");
        let d = Vec2::new(p.x - self.mean.x, p.y - self.mean.y);
        // quadratic form d^T * inv * d
        let q = d.x * (inv[(0, 0)] * d.x + inv[(0, 1)] * d.y)
            + d.y * (inv[(1, 0)] * d.x + inv[(1, 1)] * d.y);
        let norm = 1.0 / (2.0 * PI * det.sqrt());
        norm * (-0.5 * q).exp()
    }

    fn sample(&self) -> Vec2 {
        let (l00, l10, l11) = self.cholesky();
        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        let u1: f64 = rng.gen::<f64>().max(1e-300);
        let u2: f64 = rng.gen();
        let r = (-2.0 * u1.ln()).sqrt();
        let z0 = r * (2.0 * PI * u2).cos();
        let z1 = r * (2.0 * PI * u2).sin();

        Vec2::new(
            self.mean.x + l00 * z0,
            self.mean.y + l10 * z0 + l11 * z1,
        )
    }

    fn integrate(&self, region: &Polygon) -> f64 {
        self.integrate_offset(region, Vec2::ZERO)
    }

    fn integrate_offset(&self, region: &Polygon, offset: Vec2) -> f64 {
        let raw = match self.mode {
            IntegrationMode::Quadrature => {
                integrate_polygon(region, |p| self.density(Vec2::new(p.x - offset.x, p.y - offset.y)))
            }
            IntegrationMode::MonteCarlo { samples } => {
                let mut hits = 0usize;
                for _ in 0..samples {
                    let s = self.sample();
                    let translated = Vec2::new(s.x + offset.x, s.y + offset.y);
                    if region.contains(translated) {
                        hits += 1;
                    }
                }
                hits as f64 / samples as f64
            }
        };
        raw.clamp(0.0, 1.0)
    }

    fn add_point(&mut self, p: Vec2) -> Result<(), ConfigError> {
        self.calibration.push(p);
        if self.calibration.len() < 2 {
            return Err(ConfigError::InsufficientCalibrationPoints {
                have: self.calibration.len(),
                need: 2,
            });
        }
        let (mean, cov) = estimate_population_params(&self.calibration);
        if !is_positive_definite(&cov) {
            return Err(ConfigError::NonPositiveDefiniteCovariance);
        }
        self.mean = mean;
        self.cov = cov;
        Ok(())
    }
}
