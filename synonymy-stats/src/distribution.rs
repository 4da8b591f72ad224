//! Probability distributions and numerical helpers.
//!
//! Provides the [`Distribution`] trait with log-space tail functions, the
//! continuous families the Anderson-Darling test is tabulated for
//! ([`Normal`], [`Exponential`], [`Logistic`], [`GumbelMax`], [`GumbelMin`]),
//! and the Kolmogorov survival function used by the two-sample KS test.

use core::f64::consts::{PI, SQRT_2};

use synonymy_core::{Result, SynonymyError};

/// Euler-Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

// ── Numerical helpers ──────────────────────────────────────────────────────

/// Chebyshev fit behind [`erfc`] and [`ln_erfc`] (Numerical Recipes `erfcc`,
/// fractional error < 1.2e-7 everywhere). Returns `(t, exponent)` with
/// `erfc(|x|) = t * exp(exponent)`.
fn erfc_parts(x: f64) -> (f64, f64) {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    (t, poly)
}

/// Complementary error function.
pub fn erfc(x: f64) -> f64 {
    let (t, exponent) = erfc_parts(x);
    let ans = t * exponent.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Natural log of [`erfc`], accurate far into the upper tail where `erfc`
/// itself underflows.
pub fn ln_erfc(x: f64) -> f64 {
    if x >= 0.0 {
        let (t, exponent) = erfc_parts(x);
        t.ln() + exponent
    } else {
        erfc(x).ln()
    }
}

/// `ln(1 + e^x)` without overflow.
fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

/// `ln(1 - e^{-y})` for `y >= 0`.
fn ln_one_minus_exp_neg(y: f64) -> f64 {
    (-(-y).exp_m1()).ln()
}

// ── Distribution trait ─────────────────────────────────────────────────────

/// A continuous probability distribution with basic statistical properties.
pub trait Distribution {
    /// Probability density function at `x`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative distribution function at `x`.
    fn cdf(&self, x: f64) -> f64;

    /// Distribution mean.
    fn mean(&self) -> f64;

    /// Distribution variance.
    fn variance(&self) -> f64;

    /// Distribution standard deviation (default: sqrt of variance).
    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// `ln F(x)`. Implementations override this where the tail underflows.
    fn ln_cdf(&self, x: f64) -> f64 {
        self.cdf(x).ln()
    }

    /// `ln (1 - F(x))`, the log survival function.
    fn ln_sf(&self, x: f64) -> f64 {
        (1.0 - self.cdf(x)).ln()
    }
}

fn positive_scale(name: &str, scale: f64) -> Result<()> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(SynonymyError::InvalidInput(format!(
            "{}: scale must be positive and finite, got {}",
            name, scale
        )));
    }
    Ok(())
}

// ── Normal distribution ────────────────────────────────────────────────────

/// Normal (Gaussian) distribution with parameters μ and σ.
#[derive(Debug, Clone, Copy)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Create a new Normal distribution. `sigma` must be positive.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        positive_scale("Normal", sigma)?;
        Ok(Self { mu, sigma })
    }

    /// Standard normal distribution N(0, 1).
    pub fn standard() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
        }
    }

    /// Inverse CDF (Acklam's rational approximation, relative error ~1.2e-9).
    pub fn quantile(&self, p: f64) -> Result<f64> {
        if !(p > 0.0 && p < 1.0) {
            return Err(SynonymyError::InvalidInput(format!(
                "Normal::quantile: p must be in (0, 1), got {}",
                p
            )));
        }
        Ok(self.mu + self.sigma * standard_normal_quantile(p))
    }

    fn z(&self, x: f64) -> f64 {
        (x - self.mu) / self.sigma
    }
}

fn standard_normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

impl Distribution for Normal {
    fn pdf(&self, x: f64) -> f64 {
        let z = self.z(x);
        (-0.5 * z * z).exp() / (self.sigma * (2.0 * PI).sqrt())
    }

    fn cdf(&self, x: f64) -> f64 {
        0.5 * erfc(-self.z(x) / SQRT_2)
    }

    fn mean(&self) -> f64 {
        self.mu
    }

    fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }

    fn ln_cdf(&self, x: f64) -> f64 {
        let z = self.z(x);
        if z < 0.0 {
            0.5f64.ln() + ln_erfc(-z / SQRT_2)
        } else {
            (-0.5 * erfc(z / SQRT_2)).ln_1p()
        }
    }

    fn ln_sf(&self, x: f64) -> f64 {
        // Symmetric about mu.
        self.ln_cdf(2.0 * self.mu - x)
    }
}

// ── Exponential distribution ───────────────────────────────────────────────

/// Exponential distribution with location 0 and the given scale (mean).
#[derive(Debug, Clone, Copy)]
pub struct Exponential {
    scale: f64,
}

impl Exponential {
    pub fn new(scale: f64) -> Result<Self> {
        positive_scale("Exponential", scale)?;
        Ok(Self { scale })
    }
}

impl Distribution for Exponential {
    fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            0.0
        } else {
            (-x / self.scale).exp() / self.scale
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else {
            -(-x / self.scale).exp_m1()
        }
    }

    fn mean(&self) -> f64 {
        self.scale
    }

    fn variance(&self) -> f64 {
        self.scale * self.scale
    }

    fn ln_cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            f64::NEG_INFINITY
        } else {
            ln_one_minus_exp_neg(x / self.scale)
        }
    }

    fn ln_sf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else {
            -x / self.scale
        }
    }
}

// ── Logistic distribution ──────────────────────────────────────────────────

/// Logistic distribution with location and scale.
#[derive(Debug, Clone, Copy)]
pub struct Logistic {
    loc: f64,
    scale: f64,
}

impl Logistic {
    pub fn new(loc: f64, scale: f64) -> Result<Self> {
        positive_scale("Logistic", scale)?;
        Ok(Self { loc, scale })
    }

    fn z(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }
}

impl Distribution for Logistic {
    fn pdf(&self, x: f64) -> f64 {
        let z = self.z(x);
        let e = (-z.abs()).exp();
        e / (self.scale * (1.0 + e).powi(2))
    }

    fn cdf(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-self.z(x)).exp())
    }

    fn mean(&self) -> f64 {
        self.loc
    }

    fn variance(&self) -> f64 {
        (self.scale * PI).powi(2) / 3.0
    }

    fn ln_cdf(&self, x: f64) -> f64 {
        -softplus(-self.z(x))
    }

    fn ln_sf(&self, x: f64) -> f64 {
        -softplus(self.z(x))
    }
}

// ── Gumbel distributions ───────────────────────────────────────────────────

/// Gumbel distribution for maxima (right-skewed), `F(x) = exp(-e^{-z})`.
#[derive(Debug, Clone, Copy)]
pub struct GumbelMax {
    loc: f64,
    scale: f64,
}

impl GumbelMax {
    pub fn new(loc: f64, scale: f64) -> Result<Self> {
        positive_scale("GumbelMax", scale)?;
        Ok(Self { loc, scale })
    }

    fn z(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }
}

impl Distribution for GumbelMax {
    fn pdf(&self, x: f64) -> f64 {
        let z = self.z(x);
        (-(z + (-z).exp())).exp() / self.scale
    }

    fn cdf(&self, x: f64) -> f64 {
        (-(-self.z(x)).exp()).exp()
    }

    fn mean(&self) -> f64 {
        self.loc + EULER_GAMMA * self.scale
    }

    fn variance(&self) -> f64 {
        (PI * self.scale).powi(2) / 6.0
    }

    fn ln_cdf(&self, x: f64) -> f64 {
        -(-self.z(x)).exp()
    }

    fn ln_sf(&self, x: f64) -> f64 {
        ln_one_minus_exp_neg((-self.z(x)).exp())
    }
}

/// Gumbel distribution for minima (left-skewed), `F(x) = 1 - exp(-e^{z})`.
#[derive(Debug, Clone, Copy)]
pub struct GumbelMin {
    loc: f64,
    scale: f64,
}

impl GumbelMin {
    pub fn new(loc: f64, scale: f64) -> Result<Self> {
        positive_scale("GumbelMin", scale)?;
        Ok(Self { loc, scale })
    }

    fn z(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }
}

impl Distribution for GumbelMin {
    fn pdf(&self, x: f64) -> f64 {
        let z = self.z(x);
        (z - z.exp()).exp() / self.scale
    }

    fn cdf(&self, x: f64) -> f64 {
        -(-self.z(x).exp()).exp_m1()
    }

    fn mean(&self) -> f64 {
        self.loc - EULER_GAMMA * self.scale
    }

    fn variance(&self) -> f64 {
        (PI * self.scale).powi(2) / 6.0
    }

    fn ln_cdf(&self, x: f64) -> f64 {
        ln_one_minus_exp_neg(self.z(x).exp())
    }

    fn ln_sf(&self, x: f64) -> f64 {
        -self.z(x).exp()
    }
}

// ── Kolmogorov distribution ────────────────────────────────────────────────

/// Survival function of the limiting Kolmogorov distribution,
/// `Q(λ) = 2 Σ_{k≥1} (-1)^{k-1} e^{-2k²λ²}`.
///
/// For small λ the alternating series converges poorly, so the Jacobi theta
/// form of the CDF is summed instead.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    const MAX_TERMS: usize = 100;
    const EPS: f64 = 1e-16;

    if lambda.is_nan() {
        return f64::NAN;
    }
    if lambda <= 0.0 {
        return 1.0;
    }

    if lambda < 1.18 {
        // P(λ) = sqrt(2π)/λ Σ_{k≥1} exp(-(2k-1)² π² / (8λ²))
        let w = PI * PI / (8.0 * lambda * lambda);
        let mut sum = 0.0;
        for k in 1..=MAX_TERMS {
            let m = (2 * k - 1) as f64;
            let term = (-m * m * w).exp();
            sum += term;
            if term < EPS * sum.max(f64::MIN_POSITIVE) {
                break;
            }
        }
        let cdf = (2.0 * PI).sqrt() / lambda * sum;
        (1.0 - cdf).clamp(0.0, 1.0)
    } else {
        let mut sum = 0.0;
        let mut sign = 1.0;
        for k in 1..=MAX_TERMS {
            let kf = k as f64;
            let term = (-2.0 * kf * kf * lambda * lambda).exp();
            sum += sign * term;
            if term < EPS {
                break;
            }
            sign = -sign;
        }
        (2.0 * sum).clamp(0.0, 1.0)
    }
}
