//! Goodness-of-fit testing for similarity-score samples.
//!
//! - [`anderson_darling`] — does one sample follow a given distribution family?
//! - [`kolmogorov_smirnov`] — are two samples drawn from the same distribution?
//!
//! Both expect samples that have already been through
//! [`normalization::min_max`](crate::normalization::min_max); [`run_anderson_darling`]
//! and [`run_kolmogorov_smirnov`] do that step and attach a verdict.

use core::fmt;
use core::str::FromStr;

use tracing::{debug, warn};

use synonymy_core::{ReportBlock, Reportable, Result, Scored, Summarizable, SynonymyError, Verdict};

use crate::descriptive;
use crate::distribution::{
    kolmogorov_sf, Distribution, Exponential, GumbelMax, GumbelMin, Logistic, Normal,
};
use crate::normalization::{self, DEFAULT_PRECISION};

/// Significance target used when the caller does not choose one.
pub const DEFAULT_ALPHA: f64 = 0.05;

const MAX_NEWTON_ITER: usize = 200;
const NEWTON_TOL: f64 = 1e-10;

// ── Distribution families ──────────────────────────────────────────────────

/// Families with tabulated Anderson-Darling critical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistributionFamily {
    Normal,
    Exponential,
    Logistic,
    GumbelMin,
    GumbelMax,
}

impl DistributionFamily {
    pub fn name(&self) -> &'static str {
        match self {
            DistributionFamily::Normal => "normal",
            DistributionFamily::Exponential => "exponential",
            DistributionFamily::Logistic => "logistic",
            DistributionFamily::GumbelMin => "gumbel_min",
            DistributionFamily::GumbelMax => "gumbel_max",
        }
    }

    /// Significance levels (percent) matching [`Self::critical_values`].
    pub fn significance_levels(&self) -> [f64; 5] {
        match self {
            DistributionFamily::Normal | DistributionFamily::Exponential => {
                [15.0, 10.0, 5.0, 2.5, 1.0]
            }
            DistributionFamily::Logistic
            | DistributionFamily::GumbelMin
            | DistributionFamily::GumbelMax => [25.0, 10.0, 5.0, 2.5, 1.0],
        }
    }

    /// Stephens' critical values with the small-sample correction for `n`
    /// observations, rounded to 3 decimals.
    pub fn critical_values(&self, n: usize) -> [f64; 5] {
        let nf = n as f64;
        let (table, correction) = match self {
            DistributionFamily::Normal => (
                [0.576, 0.656, 0.787, 0.918, 1.092],
                1.0 + 4.0 / nf - 25.0 / (nf * nf),
            ),
            DistributionFamily::Exponential => {
                ([0.922, 1.078, 1.341, 1.606, 1.957], 1.0 + 0.6 / nf)
            }
            DistributionFamily::Logistic => {
                ([0.426, 0.563, 0.660, 0.769, 0.906], 1.0 + 0.25 / nf)
            }
            DistributionFamily::GumbelMin | DistributionFamily::GumbelMax => {
                ([0.474, 0.637, 0.757, 0.877, 1.038], 1.0 + 0.2 / nf.sqrt())
            }
        };
        table.map(|v| normalization::round_to(v / correction, 3))
    }
}

impl fmt::Display for DistributionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionFamily {
    type Err = SynonymyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "norm" => Ok(DistributionFamily::Normal),
            "exponential" | "expon" => Ok(DistributionFamily::Exponential),
            "logistic" => Ok(DistributionFamily::Logistic),
            "gumbel_min" | "gumbel_l" | "gumbel" => Ok(DistributionFamily::GumbelMin),
            "gumbel_max" | "gumbel_r" => Ok(DistributionFamily::GumbelMax),
            other => Err(SynonymyError::UnsupportedDistribution(other.to_string())),
        }
    }
}

// ── Configuration ──────────────────────────────────────────────────────────

/// Parameters for a fit test, passed explicitly per call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitConfig {
    /// Target significance; a test passes when its evidence meets it.
    pub alpha: f64,
    /// Family for the Anderson-Darling test.
    pub family: DistributionFamily,
    /// Rounding precision applied during normalization.
    pub precision: u32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            family: DistributionFamily::Normal,
            precision: DEFAULT_PRECISION,
        }
    }
}

// ── Results ────────────────────────────────────────────────────────────────

/// Anderson-Darling statistic with its critical-value table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AndersonDarlingResult {
    pub family: DistributionFamily,
    /// The A² statistic.
    pub statistic: f64,
    pub critical_values: [f64; 5],
    /// Percentages matching `critical_values` position by position.
    pub significance_levels: [f64; 5],
    /// Number of observations tested.
    pub n: usize,
}

impl AndersonDarlingResult {
    /// Index of the table row used to judge significance `alpha`: the level
    /// equal to `alpha` (in percent), else the smallest level above it, else
    /// the largest tabulated level.
    pub fn row_for(&self, alpha: f64) -> usize {
        let target = alpha * 100.0;
        if let Some(i) = self
            .significance_levels
            .iter()
            .position(|&lvl| (lvl - target).abs() < 1e-9)
        {
            return i;
        }
        // Levels are descending; scan from the smallest upwards.
        (0..self.significance_levels.len())
            .rev()
            .find(|&i| self.significance_levels[i] > target)
            .unwrap_or(0)
    }

    /// Whether the statistic rejects the fitted family at the given row.
    pub fn rejects_at(&self, row: usize) -> bool {
        self.statistic >= self.critical_values[row]
    }
}

impl Scored for AndersonDarlingResult {
    fn score(&self) -> f64 {
        self.statistic
    }
}

impl Summarizable for AndersonDarlingResult {
    fn summary(&self) -> String {
        format!(
            "Anderson-Darling ({}): A2={:.4}, n={}, 5% critical={:.3}",
            self.family, self.statistic, self.n, self.critical_values[2],
        )
    }
}

/// Two-sample Kolmogorov-Smirnov statistic and p-value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KolmogorovSmirnovResult {
    /// Largest absolute gap between the two empirical CDFs.
    pub statistic: f64,
    /// Two-sided asymptotic p-value, in `[0, 1]`.
    pub p_value: f64,
    pub n1: usize,
    pub n2: usize,
}

impl Scored for KolmogorovSmirnovResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for KolmogorovSmirnovResult {
    fn summary(&self) -> String {
        format!(
            "Kolmogorov-Smirnov: D={:.4}, p={:.6}, n1={}, n2={}",
            self.statistic, self.p_value, self.n1, self.n2,
        )
    }
}

/// Either kind of fit test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitTest {
    AndersonDarling(AndersonDarlingResult),
    KolmogorovSmirnov(KolmogorovSmirnovResult),
}

/// What a fit verdict was decided on.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitEvidence {
    /// Anderson-Darling: statistic compared against one table row.
    CriticalValue {
        statistic: f64,
        critical_value: f64,
        significance_level: f64,
    },
    /// Kolmogorov-Smirnov: p-value compared against alpha.
    PValue { p_value: f64, alpha: f64 },
}

impl FitTest {
    /// Judge the test at significance `alpha`.
    ///
    /// Anderson-Darling passes when the statistic stays below the critical
    /// value of the selected row; Kolmogorov-Smirnov passes when
    /// `p_value >= alpha`.
    pub fn verdict(&self, alpha: f64) -> Result<Verdict<FitEvidence>> {
        validate_alpha(alpha)?;
        Ok(match self {
            FitTest::AndersonDarling(ad) => {
                let row = ad.row_for(alpha);
                Verdict::from_check(
                    !ad.rejects_at(row),
                    FitEvidence::CriticalValue {
                        statistic: ad.statistic,
                        critical_value: ad.critical_values[row],
                        significance_level: ad.significance_levels[row],
                    },
                )
            }
            FitTest::KolmogorovSmirnov(ks) => Verdict::from_check(
                ks.p_value >= alpha,
                FitEvidence::PValue {
                    p_value: ks.p_value,
                    alpha,
                },
            ),
        })
    }
}

/// A fit test result plus an optional verdict against a target significance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoodnessOfFitReport {
    pub test: FitTest,
    pub alpha: Option<f64>,
    pub verdict: Option<Verdict<FitEvidence>>,
}

impl GoodnessOfFitReport {
    /// Wrap a test result without judging it.
    pub fn new(test: FitTest) -> Self {
        Self {
            test,
            alpha: None,
            verdict: None,
        }
    }

    /// Attach a verdict at significance `alpha`.
    pub fn judged(mut self, alpha: f64) -> Result<Self> {
        self.verdict = Some(self.test.verdict(alpha)?);
        self.alpha = Some(alpha);
        Ok(self)
    }
}

impl From<AndersonDarlingResult> for GoodnessOfFitReport {
    fn from(result: AndersonDarlingResult) -> Self {
        Self::new(FitTest::AndersonDarling(result))
    }
}

impl From<KolmogorovSmirnovResult> for GoodnessOfFitReport {
    fn from(result: KolmogorovSmirnovResult) -> Self {
        Self::new(FitTest::KolmogorovSmirnov(result))
    }
}

impl Reportable for GoodnessOfFitReport {
    fn render(&self) -> String {
        let block = match &self.test {
            FitTest::AndersonDarling(ad) => ReportBlock::new("Anderson-Darling Test Results")
                .field("Distribution", ad.family)
                .field("Sample size", ad.n)
                .field("AD Statistic", ad.statistic)
                .list("Critical Values:", ad.critical_values)
                .list("Significance Levels:", ad.significance_levels),
            FitTest::KolmogorovSmirnov(ks) => {
                ReportBlock::new("Kolmogorov-Smirnov Test Results")
                    .field("Sample sizes", format!("{}, {}", ks.n1, ks.n2))
                    .field("KS Statistic", ks.statistic)
                    .field("P-Value", ks.p_value)
            }
        };
        let block = match (&self.alpha, &self.verdict) {
            (Some(alpha), Some(verdict)) => {
                block.line(format!("Fit test at alpha={}: {}", alpha, verdict))
            }
            _ => block,
        };
        block.render()
    }
}

// ── Anderson-Darling ───────────────────────────────────────────────────────

/// Anderson-Darling test of `sample` against `family`, with the family's
/// parameters estimated from the sample.
///
/// Requires at least 2 finite, non-identical observations. The exponential
/// family additionally requires non-negative observations.
pub fn anderson_darling(
    sample: &[f64],
    family: DistributionFamily,
) -> Result<AndersonDarlingResult> {
    validate_sample("anderson_darling", sample)?;
    let n = sample.len();
    if n < 2 {
        return Err(SynonymyError::InvalidInput(
            "anderson_darling: need at least 2 observations".into(),
        ));
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    if sorted[0] == sorted[n - 1] {
        return Err(SynonymyError::DegenerateRange { value: sorted[0] });
    }

    let fitted = fit_family(&sorted, family)?;
    let ln_cdf: Vec<f64> = sorted.iter().map(|&x| fitted.ln_cdf(x)).collect();
    let ln_sf: Vec<f64> = sorted.iter().map(|&x| fitted.ln_sf(x)).collect();

    let nf = n as f64;
    let s: f64 = (1..=n)
        .map(|i| (2 * i - 1) as f64 / nf * (ln_cdf[i - 1] + ln_sf[n - i]))
        .sum();
    let statistic = -nf - s;

    debug!(family = %family, n, statistic, "anderson-darling");

    Ok(AndersonDarlingResult {
        family,
        statistic,
        critical_values: family.critical_values(n),
        significance_levels: family.significance_levels(),
        n,
    })
}

/// Estimate the family's parameters from sorted, non-degenerate data.
fn fit_family(sorted: &[f64], family: DistributionFamily) -> Result<Box<dyn Distribution>> {
    Ok(match family {
        DistributionFamily::Normal => {
            let mu = descriptive::mean(sorted)?;
            let sigma = descriptive::std_dev(sorted, 1)?;
            Box::new(Normal::new(mu, sigma)?)
        }
        DistributionFamily::Exponential => {
            if sorted[0] < 0.0 {
                return Err(SynonymyError::InvalidInput(format!(
                    "anderson_darling: exponential family needs non-negative data, min is {}",
                    sorted[0]
                )));
            }
            Box::new(Exponential::new(descriptive::mean(sorted)?)?)
        }
        DistributionFamily::Logistic => {
            let (loc, scale) = fit_logistic(sorted)?;
            Box::new(Logistic::new(loc, scale)?)
        }
        DistributionFamily::GumbelMax => {
            let (loc, scale) = fit_gumbel_max(sorted)?;
            Box::new(GumbelMax::new(loc, scale)?)
        }
        DistributionFamily::GumbelMin => {
            // A minimum-Gumbel sample is a maximum-Gumbel sample mirrored.
            let mirrored: Vec<f64> = sorted.iter().rev().map(|x| -x).collect();
            let (loc, scale) = fit_gumbel_max(&mirrored)?;
            Box::new(GumbelMin::new(-loc, scale)?)
        }
    })
}

/// Maximum-likelihood logistic location and scale by Newton iteration on the
/// two score equations
/// `Σ 1/(1+e^t) = N/2` and `Σ t(1-e^t)/(1+e^t) = -N`, with `t = (x-a)/b`.
fn fit_logistic(data: &[f64]) -> Result<(f64, f64)> {
    let nf = data.len() as f64;
    let mut a = descriptive::mean(data)?;
    let mut b = descriptive::std_dev(data, 1)? * 3f64.sqrt() / core::f64::consts::PI;

    for _ in 0..MAX_NEWTON_ITER {
        let (mut f1, mut f2) = (-0.5 * nf, nf);
        let (mut j11, mut j12, mut j21, mut j22) = (0.0, 0.0, 0.0, 0.0);
        for &x in data {
            let t = (x - a) / b;
            let s = 1.0 / (1.0 + t.exp());
            let ds = s * (1.0 - s);
            let g_prime = (2.0 * s - 1.0) - 2.0 * t * ds;
            f1 += s;
            f2 += t * (2.0 * s - 1.0);
            j11 += ds / b;
            j12 += ds * t / b;
            j21 -= g_prime / b;
            j22 -= g_prime * t / b;
        }

        let det = j11 * j22 - j12 * j21;
        if det == 0.0 || !det.is_finite() {
            break;
        }
        let da = (j22 * f1 - j12 * f2) / det;
        let db = (j11 * f2 - j21 * f1) / det;

        let mut step = 1.0;
        while b - step * db <= 0.0 && step > 1e-12 {
            step *= 0.5;
        }
        a -= step * da;
        b -= step * db;

        if (step * da).abs() < NEWTON_TOL * (1.0 + a.abs()) && (step * db).abs() < NEWTON_TOL * b {
            return Ok((a, b));
        }
    }

    warn!(n = data.len(), "logistic parameter fit did not converge");
    Err(SynonymyError::Convergence(
        "logistic maximum-likelihood fit".into(),
    ))
}

/// Maximum-likelihood Gumbel (maxima) location and scale.
///
/// The scale solves `β = x̄ - Σ x e^{-x/β} / Σ e^{-x/β}`, which is monotone in
/// β, so Newton from the moment estimate converges; the location follows as
/// `-β ln(mean(e^{-x/β}))`.
fn fit_gumbel_max(data: &[f64]) -> Result<(f64, f64)> {
    let mean = descriptive::mean(data)?;
    let x_min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let mut beta = descriptive::std_dev(data, 1)? * 6f64.sqrt() / core::f64::consts::PI;

    // Weighted moments of x under weights e^{-(x - x_min)/β}.
    let weighted = |beta: f64| {
        let (mut sw, mut swx, mut swx2) = (0.0, 0.0, 0.0);
        for &x in data {
            let w = (-(x - x_min) / beta).exp();
            sw += w;
            swx += w * x;
            swx2 += w * x * x;
        }
        let m = swx / sw;
        (sw, m, (swx2 / sw - m * m).max(0.0))
    };

    for _ in 0..MAX_NEWTON_ITER {
        let (_, m, var_w) = weighted(beta);
        let h = beta - mean + m;
        let dh = 1.0 + var_w / (beta * beta);
        let mut delta = h / dh;
        while beta - delta <= 0.0 {
            delta *= 0.5;
        }
        beta -= delta;
        if delta.abs() < NEWTON_TOL * beta {
            let (sw, _, _) = weighted(beta);
            let loc = x_min - beta * (sw / data.len() as f64).ln();
            return Ok((loc, beta));
        }
    }

    warn!(n = data.len(), "gumbel parameter fit did not converge");
    Err(SynonymyError::Convergence(
        "gumbel maximum-likelihood fit".into(),
    ))
}

// ── Kolmogorov-Smirnov ─────────────────────────────────────────────────────

/// Two-sided two-sample Kolmogorov-Smirnov test. Sample sizes may differ.
///
/// The p-value uses the asymptotic Kolmogorov distribution with Stephens'
/// effective-size correction `(√Ne + 0.12 + 0.11/√Ne)·D`.
pub fn kolmogorov_smirnov(sample_a: &[f64], sample_b: &[f64]) -> Result<KolmogorovSmirnovResult> {
    validate_sample("kolmogorov_smirnov: sample_a", sample_a)?;
    validate_sample("kolmogorov_smirnov: sample_b", sample_b)?;

    let mut a = sample_a.to_vec();
    let mut b = sample_b.to_vec();
    a.sort_by(|x, y| x.total_cmp(y));
    b.sort_by(|x, y| x.total_cmp(y));

    let (n1, n2) = (a.len(), b.len());
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < n1 && j < n2 {
        let v = a[i].min(b[j]);
        while i < n1 && a[i] <= v {
            i += 1;
        }
        while j < n2 && b[j] <= v {
            j += 1;
        }
        d = d.max((i as f64 / n1f - j as f64 / n2f).abs());
    }

    let en = (n1f * n2f / (n1f + n2f)).sqrt();
    let p_value = kolmogorov_sf((en + 0.12 + 0.11 / en) * d).clamp(0.0, 1.0);

    debug!(n1, n2, statistic = d, p_value, "kolmogorov-smirnov");

    Ok(KolmogorovSmirnovResult {
        statistic: d,
        p_value,
        n1,
        n2,
    })
}

// ── Pipelines ──────────────────────────────────────────────────────────────

/// Normalize a raw score sample, run Anderson-Darling against
/// `config.family`, and judge it at `config.alpha`.
///
/// Min-max scaling maps the sample minimum to 0, where the exponential CDF
/// vanishes and A² diverges. For the exponential family the zero
/// observations are dropped before testing; the rest of the scaled sample is
/// still exponential with its origin at the old minimum.
pub fn run_anderson_darling(raw: &[f64], config: &FitConfig) -> Result<GoodnessOfFitReport> {
    validate_alpha(config.alpha)?;
    let mut sample = normalization::min_max(raw, config.precision)?;
    if config.family == DistributionFamily::Exponential {
        let before = sample.len();
        sample.retain(|&v| v > 0.0);
        debug!(dropped = before - sample.len(), "dropped zero observations for exponential fit");
    }
    GoodnessOfFitReport::from(anderson_darling(&sample, config.family)?).judged(config.alpha)
}

/// Normalize two raw score samples independently, run the two-sample
/// Kolmogorov-Smirnov test, and judge it at `config.alpha`.
pub fn run_kolmogorov_smirnov(
    raw_a: &[f64],
    raw_b: &[f64],
    config: &FitConfig,
) -> Result<GoodnessOfFitReport> {
    validate_alpha(config.alpha)?;
    if raw_a.is_empty() || raw_b.is_empty() {
        return Err(SynonymyError::EmptySample(
            "kolmogorov_smirnov: both samples must be non-empty".into(),
        ));
    }
    let a = normalization::min_max(raw_a, config.precision)?;
    let b = normalization::min_max(raw_b, config.precision)?;
    GoodnessOfFitReport::from(kolmogorov_smirnov(&a, &b)?).judged(config.alpha)
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn validate_sample(context: &str, sample: &[f64]) -> Result<()> {
    if sample.is_empty() {
        return Err(SynonymyError::EmptySample(format!("{}: no observations", context)));
    }
    if let Some(pos) = sample.iter().position(|v| !v.is_finite()) {
        return Err(SynonymyError::InvalidInput(format!(
            "{}: observation {} is not finite ({})",
            context, pos, sample[pos]
        )));
    }
    Ok(())
}

fn validate_alpha(alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(SynonymyError::InvalidInput(format!(
            "alpha must be in (0, 1), got {}",
            alpha
        )));
    }
    Ok(())
}
