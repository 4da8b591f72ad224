//! Two-variant pass/fail outcome that carries its numeric evidence.

use core::fmt;

/// Outcome of a threshold check, tagged with the evidence it was decided on.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", content = "evidence", rename_all = "lowercase"))]
pub enum Verdict<E> {
    Pass(E),
    Fail(E),
}

impl<E> Verdict<E> {
    /// `Pass(evidence)` when `passed`, otherwise `Fail(evidence)`.
    pub fn from_check(passed: bool, evidence: E) -> Self {
        if passed {
            Verdict::Pass(evidence)
        } else {
            Verdict::Fail(evidence)
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass(_))
    }

    pub fn evidence(&self) -> &E {
        match self {
            Verdict::Pass(e) | Verdict::Fail(e) => e,
        }
    }

    pub fn into_evidence(self) -> E {
        match self {
            Verdict::Pass(e) | Verdict::Fail(e) => e,
        }
    }

    /// Lower-case label used in rendered reports.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass(_) => "pass",
            Verdict::Fail(_) => "fail",
        }
    }

    /// Transform the evidence while keeping the outcome.
    pub fn map<F, T>(self, f: F) -> Verdict<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Verdict::Pass(e) => Verdict::Pass(f(e)),
            Verdict::Fail(e) => Verdict::Fail(f(e)),
        }
    }
}

impl<E> fmt::Display for Verdict<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
