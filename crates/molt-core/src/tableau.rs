//! Butcher tableaux for explicit Runge-Kutta schemes.
//!
//! The scheme is a configuration-time choice. A tableau is resolved once
//! (by name or built directly) and compiled into a
//! [`StagePlan`](crate::plan::StagePlan); nothing about it changes from
//! step to step.

use std::error::Error;
use std::fmt;

/// Errors building or compiling a Runge-Kutta scheme.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemeError {
    /// No built-in tableau has this name.
    UnknownScheme {
        /// The requested name.
        name: String,
    },
    /// The tableau couples a stage to anything other than the stage
    /// immediately before it, which the four-buffer layout cannot store.
    NotDiagonal {
        /// Name of the rejected tableau.
        name: String,
    },
    /// The tableau's arrays are inconsistent or non-finite.
    Malformed {
        /// Description of the inconsistency.
        reason: String,
    },
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownScheme { name } => write!(f, "unknown Runge-Kutta scheme '{name}'"),
            Self::NotDiagonal { name } => write!(
                f,
                "scheme '{name}' is not diagonal and cannot run in four buffers"
            ),
            Self::Malformed { reason } => write!(f, "malformed Butcher tableau: {reason}"),
        }
    }
}

impl Error for SchemeError {}

/// Most stages a tableau may have.
pub const MAX_STAGES: usize = 8;

/// An explicit Butcher tableau.
///
/// `a` is strictly lower triangular and stored row by row: row `i` holds
/// the `i` coefficients `a[i][0..i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ButcherTableau {
    name: String,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
}

impl ButcherTableau {
    /// Names accepted by [`from_name()`](Self::from_name).
    pub const BUILTIN_NAMES: [&'static str; 8] = [
        "Euler",
        "RK2 Heun",
        "RK2 MP",
        "RK2 Ralston",
        "RK3 Heun",
        "RK3 Ralston",
        "SSPRK3",
        "RK4",
    ];

    /// Build and validate a tableau.
    pub fn new(
        name: impl Into<String>,
        a: Vec<Vec<f64>>,
        b: Vec<f64>,
        c: Vec<f64>,
    ) -> Result<Self, SchemeError> {
        let name = name.into();
        let stages = b.len();
        if stages == 0 {
            return Err(SchemeError::Malformed {
                reason: "tableau has no stages".into(),
            });
        }
        if stages > MAX_STAGES {
            return Err(SchemeError::Malformed {
                reason: format!("{stages} stages exceeds the maximum of {MAX_STAGES}"),
            });
        }
        if a.len() != stages || c.len() != stages {
            return Err(SchemeError::Malformed {
                reason: format!(
                    "a has {} rows and c has {} entries, expected {stages}",
                    a.len(),
                    c.len()
                ),
            });
        }
        for (i, row) in a.iter().enumerate() {
            if row.len() != i {
                return Err(SchemeError::Malformed {
                    reason: format!("row {i} of a has {} entries, expected {i}", row.len()),
                });
            }
        }
        let all_finite = a
            .iter()
            .flatten()
            .chain(b.iter())
            .chain(c.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(SchemeError::Malformed {
                reason: "coefficients must be finite".into(),
            });
        }
        Ok(Self { name, a, b, c })
    }

    /// Look up a built-in tableau by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Result<Self, SchemeError> {
        let key = name.trim().to_ascii_uppercase();
        match key.as_str() {
            "EULER" => Ok(Self::euler()),
            "RK2 HEUN" => Ok(Self::heun()),
            "RK2 MP" => Ok(Self::midpoint()),
            "RK2 RALSTON" => Ok(Self::ralston2()),
            "RK3 HEUN" => Ok(Self::heun3()),
            "RK3 RALSTON" => Ok(Self::ralston3()),
            "SSPRK3" => Ok(Self::ssprk3()),
            "RK4" => Ok(Self::rk4()),
            _ => Err(SchemeError::UnknownScheme {
                name: name.to_string(),
            }),
        }
    }

    /// Forward Euler.
    pub fn euler() -> Self {
        Self::builtin("Euler", vec![vec![]], vec![1.0], vec![0.0])
    }

    /// Heun's method: the two-stage, second-order predictor-corrector.
    pub fn heun() -> Self {
        Self::builtin(
            "RK2 Heun",
            vec![vec![], vec![1.0]],
            vec![1.0 / 2.0, 1.0 / 2.0],
            vec![0.0, 1.0],
        )
    }

    /// Explicit midpoint.
    pub fn midpoint() -> Self {
        Self::builtin(
            "RK2 MP",
            vec![vec![], vec![1.0 / 2.0]],
            vec![0.0, 1.0],
            vec![0.0, 1.0 / 2.0],
        )
    }

    /// Ralston's second-order method.
    pub fn ralston2() -> Self {
        Self::builtin(
            "RK2 Ralston",
            vec![vec![], vec![2.0 / 3.0]],
            vec![1.0 / 4.0, 3.0 / 4.0],
            vec![0.0, 2.0 / 3.0],
        )
    }

    /// Heun's third-order method.
    pub fn heun3() -> Self {
        Self::builtin(
            "RK3 Heun",
            vec![vec![], vec![1.0 / 3.0], vec![0.0, 2.0 / 3.0]],
            vec![1.0 / 4.0, 0.0, 3.0 / 4.0],
            vec![0.0, 1.0 / 3.0, 2.0 / 3.0],
        )
    }

    /// Ralston's third-order method.
    pub fn ralston3() -> Self {
        Self::builtin(
            "RK3 Ralston",
            vec![vec![], vec![1.0 / 2.0], vec![0.0, 3.0 / 4.0]],
            vec![2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
            vec![0.0, 1.0 / 2.0, 3.0 / 4.0],
        )
    }

    /// Shu-Osher SSP RK3. Not diagonal.
    pub fn ssprk3() -> Self {
        Self::builtin(
            "SSPRK3",
            vec![vec![], vec![1.0], vec![1.0 / 4.0, 1.0 / 4.0]],
            vec![1.0 / 6.0, 1.0 / 6.0, 2.0 / 3.0],
            vec![0.0, 1.0, 1.0 / 2.0],
        )
    }

    /// Classic fourth-order Runge-Kutta.
    pub fn rk4() -> Self {
        Self::builtin(
            "RK4",
            vec![
                vec![],
                vec![1.0 / 2.0],
                vec![0.0, 1.0 / 2.0],
                vec![0.0, 0.0, 1.0],
            ],
            vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
            vec![0.0, 1.0 / 2.0, 1.0 / 2.0, 1.0],
        )
    }

    // Built-in tables are well-formed by construction.
    fn builtin(name: &str, a: Vec<Vec<f64>>, b: Vec<f64>, c: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            a,
            b,
            c,
        }
    }

    /// Scheme name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stages.
    pub fn stages(&self) -> usize {
        self.b.len()
    }

    /// `a[i][j]`; zero outside the strictly lower triangle.
    pub fn a(&self, i: usize, j: usize) -> f64 {
        self.a
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(0.0)
    }

    /// Weights `b`.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Nodes `c`.
    pub fn c(&self) -> &[f64] {
        &self.c
    }

    /// Whether every stage depends only on the stage right before it.
    pub fn is_diagonal(&self) -> bool {
        self.a
            .iter()
            .enumerate()
            .skip(2)
            .all(|(i, row)| row[..i - 1].iter().all(|&v| v == 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_name_resolves() {
        for name in ButcherTableau::BUILTIN_NAMES {
            let t = ButcherTableau::from_name(name).unwrap();
            assert_eq!(t.name(), name);
            // Re-validate through the public constructor.
            let rebuilt =
                ButcherTableau::new(name, t.a.clone(), t.b.clone(), t.c.clone()).unwrap();
            assert_eq!(rebuilt, t);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(ButcherTableau::from_name("rk2 heun").unwrap(), ButcherTableau::heun());
        assert_eq!(ButcherTableau::from_name(" rk4 ").unwrap(), ButcherTableau::rk4());
    }

    #[test]
    fn unknown_name_rejected() {
        assert!(matches!(
            ButcherTableau::from_name("RK45 Dormand-Prince"),
            Err(SchemeError::UnknownScheme { .. })
        ));
    }

    #[test]
    fn weights_sum_to_one() {
        for name in ButcherTableau::BUILTIN_NAMES {
            let t = ButcherTableau::from_name(name).unwrap();
            let sum: f64 = t.b().iter().sum();
            assert!((sum - 1.0).abs() < 1e-15, "{name}: b sums to {sum}");
        }
    }

    #[test]
    fn row_sums_match_nodes() {
        for name in ButcherTableau::BUILTIN_NAMES {
            let t = ButcherTableau::from_name(name).unwrap();
            for i in 0..t.stages() {
                let row: f64 = (0..i).map(|j| t.a(i, j)).sum();
                assert!((row - t.c()[i]).abs() < 1e-15, "{name}: row {i}");
            }
        }
    }

    #[test]
    fn diagonality() {
        assert!(ButcherTableau::heun().is_diagonal());
        assert!(ButcherTableau::rk4().is_diagonal());
        assert!(ButcherTableau::euler().is_diagonal());
        assert!(!ButcherTableau::ssprk3().is_diagonal());
    }

    #[test]
    fn malformed_tables_rejected() {
        assert!(ButcherTableau::new("empty", vec![], vec![], vec![]).is_err());
        assert!(ButcherTableau::new(
            "ragged",
            vec![vec![], vec![]],
            vec![0.5, 0.5],
            vec![0.0, 1.0]
        )
        .is_err());
        assert!(ButcherTableau::new("nan", vec![vec![]], vec![f64::NAN], vec![0.0]).is_err());
        assert!(ButcherTableau::new("short c", vec![vec![]], vec![1.0], vec![]).is_err());
    }
}
