//! Outer boundary-condition tags and the enforcement policy they select.
//!
//! The boundary type arrives as a configuration string. It is resolved
//! once, at configuration time, into a [`BoundaryCondition`]; the per-stage
//! decision is then a check on the resulting [`BoundaryPolicy`].

use std::fmt;

/// Resolved outer boundary condition of a grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryCondition {
    /// Extrapolate outer ghost zones (and fill inner ghosts) after every
    /// stage update.
    Extrapolation,
    /// Outgoing-radiation condition, applied to the RHS right after each
    /// RHS evaluation.
    Radiation,
    /// Any other tag. No boundary calls are made by the stepper for it;
    /// whatever it means is handled outside this engine.
    Other(String),
}

impl BoundaryCondition {
    /// Resolve a boundary-type string.
    ///
    /// Matching ignores ASCII case and surrounding whitespace, and accepts
    /// any tag that begins with the token, so `"Extrapolation"` and
    /// `"extrapolation_and_inner"` both select [`Extrapolation`](Self::Extrapolation).
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase();
        if normalized.starts_with("extrapolation") {
            Self::Extrapolation
        } else if normalized.starts_with("radiation") {
            Self::Radiation
        } else {
            Self::Other(tag.to_string())
        }
    }

    /// The enforcement policy for this condition.
    pub fn policy(&self) -> BoundaryPolicy {
        match self {
            Self::Extrapolation => BoundaryPolicy::ExtrapolateAndInner,
            Self::Radiation => BoundaryPolicy::RadiationAndInner,
            Self::Other(_) => BoundaryPolicy::NoOp,
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extrapolation => f.write_str("extrapolation"),
            Self::Radiation => f.write_str("radiation"),
            Self::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// What the stepper does at the boundary during each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryPolicy {
    /// Never call the boundary enforcer.
    NoOp,
    /// Call the enforcer on the freshly updated buffer after each stage
    /// kernel: the predictor after intermediate stages, `y_n` after the
    /// final stage.
    ExtrapolateAndInner,
    /// Correct the RHS output right after each RHS evaluation.
    RadiationAndInner,
}

impl BoundaryPolicy {
    /// Whether the enforcer runs after each stage kernel.
    pub fn after_stage(self) -> bool {
        self == Self::ExtrapolateAndInner
    }

    /// Whether the enforcer runs after each RHS evaluation.
    pub fn after_rhs(self) -> bool {
        self == Self::RadiationAndInner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrapolation_is_case_and_prefix_insensitive() {
        for tag in [
            "extrapolation",
            "Extrapolation",
            "EXTRAPOLATION",
            "  extrapolation ",
            "extrapolation_and_inner",
        ] {
            assert_eq!(BoundaryCondition::from_tag(tag), BoundaryCondition::Extrapolation);
        }
    }

    #[test]
    fn radiation_resolves() {
        assert_eq!(BoundaryCondition::from_tag("Radiation"), BoundaryCondition::Radiation);
    }

    #[test]
    fn unknown_tags_skip_enforcement() {
        let bc = BoundaryCondition::from_tag("periodic");
        assert_eq!(bc, BoundaryCondition::Other("periodic".into()));
        assert_eq!(bc.policy(), BoundaryPolicy::NoOp);
        assert!(!bc.policy().after_stage());
        assert!(!bc.policy().after_rhs());
    }

    #[test]
    fn empty_tag_is_other() {
        assert_eq!(BoundaryCondition::from_tag("").policy(), BoundaryPolicy::NoOp);
    }

    #[test]
    fn policy_flags() {
        assert!(BoundaryPolicy::ExtrapolateAndInner.after_stage());
        assert!(!BoundaryPolicy::ExtrapolateAndInner.after_rhs());
        assert!(BoundaryPolicy::RadiationAndInner.after_rhs());
        assert!(!BoundaryPolicy::RadiationAndInner.after_stage());
    }
}
