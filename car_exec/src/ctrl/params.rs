//! Control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{ConstantController, CtrlError, FlatOutputs};
use crate::planner::PlannerParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for control
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Params {
    /// Open loop constant controller
    #[serde(default)]
    pub constant: ConstantController,

    /// Feedback controller gains
    pub gains: FeedbackGains,

    /// Trajectory of the path shape `y2 = f(y1)`
    pub flat_f: PlannerParams,

    /// Trajectory of the progress `y1 = g(t)`
    pub flat_g: PlannerParams,
}

/// Gains of the flatness based feedback controller
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FeedbackGains {
    /// Gain on the `y1` position error
    pub k01: f64,

    /// Gain on the `y2` position error
    pub k02: f64,

    /// Gain on the `y2` velocity error
    pub k12: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Build the flat output planners.
    pub fn flat_outputs(&self) -> Result<FlatOutputs, CtrlError> {
        FlatOutputs::new(self.flat_f.build()?, self.flat_g.build()?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_from_toml() {
        let params: Params = util::params::from_str(
            r#"
            [gains]
            k01 = 1.0
            k02 = 4.0
            k12 = 4.0

            [flat_f]
            order = 2
            t0 = 0.0
            tf = 5.0
            ya = [0.0, 0.0, 0.0]
            yb = [1.0, 0.0, 0.0]
            kind = { type = "polynomial" }

            [flat_g]
            order = 2
            t0 = 0.0
            tf = 10.0
            ya = [0.0, 0.0, 0.0]
            yb = [5.0, 0.0, 0.0]
            kind = { type = "gevrey", s = 1.5 }
            "#,
        )
        .unwrap();

        assert_eq!(params.constant, ConstantController::default());
        assert_eq!(params.gains.k02, 4.0);

        let flo = params.flat_outputs().unwrap();
        assert_eq!(flo.g.boundaries().tf(), 10.0);
    }
}
