use crate::Chemistry::element_weights::ElementWeights;
use crate::Network::model::Network;
use crate::Pairing::findprimarypairs::FindPrimaryPairs;
use crate::Pairing::lp_service::MicroLpSolver;
use crate::Pairing::mapmaker::Mapmaker;
use crate::Pairing::report::PredictionOutcome;
use crate::errors::PairsError;
use crate::settings::{Method, PredictionSettings};
use enum_dispatch::enum_dispatch;
use std::collections::HashSet;

/// Predicts primary pairs for a whole network.
#[enum_dispatch]
pub trait PairPredictor {
    /// Reactions in `excluded` contribute nothing. Per reaction defects end up in the
    /// outcome; `Err` is reserved for structural failures.
    fn predict(
        &self,
        network: &Network,
        weights: &ElementWeights,
        excluded: &HashSet<String>,
    ) -> Result<PredictionOutcome, PairsError>;

    /// short method name as used on the command line
    fn name(&self) -> &'static str;
}

/// The pairing method chosen for a run
#[enum_dispatch(PairPredictor)]
pub enum Predictor {
    FindPrimaryPairs(FindPrimaryPairs),
    Mapmaker(Mapmaker),
}

impl Predictor {
    pub fn from_settings(settings: &PredictionSettings) -> Self {
        match settings.method {
            Method::Fpp => {
                FindPrimaryPairs::new(Box::new(MicroLpSolver::new()), settings.max_rounds).into()
            }
            Method::Mapmaker => Mapmaker::new().into(),
        }
    }
}
