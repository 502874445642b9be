use std::time::Duration;

use super::predictor::{Prediction, PredictionError, Predictor};
use super::profile::CustomerProfile;

pub const SIMULATED_LATENCY: Duration = Duration::from_millis(800);

const INCOME_THRESHOLD: f64 = 70_000.0;
const SPEND_THRESHOLD: f64 = 800.0;
const ENGAGEMENT_THRESHOLD: u32 = 15;

/// Local heuristic standing in for the remote classifier.
///
/// Positive when income exceeds 70k, when wine, meat and gold spend together
/// exceed 800, or when web and store purchases together exceed 15.
pub fn mock_predict(profile: &CustomerProfile) -> Prediction {
    let high_income = profile.income > INCOME_THRESHOLD;
    let high_spend = profile.headline_spend() > SPEND_THRESHOLD;
    let engaged = profile.channel_engagement() > ENGAGEMENT_THRESHOLD;

    Prediction::from(high_income || high_spend || engaged)
}

/// Predictor that waits a fixed latency and then applies [`mock_predict`].
#[derive(Debug, Clone, Copy)]
pub struct SimulatedPredictor {
    latency: Duration,
}

impl Default for SimulatedPredictor {
    fn default() -> Self {
        Self::with_latency(SIMULATED_LATENCY)
    }
}

impl SimulatedPredictor {
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Predictor for SimulatedPredictor {
    async fn predict(&self, profile: &CustomerProfile) -> Result<Prediction, PredictionError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let prediction = mock_predict(profile);
        tracing::debug!(prediction = prediction.bit(), "simulated prediction computed");
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::profile::ProfileField;
    use tokio::time::Instant;

    fn with(field: ProfileField, value: f64) -> CustomerProfile {
        let mut profile = CustomerProfile::default();
        profile.set(field, value);
        profile
    }

    #[test]
    fn default_profile_is_negative() {
        assert_eq!(mock_predict(&CustomerProfile::default()), Prediction::Negative);
    }

    #[test]
    fn high_income_is_positive() {
        assert_eq!(
            mock_predict(&with(ProfileField::Income, 75_000.0)),
            Prediction::Positive
        );
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(
            mock_predict(&with(ProfileField::Income, 70_000.0)),
            Prediction::Negative
        );
        assert_eq!(
            mock_predict(&with(ProfileField::Income, 70_001.0)),
            Prediction::Positive
        );

        // defaults put meat + gold at 115, so wines of 685 lands spend on 800
        assert_eq!(
            mock_predict(&with(ProfileField::MntWines, 685.0)),
            Prediction::Negative
        );
        assert_eq!(
            mock_predict(&with(ProfileField::MntWines, 686.0)),
            Prediction::Positive
        );

        // store purchases default to 5
        assert_eq!(
            mock_predict(&with(ProfileField::NumWebPurchases, 10.0)),
            Prediction::Negative
        );
        assert_eq!(
            mock_predict(&with(ProfileField::NumWebPurchases, 11.0)),
            Prediction::Positive
        );
    }

    #[test]
    fn spend_outside_the_headline_categories_is_ignored() {
        let mut profile = CustomerProfile::default();
        profile.set(ProfileField::MntFruits, 5_000.0);
        profile.set(ProfileField::MntFishProducts, 5_000.0);
        profile.set(ProfileField::NumCatalogPurchases, 40.0);
        assert_eq!(mock_predict(&profile), Prediction::Negative);
    }

    #[test]
    fn repeated_calls_agree() {
        let profile = with(ProfileField::MntMeatProducts, 650.0);
        let first = mock_predict(&profile);
        for _ in 0..5 {
            assert_eq!(mock_predict(&profile), first);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_predictor_waits_the_configured_latency() {
        let predictor = SimulatedPredictor::default();
        let started = Instant::now();

        let prediction = predictor
            .predict(&CustomerProfile::default())
            .await
            .expect("simulation never fails");

        assert_eq!(prediction, Prediction::Negative);
        let elapsed = started.elapsed();
        assert!(elapsed >= SIMULATED_LATENCY, "returned early: {elapsed:?}");
        assert!(elapsed < SIMULATED_LATENCY + std::time::Duration::from_millis(5));
    }
}
