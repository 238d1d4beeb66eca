use crate::battle::state::TurnRng;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Capture probability never drops below this, in percent.
pub const MIN_CAPTURE_PROBABILITY: f64 = 10.0;

/// Probabilities computed for one capture attempt, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOdds {
    pub hp_percent: OrderedFloat<f64>,
    pub base_probability: OrderedFloat<f64>,
    pub final_probability: OrderedFloat<f64>,
}

/// `max(10, 100 - hp%)`: the weaker the wild creature, the easier the capture.
pub fn base_capture_probability(current_hp: u16, max_hp: u16) -> f64 {
    let hp_percent = hp_percent(current_hp, max_hp);
    (100.0 - hp_percent).max(MIN_CAPTURE_PROBABILITY)
}

fn hp_percent(current_hp: u16, max_hp: u16) -> f64 {
    if max_hp == 0 {
        return 0.0;
    }
    f64::from(current_hp) / f64::from(max_hp) * 100.0
}

/// Draw the final probability uniformly in `[base / 2, base]`.
pub fn roll_capture_odds(current_hp: u16, max_hp: u16, rng: &mut TurnRng) -> CaptureOdds {
    let base = base_capture_probability(current_hp, max_hp);
    let final_probability = rng.uniform(0.5 * base, base, "capture probability");
    CaptureOdds {
        hp_percent: OrderedFloat(hp_percent(current_hp, max_hp)),
        base_probability: OrderedFloat(base),
        final_probability: OrderedFloat(final_probability),
    }
}

/// Roll in `[0, 100]`; the capture holds if the roll does not exceed the final probability.
pub fn roll_capture_success(odds: &CaptureOdds, rng: &mut TurnRng) -> bool {
    let roll = rng.uniform(0.0, 100.0, "capture roll");
    roll <= odds.final_probability.into_inner()
}

/// Get a descriptive capture chance category for display purposes
pub fn capture_chance_description(probability: f64) -> &'static str {
    match probability {
        p if p >= 80.0 => "Excellent",
        p if p >= 60.0 => "Very Good",
        p if p >= 40.0 => "Good",
        p if p >= 25.0 => "Fair",
        p if p >= 10.0 => "Poor",
        _ => "Very Poor",
    }
}
