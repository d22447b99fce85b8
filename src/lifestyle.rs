//! Lifestyle scoring
//!
//! Collapses weekly exercise, daily fruit/vegetable intake and nightly sleep
//! into a single 0-10 score consumed by the cost estimator.

/// Highest score the estimator accepts
pub const MAX_SCORE: u8 = 10;

/// Score lifestyle habits on a 0-10 scale.
///
/// Three axes are scored independently and summed:
/// - exercise: 3 points for 5+ days a week, 2 for 3+, 1 for 1+
/// - nutrition: 3 points for 5+ portions a day, 2 for 3+, 1 for 1+
/// - sleep: 4 points for 7-9 hours, 2 for [6, 7) or (9, 10], otherwise 0
///
/// Inputs are expected to be range-checked by the caller.
pub fn score(exercise_days: u32, fruit_veg_portions: u32, sleep_hours: f64) -> u8 {
    let total = exercise_points(exercise_days)
        + nutrition_points(fruit_veg_portions)
        + sleep_points(sleep_hours);
    total.min(MAX_SCORE)
}

fn exercise_points(days: u32) -> u8 {
    match days {
        d if d >= 5 => 3,
        d if d >= 3 => 2,
        d if d >= 1 => 1,
        _ => 0,
    }
}

fn nutrition_points(portions: u32) -> u8 {
    match portions {
        p if p >= 5 => 3,
        p if p >= 3 => 2,
        p if p >= 1 => 1,
        _ => 0,
    }
}

fn sleep_points(hours: f64) -> u8 {
    if (7.0..=9.0).contains(&hours) {
        4
    } else if (6.0..7.0).contains(&hours) || (hours > 9.0 && hours <= 10.0) {
        2
    } else {
        0
    }
}
