//! Rain-chance estimation from condition labels.
//!
//! Current-weather responses carry no rain-probability field, so the core
//! derives one from the condition label. Forecast responses pass through
//! the provider's own data and do not use this estimate.

/// Estimate the chance of rain (0-100) for a condition label.
///
/// Case-insensitive lookup against a fixed table; labels that do not match
/// any entry map to 0. Pure and total: no side effects, no failure mode.
///
/// # Examples
///
/// ```
/// use skycast_core::rain::estimate_rain_chance;
///
/// assert_eq!(estimate_rain_chance("Thunderstorm"), 90);
/// assert_eq!(estimate_rain_chance("SUNNY"), 0);
/// assert_eq!(estimate_rain_chance("mystery-condition"), 0);
/// ```
#[must_use]
pub fn estimate_rain_chance(condition: &str) -> u8 {
    match condition.to_lowercase().as_str() {
        "rain" => 80,
        "light rain" => 60,
        "shower" => 70,
        "thunderstorm" => 90,
        "drizzle" => 50,
        "cloudy" => 30,
        "partly cloudy" => 20,
        "overcast" => 40,
        "clear" | "sunny" => 0,
        _ => 0,
    }
}
