//! Output formatting for weather data.

use skycast_types::{ForecastDay, TemperatureUnit, TrackedCity, WeatherSnapshot};

/// Eight-sector compass labels, clockwise from north.
const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Format a temperature in the requested display unit.
///
/// Values are stored in Celsius; Fahrenheit is derived at display time.
pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    match unit {
        TemperatureUnit::Celsius => format!("{celsius:.1}°C"),
        TemperatureUnit::Fahrenheit => format!("{:.1}°F", celsius * 9.0 / 5.0 + 32.0),
    }
}

/// Map a wind direction in degrees to a compass label.
///
/// Degrees outside 0..360 (including negatives) are normalized first.
pub fn wind_direction_label(degrees: f64) -> &'static str {
    let normalized = ((degrees % 360.0) + 360.0) % 360.0;
    if !(22.5..337.5).contains(&normalized) {
        return COMPASS[0];
    }
    let sector = ((normalized - 22.5) / 45.0) as usize + 1;
    COMPASS[sector.min(7)]
}

pub fn print_snapshot(snapshot: &WeatherSnapshot, unit: TemperatureUnit) {
    println!("  {}", snapshot.condition);
    println!(
        "  Temperature: {} (low {}, high {})",
        format_temperature(snapshot.temperature, unit),
        format_temperature(snapshot.min_temp, unit),
        format_temperature(snapshot.max_temp, unit),
    );
    println!("  Humidity:    {}%", snapshot.humidity);
    println!("  Rain chance: {}%", snapshot.rain_chance);
    println!(
        "  Wind:        {:.1} m/s {}",
        snapshot.wind_speed,
        wind_direction_label(snapshot.wind_direction_deg),
    );
    println!("  UV index:    {:.1}", snapshot.uv_index);
    println!("  Visibility:  {:.1} km", snapshot.visibility);
}

pub fn print_forecast(days: &[ForecastDay], unit: TemperatureUnit) {
    for day in days {
        println!(
            "  {}  {:>8} / {:<8}  {}",
            day.date,
            format_temperature(day.min_temp, unit),
            format_temperature(day.max_temp, unit),
            day.condition,
        );
    }
}

pub fn print_city(city: &TrackedCity, selected: bool, unit: TemperatureUnit) {
    let marker = if selected { "*" } else { " " };
    println!(
        "{} {}, {} ({})  {}  {}  rain {}%",
        marker,
        city.name,
        city.country,
        city.location,
        format_temperature(city.last_temperature, unit),
        city.last_condition,
        city.last_rain_chance,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_formatting() {
        assert_eq!(
            format_temperature(21.5, TemperatureUnit::Celsius),
            "21.5°C"
        );
        assert_eq!(
            format_temperature(0.0, TemperatureUnit::Fahrenheit),
            "32.0°F"
        );
        assert_eq!(
            format_temperature(100.0, TemperatureUnit::Fahrenheit),
            "212.0°F"
        );
    }

    #[test]
    fn test_compass_sectors() {
        assert_eq!(wind_direction_label(0.0), "N");
        assert_eq!(wind_direction_label(45.0), "NE");
        assert_eq!(wind_direction_label(90.0), "E");
        assert_eq!(wind_direction_label(135.0), "SE");
        assert_eq!(wind_direction_label(180.0), "S");
        assert_eq!(wind_direction_label(225.0), "SW");
        assert_eq!(wind_direction_label(270.0), "W");
        assert_eq!(wind_direction_label(315.0), "NW");
    }

    #[test]
    fn test_compass_boundaries() {
        assert_eq!(wind_direction_label(337.5), "N");
        assert_eq!(wind_direction_label(337.4), "NW");
        assert_eq!(wind_direction_label(22.4), "N");
        assert_eq!(wind_direction_label(22.5), "NE");
    }

    #[test]
    fn test_compass_normalizes_out_of_range() {
        assert_eq!(wind_direction_label(360.0), "N");
        assert_eq!(wind_direction_label(405.0), "NE");
        assert_eq!(wind_direction_label(-90.0), "W");
    }
}
