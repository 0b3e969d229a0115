//! HTTP client for the SkyCast weather gateway.
//!
//! The gateway exposes two request/response operations: current weather
//! and multi-day forecast. Both carry the installation's client identity
//! for server-side attribution; the identity is opaque to this module's
//! own logic.
//!
//! This client performs no retries itself; retry is layered on top by
//! [`crate::retry::with_retry`] for forecast fetches only.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use skycast_types::{ForecastDay, GeoPoint, ProviderId, WeatherSnapshot};

use crate::error::{Error, Result, STATUS_UNKNOWN};
use crate::rain::estimate_rain_chance;

/// Abstraction over the weather gateway.
///
/// Implemented by [`ServiceClient`] for the real gateway and by
/// [`crate::mock::MockWeatherClient`] for tests, so polling and dashboard
/// code can be written against either.
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Fetch the current weather for a location. Single attempt.
    async fn current_weather(
        &self,
        point: GeoPoint,
        provider: ProviderId,
    ) -> Result<WeatherSnapshot>;

    /// Fetch a forecast for a location. `days` is provider-bounded: the
    /// returned sequence is chronological and at most `days` long.
    async fn forecast(
        &self,
        point: GeoPoint,
        days: u32,
        provider: ProviderId,
    ) -> Result<Vec<ForecastDay>>;
}

/// HTTP client for the weather gateway API.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
    client_id: String,
}

// ==========================================================================
// Wire types
// ==========================================================================

#[derive(Debug, Clone, Deserialize)]
struct CurrentWeatherResponse {
    temperature: f64,
    condition: String,
    wind_speed: f64,
    wind_direction: f64,
    humidity: u8,
    visibility: f64,
    uv_index: f64,
    max_temp: f64,
    min_temp: f64,
    country: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastDayResponse {
    date: String,
    max_temp: f64,
    min_temp: f64,
    condition: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastResponse {
    forecasts: Vec<ForecastDayResponse>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: u32,
    message: String,
}

impl From<CurrentWeatherResponse> for WeatherSnapshot {
    fn from(response: CurrentWeatherResponse) -> Self {
        // The current-weather schema carries no rain probability; derive it
        let rain_chance = estimate_rain_chance(&response.condition);

        WeatherSnapshot {
            temperature: response.temperature,
            humidity: response.humidity,
            condition: response.condition,
            wind_speed: response.wind_speed,
            wind_direction_deg: response.wind_direction,
            uv_index: response.uv_index,
            visibility: response.visibility,
            rain_chance,
            country: response.country,
            max_temp: response.max_temp,
            min_temp: response.min_temp,
        }
    }
}

impl From<ForecastDayResponse> for ForecastDay {
    fn from(response: ForecastDayResponse) -> Self {
        ForecastDay {
            date: response.date,
            // The headline temperature of a forecast day is its high
            temperature: response.max_temp,
            min_temp: response.min_temp,
            max_temp: response.max_temp,
            condition: response.condition,
        }
    }
}

// ==========================================================================
// ServiceClient implementation
// ==========================================================================

impl ServiceClient {
    /// Create a new gateway client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the gateway (e.g. "http://localhost:8080")
    /// * `client_id` - The installation's client token (see [`crate::client_id`])
    pub fn new(base_url: &str, client_id: String) -> Result<Self> {
        // Normalize URL (remove trailing slash)
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url,
            client_id,
        })
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client_id: String, client: Client) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            client_id,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if status.is_success() {
            // A success body that fails to decode is treated the same as an
            // empty one: the transport yielded nothing usable
            return response.json().await.map_err(|_| Error::EmptyResponse);
        }

        let error = match response.json::<ErrorBody>().await {
            Ok(body) => Error::Service {
                code: body.code,
                message: body.message,
            },
            Err(_) => Error::Service {
                code: STATUS_UNKNOWN,
                message: status.to_string(),
            },
        };

        Err(error)
    }
}

#[async_trait]
impl WeatherClient for ServiceClient {
    async fn current_weather(
        &self,
        point: GeoPoint,
        provider: ProviderId,
    ) -> Result<WeatherSnapshot> {
        let url = format!("{}/v1/weather/current", self.base_url);
        debug!(%point, %provider, "Fetching current weather");

        let value = self
            .get_json(
                &url,
                &[
                    ("latitude", point.latitude.to_string()),
                    ("longitude", point.longitude.to_string()),
                    ("client_id", self.client_id.clone()),
                    ("provider", provider.as_str().to_string()),
                ],
            )
            .await?;

        if value.is_null() {
            return Err(Error::EmptyResponse);
        }

        let body: CurrentWeatherResponse =
            serde_json::from_value(value).map_err(|_| Error::EmptyResponse)?;

        Ok(body.into())
    }

    async fn forecast(
        &self,
        point: GeoPoint,
        days: u32,
        provider: ProviderId,
    ) -> Result<Vec<ForecastDay>> {
        let url = format!("{}/v1/weather/forecast", self.base_url);
        debug!(%point, %provider, days, "Fetching forecast");

        let value = self
            .get_json(
                &url,
                &[
                    ("latitude", point.latitude.to_string()),
                    ("longitude", point.longitude.to_string()),
                    ("client_id", self.client_id.clone()),
                    ("provider", provider.as_str().to_string()),
                    ("days", days.to_string()),
                ],
            )
            .await?;

        if value.is_null() {
            return Err(Error::EmptyResponse);
        }

        let body: ForecastResponse =
            serde_json::from_value(value).map_err(|_| Error::EmptyResponse)?;

        Ok(body.forecasts.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ServiceClient {
        ServiceClient::new("http://localhost:8080", "web-abc123xyz".to_string()).unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert_eq!(client().base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_normalizes_url() {
        let client =
            ServiceClient::new("http://localhost:8080/", "web-abc123xyz".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_rejects_invalid_url() {
        let result = ServiceClient::new("localhost:8080", "web-abc123xyz".to_string());
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_current_weather_decoding_derives_rain_chance() {
        let json = r#"{
            "temperature": 21.5,
            "condition": "Thunderstorm",
            "wind_speed": 4.2,
            "wind_direction": 180.0,
            "humidity": 65,
            "visibility": 10.0,
            "uv_index": 3.5,
            "max_temp": 24.0,
            "min_temp": 15.0,
            "country": "DE"
        }"#;

        let response: CurrentWeatherResponse = serde_json::from_str(json).unwrap();
        let snapshot = WeatherSnapshot::from(response);

        assert_eq!(snapshot.temperature, 21.5);
        assert_eq!(snapshot.rain_chance, 90);
        assert_eq!(snapshot.wind_direction_deg, 180.0);
        assert!(snapshot.rain_chance <= 100);
    }

    #[test]
    fn test_forecast_day_headline_equals_max_temp() {
        let json = r#"{
            "date": "2026-08-28",
            "max_temp": 24.0,
            "min_temp": 15.0,
            "condition": "Partly cloudy"
        }"#;

        let response: ForecastDayResponse = serde_json::from_str(json).unwrap();
        let day = ForecastDay::from(response);

        assert_eq!(day.temperature, day.max_temp);
        assert_eq!(day.min_temp, 15.0);
        assert_eq!(day.date, "2026-08-28");
    }

    #[test]
    fn test_error_body_decoding() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"code": 13, "message": "upstream unavailable"}"#).unwrap();
        let error = Error::Service {
            code: body.code,
            message: body.message,
        };
        assert!(error.is_transient());
    }
}
