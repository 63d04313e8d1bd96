//! OpenWeatherMap API client and response models.
//!
//! Two read-only endpoints are used: current conditions (`/weather`) and the
//! 5-day/3-hour forecast (`/forecast`), both addressable by city name or by
//! coordinates and both keyed with `appid`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::Error;

pub const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const USER_AGENT: &str = concat!("owm/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 10;

/// The two location forms both endpoints accept.
#[derive(Debug, Clone)]
pub enum Location {
    City(String),
    Coords { lat: f64, lon: f64 },
}

impl Location {
    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::City(name) => vec![("q", name.clone())],
            Self::Coords { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::City(name) => write!(f, "{name}"),
            Self::Coords { lat, lon } => write!(f, "{lat:.4},{lon:.4}"),
        }
    }
}

/// Temperature block shared by both endpoints. Values are metric
/// (`units=metric` on every request).
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Main {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
}

/// One entry of the `weather` array: short text plus icon code.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

pub mod current {
    use super::*;

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct Current {
        pub name: String,

        pub sys: Sys,

        pub main: Main,

        pub weather: Vec<Condition>,

        pub wind: Wind,

        pub visibility: Option<f64>,

        /// Observation time, Unix epoch seconds.
        pub dt: i64,
    }

    impl Current {
        pub fn condition(&self) -> Option<&Condition> {
            self.weather.first()
        }
    }

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct Sys {
        pub country: Option<String>,
    }

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct Wind {
        pub speed: f64,
    }
}

pub mod forecast {
    use super::*;

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct Forecast {
        pub list: Vec<Sample>,
    }

    /// One 3-hourly forecast sample. `dt_txt` is `"YYYY-MM-DD HH:MM:SS"`.
    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct Sample {
        #[serde(rename = "dt_txt")]
        pub timestamp: String,

        pub main: Main,

        pub weather: Vec<Condition>,
    }

    impl Sample {
        pub fn condition(&self) -> Option<&Condition> {
            self.weather.first()
        }
    }
}

/// Keyed OpenWeatherMap client.
#[derive(Debug, Clone)]
pub struct Api {
    client: Client,
    base_url: String,
    key: String,
}

impl Api {
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        Self::with_base_url(key, BASE_URL)
    }

    /// Same as [`Api::new`] with the endpoint base overridden, for pointing
    /// tests at a mock server.
    pub fn with_base_url(
        key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            key: key.into(),
        })
    }

    /// Current conditions for a city or coordinate pair.
    pub async fn current(&self, location: &Location) -> Result<current::Current, Error> {
        self.get_json("weather", location).await
    }

    /// 5-day/3-hour forecast list for a city or coordinate pair.
    pub async fn forecast(&self, location: &Location) -> Result<forecast::Forecast, Error> {
        self.get_json("forecast", location).await
    }

    /// Fetches current conditions and the forecast concurrently. Fails fast
    /// with the first error; there is no partial result.
    pub async fn query(
        &self,
        location: &Location,
    ) -> Result<(current::Current, forecast::Forecast), Error> {
        tracing::info!("querying weather for {location}");
        tokio::try_join!(self.current(location), self.forecast(location))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &Location,
    ) -> Result<T, Error> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(&location.params())
            .query(&[("appid", self.key.as_str()), ("units", "metric")])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            status if !status.is_success() => Err(Error::Status(status)),
            _ => Ok(response.json::<T>().await?),
        }
    }
}
