//! IP-based geolocation: the terminal stand-in for the browser's geolocation
//! prompt. Uses ip-api.com, which is free and needs no key.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::errors::Error;
use crate::owm::Location;

const GEO_URL: &str = "http://ip-api.com/json";
const TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize, Debug)]
struct GeoResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// Resolves the machine's approximate coordinates from its public IP.
pub async fn locate() -> Result<Location, Error> {
    let client = Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::Geolocation(e.to_string()))?;

    let response = client
        .get(GEO_URL)
        .send()
        .await
        .map_err(|e| Error::Geolocation(e.to_string()))?;

    if !response.status().is_success() {
        return Err(Error::Geolocation(format!(
            "lookup returned {}",
            response.status()
        )));
    }

    let body: GeoResponse = response
        .json()
        .await
        .map_err(|e| Error::Geolocation(e.to_string()))?;

    match body {
        GeoResponse {
            status,
            lat: Some(lat),
            lon: Some(lon),
            ..
        } if status == "success" => {
            tracing::info!("geolocated to {lat:.4},{lon:.4}");
            Ok(Location::Coords { lat, lon })
        }
        GeoResponse { message, .. } => Err(Error::Geolocation(
            message.unwrap_or_else(|| "location unavailable".to_string()),
        )),
    }
}
