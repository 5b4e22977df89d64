use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

// City-name geocoder with a process-lifetime cache. Only successful lookups
// are cached; a failed city retries the upstream on the next request.
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    cache: DashMap<String, (f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    // Nominatim-style services return lat/lon as strings, others as numbers.
    lat: Option<Value>,
    lon: Option<Value>,
}

fn upstream_timeout() -> Duration {
    let secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    Duration::from_secs(secs)
}

impl GeocodingClient {
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(upstream_timeout())
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            cache: DashMap::new(),
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("GEOCODER_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
        // The upstream is rate limited and requires a descriptive client id.
        let user_agent = std::env::var("GEOCODER_USER_AGENT")
            .unwrap_or_else(|_| "lifebridge-backend/0.1".to_string());
        Self::new(&base_url, &user_agent)
    }

    pub async fn resolve_city(&self, city: &str) -> Option<(f64, f64)> {
        let raw = city.trim();
        if raw.is_empty() {
            return None;
        }
        let key = raw.to_lowercase();

        if let Some(coords) = self.cache.get(&key) {
            return Some(*coords);
        }

        let url = format!("{}/search", self.base_url);
        let resp = match self
            .client
            .get(&url)
            .query(&[("q", raw), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("📍 Geocoder unreachable for '{}': {}", raw, e);
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!("📍 Geocoder non-OK for '{}': {}", raw, resp.status());
            return None;
        }

        let hits: Vec<GeocodeHit> = match resp.json().await {
            Ok(h) => h,
            Err(e) => {
                warn!("📍 Geocoder JSON parse failed for '{}': {}", raw, e);
                return None;
            }
        };

        let Some(hit) = hits.first() else {
            warn!("📍 Geocoder returned no hits for '{}'", raw);
            return None;
        };

        let lat = hit.lat.as_ref().and_then(coerce_coord);
        let lon = hit.lon.as_ref().and_then(coerce_coord);
        let (Some(lat), Some(lon)) = (lat, lon) else {
            warn!("📍 Geocoder hit without usable coordinates for '{}'", raw);
            return None;
        };

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            warn!(
                "📍 Geocoder returned out-of-range coordinates for '{}': ({}, {})",
                raw, lat, lon
            );
            return None;
        }

        self.cache.insert(key, (lat, lon));
        Some((lat, lon))
    }
}

fn coerce_coord(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    6371.0 * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_same_point_is_zero() {
        assert_eq!(haversine_km(48.14, 17.11, 48.14, 17.11), 0.0);
    }

    #[test]
    fn haversine_one_degree_longitude_at_equator() {
        // 2 * pi * 6371 / 360 = 111.1949 km
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.1949).abs() < 0.001, "got {}", d);
    }

    #[test]
    fn haversine_is_symmetric() {
        let ab = haversine_km(48.1486, 17.1077, 48.2082, 16.3738);
        let ba = haversine_km(48.2082, 16.3738, 48.1486, 17.1077);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn coerce_accepts_numbers_and_strings() {
        assert_eq!(coerce_coord(&serde_json::json!(48.14)), Some(48.14));
        assert_eq!(coerce_coord(&serde_json::json!("17.11")), Some(17.11));
        assert_eq!(coerce_coord(&serde_json::json!(" 17.11 ")), Some(17.11));
        assert_eq!(coerce_coord(&serde_json::json!("abc")), None);
        assert_eq!(coerce_coord(&serde_json::json!(null)), None);
        assert_eq!(coerce_coord(&serde_json::json!([1.0])), None);
    }
}
