use chrono::Timelike;
use rand::Rng;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::Weather,
};

const WEATHER_CACHE_TTL: u64 = 600; // 10 minutes

/// Named locations resolvable without a GPS fix.
const LOCATION_COORDS: &[(&str, f64, f64)] = &[
    ("서울", 37.5665, 126.9780),
    ("강남", 37.4979, 127.0276),
    ("여의도", 37.5219, 126.9245),
    ("판교", 37.3944, 127.1109),
    ("부산", 35.1796, 129.0756),
    ("대구", 35.8714, 128.6014),
    ("인천", 37.4563, 126.7052),
    ("광주", 35.1595, 126.8526),
    ("대전", 36.3504, 127.3845),
    ("울산", 35.5384, 129.3114),
    ("세종", 36.4800, 127.2890),
    ("수원", 37.2636, 127.0286),
    ("창원", 35.2272, 128.6811),
    ("고양", 37.6584, 126.8320),
    ("용인", 37.2411, 127.1776),
];

/// Open-Meteo current-weather response (the fields we request)
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current: OpenMeteoCurrent,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: u32,
    precipitation: f64,
}

/// Weather lookups against Open-Meteo, cached in Redis.
///
/// Recommendation requests always get a weather value: upstream failures
/// degrade to plausible time-of-day dummy data instead of erroring.
#[derive(Clone)]
pub struct WeatherService {
    http_client: HttpClient,
    cache: Cache,
    api_url: String,
}

impl WeatherService {
    pub fn new(cache: Cache, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            cache,
            api_url,
        }
    }

    /// Current weather for a named location, or for explicit coordinates
    /// when the caller supplies them.
    pub async fn get_weather(&self, location: &str, lat: Option<f64>, lng: Option<f64>) -> Weather {
        let (latitude, longitude) = match (lat, lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => location_coords(location),
        };

        match self.fetch_current(location, latitude, longitude).await {
            Ok(weather) => weather,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    location = %location,
                    "Weather lookup failed, using dummy data"
                );
                self.dummy_weather(location)
            }
        }
    }

    async fn fetch_current(
        &self,
        location: &str,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Weather> {
        let key = CacheKey::Weather(format!("{:.4}:{:.4}", latitude, longitude));

        cached!(self.cache, key, WEATHER_CACHE_TTL, async move {
            let response = self
                .http_client
                .get(&self.api_url)
                .query(&[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    (
                        "current",
                        "temperature_2m,relative_humidity_2m,weather_code,precipitation"
                            .to_string(),
                    ),
                    ("timezone", "Asia/Seoul".to_string()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                return Err(AppError::ExternalApi(format!(
                    "Open-Meteo returned status {}",
                    status
                )));
            }

            let data: OpenMeteoResponse = response.json().await?;
            let current = data.current;

            let precipitation = if current.precipitation > 0.0 {
                "비"
            } else {
                "없음"
            };

            let weather = Weather {
                location: location.to_string(),
                temperature: (current.temperature_2m * 10.0).round() / 10.0,
                sky_condition: weather_code_to_condition(current.weather_code).to_string(),
                precipitation: precipitation.to_string(),
                humidity: current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
                note: None,
            };

            tracing::info!(
                location = %weather.location,
                temperature = weather.temperature,
                condition = %weather.sky_condition,
                "Weather fetched"
            );

            Ok(weather)
        })
    }

    /// Plausible weather by time of day for when Open-Meteo is unreachable.
    fn dummy_weather(&self, location: &str) -> Weather {
        let mut rng = rand::thread_rng();
        let hour = chrono::Local::now().hour();

        let (low, high, skies): (f64, f64, &[&str]) = match hour {
            6..=11 => (15.0, 25.0, &["맑음", "구름많음"]),
            12..=17 => (20.0, 30.0, &["맑음", "구름많음", "흐림"]),
            18..=21 => (18.0, 28.0, &["맑음", "구름많음"]),
            _ => (12.0, 22.0, &["맑음", "구름많음", "흐림"]),
        };

        Weather {
            location: location.to_string(),
            temperature: (rng.gen_range(low..high) * 10.0).round() / 10.0,
            sky_condition: skies[rng.gen_range(0..skies.len())].to_string(),
            precipitation: "없음".to_string(),
            humidity: rng.gen_range(40..=80),
            note: Some("Open-Meteo API 응답 없음 - 더미 데이터".to_string()),
        }
    }
}

/// Coordinates for a named location, defaulting to 서울.
fn location_coords(location: &str) -> (f64, f64) {
    LOCATION_COORDS
        .iter()
        .find(|(name, _, _)| *name == location)
        .map(|(_, lat, lng)| (*lat, *lng))
        .unwrap_or((37.5665, 126.9780))
}

/// WMO weather interpretation code → Korean condition string
fn weather_code_to_condition(code: u32) -> &'static str {
    match code {
        0 => "맑음",
        1 | 2 => "구름많음",
        3 => "흐림",
        45 | 48 => "안개",
        51 | 53 | 55 | 56 | 57 => "이슬비",
        61 | 63 | 65 | 66 | 67 => "비",
        71 | 73 | 75 | 77 => "눈",
        80..=82 => "소나기",
        85 | 86 => "눈",
        95 | 96 | 99 => "뇌우",
        _ => "맑음",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_code_mapping() {
        assert_eq!(weather_code_to_condition(0), "맑음");
        assert_eq!(weather_code_to_condition(2), "구름많음");
        assert_eq!(weather_code_to_condition(3), "흐림");
        assert_eq!(weather_code_to_condition(55), "이슬비");
        assert_eq!(weather_code_to_condition(65), "비");
        assert_eq!(weather_code_to_condition(75), "눈");
        assert_eq!(weather_code_to_condition(81), "소나기");
        assert_eq!(weather_code_to_condition(86), "눈");
        assert_eq!(weather_code_to_condition(99), "뇌우");
        // Unknown codes read as clear skies.
        assert_eq!(weather_code_to_condition(42), "맑음");
    }

    #[test]
    fn test_location_coords_table_and_default() {
        assert_eq!(location_coords("부산"), (35.1796, 129.0756));
        assert_eq!(location_coords("판교"), (37.3944, 127.1109));
        // Unknown locations resolve to 서울.
        assert_eq!(location_coords("제주"), (37.5665, 126.9780));
    }
}
