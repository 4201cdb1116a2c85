use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, RngCore};
use reqwest::Client;
use serde::Deserialize;
use crate::config::sources::WeatherConfig;
use crate::error::{Error, Result};
use crate::feeds::http::send_checked;
use crate::feeds::{SourceAdapter, SourceKind};
use crate::types::{DataOrigin, WeatherRecord};

const SYNTHETIC_CONDITION: &str = "Sunny";

/// Current conditions for one city from an OpenWeatherMap-compatible API.
pub struct WeatherAdapter {
    client: Client,
    config: WeatherConfig,
}

impl WeatherAdapter {
    pub fn new(client: Client, config: WeatherConfig) -> Self {
        WeatherAdapter { client, config }
    }
}

#[async_trait]
impl SourceAdapter for WeatherAdapter {
    type Record = WeatherRecord;

    fn kind(&self) -> SourceKind {
        SourceKind::Weather
    }

    async fn fetch_live(&self) -> Result<WeatherRecord> {
        let api_key = self.config.credential()
            .ok_or(Error::MissingCredential("weather"))?;

        let request = self.client
            .get(&self.config.api_url)
            .query(&[
                ("q", self.config.city.as_str()),
                ("appid", api_key),
                ("units", "metric"),
                ("lang", "en"),
            ]);

        let data: CurrentWeather = send_checked(request).await?.json().await?;
        let condition = data.weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| Error::ParseFailure("weather conditions array is empty".into()))?;

        Ok(WeatherRecord {
            city: data.name,
            temperature: data.main.temp,
            humidity: data.main.humidity,
            pressure: data.main.pressure,
            condition,
            collected_at: Utc::now(),
            origin: DataOrigin::Live,
        })
    }

    fn synthesize(&self, rng: &mut dyn RngCore) -> WeatherRecord {
        WeatherRecord {
            city: self.config.city.clone(),
            temperature: rng.gen_range(15.0..=30.0),
            humidity: rng.gen_range(40.0..=80.0),
            pressure: rng.gen_range(1000.0..=1020.0),
            condition: SYNTHETIC_CONDITION.to_string(),
            collected_at: Utc::now(),
            origin: DataOrigin::Synthetic,
        }
    }
}

#[derive(Deserialize)]
struct CurrentWeather {
    name: String,
    main: MainReadings,
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(url: String, api_key: Option<&str>) -> WeatherAdapter {
        WeatherAdapter::new(
            Client::new(),
            WeatherConfig {
                api_url: url,
                city: "Oslo".to_string(),
                api_key: api_key.map(String::from),
            },
        )
    }

    #[test]
    fn synthetic_readings_stay_in_range() {
        let adapter = adapter("http://unused".into(), None);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1_000 {
            let record = adapter.synthesize(&mut rng);
            assert!((15.0..=30.0).contains(&record.temperature));
            assert!((40.0..=80.0).contains(&record.humidity));
            assert!((1000.0..=1020.0).contains(&record.pressure));
            assert_eq!(record.city, "Oslo");
            assert_eq!(record.condition, "Sunny");
            assert_eq!(record.origin, DataOrigin::Synthetic);
        }
    }

    #[tokio::test]
    async fn parses_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Oslo"))
            .and(query_param("appid", "secret"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Oslo",
                "main": { "temp": 4.5, "humidity": 71, "pressure": 1008 },
                "weather": [{ "description": "light rain" }]
            })))
            .mount(&server)
            .await;

        let record = adapter(server.uri(), Some("secret")).fetch_live().await.unwrap();
        assert_eq!(record.city, "Oslo");
        assert_eq!(record.temperature, 4.5);
        assert_eq!(record.humidity, 71.0);
        assert_eq!(record.pressure, 1008.0);
        assert_eq!(record.condition, "light rain");
        assert_eq!(record.origin, DataOrigin::Live);
    }

    #[tokio::test]
    async fn missing_key_never_reaches_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = adapter(server.uri(), Some("your_weather_api_key")).fetch_live().await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential("weather")));
    }

    #[tokio::test]
    async fn unauthorized_is_a_response_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = adapter(server.uri(), Some("revoked")).fetch_live().await.unwrap_err();
        assert!(matches!(err, Error::ResponseFailure { status: 401, .. }));
    }

    #[tokio::test]
    async fn unexpected_schema_is_a_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cod": 200 })))
            .mount(&server)
            .await;

        let err = adapter(server.uri(), Some("secret")).fetch_live().await.unwrap_err();
        assert!(matches!(err, Error::ParseFailure(_)));
    }
}
