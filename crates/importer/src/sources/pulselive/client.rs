use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::info;

use super::models::{ApiEvent, ApiRider, RiderProfile, Season};
use crate::fetch::FetchError;
use crate::{ImporterError, Result};

/// Client for the public results API. Calls go direct, not through the proxy.
pub struct PulseliveClient {
    base_url: String,
    client: reqwest::Client,
}

impl PulseliveClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("gp-importer/0.1")
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status().as_u16();
        info!(method = "GET", url = %url, status, "response");
        if status != 200 {
            return Err(FetchError::Status { url, status }.into());
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn seasons(&self) -> Result<Vec<Season>> {
        self.get_json("/results/seasons", &[]).await
    }

    /// Id of the season for `year`. A year the API does not know is an error.
    pub async fn season_id(&self, year: i32) -> Result<String> {
        self.seasons()
            .await?
            .into_iter()
            .find(|season| season.year == year)
            .map(|season| season.id)
            .ok_or_else(|| {
                ImporterError::ImportError(format!("'{year}' is not an available season"))
            })
    }

    pub async fn events(&self, season_id: &str) -> Result<Vec<ApiEvent>> {
        self.get_json("/results/events", &[("seasonUuid", season_id)])
            .await
    }

    /// Riders of the current championship, all classes.
    pub async fn riders(&self) -> Result<Vec<ApiRider>> {
        self.get_json("/riders", &[]).await
    }

    pub async fn rider(&self, rider_id: &str) -> Result<RiderProfile> {
        self.get_json(&format!("/riders/{rider_id}"), &[]).await
    }

    /// Career history of a current rider, found by full name (case-insensitive).
    pub async fn rider_history(&self, rider_name: &str) -> Result<RiderProfile> {
        let wanted = rider_name.trim().to_uppercase();
        let rider = self
            .riders()
            .await?
            .into_iter()
            .find(|rider| rider.full_name().is_some_and(|name| name.to_uppercase() == wanted))
            .ok_or_else(|| {
                ImporterError::ImportError(format!("'{rider_name}' is not a current rider"))
            })?;

        self.rider(&rider.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> PulseliveClient {
        PulseliveClient::new(format!("{}/motogp/v1/", server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    async fn mount_seasons(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/motogp/v1/results/seasons"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "s-2023", "year": 2023, "current": false},
                {"id": "s-2024", "year": 2024, "current": true}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_season_id_lookup() {
        let server = MockServer::start().await;
        mount_seasons(&server).await;
        let client = client(&server).await;

        assert_eq!(client.season_id(2024).await.unwrap(), "s-2024");
        let err = client.season_id(1900).await.unwrap_err();
        assert!(matches!(err, ImporterError::ImportError(msg) if msg.contains("1900")));
    }

    #[tokio::test]
    async fn test_events_pass_season_uuid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/motogp/v1/results/events"))
            .and(query_param("seasonUuid", "s-2024"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": "e1",
                    "name": "Grand Prix of Spain",
                    "circuit": {"name": "Circuito de Jerez", "place": "Jerez"},
                    "date_start": "2024-04-26",
                    "date_end": "2024-04-28",
                    "test": false,
                    "status": "FINISHED"
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let events = client(&server).await.events("s-2024").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name.as_deref(), Some("Grand Prix of Spain"));
    }

    async fn mount_riders(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/motogp/v1/riders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "r-93", "name": "Marc", "surname": "Marquez"},
                {"id": "r-31", "name": "Pedro", "surname": "Acosta"}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_rider_history_by_name() {
        let server = MockServer::start().await;
        mount_riders(&server).await;
        Mock::given(method("GET"))
            .and(path("/motogp/v1/riders/r-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "r-31",
                "name": "Pedro",
                "surname": "Acosta",
                "career": [
                    {"season": 2023, "number": 37, "category": {"name": "Moto2"}},
                    {"season": 2024, "number": 31, "category": {"name": "MotoGP"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client(&server).await.rider_history("pedro acosta").await.unwrap();
        assert_eq!(profile.rider.id, "r-31");
        assert_eq!(profile.career.len(), 2);
        assert_eq!(profile.career[1].season, Some(2024));
        assert_eq!(profile.career[1].number, Some(31));
    }

    #[tokio::test]
    async fn test_rider_history_unknown_name() {
        let server = MockServer::start().await;
        mount_riders(&server).await;

        let err = client(&server)
            .await
            .rider_history("Valentino Rossi")
            .await
            .unwrap_err();
        assert!(matches!(err, ImporterError::ImportError(msg) if msg.contains("Valentino Rossi")));
    }

    #[tokio::test]
    async fn test_non_200_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/motogp/v1/riders"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).await.riders().await.unwrap_err();
        assert!(matches!(
            err,
            ImporterError::FetchError(FetchError::Status { status: 500, .. })
        ));
    }
}
