use crate::wire::{EventDto, StandingDto, TokenResponse, event_values, standing_values};
use crate::{BracketEvent, Conference, EventSide, PlayoffRound, SeasonType, StandingsRow};
use chrono::Utc;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// REST client for the league backend.
#[derive(Debug, Clone)]
pub struct PlayoffApi {
    client: Client,
    base_url: String,
    timeout: Duration,
    access_token: Option<String>,
}

impl Default for PlayoffApi {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Auth(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Auth(msg) => write!(f, "Auth error: {msg}"),
            ApiError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl PlayoffApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("playofftui/0.1 (terminal bracket viewer)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(10),
            access_token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token attached to every subsequent request.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    /// Regular/postseason standings for one season.
    pub async fn fetch_standings(
        &self,
        year: u16,
        season_type: SeasonType,
    ) -> ApiResult<Vec<StandingsRow>> {
        let url = format!("{}/standings", self.base_url);
        let query = [
            ("year", year.to_string()),
            ("seasonType", season_type.code().to_string()),
        ];
        let payload = self.get_json(&url, &query).await?;
        let rows: Vec<StandingsRow> = decode_each::<StandingDto>(standing_values(payload), "standings row")
            .into_iter()
            .map(map_standing)
            .collect();
        debug!("fetched {} standings rows for {year}", rows.len());
        Ok(rows)
    }

    /// Raw playoff events for a season, optionally narrowed to one week.
    pub async fn fetch_playoff_bracket(
        &self,
        season_year: u16,
        season_type: SeasonType,
        week: Option<u8>,
    ) -> ApiResult<Vec<BracketEvent>> {
        let url = format!("{}/schedules/playoffBracket", self.base_url);
        let mut query = vec![
            ("seasonYear", season_year.to_string()),
            ("seasonType", season_type.code().to_string()),
        ];
        if let Some(week) = week {
            query.push(("week", week.to_string()));
        }
        let payload = self.get_json(&url, &query).await?;
        let events: Vec<BracketEvent> = decode_each::<EventDto>(event_values(payload), "bracket event")
            .into_iter()
            .map(map_event)
            .collect();
        debug!("fetched {} bracket events for {season_year}", events.len());
        Ok(events)
    }

    pub async fn login(&self, user_name: &str, password: &str) -> ApiResult<String> {
        let url = format!("{}/auth/login", self.base_url);
        let body = json!({ "userName": user_name, "password": password });
        let token: TokenResponse = self.post_json(&url, &body).await?;
        Ok(token.access_token)
    }

    pub async fn refresh(&self, person_id: i64) -> ApiResult<String> {
        let url = format!("{}/auth/refresh", self.base_url);
        let token: TokenResponse = self.post_json(&url, &json!({ "personId": person_id })).await?;
        Ok(token.access_token)
    }

    pub async fn logout(&self, person_id: i64) -> ApiResult<()> {
        let url = format!("{}/auth/logout", self.base_url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&json!({ "personId": person_id }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        response.error_for_status().map_err(|e| ApiError::Api(e, url))?;
        Ok(())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        let full_url = Url::parse_with_params(url, query)
            .map_err(|e| ApiError::Other(format!("invalid url {url}: {e}")))?;
        let response = self
            .authorized(self.client.get(full_url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }

    async fn post_json<T: DeserializeOwned>(&self, url: &str, body: &Value) -> ApiResult<T> {
        let response = self
            .authorized(self.client.post(url))
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

/// Decode array elements one at a time; a bad element is skipped, not fatal.
fn decode_each<T: DeserializeOwned>(values: Vec<Value>, what: &str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<T>(v) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("skipping malformed {what}: {e}");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_event(dto: EventDto) -> BracketEvent {
    let date = dto
        .date
        .as_deref()
        .and_then(|d| chrono::DateTime::parse_from_rfc3339(d).ok())
        .map(|dt| dt.with_timezone(&Utc));

    BracketEvent {
        id: dto.id,
        date,
        status: dto.status.unwrap_or_default(),
        conference: dto.playoff_conference.as_deref().and_then(Conference::parse),
        round: dto.playoff_round.as_deref().and_then(PlayoffRound::parse),
        home: EventSide {
            name: dto.home_team_name.unwrap_or_default(),
            external_id: dto.home_team_id,
            team_id: dto.home_team_db_id,
            seed: dto.home_seed,
            score: dto.home_score,
            logo: dto.home_logo_local,
        },
        away: EventSide {
            name: dto.away_team_name.unwrap_or_default(),
            external_id: dto.away_team_id,
            team_id: dto.away_team_db_id,
            seed: dto.away_seed,
            score: dto.away_score,
            logo: dto.away_logo_local,
        },
    }
}

fn map_standing(dto: StandingDto) -> StandingsRow {
    StandingsRow {
        team_id: dto.team_id,
        team_name: dto.team_name.unwrap_or_default(),
        conference: dto.conference.unwrap_or_default(),
        division: dto.division.unwrap_or_default(),
        wins: dto.wins.unwrap_or_default(),
        losses: dto.losses.unwrap_or_default(),
        ties: dto.ties.unwrap_or_default(),
        points_for: dto.points_for.unwrap_or_default(),
        points_against: dto.points_against.unwrap_or_default(),
        playoff_seed: dto.playoff_seed,
    }
}
