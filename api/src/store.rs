use crate::bracket::BracketBuilder;
use crate::client::{ApiResult, PlayoffApi};
use crate::standings::{SeedMap, StandingsTable, build_seed_map};
use crate::{BracketEvent, BracketGame, Conference, ConferenceBracket, PlayoffBracket, SeasonType};
use log::{debug, error};
use std::collections::HashMap;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load playoff bracket";

/// Which bracket to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadRequest {
    pub season_year: u16,
    pub season_type: SeasonType,
    pub week: Option<u8>,
}

impl LoadRequest {
    pub fn new(season_year: u16, season_type: SeasonType, week: Option<u8>) -> Self {
        Self { season_year, season_type, week }
    }
}

/// Everything a single successful load produces.
#[derive(Debug, Clone, Default)]
pub struct BracketSnapshot {
    pub standings: StandingsTable,
    pub seeds: SeedMap,
    pub events: Vec<BracketEvent>,
}

/// Fetch standings (regular season) then the bracket events. A standings
/// failure aborts before the bracket request is made.
pub async fn fetch_snapshot(api: &PlayoffApi, request: &LoadRequest) -> ApiResult<BracketSnapshot> {
    debug!(
        "loading bracket for {} (season type {}, week {:?})",
        request.season_year,
        request.season_type.code(),
        request.week
    );
    let rows = api
        .fetch_standings(request.season_year, SeasonType::Regular)
        .await?;
    let seeds = build_seed_map(&rows);

    let events = api
        .fetch_playoff_bracket(request.season_year, request.season_type, request.week)
        .await?;

    Ok(BracketSnapshot {
        standings: StandingsTable::new(rows),
        seeds,
        events: dedupe_by_id(events),
    })
}

/// Later duplicates replace earlier ones but keep the earlier position.
pub fn dedupe_by_id(events: Vec<BracketEvent>) -> Vec<BracketEvent> {
    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut out: Vec<BracketEvent> = Vec::with_capacity(events.len());
    for event in events {
        match position.get(&event.id) {
            Some(&idx) => out[idx] = event,
            None => {
                position.insert(event.id, out.len());
                out.push(event);
            }
        }
    }
    out
}

/// Owns the last loaded bracket snapshot and the load status.
///
/// Bracket views are recomputed from the snapshot on every call. While a load
/// is in flight the previous snapshot stays readable.
#[derive(Debug, Clone)]
pub struct PlayoffBracketStore {
    pub season_year: u16,
    pub season_type: SeasonType,
    pub season_week: u8,
    pub loading: bool,
    pub error: Option<String>,
    snapshot: BracketSnapshot,
}

impl Default for PlayoffBracketStore {
    fn default() -> Self {
        Self {
            season_year: 0,
            season_type: SeasonType::Postseason,
            season_week: 1,
            loading: false,
            error: None,
            snapshot: BracketSnapshot::default(),
        }
    }
}

impl PlayoffBracketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[BracketEvent] {
        &self.snapshot.events
    }

    pub fn standings(&self) -> &StandingsTable {
        &self.snapshot.standings
    }

    pub fn seeds(&self) -> &SeedMap {
        &self.snapshot.seeds
    }

    /// Record the requested season and mark the store as loading.
    pub fn begin_load(&mut self, request: &LoadRequest) {
        self.loading = true;
        self.error = None;
        self.season_year = request.season_year;
        self.season_type = request.season_type;
        self.season_week = request.week.unwrap_or(1);
    }

    pub fn apply_snapshot(&mut self, snapshot: BracketSnapshot) {
        debug!(
            "bracket snapshot: {} events, {} seeded teams",
            snapshot.events.len(),
            snapshot.seeds.len()
        );
        self.snapshot = snapshot;
        self.loading = false;
    }

    /// Keep the previous snapshot and surface the failure.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        let message = message.into();
        let message = if message.trim().is_empty() {
            LOAD_FAILED_MESSAGE.to_owned()
        } else {
            message
        };
        error!("bracket load failed: {message}");
        self.error = Some(message);
        self.loading = false;
    }

    pub fn finish_load(&mut self, result: ApiResult<BracketSnapshot>) -> ApiResult<()> {
        match result {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                Ok(())
            }
            Err(e) => {
                self.fail_load(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch and install a new snapshot. The error is stored and returned.
    pub async fn load(&mut self, api: &PlayoffApi, request: LoadRequest) -> ApiResult<()> {
        self.begin_load(&request);
        let result = fetch_snapshot(api, &request).await;
        self.finish_load(result)
    }

    pub fn builder(&self) -> BracketBuilder<'_> {
        BracketBuilder::new(&self.snapshot.standings, &self.snapshot.seeds)
    }

    pub fn afc_bracket(&self) -> ConferenceBracket {
        self.builder().conference_bracket(Conference::Afc, &self.snapshot.events)
    }

    pub fn nfc_bracket(&self) -> ConferenceBracket {
        self.builder().conference_bracket(Conference::Nfc, &self.snapshot.events)
    }

    pub fn super_bowl(&self) -> BracketGame {
        self.builder().super_bowl(&self.snapshot.events)
    }

    pub fn bracket(&self) -> PlayoffBracket {
        self.builder().bracket(&self.snapshot.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use crate::{EventSide, PlayoffRound};
    use mockito::{Matcher, Server};

    const STANDINGS: &str = r#"{ "data": [
        { "teamId": 10, "teamName": "Kansas City Chiefs", "conference": "AFC", "wins": 15, "losses": 2, "playoffSeed": 1 },
        { "teamId": 11, "teamName": "Buffalo Bills", "conference": "AFC", "wins": 13, "losses": 4, "playoffSeed": 2 },
        { "teamId": 13, "teamName": "Houston Texans", "conference": "AFC", "wins": 10, "losses": 7, "playoffSeed": 4 },
        { "teamId": 14, "teamName": "Los Angeles Chargers", "conference": "AFC", "wins": 11, "losses": 6, "playoffSeed": 5 },
        { "teamId": 30, "teamName": "Denver Broncos", "conference": "AFC", "wins": 10, "losses": 7, "playoffSeed": null }
    ] }"#;

    const EVENTS: &str = r#"{ "events": [
        { "id": 1, "date": "2025-01-11T21:30:00Z", "status": "Scheduled",
          "homeTeamName": "Houston Texans", "awayTeamName": "Los Angeles Chargers",
          "homeTeamDbId": 13, "awayTeamDbId": 14, "homeScore": 0, "awayScore": 0,
          "playoffRound": "WILD_CARD", "playoffConference": "AFC", "homeSeed": 4, "awaySeed": 5 },
        { "id": 2, "status": "Scheduled", "homeTeamName": "TBD", "awayTeamName": "TBD",
          "playoffRound": "SUPER_BOWL" },
        { "id": 1, "date": "2025-01-11T21:30:00Z", "status": "Final",
          "homeTeamName": "Houston Texans", "awayTeamName": "Los Angeles Chargers",
          "homeTeamDbId": 13, "awayTeamDbId": 14, "homeScore": 32, "awayScore": 12,
          "playoffRound": "WILD_CARD", "playoffConference": "AFC", "homeSeed": 4, "awaySeed": 5 }
    ] }"#;

    fn event(id: i64, status: &str) -> BracketEvent {
        BracketEvent {
            id,
            date: None,
            status: status.into(),
            conference: Some(Conference::Afc),
            round: Some(PlayoffRound::WildCard),
            home: EventSide::default(),
            away: EventSide::default(),
        }
    }

    async fn mock_standings(server: &mut Server, status: usize, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/standings")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("year".into(), "2024".into()),
                Matcher::UrlEncoded("seasonType".into(), "2".into()),
            ]))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    #[test]
    fn dedupe_keeps_last_occurrence_in_first_position() {
        let events = vec![event(1, "Scheduled"), event(2, "Final"), event(1, "Final")];
        let deduped = dedupe_by_id(events);
        assert_eq!(deduped.len(), 2);
        assert_eq!((deduped[0].id, deduped[0].status.as_str()), (1, "Final"));
        assert_eq!(deduped[1].id, 2);
    }

    #[test]
    fn begin_load_records_season_and_defaults_week() {
        let mut store = PlayoffBracketStore::new();
        store.error = Some("previous".into());
        store.begin_load(&LoadRequest::new(2024, SeasonType::Postseason, None));
        assert!(store.loading);
        assert!(store.error.is_none());
        assert_eq!((store.season_year, store.season_week), (2024, 1));

        store.begin_load(&LoadRequest::new(2023, SeasonType::Postseason, Some(3)));
        assert_eq!((store.season_year, store.season_week), (2023, 3));
    }

    #[test]
    fn stale_snapshot_is_readable_while_loading() {
        let mut store = PlayoffBracketStore::new();
        store.apply_snapshot(BracketSnapshot {
            events: vec![event(1, "Final")],
            ..Default::default()
        });
        store.begin_load(&LoadRequest::new(2024, SeasonType::Postseason, None));
        assert!(store.loading);
        assert_eq!(store.events().len(), 1);
        assert_eq!(store.afc_bracket().wild_card.len(), 3);
    }

    #[test]
    fn fail_load_uses_fallback_message() {
        let mut store = PlayoffBracketStore::new();
        store.loading = true;
        store.fail_load("  ");
        assert!(!store.loading);
        assert_eq!(store.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn load_builds_bracket_from_standings_and_events() {
        let mut server = Server::new_async().await;
        let _standings = mock_standings(&mut server, 200, STANDINGS).await;
        let _events = server
            .mock("GET", "/schedules/playoffBracket")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("seasonYear".into(), "2024".into()),
                Matcher::UrlEncoded("seasonType".into(), "3".into()),
            ]))
            .with_status(200)
            .with_body(EVENTS)
            .create_async()
            .await;

        let api = PlayoffApi::with_base_url(server.url());
        let mut store = PlayoffBracketStore::new();
        store
            .load(&api, LoadRequest::new(2024, SeasonType::Postseason, None))
            .await
            .expect("load succeeds");

        assert!(!store.loading);
        assert!(store.error.is_none());
        assert_eq!(store.events().len(), 2, "duplicate event id collapsed");
        assert_eq!(store.seeds().len(), 4, "Broncos have no seed");

        let afc = store.afc_bracket();
        let opener = &afc.wild_card[0];
        assert_eq!(opener.slot, "AFC-WC-4-5");
        assert_eq!((opener.top_score, opener.bottom_score), (Some(12), Some(32)));
        assert_eq!(opener.winner_id, Some(13));
        assert_eq!(opener.bottom.as_ref().unwrap().record, "10-7");
        assert_eq!(opener.top.as_ref().unwrap().name, "Chargers");

        let sb = store.super_bowl();
        assert_eq!(sb.slot, "SB");
        assert!(sb.top.is_none() && sb.bottom.is_none(), "TBD Super Bowl slot renders empty");
        assert!(store.nfc_bracket().wild_card.iter().all(BracketGame::is_empty));
    }

    #[tokio::test]
    async fn standings_failure_skips_bracket_fetch_and_keeps_state() {
        let mut server = Server::new_async().await;
        let _standings = mock_standings(&mut server, 500, "").await;
        let events = server
            .mock("GET", "/schedules/playoffBracket")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let api = PlayoffApi::with_base_url(server.url());
        let mut store = PlayoffBracketStore::new();
        store.apply_snapshot(BracketSnapshot {
            events: vec![event(99, "Final")],
            ..Default::default()
        });

        let err = store
            .load(&api, LoadRequest::new(2024, SeasonType::Postseason, Some(2)))
            .await
            .unwrap_err();

        events.assert_async().await;
        assert!(matches!(err, ApiError::Api(_, _)));
        assert!(!store.loading);
        assert!(store.error.as_deref().is_some_and(|m| m.contains("standings")));
        assert_eq!(store.events().len(), 1);
        assert_eq!(store.events()[0].id, 99);
        assert_eq!(store.season_week, 2);
    }
}
