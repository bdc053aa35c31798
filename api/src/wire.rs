/// Backend wire types: serde shapes for deserializing REST responses.
/// These map to the clean domain types via the mapping functions in client.rs.
/// Optional fields are `Option` rather than `#[serde(default)]` so that an
/// explicit `null` decodes too.
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Playoff bracket  (GET /schedules/playoffBracket)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: i64,
    pub date: Option<String>,
    pub status: Option<String>,
    pub status_detail: Option<String>,

    pub home_team_id: Option<i64>,
    pub away_team_id: Option<i64>,
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,

    pub home_logo_local: Option<String>,
    pub away_logo_local: Option<String>,

    pub home_score: Option<u16>,
    pub away_score: Option<u16>,

    pub playoff_round: Option<String>,
    pub playoff_conference: Option<String>,

    pub home_seed: Option<u8>,
    pub away_seed: Option<u8>,

    pub home_team_db_id: Option<i64>,
    pub away_team_db_id: Option<i64>,
}

/// Pull the event array out of `{ events }` or `{ data: { events } }`.
/// Any other shape yields no events.
pub fn event_values(payload: Value) -> Vec<Value> {
    let Value::Object(mut obj) = payload else {
        return Vec::new();
    };

    if let Some(Value::Array(events)) = obj.remove("events") {
        return events;
    }

    match obj.remove("data") {
        Some(Value::Object(mut data)) => match data.remove("events") {
            Some(Value::Array(events)) => events,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Standings  (GET /standings)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StandingDto {
    pub team_id: i64,
    pub team_name: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub wins: Option<u16>,
    pub losses: Option<u16>,
    pub ties: Option<u16>,
    pub points_for: Option<u32>,
    pub points_against: Option<u32>,
    pub playoff_seed: Option<i32>,
}

/// Standings arrive either bare or wrapped as `{ data: [...] }`.
pub fn standing_values(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Auth  (POST /auth/*)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_read_from_top_level_envelope() {
        let payload = json!({ "success": true, "events": [{ "id": 1 }, { "id": 2 }] });
        assert_eq!(event_values(payload).len(), 2);
    }

    #[test]
    fn events_read_from_data_envelope() {
        let payload = json!({ "data": { "seasonYear": 2024, "events": [{ "id": 7 }] } });
        let events = event_values(payload);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["id"], 7);
    }

    #[test]
    fn unknown_event_shapes_are_empty() {
        assert!(event_values(json!([{ "id": 1 }])).is_empty());
        assert!(event_values(json!({ "data": [{ "id": 1 }] })).is_empty());
        assert!(event_values(json!({ "events": "nope" })).is_empty());
        assert!(event_values(json!(null)).is_empty());
    }

    #[test]
    fn standings_accept_bare_and_wrapped_arrays() {
        assert_eq!(standing_values(json!([{ "teamId": 1 }])).len(), 1);
        assert_eq!(standing_values(json!({ "data": [{ "teamId": 1 }, { "teamId": 2 }] })).len(), 2);
        assert!(standing_values(json!({ "rows": [] })).is_empty());
    }

    #[test]
    fn event_dto_tolerates_missing_fields() {
        let dto: EventDto = serde_json::from_value(json!({
            "id": 401,
            "status": "Final",
            "homeTeamName": "Buffalo Bills",
            "awayTeamName": "TBD",
            "homeSeed": 2,
            "playoffRound": "WILD_CARD",
            "playoffConference": "AFC"
        }))
        .unwrap();
        assert_eq!(dto.id, 401);
        assert_eq!(dto.home_seed, Some(2));
        assert_eq!(dto.away_seed, None);
        assert!(dto.date.is_none());
        assert!(dto.home_team_db_id.is_none());
    }

    #[test]
    fn null_fields_decode_instead_of_failing() {
        let dto: EventDto = serde_json::from_value(json!({
            "id": 9,
            "status": null,
            "homeTeamName": null,
            "awayTeamName": "Buffalo Bills",
            "homeScore": null
        }))
        .unwrap();
        assert!(dto.home_team_name.is_none());
        assert!(dto.status.is_none());

        let row: StandingDto = serde_json::from_value(json!({
            "teamId": 4,
            "teamName": null,
            "wins": null,
            "division": null
        }))
        .unwrap();
        assert!(row.team_name.is_none());
        assert!(row.wins.is_none());
    }
}
