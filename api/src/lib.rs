pub mod auth;
pub mod bracket;
pub mod client;
pub mod standings;
pub mod store;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the backend wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    #[serde(rename = "AFC")]
    Afc,
    #[serde(rename = "NFC")]
    Nfc,
}

impl Conference {
    pub fn label(&self) -> &'static str {
        match self {
            Conference::Afc => "AFC",
            Conference::Nfc => "NFC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AFC" => Some(Conference::Afc),
            "NFC" => Some(Conference::Nfc),
            _ => None,
        }
    }
}

/// Playoff rounds, ordered from first to last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayoffRound {
    WildCard,
    Divisional,
    Conference,
    SuperBowl,
}

impl PlayoffRound {
    pub fn label(&self) -> &'static str {
        match self {
            PlayoffRound::WildCard => "Wild Card",
            PlayoffRound::Divisional => "Divisional",
            PlayoffRound::Conference => "Conference",
            PlayoffRound::SuperBowl => "Super Bowl",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WILD_CARD" => Some(PlayoffRound::WildCard),
            "DIVISIONAL" => Some(PlayoffRound::Divisional),
            "CONFERENCE" => Some(PlayoffRound::Conference),
            "SUPER_BOWL" => Some(PlayoffRound::SuperBowl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// Backend season type code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonType {
    Preseason,
    Regular,
    #[default]
    Postseason,
}

impl SeasonType {
    pub fn code(&self) -> u8 {
        match self {
            SeasonType::Preseason => 1,
            SeasonType::Regular => 2,
            SeasonType::Postseason => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(SeasonType::Preseason),
            2 => Some(SeasonType::Regular),
            3 => Some(SeasonType::Postseason),
            _ => None,
        }
    }
}

/// One side (home or away) of a raw bracket event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSide {
    pub name: String,
    /// Upstream (ESPN) team id; -1 or absent for TBD.
    pub external_id: Option<i64>,
    /// Backend `Team.id`.
    pub team_id: Option<i64>,
    pub seed: Option<u8>,
    pub score: Option<u16>,
    pub logo: Option<String>,
}

/// A sourced playoff game record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketEvent {
    pub id: i64,
    pub date: Option<DateTime<Utc>>,
    pub status: String,
    pub conference: Option<Conference>,
    pub round: Option<PlayoffRound>,
    pub home: EventSide,
    pub away: EventSide,
}

impl BracketEvent {
    pub fn side(&self, side: Side) -> &EventSide {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("scheduled")
    }

    /// "final", "complete" or "completed" anywhere in the status text.
    pub fn is_finalish(&self) -> bool {
        let s = self.status.trim().to_lowercase();
        s.contains("final") || s.contains("complete") || s.contains("completed")
    }

    /// `"{lo}-{hi}"` when both seeds are known.
    pub fn seed_pair_key(&self) -> Option<String> {
        let home = self.home.seed?;
        let away = self.away.seed?;
        Some(format!("{}-{}", home.min(away), home.max(away)))
    }

    pub fn has_seed(&self, seed: u8) -> bool {
        self.home.seed == Some(seed) || self.away.seed == Some(seed)
    }

    /// Sort key for chronological ordering; undated events sort last.
    pub fn sort_time(&self) -> i64 {
        self.date.map(|d| d.timestamp_millis()).unwrap_or(i64::MAX)
    }
}

/// One team's regular-season record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingsRow {
    pub team_id: i64,
    pub team_name: String,
    pub conference: String,
    pub division: String,
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
    pub points_for: u32,
    pub points_against: u32,
    /// Raw backend value; only 1..=7 counts as a playoff seed.
    pub playoff_seed: Option<i32>,
}

// ---------------------------------------------------------------------------
// View model, rebuilt from the current snapshot on every read
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTeam {
    pub id: i64,
    /// 0 = unknown, not displayed.
    pub seed: u8,
    pub name: String,
    pub logo_url: String,
    /// "W-L", empty when unavailable.
    pub record: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketGame {
    pub slot: String,
    /// Away team.
    pub top: Option<BracketTeam>,
    /// Home team.
    pub bottom: Option<BracketTeam>,
    pub top_score: Option<u16>,
    pub bottom_score: Option<u16>,
    pub winner_id: Option<i64>,
}

impl BracketGame {
    /// A slot with no event behind it yet.
    pub fn empty(slot: impl Into<String>) -> Self {
        Self { slot: slot.into(), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none()
    }

    pub fn winner(&self) -> Option<&BracketTeam> {
        let winner_id = self.winner_id?;
        [self.top.as_ref(), self.bottom.as_ref()]
            .into_iter()
            .flatten()
            .find(|t| t.id == winner_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceBracket {
    pub conference: Conference,
    /// Slot order 4-5, 3-6, 2-7.
    pub wild_card: [BracketGame; 3],
    /// The game holding the #1 seed comes first.
    pub divisional: [BracketGame; 2],
    pub championship: BracketGame,
    pub champion: Option<BracketTeam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffBracket {
    pub afc: ConferenceBracket,
    pub nfc: ConferenceBracket,
    pub super_bowl: BracketGame,
}
