use crate::StandingsRow;
use std::collections::HashMap;

/// Team id → playoff seed (1–7).
pub type SeedMap = HashMap<i64, u8>;

/// Build the seed lookup from standings. Rows without a seed in 1..=7 are
/// left out rather than zero-filled.
pub fn build_seed_map(rows: &[StandingsRow]) -> SeedMap {
    rows.iter()
        .filter_map(|r| {
            let seed = r.playoff_seed?;
            (1..=7).contains(&seed).then_some((r.team_id, seed as u8))
        })
        .collect()
}

/// Trim, lowercase and collapse internal whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// "Cincinnati Bengals" -> "Bengals".
pub fn short_name(team_name: &str) -> &str {
    team_name.split_whitespace().last().unwrap_or("")
}

/// Regular-season standings for one year, with the lookups the bracket needs.
#[derive(Debug, Clone, Default)]
pub struct StandingsTable {
    rows: Vec<StandingsRow>,
}

impl StandingsTable {
    pub fn new(rows: Vec<StandingsRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[StandingsRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn by_team_id(&self, team_id: i64) -> Option<&StandingsRow> {
        self.rows.iter().find(|r| r.team_id == team_id)
    }

    pub fn by_name(&self, name: &str) -> Option<&StandingsRow> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.rows.iter().find(|r| normalize_name(&r.team_name) == wanted)
    }

    /// "W-L", or "W-L-T" once a tie is on the books. Without ties this is the
    /// plain two-part record other clients show; the tie column is an
    /// extension so a 10-6-1 team doesn't read as 10-6.
    pub fn record(&self, team_id: i64) -> Option<String> {
        let row = self.by_team_id(team_id)?;
        if row.ties > 0 {
            Some(format!("{}-{}-{}", row.wins, row.losses, row.ties))
        } else {
            Some(format!("{}-{}", row.wins, row.losses))
        }
    }

    pub fn display_name(&self, team_id: i64) -> Option<String> {
        let row = self.by_team_id(team_id)?;
        let short = short_name(&row.team_name);
        if short.is_empty() { None } else { Some(short.to_owned()) }
    }

    /// Logos live under `/logos/{afc|nfc}/{ShortName}.{avif|webp}`.
    pub fn logo_url(&self, team_id: i64) -> Option<String> {
        let row = self.by_team_id(team_id)?;
        let short = short_name(&row.team_name);
        if short.is_empty() || row.conference.trim().is_empty() {
            return None;
        }
        let ext = if short == "Chargers" { "webp" } else { "avif" };
        Some(format!(
            "/logos/{}/{}.{}",
            row.conference.trim().to_lowercase(),
            short,
            ext
        ))
    }
}
