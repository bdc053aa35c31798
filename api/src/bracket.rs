//! Playoff bracket assembly.
//!
//! Raw events are slotted into the fixed NFL template: three wild-card games
//! per conference (4v5, 3v6, 2v7), two divisional games, one conference
//! championship and the Super Bowl. Every function here is pure; the same
//! snapshot always yields the same bracket.

use crate::standings::{SeedMap, StandingsTable};
use crate::{
    BracketEvent, BracketGame, BracketTeam, Conference, ConferenceBracket, PlayoffBracket,
    PlayoffRound, Side,
};

/// Canonical wild-card seed pairs, in slot order.
pub const WILD_CARD_SLOTS: [&str; 3] = ["4-5", "3-6", "2-7"];

pub const SUPER_BOWL_SLOT: &str = "SB";

/// Builds bracket view models from one standings/seed snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BracketBuilder<'a> {
    standings: &'a StandingsTable,
    seeds: &'a SeedMap,
}

impl<'a> BracketBuilder<'a> {
    pub fn new(standings: &'a StandingsTable, seeds: &'a SeedMap) -> Self {
        Self { standings, seeds }
    }

    /// Resolve one side of an event into a display-ready team.
    ///
    /// Returns `None` for unscheduled placeholder slots (empty or "TBD" name)
    /// and when no positive team id can be found.
    pub fn resolve_team(&self, event: &BracketEvent, side: Side) -> Option<BracketTeam> {
        let raw = event.side(side);
        let name = raw.name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("TBD") {
            return None;
        }

        let internal_id = raw
            .team_id
            .or_else(|| self.standings.by_name(name).map(|r| r.team_id));
        let id = internal_id.or(raw.external_id).filter(|&id| id > 0)?;

        let seed = raw
            .seed
            .or_else(|| internal_id.and_then(|tid| self.seeds.get(&tid).copied()))
            .unwrap_or(0);

        let display_name = internal_id
            .and_then(|tid| self.standings.display_name(tid))
            .unwrap_or_else(|| name.to_owned());
        let record = internal_id
            .and_then(|tid| self.standings.record(tid))
            .unwrap_or_default();
        let logo_url = internal_id
            .and_then(|tid| self.standings.logo_url(tid))
            .or_else(|| raw.logo.clone().filter(|l| !l.is_empty()))
            .unwrap_or_default();

        Some(BracketTeam { id, seed, name: display_name, logo_url, record })
    }

    /// Convert one event into a game view. Away renders on top, home on the bottom.
    pub fn game_view(&self, slot: &str, event: Option<&BracketEvent>) -> BracketGame {
        let Some(event) = event else {
            return BracketGame::empty(slot);
        };

        let top = self.resolve_team(event, Side::Away);
        let bottom = self.resolve_team(event, Side::Home);

        let (top_score, bottom_score) = if event.is_scheduled() {
            (None, None)
        } else {
            (event.away.score, event.home.score)
        };

        let winner_id = match (&top, &bottom, top_score, bottom_score) {
            (Some(t), Some(b), Some(ts), Some(bs)) if event.is_finalish() && ts != bs => {
                Some(if ts > bs { t.id } else { b.id })
            }
            _ => None,
        };

        BracketGame {
            slot: slot.to_owned(),
            top,
            bottom,
            top_score,
            bottom_score,
            winner_id,
        }
    }

    /// Build the fixed slot layout for one conference.
    pub fn conference_bracket(
        &self,
        conference: Conference,
        events: &[BracketEvent],
    ) -> ConferenceBracket {
        let conf = conference.label();
        let in_conference: Vec<&BracketEvent> = events
            .iter()
            .filter(|e| e.conference == Some(conference))
            .collect();
        let by_round = |round: PlayoffRound| round_events(&in_conference, round);

        // Wild card: canonical seed-pair slots first, leftovers fill the gaps.
        let wild_card_events = place_wild_card(&by_round(PlayoffRound::WildCard));
        let wild_card = std::array::from_fn(|i| {
            self.game_view(&format!("{conf}-WC-{}", WILD_CARD_SLOTS[i]), wild_card_events[i])
        });

        // Divisional: the #1 seed's game leads.
        let divisional_events = by_round(PlayoffRound::Divisional);
        let first_idx = divisional_events
            .iter()
            .position(|e| e.has_seed(1))
            .or((!divisional_events.is_empty()).then_some(0));
        let first = first_idx.map(|i| divisional_events[i]);
        let second = divisional_events
            .iter()
            .enumerate()
            .find(|(i, _)| Some(*i) != first_idx)
            .map(|(_, e)| *e)
            .or_else(|| divisional_events.get(1).copied());
        let divisional = [
            self.game_view(&format!("{conf}-DIV-1"), first),
            self.game_view(&format!("{conf}-DIV-2"), second),
        ];

        let championship_event = by_round(PlayoffRound::Conference).first().copied();
        let championship = self.game_view(&format!("{conf}-CONF"), championship_event);
        let champion = champion_of(&championship);

        ConferenceBracket { conference, wild_card, divisional, championship, champion }
    }

    /// The Super Bowl event if one exists, otherwise a placeholder pairing the
    /// two conference champions (NFC on top).
    pub fn super_bowl(&self, events: &[BracketEvent]) -> BracketGame {
        let afc = self.conference_bracket(Conference::Afc, events);
        let nfc = self.conference_bracket(Conference::Nfc, events);
        self.super_bowl_between(events, nfc.champion, afc.champion)
    }

    /// Both conferences plus the Super Bowl.
    pub fn bracket(&self, events: &[BracketEvent]) -> PlayoffBracket {
        let afc = self.conference_bracket(Conference::Afc, events);
        let nfc = self.conference_bracket(Conference::Nfc, events);
        let super_bowl = self.super_bowl_between(events, nfc.champion.clone(), afc.champion.clone());
        PlayoffBracket { afc, nfc, super_bowl }
    }

    fn super_bowl_between(
        &self,
        events: &[BracketEvent],
        nfc_champion: Option<BracketTeam>,
        afc_champion: Option<BracketTeam>,
    ) -> BracketGame {
        match events.iter().find(|e| e.round == Some(PlayoffRound::SuperBowl)) {
            Some(event) => self.game_view(SUPER_BOWL_SLOT, Some(event)),
            None => placeholder_super_bowl(nfc_champion, afc_champion),
        }
    }
}

fn placeholder_super_bowl(nfc: Option<BracketTeam>, afc: Option<BracketTeam>) -> BracketGame {
    BracketGame {
        slot: SUPER_BOWL_SLOT.to_owned(),
        top: nfc,
        bottom: afc,
        ..BracketGame::default()
    }
}

/// Events for one round, earliest first. Stable, so ties keep input order.
fn round_events<'e>(events: &[&'e BracketEvent], round: PlayoffRound) -> Vec<&'e BracketEvent> {
    let mut out: Vec<&BracketEvent> = events
        .iter()
        .copied()
        .filter(|e| e.round == Some(round))
        .collect();
    out.sort_by_key(|e| e.sort_time());
    out
}

/// Assign date-sorted wild-card events to the three canonical slots.
///
/// An event takes its seed-pair slot when that slot is still open. Events with
/// unknown or non-canonical pairs, and duplicates of a filled pair, go to a
/// remainder list. An open slot at index i takes remainder entry i, so a
/// leftover whose index lands on a filled slot is not shown.
fn place_wild_card<'e>(events: &[&'e BracketEvent]) -> [Option<&'e BracketEvent>; 3] {
    let mut slots: [Option<&BracketEvent>; 3] = [None; 3];
    let mut remainder: Vec<&BracketEvent> = Vec::new();

    for &event in events {
        let idx = event
            .seed_pair_key()
            .and_then(|key| WILD_CARD_SLOTS.iter().position(|s| *s == key));
        match idx {
            Some(i) if slots[i].is_none() => slots[i] = Some(event),
            _ => remainder.push(event),
        }
    }

    std::array::from_fn(|i| slots[i].or_else(|| remainder.get(i).copied()))
}

fn champion_of(game: &BracketGame) -> Option<BracketTeam> {
    let winner_id = game.winner_id?;
    let (top, bottom) = (game.top.as_ref()?, game.bottom.as_ref()?);
    if top.id == winner_id {
        Some(top.clone())
    } else {
        Some(bottom.clone())
    }
}
