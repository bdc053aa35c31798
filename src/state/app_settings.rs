use chrono::{Datelike, Local, NaiveDate};
use log::LevelFilter;
use playoff_api::SeasonType;
use playoff_api::client::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_url: String,
    pub season_year: u16,
    pub season_type: SeasonType,
    pub week: Option<u8>,
    pub credentials: Option<(String, String)>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: DEFAULT_BASE_URL.to_owned(),
            season_year: current_season_year(Local::now().date_naive()),
            season_type: SeasonType::Postseason,
            week: None,
            credentials: None,
        }
    }
}

impl AppSettings {
    /// Defaults overridden by `PLAYOFFTUI_*` environment variables.
    pub fn load() -> Self {
        let mut settings = Self::default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| var(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        if let Some(url) = var("PLAYOFFTUI_API_URL") {
            self.api_url = url;
        }
        if let Some(year) = var("PLAYOFFTUI_SEASON").and_then(|v| v.parse().ok()) {
            self.season_year = year;
        }
        if let Some(season_type) = var("PLAYOFFTUI_SEASON_TYPE")
            .and_then(|v| v.parse().ok())
            .and_then(SeasonType::from_code)
        {
            self.season_type = season_type;
        }
        if let Some(week) = var("PLAYOFFTUI_WEEK").and_then(|v| v.parse().ok()) {
            self.week = Some(week);
        }
        if let Some(level) = var("PLAYOFFTUI_LOG").and_then(|v| v.parse().ok()) {
            self.log_level = Some(level);
        }
        if let (Some(user), Some(password)) = (var("PLAYOFFTUI_USER"), var("PLAYOFFTUI_PASSWORD")) {
            self.credentials = Some((user, password));
        }
    }
}

/// NFL seasons are named for the year they kick off; January and February
/// playoff games belong to the previous year's season.
pub fn current_season_year(today: NaiveDate) -> u16 {
    let year = if today.month() < 9 { today.year() - 1 } else { today.year() };
    year.clamp(0, i32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> AppSettings {
        let env: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let mut settings = AppSettings::default();
        settings.apply_env(|key| env.get(key).cloned());
        settings
    }

    #[test]
    fn season_year_rolls_back_before_september() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let aug = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
        let sep = NaiveDate::from_ymd_opt(2025, 9, 4).unwrap();
        assert_eq!(current_season_year(jan), 2024);
        assert_eq!(current_season_year(aug), 2024);
        assert_eq!(current_season_year(sep), 2025);
    }

    #[test]
    fn env_overrides_defaults() {
        let settings = settings_from(&[
            ("PLAYOFFTUI_API_URL", "https://league.example/api"),
            ("PLAYOFFTUI_SEASON", "2023"),
            ("PLAYOFFTUI_SEASON_TYPE", "2"),
            ("PLAYOFFTUI_WEEK", "3"),
            ("PLAYOFFTUI_LOG", "debug"),
            ("PLAYOFFTUI_USER", "coach"),
            ("PLAYOFFTUI_PASSWORD", "hunter2"),
        ]);
        assert_eq!(settings.api_url, "https://league.example/api");
        assert_eq!(settings.season_year, 2023);
        assert_eq!(settings.season_type, SeasonType::Regular);
        assert_eq!(settings.week, Some(3));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert_eq!(
            settings.credentials,
            Some(("coach".to_string(), "hunter2".to_string()))
        );
    }

    #[test]
    fn invalid_or_blank_env_values_are_ignored() {
        let settings = settings_from(&[
            ("PLAYOFFTUI_API_URL", "   "),
            ("PLAYOFFTUI_SEASON_TYPE", "9"),
            ("PLAYOFFTUI_WEEK", "wild"),
            ("PLAYOFFTUI_USER", "coach"),
        ]);
        assert_eq!(settings.api_url, DEFAULT_BASE_URL);
        assert_eq!(settings.season_type, SeasonType::Postseason);
        assert_eq!(settings.week, None);
        assert!(settings.credentials.is_none(), "password is required too");
    }
}
