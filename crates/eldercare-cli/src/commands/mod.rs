pub mod auth;
pub mod config;
pub mod emergency;
pub mod event;
pub mod med;
pub mod notify;
pub mod profile;
pub mod remind;
pub mod report;

use std::error::Error;
use std::io::Read;
use std::rc::Rc;

use chrono::NaiveDate;
use eldercare_core::{clock, App, Config, LogNotifier};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Load the config and open the application state on disk.
pub fn open_app() -> Result<App, Box<dyn Error>> {
    let config = Config::load()?;
    tracing::debug!(api = %config.api_base_url(), "opening application state");
    Ok(App::open(config, Rc::new(LogNotifier))?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `YYYY-MM-DD`, or today when absent.
pub fn date_or_today(value: Option<&str>) -> Result<NaiveDate, Box<dyn Error>> {
    match value {
        Some(v) => Ok(clock::parse_date("date", v)?),
        None => Ok(clock::today_local()),
    }
}

/// Read a JSON array of rows from a file, or from stdin when `path` is `-`.
pub fn read_rows<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, Box<dyn Error>> {
    let content = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&content)?)
}

/// Split a comma-separated list, dropping empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
