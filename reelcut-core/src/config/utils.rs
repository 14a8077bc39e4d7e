//! Environment overrides for `BatchConfig`.
//!
//! Unset variables fall back to the default silently. Set but unparseable
//! values also fall back, with a warning naming the variable.

use log::warn;

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

fn get_env_parsed<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    let Ok(raw) = env::var(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("Ignoring {key}={raw:?}: not a valid value, using {default}");
            default
        }
    }
}

/// Path from `key`; unset or blank gives `None`.
pub fn get_env_opt_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .map(PathBuf::from)
}

/// Accepts `1/0`, `true/false`, `yes/no` and `on/off` in any case.
pub fn get_env_bool(key: &str, default: bool) -> bool {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!("Ignoring {key}={raw:?}: expected a boolean, using {default}");
            default
        }
    }
}

pub fn get_env_u32(key: &str, default: u32) -> u32 {
    get_env_parsed(key, default)
}

pub fn get_env_usize(key: &str, default: usize) -> usize {
    get_env_parsed(key, default)
}

pub fn get_env_f64(key: &str, default: f64) -> f64 {
    get_env_parsed(key, default)
}
