use crate::domain::model::ActorId;
use crate::utils::error::{MarketError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MarketError::Config {
            message: format!("{field_name}: URL cannot be empty"),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MarketError::Config {
                message: format!("{field_name}: unsupported URL scheme: {scheme}"),
            }),
        },
        Err(e) => Err(MarketError::Config {
            message: format!("{field_name}: invalid URL format: {e}"),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MarketError::Config {
            message: format!("{field_name}: value cannot be empty or whitespace-only"),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(MarketError::Config {
            message: format!("{field_name}: value must be at least {min_value}"),
        });
    }
    Ok(())
}

fn mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<@!?(\d+)>").expect("mention regex is valid"))
}

/// Extracts actor ids from a free-form list of `<@id>` mentions, the format
/// used by manual roster syncs. Fails when the text carries no mention at all.
pub fn parse_player_mentions(raw: &str) -> Result<Vec<ActorId>> {
    let ids: Vec<ActorId> = mention_regex()
        .captures_iter(raw)
        .map(|cap| ActorId::new(&cap[1]))
        .collect();

    if ids.is_empty() {
        return Err(MarketError::Validation {
            message: "no valid player mentions found in the supplied list".to_string(),
        });
    }
    Ok(ids)
}
