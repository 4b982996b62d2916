use std::path::PathBuf;

use deskpulse_domain::{Environment, Error, Result, DEFAULT_API_URL, DEFAULT_WORKSPACE};
use url::Url;

/// Reads the environment, after loading a `.env` file if one exists.
pub fn load_environment() -> Result<Environment> {
    dotenv::dotenv().ok();
    let base_path = dirs::config_dir()
        .map(|dir| dir.join("deskpulse"))
        .unwrap_or(PathBuf::from(".").join(".deskpulse"));

    environment_from(|name| std::env::var(name).ok(), base_path)
}

fn parse_url(name: &'static str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|source| Error::InvalidUrl { name, source })
}

pub(crate) fn environment_from(
    lookup: impl Fn(&str) -> Option<String>,
    base_path: PathBuf,
) -> Result<Environment> {
    let var = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let token = var("DESKPULSE_TOKEN")
        .or_else(|| var("INTERCOM_TOKEN"))
        .ok_or(Error::MissingToken)?;

    // Url::join drops the last segment of a base without a trailing slash.
    let mut api_url = var("DESKPULSE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    if !api_url.ends_with('/') {
        api_url.push('/');
    }
    let api_url = parse_url("DESKPULSE_API_URL", &api_url)?;

    let slack_webhook = match var("DESKPULSE_SLACK_WEBHOOK") {
        Some(webhook) => Some(parse_url("DESKPULSE_SLACK_WEBHOOK", &webhook)?),
        None => var("SLACK_WEBHOOK")
            .map(|webhook| parse_url("SLACK_WEBHOOK", &webhook))
            .transpose()?,
    };

    Ok(Environment {
        token,
        api_url,
        workspace_id: var("DESKPULSE_WORKSPACE").unwrap_or_else(|| DEFAULT_WORKSPACE.to_string()),
        slack_webhook,
        base_path,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Environment> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment_from(|name| vars.get(name).cloned(), PathBuf::from("/tmp/deskpulse"))
    }

    #[test]
    fn test_defaults() {
        let actual = load(&[("INTERCOM_TOKEN", "abc")]).unwrap();

        assert_eq!(actual.token, "abc");
        assert_eq!(actual.api_url.as_str(), "https://api.intercom.io/");
        assert_eq!(actual.workspace_id, "xwvpdtlu");
        assert_eq!(actual.slack_webhook, None);
        assert_eq!(actual.log_path(), PathBuf::from("/tmp/deskpulse/logs"));
    }

    #[test]
    fn test_own_token_wins() {
        let actual = load(&[("DESKPULSE_TOKEN", "mine"), ("INTERCOM_TOKEN", "legacy")]).unwrap();
        assert_eq!(actual.token, "mine");
    }

    #[test]
    fn test_missing_or_blank_token() {
        assert!(matches!(load(&[]), Err(Error::MissingToken)));
        assert!(matches!(load(&[("DESKPULSE_TOKEN", "  ")]), Err(Error::MissingToken)));
    }

    #[test]
    fn test_overrides() {
        let actual = load(&[
            ("DESKPULSE_TOKEN", "t"),
            ("DESKPULSE_API_URL", "http://localhost:8080/api"),
            ("DESKPULSE_WORKSPACE", "ws9"),
            ("SLACK_WEBHOOK", "https://hooks.slack.com/services/x"),
        ])
        .unwrap();

        assert_eq!(actual.api_url.as_str(), "http://localhost:8080/api/");
        assert_eq!(actual.workspace_id, "ws9");
        assert_eq!(
            actual.slack_webhook.map(String::from),
            Some("https://hooks.slack.com/services/x".to_string())
        );
    }

    #[test]
    fn test_invalid_url_names_the_variable() {
        let actual = load(&[("DESKPULSE_TOKEN", "t"), ("DESKPULSE_SLACK_WEBHOOK", "not a url")]);
        assert!(matches!(actual, Err(Error::InvalidUrl { name: "DESKPULSE_SLACK_WEBHOOK", .. })));
    }
}
