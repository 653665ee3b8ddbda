use crate::defaults::{DEFAULT_SQLMAP_ALLOWED_ACTIONS, DEFAULT_SQLMAP_DENIED_FLAGS};
use crate::{to_strings, PolicyResult, PolicyViolation};
use command_runner::CommandSpec;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Rules for the SQL injection scanner.
#[derive(Debug, Clone)]
pub struct WebScanPolicy {
    pub program: String,
    pub allowed_actions: Vec<String>,
    pub denied_flags: Vec<String>,
    pub timeout: Duration,
}

impl Default for WebScanPolicy {
    fn default() -> Self {
        Self::new("sqlmap", Duration::from_secs(120))
    }
}

impl WebScanPolicy {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            allowed_actions: to_strings(DEFAULT_SQLMAP_ALLOWED_ACTIONS),
            denied_flags: to_strings(DEFAULT_SQLMAP_DENIED_FLAGS),
            timeout,
        }
    }

    /// Check `url` and `action`, then build `<program> -u <url> --batch [<action>]`.
    ///
    /// Order: URL shape, deny-list over the raw text of both inputs, action
    /// allow-set.
    pub fn validate(&self, url: &str, action: Option<&str>) -> PolicyResult<CommandSpec> {
        check_target_url(url)?;

        let raw_action = action.unwrap_or_default();
        for text in [url, raw_action] {
            if let Some(flag) = first_denied(text, &self.denied_flags) {
                debug!(flag, "web-scan request hit deny-list");
                return Err(PolicyViolation::Blocked {
                    flag: flag.to_string(),
                });
            }
        }

        let action = raw_action.trim();
        let mut args = vec!["-u".to_string(), url.to_string(), "--batch".to_string()];
        if !action.is_empty() {
            if !self.allowed_actions.iter().any(|allowed| allowed == action) {
                return Err(PolicyViolation::NotPermitted {
                    value: action.to_string(),
                });
            }
            args.push(action.to_string());
        }

        Ok(CommandSpec::new(self.program.clone(), args, self.timeout))
    }
}

fn check_target_url(raw: &str) -> PolicyResult<()> {
    if raw.is_empty() {
        return Err(PolicyViolation::bad_input("url is required"));
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(PolicyViolation::bad_input("url must not contain whitespace"));
    }

    let parsed =
        Url::parse(raw).map_err(|err| PolicyViolation::bad_input(format!("invalid url: {err}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PolicyViolation::bad_input("url scheme must be http or https"));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(PolicyViolation::bad_input("url must name a host"));
    }

    let has_parameter = parsed.query().is_some_and(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, _)| !key.is_empty())
    });
    if !has_parameter {
        return Err(PolicyViolation::bad_input(
            "url must carry at least one key=value query parameter",
        ));
    }

    Ok(())
}

fn first_denied<'a>(text: &str, denied: &'a [String]) -> Option<&'a str> {
    let haystack = text.to_ascii_lowercase();
    denied
        .iter()
        .find(|flag| haystack.contains(&flag.to_ascii_lowercase()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> WebScanPolicy {
        WebScanPolicy::default()
    }

    #[test]
    fn url_without_query_is_bad_input() {
        let err = policy().validate("http://example.com", None).unwrap_err();
        assert_eq!(err.code(), "bad_input");
    }

    #[test]
    fn malformed_urls_are_bad_input() {
        for url in [
            "",
            "example.com/a?id=1",
            "ftp://example.com/a?id=1",
            "http://example.com/a?id",
            "http://example.com/a?=1",
            "http://example.com/a?id=1 --os-shell",
        ] {
            let err = policy().validate(url, None).unwrap_err();
            assert!(
                matches!(err, PolicyViolation::BadInput { .. }),
                "{url:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn denied_flag_in_action_is_blocked() {
        let err = policy()
            .validate("http://example.com/a?id=1", Some("--dbs --dump-all"))
            .unwrap_err();
        assert_eq!(
            err,
            PolicyViolation::Blocked {
                flag: "--dump-all".to_string()
            }
        );
    }

    #[test]
    fn deny_list_is_case_insensitive_and_scans_url() {
        let err = policy()
            .validate("http://example.com/a?id=1&x=--OS-SHELL", None)
            .unwrap_err();
        assert_eq!(err.code(), "blocked");

        let err = policy()
            .validate("http://example.com/a?id=1", Some("--Dump-All"))
            .unwrap_err();
        assert_eq!(err.code(), "blocked");
    }

    #[test]
    fn url_shape_runs_before_deny_list() {
        let err = policy()
            .validate("http://example.com", Some("--dump-all"))
            .unwrap_err();
        assert_eq!(err.code(), "bad_input");
    }

    #[test]
    fn unknown_action_is_not_permitted() {
        let err = policy()
            .validate("http://example.com/a?id=1", Some("--passwords"))
            .unwrap_err();
        assert_eq!(
            err,
            PolicyViolation::NotPermitted {
                value: "--passwords".to_string()
            }
        );
    }

    #[test]
    fn allowed_action_builds_command() {
        let spec = policy()
            .validate("http://example.com/a?id=1", Some(" --dbs "))
            .unwrap();
        assert_eq!(spec.program, "sqlmap");
        assert_eq!(
            spec.command_line(),
            "sqlmap -u http://example.com/a?id=1 --batch --dbs"
        );
        assert_eq!(spec.timeout, Duration::from_secs(120));
    }

    #[test]
    fn missing_or_blank_action_runs_bare_scan() {
        for action in [None, Some(""), Some("   ")] {
            let spec = policy()
                .validate("https://example.com/item.php?id=5&cat=2", action)
                .unwrap();
            assert_eq!(
                spec.args,
                vec!["-u", "https://example.com/item.php?id=5&cat=2", "--batch"]
            );
        }
    }
}
