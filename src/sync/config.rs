use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_PATH: &str = "data.json";
/// Environment variable that overrides the stored token
pub const TOKEN_ENV: &str = "PULSE_GITHUB_TOKEN";

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Coordinates and credential for the remote copy of the document
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            path: default_path(),
            api_base: default_api_base(),
        }
    }
}

// Keep the token out of logs
impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("path", &self.path)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Partial update to a [`SyncConfig`]; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct SyncConfigPatch {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub path: Option<String>,
    pub api_base: Option<String>,
}

impl SyncConfig {
    /// Sync runs only with a token, an owner and a repository
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty() && !self.owner.trim().is_empty() && !self.repo.trim().is_empty()
    }

    /// Path within the repository, without leading slashes; defaults when blank
    pub fn file_path(&self) -> &str {
        let trimmed = self.path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            DEFAULT_PATH
        } else {
            trimmed
        }
    }

    /// Content API URL for the configured file
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            self.owner.trim(),
            self.repo.trim(),
            self.file_path()
        )
    }

    /// Use `token` instead of the stored one when it is set and non-empty
    pub fn with_token_override(self, token: Option<String>) -> Self {
        match token.filter(|t| !t.trim().is_empty()) {
            Some(token) => Self { token, ..self },
            None => self,
        }
    }

    pub fn patched(&self, patch: SyncConfigPatch) -> Self {
        let trimmed = |v: String| v.trim().to_string();
        Self {
            token: patch.token.map(trimmed).unwrap_or_else(|| self.token.clone()),
            owner: patch.owner.map(trimmed).unwrap_or_else(|| self.owner.clone()),
            repo: patch.repo.map(trimmed).unwrap_or_else(|| self.repo.clone()),
            path: patch.path.map(trimmed).unwrap_or_else(|| self.path.clone()),
            api_base: patch.api_base.map(trimmed).unwrap_or_else(|| self.api_base.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SyncConfig {
        SyncConfig {
            token: "ghp_secret".to_string(),
            owner: "me".to_string(),
            repo: "vault".to_string(),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn test_is_configured() {
        assert!(configured().is_configured());
        assert!(!SyncConfig::default().is_configured());
        for blank in ["token", "owner", "repo"] {
            let mut config = configured();
            match blank {
                "token" => config.token = " ".to_string(),
                "owner" => config.owner.clear(),
                _ => config.repo.clear(),
            }
            assert!(!config.is_configured(), "{} blank should disable sync", blank);
        }
    }

    #[test]
    fn test_contents_url() {
        let mut config = configured();
        config.path = "/backups/data.json".to_string();
        config.api_base = "https://ghe.example.com/api/v3/".to_string();
        assert_eq!(
            config.contents_url(),
            "https://ghe.example.com/api/v3/repos/me/vault/contents/backups/data.json"
        );

        config.path = String::new();
        assert!(config.contents_url().ends_with("/contents/data.json"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", configured());
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_token_override() {
        let config = SyncConfig::default().with_token_override(Some("env-token".to_string()));
        assert_eq!(config.token, "env-token");
        let config = configured().with_token_override(Some("  ".to_string()));
        assert_eq!(config.token, "ghp_secret");
    }

    #[test]
    fn test_patch() {
        let patched = configured().patched(SyncConfigPatch {
            repo: Some(" notes ".to_string()),
            ..SyncConfigPatch::default()
        });
        assert_eq!(patched.repo, "notes");
        assert_eq!(patched.owner, "me");
    }

    #[test]
    fn test_defaults_from_partial_json() {
        let config: SyncConfig = serde_json::from_str(r#"{"token":"t","owner":"o","repo":"r"}"#).unwrap();
        assert_eq!(config.path, DEFAULT_PATH);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }
}
