use crate::error::{Result, TenderlyError};

pub static USER_VAR: &str = "TENDERLY_USER";
pub static PROJECT_VAR: &str = "TENDERLY_PROJECT";
pub static ACCESS_KEY_VAR: &str = "TENDERLY_ACCESS_KEY";

/// Tenderly account credentials.
///
/// See the Tenderly docs on finding the project slug and user name, and on
/// generating API access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct Environment {
    pub user: String,
    pub project: String,
    pub api_key: String,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("user", &self.user)
            .field("project", &self.project)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Environment {
    pub fn new(
        user: impl Into<String>,
        project: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            project: project.into(),
            api_key: api_key.into(),
        }
    }

    /// Reads `TENDERLY_USER`, `TENDERLY_PROJECT` and `TENDERLY_ACCESS_KEY`
    /// from the process environment, after loading `.env` if there is one.
    pub fn resolve() -> Result<Self> {
        oval_utils::config::load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the three values through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| TenderlyError::Configuration(format!("{} not set", name)))
        };
        Ok(Self {
            user: require(USER_VAR)?,
            project: require(PROJECT_VAR)?,
            api_key: require(ACCESS_KEY_VAR)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_resolve_all_set() {
        let env = Environment::from_lookup(lookup_in(&[
            (USER_VAR, "alice"),
            (PROJECT_VAR, "oval"),
            (ACCESS_KEY_VAR, "secret"),
        ]))
        .unwrap();
        assert_eq!(env, Environment::new("alice", "oval", "secret"));
        assert!(!format!("{:?}", env).contains("secret"));
    }

    #[test]
    fn test_missing_or_empty_is_configuration_error() {
        let err = Environment::from_lookup(lookup_in(&[
            (USER_VAR, "alice"),
            (ACCESS_KEY_VAR, "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, TenderlyError::Configuration(ref m) if m.contains(PROJECT_VAR)));

        let err = Environment::from_lookup(lookup_in(&[
            (USER_VAR, "alice"),
            (PROJECT_VAR, "oval"),
            (ACCESS_KEY_VAR, ""),
        ]))
        .unwrap_err();
        assert!(matches!(err, TenderlyError::Configuration(ref m) if m.contains(ACCESS_KEY_VAR)));
    }
}
