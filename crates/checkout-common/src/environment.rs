//! API environments

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Environment the components talk to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Test environment
    #[default]
    Test,
    /// Live, Europe
    Europe,
    /// Live, United States
    UnitedStates,
    /// Live, Australia
    Australia,
    /// Live, India
    India,
    /// Custom base url
    Custom(Url),
}

impl Environment {
    /// Base url, always ending with a slash
    pub fn base_url(&self) -> Result<Url, Error> {
        let url = match self {
            Self::Test => Url::parse("https://checkoutshopper-test.adyen.com/checkoutshopper/")?,
            Self::Europe => Url::parse("https://checkoutshopper-live.adyen.com/checkoutshopper/")?,
            Self::UnitedStates => {
                Url::parse("https://checkoutshopper-live-us.adyen.com/checkoutshopper/")?
            }
            Self::Australia => {
                Url::parse("https://checkoutshopper-live-au.adyen.com/checkoutshopper/")?
            }
            Self::India => Url::parse("https://checkoutshopper-live-in.adyen.com/checkoutshopper/")?,
            Self::Custom(url) => {
                if url.path().ends_with('/') {
                    url.clone()
                } else {
                    Url::parse(&format!("{url}/"))?
                }
            }
        };

        Ok(url)
    }

    /// Whether this is a test environment
    pub fn is_test(&self) -> bool {
        matches!(self, Self::Test)
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "europe" | "live" => Ok(Self::Europe),
            "united_states" | "us" => Ok(Self::UnitedStates),
            "australia" | "au" => Ok(Self::Australia),
            "india" | "in" => Ok(Self::India),
            _ => Ok(Self::Custom(Url::parse(s)?)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Europe => write!(f, "europe"),
            Self::UnitedStates => write!(f, "united_states"),
            Self::Australia => write!(f, "australia"),
            Self::India => write!(f, "india"),
            Self::Custom(url) => write!(f, "{url}"),
        }
    }
}

impl Serialize for Environment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Environment::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_base_url_gets_trailing_slash() {
        let environment =
            Environment::from_str("http://localhost:8080/checkoutshopper").expect("valid url");
        let base_url = environment.base_url().expect("valid base url");

        assert_eq!(base_url.as_str(), "http://localhost:8080/checkoutshopper/");
        assert_eq!(
            base_url.join("v1/clientKeys/key").expect("joinable").as_str(),
            "http://localhost:8080/checkoutshopper/v1/clientKeys/key"
        );
    }

    #[test]
    fn test_named_environments() {
        assert_eq!(Environment::from_str("TEST").expect("known"), Environment::Test);
        assert_eq!(Environment::from_str("live").expect("known"), Environment::Europe);
        assert!(Environment::from_str("not a url").is_err());
    }

    #[test]
    fn test_serde_uses_names_and_urls() {
        let environment: Environment = serde_json::from_str(r#""us""#).expect("known alias");
        assert_eq!(environment, Environment::UnitedStates);

        let environment: Environment =
            serde_json::from_str(r#""http://localhost:8080/checkoutshopper""#).expect("url");
        assert!(matches!(environment, Environment::Custom(_)));
        assert_eq!(
            serde_json::to_string(&environment).expect("serializable"),
            r#""http://localhost:8080/checkoutshopper""#
        );

        assert_eq!(
            serde_json::to_string(&Environment::UnitedStates).expect("serializable"),
            r#""united_states""#
        );
        assert!(serde_json::from_str::<Environment>(r#""nowhere""#).is_err());
    }
}
