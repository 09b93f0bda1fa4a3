use anyhow::Error;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regions that host the batch avatar synthesis API. The region selects the
/// service host prefix, e.g. `westus2.customvoice.api.speech.microsoft.com`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
pub enum Region {
    #[serde(rename = "westus2")]
    #[value(name = "westus2")]
    WestUs2,
    #[serde(rename = "westeurope")]
    #[value(name = "westeurope")]
    WestEurope,
    #[serde(rename = "southeastasia")]
    #[value(name = "southeastasia")]
    SoutheastAsia,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::WestUs2 => "westus2",
            Region::WestEurope => "westeurope",
            Region::SoutheastAsia => "southeastasia",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "westus2" => Ok(Region::WestUs2),
            "westeurope" => Ok(Region::WestEurope),
            "southeastasia" => Ok(Region::SoutheastAsia),
            other => Err(anyhow::anyhow!(
                "unknown region: {} (expected westus2, westeurope or southeastasia)",
                other
            )),
        }
    }
}

/// Credentials for the speech service, passed into the client at construction
/// and immutable for the process lifetime. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub subscription_key: String,
    pub region: Region,
}

// Keep the subscription key out of debug output and logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("subscription_key", &"***")
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub region: Option<Region>,
    pub poll_interval_secs: Option<u64>,
    pub wait_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let config = toml::from_str(
            &std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {}", e, path))?,
        )?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_region_roundtrip() {
        for (name, region) in [
            ("westus2", Region::WestUs2),
            ("westeurope", Region::WestEurope),
            ("southeastasia", Region::SoutheastAsia),
        ] {
            assert_eq!(name.parse::<Region>().unwrap(), region);
            assert_eq!(region.to_string(), name);
        }
        assert!("eastus".parse::<Region>().is_err());
    }

    #[test]
    fn test_config_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\nregion = \"westeurope\"\npoll_interval_secs = 2"
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.region, Some(Region::WestEurope));
        assert_eq!(config.poll_interval_secs, Some(2));
        assert_eq!(config.wait_timeout_secs, None);
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let credentials = Credentials {
            subscription_key: "super-secret".to_string(),
            region: Region::WestUs2,
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("super-secret"));
    }
}
