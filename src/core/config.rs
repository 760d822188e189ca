use crate::core::filter::Selector;
use log::{info, warn};
use std::env;
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Defaults
-------------------------------------------------------------------------------------------------*/

pub const DEFAULT_URL: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/*-------------------------------------------------------------------------------------------------
  Config Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for the [Config] struct. The [ConfigBuilder] provides setters for each
/// configuration value and a [ConfigBuilder::build] method to create a [Config] instance.
///
/// ```
/// use std::time::Duration;
///
/// let config = awsipblock::ConfigBuilder::default()
///     .url("https://ip-ranges.amazonaws.com/ip-ranges.json")
///     .refresh_interval(Duration::from_secs(5 * 60))
///     .region("us-east-1")
///     .service("EC2")
///     .build();
///
/// assert_eq!(config.refresh_interval(), Duration::from_secs(300));
/// assert_eq!(config.selector().get_region(), Some("us-east-1"));
/// ```
///
/// The [ConfigBuilder::new] method sources initial values from environment variables when set
/// and uses default values otherwise. [ConfigBuilder::default] ignores the environment.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    url: String,
    refresh_interval: Duration,
    region: String,
    service: String,
}

/*--------------------------------------------------------------------------------------
  Config Builder Implementation
--------------------------------------------------------------------------------------*/

impl Default for ConfigBuilder {
    /// Create a new [ConfigBuilder] with default configuration values.
    ///
    /// ```
    /// let config = awsipblock::ConfigBuilder::default().build();
    ///
    /// assert_eq!(config.url(), "https://ip-ranges.amazonaws.com/ip-ranges.json");
    /// assert_eq!(config.refresh_interval(), std::time::Duration::from_secs(60));
    /// assert_eq!(config.selector(), &awsipblock::Selector::new());
    /// ```
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            region: String::new(),
            service: String::new(),
        }
    }
}

impl ConfigBuilder {
    /// Create a new [ConfigBuilder] reading initial configuration values from environment
    /// variables when set and default values when they are not.
    ///
    /// The environment variables used to set the initial configuration values are:
    /// - `AWSIPBLOCK_URL`
    /// - `AWSIPBLOCK_REFRESH_INTERVAL` (seconds)
    /// - `AWSIPBLOCK_REGION`
    /// - `AWSIPBLOCK_SERVICE`
    pub fn new() -> Self {
        let default = ConfigBuilder::default();

        Self {
            url: get_env_var("AWSIPBLOCK_URL", default.url),
            refresh_interval: Duration::from_secs(
                get_env_var(
                    "AWSIPBLOCK_REFRESH_INTERVAL",
                    default.refresh_interval.as_secs(),
                ),
            ),
            region: get_env_var("AWSIPBLOCK_REGION", default.region),
            service: get_env_var("AWSIPBLOCK_SERVICE", default.service),
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Set the URL used to retrieve the AWS IP Ranges; defaults to
    /// `https://ip-ranges.amazonaws.com/ip-ranges.json`.
    pub fn url(&mut self, url: &str) -> &mut Self {
        self.url = url.to_string();
        self
    }

    /// Set the polling period of the refresh loop; defaults to 60 seconds. Intervals shorter
    /// than [MIN_REFRESH_INTERVAL] are raised to it when the [Config] is built.
    pub fn refresh_interval(&mut self, refresh_interval: Duration) -> &mut Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Only block prefixes from this AWS region (case-insensitive). Empty selects every
    /// region.
    pub fn region(&mut self, region: &str) -> &mut Self {
        self.region = region.to_string();
        self
    }

    /// Only block prefixes used by this AWS service (case-insensitive). Empty selects every
    /// service.
    pub fn service(&mut self, service: &str) -> &mut Self {
        self.service = service.to_string();
        self
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    pub fn build(&self) -> Config {
        if self.refresh_interval < MIN_REFRESH_INTERVAL {
            warn!(
                "Refresh interval {:?} is below the minimum; using {:?}",
                self.refresh_interval, MIN_REFRESH_INTERVAL
            );
        }

        Config {
            url: self.url.clone(),
            refresh_interval: self.refresh_interval.max(MIN_REFRESH_INTERVAL),
            selector: Selector::new()
                .region(&self.region)
                .service(&self.service),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Config
-------------------------------------------------------------------------------------------------*/

/// Configuration of a [Blocker](crate::Blocker): where the AWS IP Ranges are fetched from,
/// how often they are refreshed, and which prefixes are blocked.
///
/// When neither a region nor a service is configured, every AWS IP prefix is blocked.
#[derive(Debug, Clone)]
pub struct Config {
    url: String,
    refresh_interval: Duration,
    selector: Selector,
}

/*--------------------------------------------------------------------------------------
  Config Implementation
--------------------------------------------------------------------------------------*/

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::default().build()
    }
}

impl Config {
    pub fn new() -> Self {
        ConfigBuilder::new().build()
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Get and parse an environment variable value or return a default value.
fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use env::VarError;
    use test_log::test;

    /*-------------------------------------------------------------------------
      Test Environment Variable Configuration
    -------------------------------------------------------------------------*/

    /// ENV_VAR: AWSIPBLOCK_URL
    /// ENV_VAR: AWSIPBLOCK_REFRESH_INTERVAL
    /// ENV_VAR: AWSIPBLOCK_REGION
    /// ENV_VAR: AWSIPBLOCK_SERVICE
    #[test]
    fn test_environment_variable_configuration() {
        let test_env_vars = [
            ("AWSIPBLOCK_URL", "https://my-ip-ranges.com/ip-ranges.json"),
            ("AWSIPBLOCK_REFRESH_INTERVAL", "300"),
            ("AWSIPBLOCK_REGION", "us-east-1"),
            ("AWSIPBLOCK_SERVICE", "EC2"),
        ];

        let default = Config::default();

        // Store environment variable values
        let stored_env_vars: Vec<(String, std::result::Result<String, VarError>)> = test_env_vars
            .iter()
            .map(|(env_var, _)| (env_var.to_string(), env::var(env_var)))
            .collect();

        // Unset all environment variables
        test_env_vars
            .iter()
            .for_each(|(env_var, _)| env::remove_var(env_var));

        // Test default cases
        let new = Config::new();
        assert_eq!(new.url(), default.url());
        assert_eq!(new.refresh_interval(), default.refresh_interval());
        assert_eq!(new.selector(), default.selector());

        // Set all environment variables
        for (env_var, value) in test_env_vars.iter() {
            env::set_var(env_var, value);
        }

        // Test environment variable configuration
        let env_config = Config::new();
        assert_eq!(env_config.url(), "https://my-ip-ranges.com/ip-ranges.json");
        assert_eq!(env_config.refresh_interval(), Duration::from_secs(300));
        assert_eq!(env_config.selector().get_region(), Some("us-east-1"));
        assert_eq!(env_config.selector().get_service(), Some("EC2"));

        // Invalid values fall back to the defaults
        env::set_var("AWSIPBLOCK_REFRESH_INTERVAL", "five minutes");
        assert_eq!(Config::new().refresh_interval(), DEFAULT_REFRESH_INTERVAL);

        // A zero interval is raised to the minimum
        env::set_var("AWSIPBLOCK_REFRESH_INTERVAL", "0");
        assert_eq!(Config::new().refresh_interval(), MIN_REFRESH_INTERVAL);

        // Reset environment variables
        for (env_var, value) in stored_env_vars {
            match value {
                Ok(value) => env::set_var(env_var, value),
                Err(VarError::NotPresent) => env::remove_var(env_var),
                Err(VarError::NotUnicode(value)) => env::set_var(env_var, value),
            }
        }
    }

    /*-------------------------------------------------------------------------
      Test Getter and Setter Methods
    -------------------------------------------------------------------------*/

    #[test]
    fn test_getter_and_setter_methods() {
        let config = ConfigBuilder::default()
            .url("https://my-ip-ranges.com/ip-ranges.json")
            .refresh_interval(Duration::from_secs(10))
            .region("eu-west-1")
            .service("S3")
            .build();

        assert_eq!(config.url(), "https://my-ip-ranges.com/ip-ranges.json");
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(
            config.selector(),
            &Selector::new().region("eu-west-1").service("S3")
        );
    }

    #[test]
    fn test_refresh_interval_is_clamped_to_minimum() {
        let config = ConfigBuilder::default()
            .refresh_interval(Duration::ZERO)
            .build();
        assert_eq!(config.refresh_interval(), MIN_REFRESH_INTERVAL);

        let config = ConfigBuilder::default()
            .refresh_interval(Duration::from_millis(250))
            .build();
        assert_eq!(config.refresh_interval(), MIN_REFRESH_INTERVAL);

        let config = ConfigBuilder::default()
            .refresh_interval(Duration::from_secs(2))
            .build();
        assert_eq!(config.refresh_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_empty_region_and_service_select_everything() {
        let config = ConfigBuilder::default().region("").service("").build();

        assert_eq!(config.selector(), &Selector::new());
        assert!(config.selector().matches("any-region", "ANY_SERVICE"));
    }
}
