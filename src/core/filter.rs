use log::trace;

/*-------------------------------------------------------------------------------------------------
  Selector
-------------------------------------------------------------------------------------------------*/

/// Region/service selector applied to the AWS IP Prefixes when a snapshot is built.
///
/// Each dimension is optional; an unset (or empty) dimension matches any value. A selector with
/// neither dimension set is an open filter and matches every prefix in the document.
///
/// Comparisons are case-insensitive, so `"EC2"` and `"ec2"` select the same prefixes.
///
/// ```
/// let selector = awsipblock::Selector::new()
///     .region("us-east-1")
///     .service("EC2");
///
/// assert!(selector.matches("US-EAST-1", "ec2"));
/// assert!(!selector.matches("eu-west-1", "EC2"));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Selector {
    region: Option<String>,
    service: Option<String>,
}

/*--------------------------------------------------------------------------------------
  Selector Implementation
--------------------------------------------------------------------------------------*/

impl Selector {
    /// Create an open selector (matches every prefix).
    pub fn new() -> Self {
        Self::default()
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Only select prefixes from this AWS region. An empty string clears the region filter.
    pub fn region<S: AsRef<str>>(mut self, region: S) -> Self {
        self.region = non_empty(region.as_ref());
        self
    }

    /// Only select prefixes used by this AWS service. An empty string clears the service
    /// filter.
    pub fn service<S: AsRef<str>>(mut self, service: S) -> Self {
        self.service = non_empty(service.as_ref());
        self
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    pub fn get_region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn get_service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /*-------------------------------------------------------------------------
      Filter Functions
    -------------------------------------------------------------------------*/

    pub(crate) fn match_region(&self, region: &str) -> bool {
        if let Some(filter_region) = &self.region {
            filter_region.eq_ignore_ascii_case(region)
        } else {
            trace!("No `region` filter");
            true
        }
    }

    pub(crate) fn match_service(&self, service: &str) -> bool {
        if let Some(filter_service) = &self.service {
            filter_service.eq_ignore_ascii_case(service)
        } else {
            trace!("No `service` filter");
            true
        }
    }

    /// Check whether a prefix published for `region` and `service` is selected.
    pub fn matches(&self, region: &str, service: &str) -> bool {
        self.match_region(region) && self.match_service(service)
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    /*-------------------------------------------------------------------------
      Test Getter and Setter Methods
    -------------------------------------------------------------------------*/

    #[test]
    fn test_getter_and_setter_methods() {
        let selector = Selector::new().region("us-east-1").service("EC2");
        assert_eq!(selector.get_region(), Some("us-east-1"));
        assert_eq!(selector.get_service(), Some("EC2"));

        // Empty values clear the dimension
        let selector = selector.region("").service("  ");
        assert_eq!(selector.get_region(), None);
        assert_eq!(selector.get_service(), None);
        assert_eq!(selector, Selector::default());
    }

    /*-------------------------------------------------------------------------
      Test Filter Functions
    -------------------------------------------------------------------------*/

    #[test]
    fn test_match_region_and_service() {
        let selector = Selector::new().region("us-east-1").service("ec2");

        assert!(selector.matches("us-east-1", "ec2"));
        assert!(!selector.matches("us-east-1", "s3")); // Service mismatch
        assert!(!selector.matches("eu-west-1", "ec2")); // Region mismatch
        assert!(!selector.matches("eu-west-1", "s3"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let selector = Selector::new().region("US-EAST-1").service("ec2");

        assert!(selector.matches("us-east-1", "EC2"));
        assert!(selector.matches("Us-East-1", "Ec2"));
    }

    #[test]
    fn test_match_service_only() {
        let selector = Selector::new().region("").service("ec2");

        assert!(selector.matches("us-east-1", "EC2"));
        assert!(selector.matches("eu-west-1", "EC2"));
        assert!(selector.matches("GLOBAL", "ec2"));
        assert!(!selector.matches("us-east-1", "S3"));
    }

    #[test]
    fn test_match_region_only() {
        let selector = Selector::new().region("us-east-1");

        assert!(selector.matches("us-east-1", "EC2"));
        assert!(selector.matches("us-east-1", "S3"));
        assert!(!selector.matches("eu-west-1", "EC2"));
    }

    #[test]
    fn test_open_selector_matches_everything() {
        let selector = Selector::new().region("").service("");

        assert!(selector.matches("us-east-1", "EC2"));
        assert!(selector.matches("eu-west-1", "S3"));
        assert!(selector.matches("", ""));
    }
}
