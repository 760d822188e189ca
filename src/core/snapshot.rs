use crate::core::datetime;
use crate::core::filter::Selector;
use crate::core::json::RangeDocument;
use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;
use log::debug;
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  Snapshot
-------------------------------------------------------------------------------------------------*/

/// An immutable set of AWS IP Prefixes selected from one AWS IP Ranges document.
///
/// Snapshots are built completely before they are handed to the [Table](crate::Table) and are
/// never modified afterwards; a refresh publishes a new snapshot instead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    sync_token: String,
    create_date: Option<DateTime<Utc>>,
    ranges: Vec<IpNetwork>,
}

/*--------------------------------------------------------------------------------------
  Snapshot Implementation
--------------------------------------------------------------------------------------*/

impl Snapshot {
    /// Build a snapshot from a range document, keeping the prefixes selected by `selector` in
    /// document order. Entries whose prefix is not valid CIDR notation are skipped.
    pub fn build(document: &RangeDocument, selector: &Selector) -> Self {
        let mut ranges = Vec::new();
        let mut skipped = 0usize;

        for (cidr, region, service) in document.entries() {
            let prefix: IpNetwork = match cidr.parse() {
                Ok(prefix) => prefix,
                Err(error) => {
                    debug!("Skipping invalid IP prefix {cidr:?}: {error}");
                    skipped += 1;
                    continue;
                }
            };

            if selector.matches(region, service) {
                ranges.push(prefix);
            }
        }

        if skipped > 0 {
            debug!("Skipped {skipped} invalid IP prefix(es)");
        }

        Self {
            sync_token: document.sync_token.clone(),
            create_date: datetime::parse(&document.create_date),
            ranges,
        }
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// The "sync token" of the source document: its publication time in Unix epoch format.
    /// Empty for the initial (empty) snapshot.
    pub fn sync_token(&self) -> &str {
        &self.sync_token
    }

    /// The publication time of the source document, when it could be parsed.
    pub fn create_date(&self) -> Option<&DateTime<Utc>> {
        self.create_date.as_ref()
    }

    pub fn ranges(&self) -> &[IpNetwork] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /*-------------------------------------------------------------------------
      Lookup
    -------------------------------------------------------------------------*/

    /// The first prefix (in document order) containing `ip`. IPv4-mapped IPv6 addresses
    /// (`::ffff:a.b.c.d`) are compared as IPv4.
    pub fn matching_range(&self, ip: IpAddr) -> Option<&IpNetwork> {
        let ip = ip.to_canonical();
        self.ranges.iter().find(|range| range.contains(ip))
    }

    /// Check whether `ip` falls inside any of the snapshot's prefixes.
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.matching_range(ip).is_some()
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::json::tests::TEST_DOCUMENT;
    use crate::core::json::{self, PrefixEntry};
    use chrono::TimeZone;
    use test_log::test;

    pub(crate) fn test_document(entries: &[(&str, &str, &str)]) -> RangeDocument {
        RangeDocument {
            sync_token: "1640995200".to_string(),
            create_date: "2022-01-01-00-00-00".to_string(),
            prefixes: entries
                .iter()
                .map(|(ip_prefix, region, service)| PrefixEntry {
                    ip_prefix: ip_prefix.to_string(),
                    region: region.to_string(),
                    service: service.to_string(),
                })
                .collect(),
            ipv6_prefixes: vec![],
        }
    }

    #[test]
    fn test_build_selects_matching_prefixes() {
        let document = test_document(&[
            ("10.0.0.0/8", "us-east-1", "ec2"),
            ("172.16.0.0/12", "eu-west-1", "ec2"),
        ]);
        let selector = Selector::new().region("us-east-1").service("ec2");

        let snapshot = Snapshot::build(&document, &selector);

        let expected: IpNetwork = "10.0.0.0/8".parse().unwrap();
        assert_eq!(snapshot.ranges(), &[expected]);
        assert!(snapshot.contains("10.1.2.3".parse().unwrap()));
        assert!(!snapshot.contains("172.16.5.5".parse().unwrap()));
    }

    #[test]
    fn test_build_skips_malformed_prefixes() {
        let document = test_document(&[
            ("10.0.0.0/8", "us-east-1", "EC2"),
            ("not-a-cidr", "us-east-1", "EC2"),
            ("10.0.0.0/33", "us-east-1", "EC2"),
            ("192.168.0.0/16", "us-east-1", "EC2"),
        ]);

        let snapshot = Snapshot::build(&document, &Selector::new());

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_build_preserves_document_order() {
        let document = json::parse(TEST_DOCUMENT).unwrap();

        let snapshot = Snapshot::build(&document, &Selector::new());

        let expected: Vec<IpNetwork> = [
            "10.0.0.0/8",
            "172.16.0.0/12",
            "192.168.0.0/16",
            "2001:db8::/32",
        ]
        .iter()
        .map(|prefix| prefix.parse().unwrap())
        .collect();
        assert_eq!(snapshot.ranges(), expected.as_slice());
    }

    #[test]
    fn test_build_selects_ipv6_prefixes() {
        let document = json::parse(TEST_DOCUMENT).unwrap();
        let selector = Selector::new().region("us-east-1").service("ec2");

        let snapshot = Snapshot::build(&document, &selector);

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("2001:db8::1".parse().unwrap()));
        assert!(!snapshot.contains("2001:db9::1".parse().unwrap()));
    }

    #[test]
    fn test_build_metadata() {
        let document = json::parse(TEST_DOCUMENT).unwrap();

        let snapshot = Snapshot::build(&document, &Selector::new());

        assert_eq!(snapshot.sync_token(), "1640995200");
        assert_eq!(
            snapshot.create_date(),
            Some(&Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_contains_prefix_boundaries() {
        let document = test_document(&[("10.0.0.0/24", "us-east-1", "EC2")]);
        let snapshot = Snapshot::build(&document, &Selector::new());

        assert!(!snapshot.contains("9.255.255.255".parse().unwrap())); // Below network address
        assert!(snapshot.contains("10.0.0.0".parse().unwrap())); // Network address
        assert!(snapshot.contains("10.0.0.255".parse().unwrap())); // Last address
        assert!(!snapshot.contains("10.0.1.0".parse().unwrap())); // Beyond last address
    }

    #[test]
    fn test_matching_range_is_first_in_document_order() {
        let document = test_document(&[
            ("10.0.0.0/8", "us-east-1", "EC2"),
            ("10.1.0.0/16", "us-east-1", "EC2"),
        ]);
        let snapshot = Snapshot::build(&document, &Selector::new());

        let expected: IpNetwork = "10.0.0.0/8".parse().unwrap();
        assert_eq!(
            snapshot.matching_range("10.1.2.3".parse().unwrap()),
            Some(&expected)
        );
        assert_eq!(snapshot.matching_range("11.0.0.1".parse().unwrap()), None);
    }

    #[test]
    fn test_contains_ipv4_mapped_ipv6() {
        let document = test_document(&[("10.0.0.0/8", "us-east-1", "EC2")]);
        let snapshot = Snapshot::build(&document, &Selector::new());

        assert!(snapshot.contains("::ffff:10.1.2.3".parse().unwrap()));
        assert!(!snapshot.contains("::ffff:11.1.2.3".parse().unwrap()));
    }

    #[test]
    fn test_empty_snapshot_matches_nothing() {
        let snapshot = Snapshot::default();

        assert!(snapshot.is_empty());
        assert!(!snapshot.contains("10.0.0.1".parse().unwrap()));
        assert!(!snapshot.contains("::1".parse().unwrap()));
    }
}
