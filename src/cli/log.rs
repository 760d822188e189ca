use awsipblock::Snapshot;
use log::{info, warn};
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Snapshot Summary
--------------------------------------------------------------------------------------*/

pub fn snapshot_summary(snapshot: &Snapshot) {
    let create_date = snapshot
        .create_date()
        .map(|create_date| create_date.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());

    info!("Sync token:  {}", snapshot.sync_token());
    info!("Create date: {create_date}");
    info!("Blocked {} AWS IP Prefix(es)", snapshot.len());

    if snapshot.is_empty() {
        warn!("No AWS IP Prefixes match the region and service filters");
    }
}

/*--------------------------------------------------------------------------------------
  Check Results
--------------------------------------------------------------------------------------*/

pub fn check_results(snapshot: &Snapshot, ips: &[IpAddr]) {
    if ips.is_empty() {
        return;
    }

    let count_blocked = ips.iter().filter(|ip| snapshot.contains(**ip)).count();
    info!(
        "Checked {} IP address(es); {count_blocked} blocked",
        ips.len()
    );
}
