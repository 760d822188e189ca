use awsipblock::Snapshot;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::*;
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

fn new_table(headers: [&str; 2]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        headers
            .iter()
            .map(|header| {
                Cell::new(header)
                    .add_attribute(Attribute::Bold)
                    .fg(Color::Green)
            })
            .collect::<Vec<Cell>>(),
    );

    table
}

/*--------------------------------------------------------------------------------------
  Check Table
--------------------------------------------------------------------------------------*/

pub fn check_table(snapshot: &Snapshot, ips: &[IpAddr]) {
    let mut table = new_table(["IP Address", "Blocked"]);

    for ip in ips {
        let status = match snapshot.matching_range(*ip) {
            Some(prefix) => Cell::new(format!("yes ({prefix})")).fg(Color::Red),
            None => Cell::new("no"),
        };

        table.add_row(vec![Cell::new(ip).add_attribute(Attribute::Bold), status]);
    }

    println!("{table}");
}

/*--------------------------------------------------------------------------------------
  Prefix Table
--------------------------------------------------------------------------------------*/

pub fn prefix_table(snapshot: &Snapshot) {
    let mut table = new_table(["IP Prefix", "Netmask"]);

    for prefix in snapshot.ranges() {
        table.add_row(vec![
            Cell::new(prefix).add_attribute(Attribute::Bold),
            Cell::new(prefix.mask()),
        ]);
    }

    // Right-align the IP Prefix column
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{table}");
}

/*--------------------------------------------------------------------------------------
  Prefixes In CIDR Format
--------------------------------------------------------------------------------------*/

pub fn prefixes_in_cidr_format(snapshot: &Snapshot) {
    for prefix in snapshot.ranges() {
        println!("{prefix}");
    }
}

/*--------------------------------------------------------------------------------------
  Prefixes In Netmask Format
--------------------------------------------------------------------------------------*/

pub fn prefixes_in_netmask_format(snapshot: &Snapshot) {
    for prefix in snapshot.ranges() {
        println!("{} {}", prefix.network(), prefix.mask());
    }
}
