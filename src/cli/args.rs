use clap::{Parser, ValueEnum};
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(author, version, about = "Check IP addresses against the blocked AWS IP ranges.", long_about = None)]
pub struct Args {
    /// Block prefixes from this AWS Region (all regions when omitted)
    #[arg(short = 'r', long)]
    pub region: Option<String>,

    /// Block prefixes used by this AWS Service (all services when omitted)
    #[arg(short = 's', long)]
    pub service: Option<String>,

    /// URL of the AWS IP Ranges JSON document
    #[arg(long)]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// IP addresses to check; lists the blocked prefixes when omitted
    pub ips: Vec<IpAddr>,
}

/*--------------------------------------------------------------------------------------
  Output Format
--------------------------------------------------------------------------------------*/

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Table of checked IP addresses (or blocked prefixes)
    Table,

    /// Blocked prefixes in (RFC4632) CIDR format
    Cidr,

    /// Blocked prefixes in network mask format (n.n.n.n m.m.m.m)
    Netmask,
}
