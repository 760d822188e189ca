/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod blocker;
pub mod config;
pub mod datetime;
pub mod errors;
pub mod fetcher;
pub mod filter;
pub mod json;
pub mod middleware;
pub mod refresh;
pub mod snapshot;
pub mod table;
