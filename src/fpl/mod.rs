// Upstream sports-data access: raw resource records and the fetcher.

pub mod client;
pub mod types;
