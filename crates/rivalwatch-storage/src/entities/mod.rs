pub mod company;
pub mod company_competitor;
pub mod company_industry;
pub mod company_signal;
pub mod company_snapshot;
pub mod enrichment_usage;
pub mod industry;
pub mod market_positioning;
pub mod user;
