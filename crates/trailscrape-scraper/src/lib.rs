pub mod classify;
pub mod client;
pub mod crawl;
pub mod error;
pub mod export;
pub mod output;
pub mod region_info;
pub mod table;
pub mod validate;

mod rate_limit;

pub use classify::{ExcludeColumn, TableClassifier};
pub use client::{AuthenticatedClient, ClientSettings, TrailforksClient};
pub use crawl::{total_pages, CrawlReport, CrawlTermination, RIDELOGS_PER_PAGE};
pub use error::ScraperError;
pub use export::{check_export_csv, repair_export_text, ExportCheck, ExportSummary};
pub use region_info::parse_region_info;
pub use table::{parse_tables, DataTable};
pub use validate::is_error_page;
