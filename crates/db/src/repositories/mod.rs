//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod campaign_repo;
pub mod category_repo;
pub mod contact_repo;
pub mod dashboard_repo;
pub mod email_log_repo;
pub mod sale_repo;
pub mod session_repo;
pub mod sponsor_repo;
pub mod transaction_repo;
pub mod user_repo;
pub mod waiting_list_repo;
pub mod workbook_repo;

pub use campaign_repo::CampaignRepo;
pub use category_repo::CategoryRepo;
pub use contact_repo::ContactRepo;
pub use dashboard_repo::DashboardRepo;
pub use email_log_repo::EmailLogRepo;
pub use sale_repo::SaleRepo;
pub use session_repo::SessionRepo;
pub use sponsor_repo::SponsorRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;
pub use waiting_list_repo::WaitingListRepo;
pub use workbook_repo::WorkbookResponseRepo;
