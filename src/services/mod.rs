pub mod auditor;
pub mod provisioning;
pub mod wallet_service;

pub use auditor::BalanceAuditor;
pub use provisioning::UserService;
pub use wallet_service::WalletService;
