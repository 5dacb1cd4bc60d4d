pub mod contracts;
pub mod export;
pub mod locks;
pub mod users;

pub use contracts::{AcceptOutcome, ContractService, EnrollOutcome};
pub use locks::ContractLocks;
pub use users::UserDirectory;
