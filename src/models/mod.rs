pub mod contracts;
pub mod users;
