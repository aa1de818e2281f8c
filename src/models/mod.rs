pub mod account;

pub use account::{AccountRecord, Accounts, PageInfo};
