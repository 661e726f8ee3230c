//! Account and transaction records and input-sheet loading

mod data;
pub mod loader;

pub use data::{Account, Installment, Interval, TransactionDefinition};
pub use loader::{
    load_accounts, load_accounts_from_reader, load_transactions, load_transactions_from_reader,
    TransactionLoad,
};
