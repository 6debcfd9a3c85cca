pub mod client;
pub mod contracts;
pub mod mock;
pub mod rule;

pub use client::{ChainClient, ChainClientRegistry, Log, Transaction, TransactionReceipt};
pub use contracts::{SpaceContract, WalletLinkContract};
pub use rule::RuleEvaluator;
