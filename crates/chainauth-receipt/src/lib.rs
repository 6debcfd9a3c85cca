pub mod verifier;

pub use verifier::{ReceiptVerifier, UserReceipt};
