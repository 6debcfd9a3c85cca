pub mod address;

pub use address::{address_to_hex, hash_to_hex, parse_address, parse_stream_hash, ParseError};
