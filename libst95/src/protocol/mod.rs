// libst95/src/protocol/mod.rs

//! ST95 host frames: encoding, commands and responses.

pub mod codec;
pub mod commands;
pub mod frame;
pub mod parser;
pub mod responses;

pub use commands::*;
pub use frame::Frame;
pub use responses::*;
