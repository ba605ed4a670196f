pub mod command;
pub mod common;
pub mod reply;

pub use command::parse_command;
pub use common::*;
pub use reply::parse_reply_body;
