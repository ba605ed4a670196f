//! Compatibility layer for the legacy hub line protocol: the reply and
//! command grammar, typed keyword dictionaries, the command lifecycle and
//! per-actor keyword models.

pub mod analyzer;
pub mod command;
pub mod config;
pub mod error;
pub mod hub;
pub mod keys;
pub mod message;
pub mod model;
pub mod parser;
pub mod tokenizer;
pub mod types;

// Re-exports
pub use command::{CommandError, CommandStatus};
pub use config::HubConfig;
pub use error::*;
pub use hub::HubSession;
pub use keys::{Key, KeysDictionary};
pub use message::{Keyword, Keywords, Reply, ReplyHeader};
pub use model::{KeywordModel, ModelSet};
pub use parser::{parse_command, parse_reply, GrammarError};
pub use types::{TypedValue, ValueSpec, ValueType};

#[cfg(test)]
mod tests {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }
}
