pub mod interface;
pub mod protocol;
pub mod service;
pub mod shared;

pub use interface::{db, http, llm};
pub use protocol::session;
pub use service::{anticipation, control_law, relevance, voice};
pub use shared::{config, constants, entities, error, lexicon, logging, ports, utils};
