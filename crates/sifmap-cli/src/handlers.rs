//! Command handlers for CLI subcommands
//!
//! Each subcommand has its own module; this module re-exports the entry
//! points used by `main`.

mod completions;
mod config;
mod inbound;
mod lookup;
mod outbound;
mod utils;
mod validate;

pub use completions::handle_completions;
pub use config::handle_config;
pub use inbound::handle_inbound;
pub use lookup::handle_lookup;
pub use outbound::handle_outbound;
pub use validate::handle_validate;
