//! Result sinks.
//!
//! Both sinks run after a chase has finished and only read its pages:
//! - `write_details`: the whole trace as pretty-printed JSON
//! - `write_final_body`: the body of the last hop, verbatim

mod body;
mod details;
mod output;

pub use body::write_final_body;
pub use details::write_details;
pub use output::open_output;
