//! Appender implementations

pub mod console;
pub mod network;
pub mod stream;

pub use console::ConsoleAppender;
pub use network::NetworkAppender;
pub use stream::StreamAppender;

pub use crate::core::Appender;
