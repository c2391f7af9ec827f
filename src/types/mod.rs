//! Data types shared between the server components

pub mod message;

pub use message::Message;
