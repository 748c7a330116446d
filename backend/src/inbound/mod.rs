//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! [`http`] serves the JSON API and the page view models; [`ws`] hosts the
//! infinite-scroll feed socket.

pub mod http;
pub mod ws;
