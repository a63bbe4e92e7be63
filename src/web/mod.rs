//! Server-rendered HTML for the prediction form

pub mod handlers;
