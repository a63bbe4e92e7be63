pub mod pages;

pub use pages::{render_page, PredictTemplate};
