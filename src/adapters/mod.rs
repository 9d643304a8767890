// Adapters layer: concrete implementations of the page and transport ports.

pub mod http;
pub mod memory_page;
