pub mod graph;
pub mod oauth;
