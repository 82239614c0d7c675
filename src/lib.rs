pub mod configuration;
pub mod document_store;
pub mod domain;
pub mod fan_out;
pub mod push_client;
pub mod recipients;
pub mod routes;
pub mod startup;
pub mod telemetry;
