// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod error;
pub mod multipart;
pub mod tableau_client;
pub mod ts_xml;
pub mod xml_mapper;
