pub mod models;
pub mod ldap_client;
pub mod classifier;
pub mod aggregator;
pub mod html_generator;
pub mod publisher;
pub mod windows_auth;
pub mod report_data;
pub mod diagnostics;
