// Application layer - Use cases over the Tableau REST API
pub mod permission_service;
pub mod runner;
pub mod schedule_service;
pub mod tableau_api;
pub mod workbook_service;

#[cfg(test)]
pub mod test_support;
