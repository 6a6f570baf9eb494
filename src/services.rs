pub mod tour_schema;
pub mod tour_service;
