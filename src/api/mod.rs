pub mod config_dto;
pub mod event_catalog_dto;
pub mod inventory_dto;
