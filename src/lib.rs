pub mod api;
pub mod config;
pub mod dto;
pub mod entities;
pub mod error;
pub mod mapper;
pub mod metrics;
pub mod migrator;
pub mod model;
pub mod security;
pub mod service;
pub mod telemetry;
pub mod validation;

pub use sea_orm;
