pub mod api;
pub mod config;
pub mod controller;
pub mod dto;
pub mod layout;
pub mod models;
pub mod repository;
pub mod service;
pub mod terminal;
