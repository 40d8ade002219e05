pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod seating;
pub mod store;
pub mod transfer;
pub mod web;
