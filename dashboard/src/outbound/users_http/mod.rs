//! HTTP user directory adapter.
//!
//! This module provides a thin reqwest implementation of the
//! `UsersRepository` port against a json-server style REST API.

mod dto;
mod http_repository;

pub use http_repository::UsersHttpRepository;
