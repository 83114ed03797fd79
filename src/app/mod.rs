//! Demo application mounted by the binary: a few HTML pages and a small user API.

pub mod controllers;
pub mod routes;
