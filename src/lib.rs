pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod dom;
pub mod logging;
pub mod mvi;
pub mod route;
pub mod state;
pub mod storage;
pub mod store;
pub mod view;
