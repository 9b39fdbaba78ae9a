//! Request handlers for the plugin daemon.
//!
//! # Handler Modules
//!
//! - [`info`] - Plugin menu and daemon information
//! - [`door`] - Door settings page, settings update and the two open actions
//! - [`oled`] - OLED settings page, JSON readout and settings update
//! - [`signals`] - Host-raised signals published on the bus
//! - [`host`] - Modelled irrigation-host state
//!
//! JSON handlers return `Result<Json<ApiResponse<T>>, ApiError>` and use the
//! `api_ok!()` / `api_fail!()` macros. Page handlers return HTML, and action
//! handlers answer with a 303 redirect.

pub mod door;
pub mod host;
pub mod info;
pub mod oled;
pub mod signals;
