//! Extensible attribute definitions (`extensibleattributedef`) on NIOS,
//! managed through WAPI.
//!
//! The crate validates declarative module arguments, shapes them into a
//! WAPI request payload and delegates reconciliation to a [`WapiPort`]
//! client. The bundled [`WapiReconciler`] runs on top of any
//! [`ObjectApiPort`]: [`ReqwestWapi`] talks to an appliance, [`InMemoryWapi`]
//! keeps objects in process.
//!
//! [`WapiPort`]: app::ports::WapiPort
//! [`ObjectApiPort`]: app::ports::ObjectApiPort
//! [`WapiReconciler`]: infra::WapiReconciler
//! [`ReqwestWapi`]: infra::ReqwestWapi
//! [`InMemoryWapi`]: infra::InMemoryWapi

pub mod config;
pub mod constants;
pub mod error;
pub mod extensible_attribute;
pub mod logging;
pub mod normalize;
pub mod params;
pub mod schema;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;
