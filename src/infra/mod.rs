pub mod http_client;
pub mod in_memory;
pub mod wapi_reconciler;

pub use http_client::ReqwestWapi;
pub use in_memory::InMemoryWapi;
pub use wapi_reconciler::WapiReconciler;
