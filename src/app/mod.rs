pub mod ports;
pub mod run_module_use_case;
