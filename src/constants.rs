/// WAPI object type managed by this module
pub const EXTENSIBLE_ATTRIBUTE_DEF: &str = "extensibleattributedef";

/// Attribute types accepted by WAPI for extensible attribute definitions
pub const ATTRIBUTE_TYPES: &[&str] = &["DATE", "EMAIL", "ENUM", "INTEGER", "STRING", "URL"];

pub const STATE_PRESENT: &str = "present";
pub const STATE_ABSENT: &str = "absent";

// Provider defaults
pub const DEFAULT_WAPI_VERSION: &str = "2.9";
pub const DEFAULT_HTTP_REQUEST_TIMEOUT: u64 = 10;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_RESULTS: u32 = 1000;

// Environment fallbacks for provider settings
pub const ENV_HOST: &str = "INFOBLOX_HOST";
pub const ENV_USERNAME: &str = "INFOBLOX_USERNAME";
pub const ENV_PASSWORD: &str = "INFOBLOX_PASSWORD";
pub const ENV_WAPI_VERSION: &str = "INFOBLOX_WAPI_VERSION";

/// Wrapper key some engines put around the module arguments
pub const MODULE_ARGS_KEY: &str = "ANSIBLE_MODULE_ARGS";

/// Prefix of engine-internal argument keys
pub const INTERNAL_ARG_PREFIX: &str = "_ansible_";
pub const CHECK_MODE_ARG: &str = "_ansible_check_mode";
