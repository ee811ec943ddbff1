pub mod cargo_env {
    pub const CARGO_PKG_NAME: &'static str = env!("CARGO_PKG_NAME");
}

pub mod common {
    /// Prefix of environment variables overriding settings, e.g. `DART_TEST_EVENTS_FORMAT`.
    pub const ENV_PREFIX: &str = "DART_TEST_EVENTS";
    pub const DEFAULT_CHUNK_SIZE: usize = 8192;
}

pub mod exit_code {
    pub const TESTS_FAILED: i32 = 1;
    pub const IO_ERROR: i32 = 2;
    pub const INTERRUPTED: i32 = 130;
}
