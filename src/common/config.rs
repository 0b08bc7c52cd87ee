/// Application configuration constants
pub struct AppConfig;

impl AppConfig {
    // Management API
    pub const API_PORT: u16 = 8443;
    pub const API_BASE_PATH: &'static str = "/mgmt/v1.2/rest";
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;

    // Mutation pacing
    pub const MUTATION_DELAY_MS: u64 = 1000;

    // Asynchronous task polling
    pub const TASK_TIMEOUT_SECS: u64 = 120;
    pub const TASK_POLL_INTERVAL_SECS: u64 = 5;

    // Plan display
    pub const PLAN_PREVIEW_LINES: usize = 5;
    pub const FABRIC_DISPLAY_CHARS: usize = 12;
}
