pub mod search {

    pub const MIN_QUERY_LEN: usize = 2;

    pub const PER_SOURCE_LIMIT: u64 = 10;

    pub const MAX_RESULTS: usize = 15;

    pub const DIAGNOSTIC_SAMPLE_LIMIT: u64 = 5;

    pub const WATER_COLOR: &str = "#2563eb";

    pub const LANDING_SITE_COLOR: &str = "#16a34a";
}

pub mod archive {

    /// Table whose archived copy marks a season snapshot as present.
    pub const PROBE_TABLE: &str = "vass_vann";

    pub const PROBE_PREFIXES: &[&str] = &["", "test", "backup", "old"];

    pub const PROBE_YEARS_BACK: i32 = 1;

    pub const PROBE_YEARS_FORWARD: i32 = 2;

    /// Hosted-backend client roles that lose write access to archived originals.
    pub const REVOKE_ROLES: &[&str] = &["anon", "authenticated"];

    /// Singleton row id in `app_config`.
    pub const CONFIG_ROW_ID: i32 = 1;
}
