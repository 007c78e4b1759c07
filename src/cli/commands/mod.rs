mod archive_sql;
mod migrate;

pub use archive_sql::cmd_archive_sql;
pub use migrate::cmd_migrate;
