use anyhow::ensure;
use chrono::Utc;

use crate::archive::{ArchivePlan, build_migration, is_safe_identifier};

/// Offline twin of the archive endpoint: same builder, output to stdout.
pub fn cmd_archive_sql(
    year: String,
    prefix: String,
    tables: Vec<String>,
    updated_by: String,
) -> anyhow::Result<()> {
    ensure!(!year.is_empty(), "Year is required");
    ensure!(
        is_safe_identifier(&year),
        "Year may only contain letters, digits and underscores"
    );
    ensure!(
        prefix.is_empty() || is_safe_identifier(&prefix),
        "Prefix may only contain letters, digits and underscores"
    );
    for table in &tables {
        ensure!(!table.is_empty(), "Table names cannot be empty");
        ensure!(
            is_safe_identifier(table),
            "Table name '{table}' may only contain letters, digits and underscores"
        );
    }

    let plan = ArchivePlan {
        year,
        prefix,
        tables,
        requested_by: updated_by,
    };
    let migration = build_migration(&plan, Utc::now());

    println!("-- {}", migration.name);
    println!();
    println!("{}", migration.sql());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(year: &str, tables: &[&str]) -> anyhow::Result<()> {
        let tables = tables.iter().copied().map(str::to_string).collect();
        cmd_archive_sql(year.to_string(), String::new(), tables, "cli".to_string())
    }

    #[test]
    fn accepts_a_well_formed_request() {
        assert!(run("2025", &["vass_vann"]).is_ok());
    }

    #[test]
    fn rejects_blank_year_and_blank_table_names() {
        assert!(run("", &["vass_vann"]).is_err());
        assert!(run("2025", &[""]).is_err());
    }

    #[test]
    fn rejects_unsafe_identifiers() {
        assert!(run("2025; DROP", &["vass_vann"]).is_err());
        assert!(run("2025", &["vass vann"]).is_err());
    }
}
