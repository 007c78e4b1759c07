//! Season-archive SQL generation.
//!
//! Builds the migration text that snapshots live tables into
//! `<year>_[<prefix>_]<table>` copies, locks the originals against client
//! writes and repoints the `app_config` singleton at the new season. The SQL
//! is returned as text and never executed here; an operator reviews it and
//! runs it in the hosted backend's SQL editor.

use chrono::{DateTime, Utc};

use crate::constants::archive::{CONFIG_ROW_ID, REVOKE_ROLES};

/// One requested season snapshot. Identifiers must already be validated
/// (ASCII alphanumeric/underscore) because they are interpolated into DDL;
/// see `api::validation`.
#[derive(Debug, Clone)]
pub struct ArchivePlan {
    pub year: String,
    pub prefix: String,
    pub tables: Vec<String>,
    /// Email recorded in `app_config.updated_by`.
    pub requested_by: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedMigration {
    pub name: String,
    pub statements: Vec<String>,
}

impl GeneratedMigration {
    #[must_use]
    pub fn sql(&self) -> String {
        self.statements.join("\n\n")
    }
}

/// Archive-copy name for one table: `<year>_<table>`, or
/// `<year>_<prefix>_<table>` when a prefix is set.
#[must_use]
pub fn archived_name(year: &str, prefix: &str, table: &str) -> String {
    if prefix.is_empty() {
        format!("{year}_{table}")
    } else {
        format!("{year}_{prefix}_{table}")
    }
}

/// Assembles the full migration for `plan`.
///
/// Per table, in order: structure copy, row copy, RLS enablement, policy
/// duplication, write revocation on the original. After all tables: one
/// foreign-key rebuild block, then the `app_config` update. Everything except
/// the row copy is idempotent; re-running the script duplicates rows, which
/// the operator note calls out instead of papering over with conflict
/// handling.
#[must_use]
pub fn build_migration(plan: &ArchivePlan, now: DateTime<Utc>) -> GeneratedMigration {
    let mut statements = Vec::with_capacity(plan.tables.len() * 5 + 2);

    for table in &plan.tables {
        let archived = archived_name(&plan.year, &plan.prefix, table);
        statements.push(create_archive_table(&archived, table));
        statements.push(copy_rows(&archived, table));
        statements.push(enable_rls(&archived));
        statements.push(duplicate_policies(table, &archived));
        statements.push(revoke_writes(table));
    }

    statements.push(rebuild_foreign_keys(plan));
    statements.push(update_active_season(plan));

    GeneratedMigration {
        name: migration_name(&plan.year, &plan.prefix, now),
        statements,
    }
}

fn migration_name(year: &str, prefix: &str, now: DateTime<Utc>) -> String {
    let prefix_part = if prefix.is_empty() { "noprefix" } else { prefix };
    format!(
        "archive_tables_{year}_{prefix_part}_{}",
        now.format("%Y%m%d%H%M%S")
    )
}

/// `LIKE ... INCLUDING ALL` copies columns, defaults, CHECK/NOT NULL
/// constraints, indexes, generated columns and identity. Foreign keys and
/// triggers are not copied; FKs are rebuilt separately.
fn create_archive_table(archived: &str, table: &str) -> String {
    format!(r#"CREATE TABLE IF NOT EXISTS "{archived}" (LIKE "{table}" INCLUDING ALL);"#)
}

fn copy_rows(archived: &str, table: &str) -> String {
    format!(r#"INSERT INTO "{archived}" SELECT * FROM "{table}";"#)
}

fn enable_rls(archived: &str) -> String {
    format!(r#"ALTER TABLE "{archived}" ENABLE ROW LEVEL SECURITY;"#)
}

/// Recreates every row-level-security policy of `table` on `archived`.
///
/// `pg_policy.polcmd` stores single-character command codes. An empty
/// resolved role list means the policy applied to everyone and maps back to
/// `public`. INSERT policies only accept WITH CHECK; every other command
/// gets USING and, where a check expression exists, WITH CHECK as well.
fn duplicate_policies(table: &str, archived: &str) -> String {
    format!(
        r#"DO $$
DECLARE
  pol RECORD;
  cmd text;
  roles text;
  stmt text;
BEGIN
  FOR pol IN
    SELECT
      p.polname,
      p.polpermissive,
      p.polcmd,
      pg_get_expr(p.polqual, p.polrelid) AS qual,
      pg_get_expr(p.polwithcheck, p.polrelid) AS with_check,
      ARRAY(SELECT r.rolname FROM pg_roles r WHERE r.oid = ANY(p.polroles)) AS role_names
    FROM pg_policy p
    JOIN pg_class c ON c.oid = p.polrelid
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = 'public' AND c.relname = '{table}'
  LOOP
    cmd := CASE pol.polcmd
      WHEN 'r' THEN 'SELECT'
      WHEN 'a' THEN 'INSERT'
      WHEN 'w' THEN 'UPDATE'
      WHEN 'd' THEN 'DELETE'
      ELSE 'ALL'
    END;

    IF pol.role_names IS NULL OR cardinality(pol.role_names) = 0 THEN
      roles := 'public';
    ELSE
      SELECT string_agg(quote_ident(r), ', ') INTO roles FROM unnest(pol.role_names) AS r;
    END IF;

    stmt := format(
      'CREATE POLICY %I ON %I AS %s FOR %s TO %s',
      pol.polname,
      '{archived}',
      CASE WHEN pol.polpermissive THEN 'PERMISSIVE' ELSE 'RESTRICTIVE' END,
      cmd,
      roles
    );

    IF pol.polcmd = 'a' THEN
      IF pol.with_check IS NOT NULL THEN
        stmt := stmt || format(' WITH CHECK (%s)', pol.with_check);
      END IF;
    ELSE
      IF pol.qual IS NOT NULL THEN
        stmt := stmt || format(' USING (%s)', pol.qual);
      END IF;
      IF pol.with_check IS NOT NULL THEN
        stmt := stmt || format(' WITH CHECK (%s)', pol.with_check);
      END IF;
    END IF;

    EXECUTE stmt;
  END LOOP;
END $$;"#
    )
}

/// The originals stay readable; season data is frozen by revoking writes
/// from the hosted backend's client roles.
fn revoke_writes(table: &str) -> String {
    let roles = REVOKE_ROLES.join(", ");
    format!(r#"REVOKE INSERT, UPDATE, DELETE ON "{table}" FROM {roles};"#)
}

/// Rebuilds foreign keys on the archived copies.
///
/// `LIKE` never carries FKs over, so every constraint owned by an archived
/// table is recreated there, retargeted at the archived copy of the
/// referenced table when that table is part of the snapshot. Referential
/// action codes from `pg_constraint` map `c`/`n`/`d`/`r` to
/// CASCADE/SET NULL/SET DEFAULT/RESTRICT, anything else to NO ACTION.
/// `duplicate_object` errors are reported and skipped so re-runs survive.
fn rebuild_foreign_keys(plan: &ArchivePlan) -> String {
    let table_array = plan
        .tables
        .iter()
        .map(|t| format!("'{t}'"))
        .collect::<Vec<_>>()
        .join(", ");
    let stem = archived_name(&plan.year, &plan.prefix, "");

    format!(
        r#"DO $$
DECLARE
  fk RECORD;
  target_ref text;
BEGIN
  FOR fk IN
    SELECT
      con.conname AS constraint_name,
      src.relname AS source_table,
      ref.relname AS referenced_table,
      (SELECT string_agg(quote_ident(a.attname), ', ' ORDER BY u.ord)
         FROM unnest(con.conkey) WITH ORDINALITY AS u(attnum, ord)
         JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = u.attnum
      ) AS source_columns,
      (SELECT string_agg(quote_ident(a.attname), ', ' ORDER BY u.ord)
         FROM unnest(con.confkey) WITH ORDINALITY AS u(attnum, ord)
         JOIN pg_attribute a ON a.attrelid = con.confrelid AND a.attnum = u.attnum
      ) AS referenced_columns,
      CASE con.confupdtype
        WHEN 'c' THEN 'CASCADE'
        WHEN 'n' THEN 'SET NULL'
        WHEN 'd' THEN 'SET DEFAULT'
        WHEN 'r' THEN 'RESTRICT'
        ELSE 'NO ACTION'
      END AS update_action,
      CASE con.confdeltype
        WHEN 'c' THEN 'CASCADE'
        WHEN 'n' THEN 'SET NULL'
        WHEN 'd' THEN 'SET DEFAULT'
        WHEN 'r' THEN 'RESTRICT'
        ELSE 'NO ACTION'
      END AS delete_action
    FROM pg_constraint con
    JOIN pg_class src ON src.oid = con.conrelid
    JOIN pg_class ref ON ref.oid = con.confrelid
    JOIN pg_namespace n ON n.oid = src.relnamespace
    WHERE con.contype = 'f'
      AND n.nspname = 'public'
      AND src.relname = ANY(ARRAY[{table_array}])
  LOOP
    IF fk.referenced_table = ANY(ARRAY[{table_array}]) THEN
      target_ref := '{stem}' || fk.referenced_table;
    ELSE
      target_ref := fk.referenced_table;
    END IF;

    BEGIN
      EXECUTE format(
        'ALTER TABLE %I ADD CONSTRAINT %I FOREIGN KEY (%s) REFERENCES %I (%s) ON UPDATE %s ON DELETE %s',
        '{stem}' || fk.source_table,
        fk.constraint_name,
        fk.source_columns,
        target_ref,
        fk.referenced_columns,
        fk.update_action,
        fk.delete_action
      );
    EXCEPTION WHEN duplicate_object THEN
      RAISE NOTICE 'constraint % already exists on %, skipping',
        fk.constraint_name, '{stem}' || fk.source_table;
    END;
  END LOOP;
END $$;"#
    )
}

fn update_active_season(plan: &ArchivePlan) -> String {
    format!(
        r#"UPDATE app_config
SET active_year = '{}',
    active_prefix = '{}',
    updated_by = {},
    updated_at = now()
WHERE id = {CONFIG_ROW_ID};"#,
        plan.year,
        plan.prefix,
        quote_literal(&plan.requested_by),
    )
}

/// Single-quoted SQL literal with embedded quotes doubled.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Values interpolated into generated DDL must stay plain identifiers.
#[must_use]
pub fn is_safe_identifier(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plan(year: &str, prefix: &str, tables: &[&str]) -> ArchivePlan {
        ArchivePlan {
            year: year.to_string(),
            prefix: prefix.to_string(),
            tables: tables.iter().map(|t| (*t).to_string()).collect(),
            requested_by: "ops@kalkfly.no".to_string(),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn archived_names_include_optional_prefix() {
        assert_eq!(archived_name("2025", "", "vass_vann"), "2025_vass_vann");
        assert_eq!(
            archived_name("2025", "test", "vass_vann"),
            "2025_test_vass_vann"
        );
    }

    #[test]
    fn migration_name_marks_missing_prefix() {
        let unprefixed = build_migration(&plan("2025", "", &["vass_vann"]), fixed_now());
        assert_eq!(unprefixed.name, "archive_tables_2025_noprefix_20250901120000");

        let prefixed = build_migration(&plan("2025", "test", &["vass_vann"]), fixed_now());
        assert_eq!(prefixed.name, "archive_tables_2025_test_20250901120000");
    }

    #[test]
    fn statements_follow_snapshot_order() {
        let m = build_migration(&plan("2025", "", &["vass_vann"]), fixed_now());

        assert_eq!(m.statements.len(), 7);
        assert_eq!(
            m.statements[0],
            r#"CREATE TABLE IF NOT EXISTS "2025_vass_vann" (LIKE "vass_vann" INCLUDING ALL);"#
        );
        assert_eq!(
            m.statements[1],
            r#"INSERT INTO "2025_vass_vann" SELECT * FROM "vass_vann";"#
        );
        assert_eq!(
            m.statements[2],
            r#"ALTER TABLE "2025_vass_vann" ENABLE ROW LEVEL SECURITY;"#
        );
        assert!(m.statements[3].contains("pg_policy"));
        assert_eq!(
            m.statements[4],
            r#"REVOKE INSERT, UPDATE, DELETE ON "vass_vann" FROM anon, authenticated;"#
        );
        assert!(m.statements[5].contains("pg_constraint"));
        assert!(m.statements[6].starts_with("UPDATE app_config"));
    }

    #[test]
    fn tables_are_archived_in_request_order() {
        let m = build_migration(
            &plan("2026", "backup", &["vass_vann", "landingsplasser"]),
            fixed_now(),
        );

        assert_eq!(m.statements.len(), 12);
        assert!(m.statements[0].contains(r#""2026_backup_vass_vann""#));
        assert!(m.statements[5].contains(r#""2026_backup_landingsplasser""#));
    }

    #[test]
    fn row_copy_stays_a_plain_insert() {
        // Re-running the script duplicates rows; the response note warns the
        // operator instead of the statement deduplicating silently.
        let m = build_migration(&plan("2025", "", &["vass_vann"]), fixed_now());
        let insert = &m.statements[1];

        assert!(!insert.contains("ON CONFLICT"));
        assert!(!insert.contains("WHERE"));
    }

    #[test]
    fn policy_block_maps_command_codes_and_default_role() {
        let m = build_migration(&plan("2025", "", &["vass_vann"]), fixed_now());
        let block = &m.statements[3];

        assert!(block.contains("WHEN 'r' THEN 'SELECT'"));
        assert!(block.contains("WHEN 'a' THEN 'INSERT'"));
        assert!(block.contains("WHEN 'w' THEN 'UPDATE'"));
        assert!(block.contains("WHEN 'd' THEN 'DELETE'"));
        assert!(block.contains("ELSE 'ALL'"));
        assert!(block.contains("roles := 'public';"));
        assert!(block.contains("c.relname = 'vass_vann'"));
        assert!(block.contains("'2025_vass_vann'"));
        assert!(block.contains("WITH CHECK"));
        assert!(block.contains("USING"));
    }

    #[test]
    fn fk_block_preserves_actions_and_survives_reruns() {
        let m = build_migration(
            &plan("2025", "", &["vass_vann", "landingsplasser"]),
            fixed_now(),
        );
        let block = &m.statements[m.statements.len() - 2];

        assert!(block.contains("WHEN 'c' THEN 'CASCADE'"));
        assert!(block.contains("WHEN 'n' THEN 'SET NULL'"));
        assert!(block.contains("WHEN 'd' THEN 'SET DEFAULT'"));
        assert!(block.contains("WHEN 'r' THEN 'RESTRICT'"));
        assert!(block.contains("ELSE 'NO ACTION'"));
        assert!(block.contains("WITH ORDINALITY"));
        assert!(block.contains("ARRAY['vass_vann', 'landingsplasser']"));
        assert!(block.contains("target_ref := '2025_' || fk.referenced_table;"));
        assert!(block.contains("duplicate_object"));
    }

    #[test]
    fn config_update_repoints_the_frontend() {
        let m = build_migration(&plan("2025", "", &["vass_vann"]), fixed_now());
        let update = m.statements.last().unwrap();

        assert!(update.contains("active_year = '2025'"));
        assert!(update.contains("active_prefix = ''"));
        assert!(update.contains("updated_by = 'ops@kalkfly.no'"));
        assert!(update.contains("updated_at = now()"));
        assert!(update.contains("WHERE id = 1"));
    }

    #[test]
    fn quoted_emails_cannot_break_the_update() {
        let mut p = plan("2025", "", &["vass_vann"]);
        p.requested_by = "o'brien@kalkfly.no".to_string();
        let m = build_migration(&p, fixed_now());

        assert!(m.statements.last().unwrap().contains("'o''brien@kalkfly.no'"));
    }

    #[test]
    fn sql_joins_statements_in_order() {
        let m = build_migration(&plan("2025", "", &["vass_vann"]), fixed_now());
        let sql = m.sql();

        let create = sql.find("CREATE TABLE IF NOT EXISTS").unwrap();
        let insert = sql.find("INSERT INTO").unwrap();
        let revoke = sql.find("REVOKE").unwrap();
        let update = sql.find("UPDATE app_config").unwrap();
        assert!(create < insert && insert < revoke && revoke < update);
    }
}
