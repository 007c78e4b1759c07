use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{Condition, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

use crate::constants::search as limits;
use crate::entities::{landingsplasser, vass_vann};

pub struct SearchRepository {
    conn: DatabaseConnection,
}

impl SearchRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Water bodies whose name contains `term`, case-insensitively.
    pub async fn waters_matching(&self, term: &str) -> Result<Vec<vass_vann::Model>> {
        let pattern = contains_pattern(term);

        vass_vann::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(vass_vann::Column::Name))).like(&pattern))
            .limit(limits::PER_SOURCE_LIMIT)
            .all(&self.conn)
            .await
            .context("Failed to query vass_vann by name")
    }

    /// Landing sites whose designation or code contains `term`, case-insensitively.
    pub async fn landing_sites_matching(&self, term: &str) -> Result<Vec<landingsplasser::Model>> {
        let pattern = contains_pattern(term);

        landingsplasser::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(landingsplasser::Column::Lp)))
                            .like(&pattern),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(landingsplasser::Column::Kode)))
                            .like(&pattern),
                    ),
            )
            .limit(limits::PER_SOURCE_LIMIT)
            .all(&self.conn)
            .await
            .context("Failed to query landingsplasser by lp/kode")
    }

    /// Unfiltered sample used to log whether the table is readable at all
    /// after a filtered lookup failed.
    pub async fn water_sample(&self) -> Result<Vec<vass_vann::Model>> {
        vass_vann::Entity::find()
            .limit(limits::DIAGNOSTIC_SAMPLE_LIMIT)
            .all(&self.conn)
            .await
            .context("Failed to sample vass_vann")
    }

    pub async fn landing_site_sample(&self) -> Result<Vec<landingsplasser::Model>> {
        landingsplasser::Entity::find()
            .limit(limits::DIAGNOSTIC_SAMPLE_LIMIT)
            .all(&self.conn)
            .await
            .context("Failed to sample landingsplasser")
    }
}

/// Substring pattern for `lower(col) LIKE`, lowered on the Rust side so the
/// same expression works on both the Postgres and SQLite backends.
fn contains_pattern(term: &str) -> String {
    format!("%{}%", term.to_lowercase())
}
