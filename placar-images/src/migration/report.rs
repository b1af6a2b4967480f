use placar_core::EntityKind;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Per-kind counters of a migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationCounts {
    /// Records enumerated.
    pub total: u32,
    /// Records holding a legacy reference, migration attempted.
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
}

/// Result of a bulk or streaming migration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub teams: MigrationCounts,
    pub items: MigrationCounts,
    pub cancelled: bool,
}

impl MigrationReport {
    pub fn counts(&self, kind: EntityKind) -> &MigrationCounts {
        match kind {
            EntityKind::TeamBanner => &self.teams,
            EntityKind::ShopItem => &self.items,
        }
    }

    pub fn counts_mut(&mut self, kind: EntityKind) -> &mut MigrationCounts {
        match kind {
            EntityKind::TeamBanner => &mut self.teams,
            EntityKind::ShopItem => &mut self.items,
        }
    }

    pub fn total_migrated(&self) -> u32 {
        self.teams.succeeded + self.items.succeeded
    }

    pub fn total_failed(&self) -> u32 {
        self.teams.failed + self.items.failed
    }
}

#[derive(serde::Serialize)]
struct TeamSummary {
    migradas: u32,
    erros: u32,
    total: u32,
}

#[derive(serde::Serialize)]
struct ItemSummary {
    migrados: u32,
    erros: u32,
    total: u32,
}

/// `{duplas:{migradas,erros,total}, itens:{migrados,erros,total}, totalMigracoes, totalErros}`,
/// plus `cancelado: true` when the run was cut short.
impl Serialize for MigrationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.cancelled { 5 } else { 4 };
        let mut state = serializer.serialize_struct("MigrationReport", fields)?;
        state.serialize_field(
            "duplas",
            &TeamSummary {
                migradas: self.teams.succeeded,
                erros: self.teams.failed,
                total: self.teams.total,
            },
        )?;
        state.serialize_field(
            "itens",
            &ItemSummary {
                migrados: self.items.succeeded,
                erros: self.items.failed,
                total: self.items.total,
            },
        )?;
        state.serialize_field("totalMigracoes", &self.total_migrated())?;
        state.serialize_field("totalErros", &self.total_failed())?;
        if self.cancelled {
            state.serialize_field("cancelado", &true)?;
        }
        state.end()
    }
}

/// Per-kind counters of a URL rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteCounts {
    pub total: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub teams: RewriteCounts,
    pub items: RewriteCounts,
    pub cancelled: bool,
}

impl RewriteReport {
    pub fn counts_mut(&mut self, kind: EntityKind) -> &mut RewriteCounts {
        match kind {
            EntityKind::TeamBanner => &mut self.teams,
            EntityKind::ShopItem => &mut self.items,
        }
    }

    pub fn total_updated(&self) -> u32 {
        self.teams.updated + self.items.updated
    }
}

#[derive(serde::Serialize)]
struct TeamRewriteSummary {
    atualizadas: u32,
    ignoradas: u32,
    erros: u32,
    total: u32,
}

#[derive(serde::Serialize)]
struct ItemRewriteSummary {
    atualizados: u32,
    ignorados: u32,
    erros: u32,
    total: u32,
}

impl Serialize for RewriteReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.cancelled { 4 } else { 3 };
        let mut state = serializer.serialize_struct("RewriteReport", fields)?;
        state.serialize_field(
            "duplas",
            &TeamRewriteSummary {
                atualizadas: self.teams.updated,
                ignoradas: self.teams.skipped,
                erros: self.teams.failed,
                total: self.teams.total,
            },
        )?;
        state.serialize_field(
            "itens",
            &ItemRewriteSummary {
                atualizados: self.items.updated,
                ignorados: self.items.skipped,
                erros: self.items.failed,
                total: self.items.total,
            },
        )?;
        state.serialize_field("totalAtualizacoes", &self.total_updated())?;
        if self.cancelled {
            state.serialize_field("cancelado", &true)?;
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn migration_summary_shape() {
        let mut report = MigrationReport::default();
        report.teams = MigrationCounts {
            total: 3,
            attempted: 2,
            succeeded: 1,
            failed: 1,
        };
        report.items.total = 1;
        report.items.succeeded = 1;

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "duplas": {"migradas": 1, "erros": 1, "total": 3},
                "itens": {"migrados": 1, "erros": 0, "total": 1},
                "totalMigracoes": 2,
                "totalErros": 1
            })
        );
    }

    #[test]
    fn cancelled_flag_only_when_set() {
        let report = MigrationReport {
            cancelled: true,
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&report).unwrap()["cancelado"], json!(true));

        let rewrite = RewriteReport::default();
        let value = serde_json::to_value(&rewrite).unwrap();
        assert!(value.get("cancelado").is_none());
        assert_eq!(value["totalAtualizacoes"], json!(0));
        assert_eq!(value["itens"], json!({"atualizados": 0, "ignorados": 0, "erros": 0, "total": 0}));
    }
}
