//! Plan/package catalog: a pure lookup table loaded once at startup.

use std::collections::HashMap;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::catalog::{CatalogEntry, CatalogKind},
};

/// Immutable catalog of subscription plans and credit packages.
///
/// Built once at process start (from a JSON file or the compiled-in
/// defaults) and shared read-only behind an `Arc`. Lookups have no side
/// effects and no failure mode beyond "not found".
pub struct Catalog {
    entries: HashMap<(CatalogKind, String), CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| ((e.kind, e.id.clone()), e))
            .collect();
        Self { entries }
    }

    /// Load catalog entries from a JSON file: an array of `CatalogEntry`.
    pub fn from_json_file(path: &str) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Internal(format!("Failed to read catalog file {path}: {e}")))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Internal(format!("Invalid catalog file {path}: {e}")))?;
        Ok(Self::new(entries))
    }

    /// The default catalog used when no `CATALOG_PATH` is configured.
    pub fn builtin() -> Self {
        Self::new(vec![
            CatalogEntry {
                id: "free".into(),
                kind: CatalogKind::SubscriptionPlan,
                name: "Free".into(),
                description: Some("Starter tier".into()),
                monthly_price_cents: 0,
                annual_price_cents: 0,
                price_cents: 0,
                currency: "usd".into(),
                credits: 50,
            },
            CatalogEntry {
                id: "pro".into(),
                kind: CatalogKind::SubscriptionPlan,
                name: "Pro".into(),
                description: Some("For regular use".into()),
                monthly_price_cents: 1_900,
                annual_price_cents: 19_000,
                price_cents: 0,
                currency: "usd".into(),
                credits: 500,
            },
            CatalogEntry {
                id: "credits-100".into(),
                kind: CatalogKind::CreditPackage,
                name: "100 credits".into(),
                description: None,
                monthly_price_cents: 0,
                annual_price_cents: 0,
                price_cents: 500,
                currency: "usd".into(),
                credits: 100,
            },
            CatalogEntry {
                id: "credits-500".into(),
                kind: CatalogKind::CreditPackage,
                name: "500 credits".into(),
                description: None,
                monthly_price_cents: 0,
                annual_price_cents: 0,
                price_cents: 2_000,
                currency: "usd".into(),
                credits: 500,
            },
        ])
    }

    pub fn resolve(&self, kind: CatalogKind, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(&(kind, id.to_string()))
    }

    pub fn plans(&self) -> Vec<&CatalogEntry> {
        let mut plans: Vec<&CatalogEntry> = self
            .entries
            .values()
            .filter(|e| e.kind == CatalogKind::SubscriptionPlan)
            .collect();
        plans.sort_by(|a, b| a.id.cmp(&b.id));
        plans
    }

    pub fn packages(&self) -> Vec<&CatalogEntry> {
        let mut packages: Vec<&CatalogEntry> = self
            .entries
            .values()
            .filter(|e| e.kind == CatalogKind::CreditPackage)
            .collect();
        packages.sort_by(|a, b| a.id.cmp(&b.id));
        packages
    }
}
