use serde::{Deserialize, Serialize};

/// What a catalog entry sells: a recurring plan or a one-time credit bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    SubscriptionPlan,
    CreditPackage,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::SubscriptionPlan => "subscription-plan",
            CatalogKind::CreditPackage => "credit-package",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Annual => "annual",
        }
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" => Ok(BillingCycle::Monthly),
            "annual" | "year" | "yearly" => Ok(BillingCycle::Annual),
            _ => Err(format!(
                "Invalid billing cycle: {}. Must be 'monthly' or 'annual'",
                s
            )),
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One sellable item. Immutable after catalog load.
///
/// Plans carry both monthly and annual prices; packages carry a flat price.
/// `credits` is the grant applied to the buyer's ledger on activation or
/// capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub kind: CatalogKind,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub monthly_price_cents: i64,
    #[serde(default)]
    pub annual_price_cents: i64,
    #[serde(default)]
    pub price_cents: i64,
    pub currency: String,
    pub credits: i64,
}

impl CatalogEntry {
    /// Price for a plan under the given cycle; packages ignore the cycle.
    pub fn price_for_cycle(&self, cycle: BillingCycle) -> i64 {
        match self.kind {
            CatalogKind::SubscriptionPlan => match cycle {
                BillingCycle::Monthly => self.monthly_price_cents,
                BillingCycle::Annual => self.annual_price_cents,
            },
            CatalogKind::CreditPackage => self.price_cents,
        }
    }

    pub fn is_free(&self, cycle: BillingCycle) -> bool {
        self.price_for_cycle(cycle) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> CatalogEntry {
        CatalogEntry {
            id: "pro".into(),
            kind: CatalogKind::SubscriptionPlan,
            name: "Pro".into(),
            description: None,
            monthly_price_cents: 1_900,
            annual_price_cents: 19_000,
            price_cents: 0,
            currency: "usd".into(),
            credits: 500,
        }
    }

    #[test]
    fn plan_price_follows_cycle() {
        let p = plan();
        assert_eq!(p.price_for_cycle(BillingCycle::Monthly), 1_900);
        assert_eq!(p.price_for_cycle(BillingCycle::Annual), 19_000);
    }

    #[test]
    fn package_price_ignores_cycle() {
        let pack = CatalogEntry {
            id: "credits-100".into(),
            kind: CatalogKind::CreditPackage,
            name: "100 credits".into(),
            description: None,
            monthly_price_cents: 0,
            annual_price_cents: 0,
            price_cents: 500,
            currency: "usd".into(),
            credits: 100,
        };
        assert_eq!(pack.price_for_cycle(BillingCycle::Monthly), 500);
        assert_eq!(pack.price_for_cycle(BillingCycle::Annual), 500);
    }

    #[test]
    fn free_means_zero_for_the_chosen_cycle() {
        let mut p = plan();
        p.monthly_price_cents = 0;
        assert!(p.is_free(BillingCycle::Monthly));
        assert!(!p.is_free(BillingCycle::Annual));
    }

    #[test]
    fn billing_cycle_from_str_accepts_aliases() {
        assert_eq!(
            "yearly".parse::<BillingCycle>().unwrap(),
            BillingCycle::Annual
        );
        assert_eq!(
            "Monthly".parse::<BillingCycle>().unwrap(),
            BillingCycle::Monthly
        );
        assert!("weekly".parse::<BillingCycle>().is_err());
    }
}
