// Budget-gated upgrade purchases for docked ships
use crate::client::RemoteError;
use crate::models::{CrewRole, Offer, PlayerStatus};
use crate::operations::session::PlayerSession;
use crate::{o_debug, o_error, o_info};

/// Seconds of operating costs that must remain covered after any purchase
pub const MIN_RUNWAY_SECONDS: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountSnapshot {
    pub balance: f64,
    pub cost_per_second: f64,
}

impl From<&PlayerStatus> for AccountSnapshot {
    fn from(status: &PlayerStatus) -> Self {
        Self {
            balance: status.money,
            cost_per_second: status.costs,
        }
    }
}

/// `price < balance` and the remaining balance covers strictly more than
/// `MIN_RUNWAY_SECONDS` whole seconds of costs.
pub fn is_affordable(price: f64, account: &AccountSnapshot) -> bool {
    if price >= account.balance {
        return false;
    }
    if account.cost_per_second <= 0.0 {
        return true;
    }
    ((account.balance - price) / account.cost_per_second).trunc() > MIN_RUNWAY_SECONDS
}

/// First offer in catalog order that passes the affordability rule
pub fn pick_upgrade<'o, O: Offer>(offers: &'o [O], account: &AccountSnapshot) -> Option<&'o O> {
    offers.iter().find(|offer| is_affordable(offer.price(), account))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeCategory {
    Module,
    Ship,
    Crew,
}

impl std::fmt::Display for UpgradeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpgradeCategory::Module => write!(f, "module"),
            UpgradeCategory::Ship => write!(f, "hull/cargo"),
            UpgradeCategory::Crew => write!(f, "crew"),
        }
    }
}

/// Outcome of one category pass
#[derive(Debug, Clone, PartialEq)]
pub enum UpgradeDecision {
    Bought { label: String, price: f64 },
    /// Candidates existed but none passed the rule
    Unaffordable { candidates: usize },
    NothingOffered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeReport {
    pub ship_id: u64,
    pub module: Result<UpgradeDecision, RemoteError>,
    pub ship: Result<UpgradeDecision, RemoteError>,
    pub crew: Result<UpgradeDecision, RemoteError>,
}

impl UpgradeReport {
    pub fn purchases(&self) -> usize {
        [&self.module, &self.ship, &self.crew]
            .into_iter()
            .filter(|decision| matches!(decision, Ok(UpgradeDecision::Bought { .. })))
            .count()
    }
}

pub struct UpgradeBuyer<'a> {
    session: &'a PlayerSession,
    interesting_ship_upgrades: &'a [String],
}

impl<'a> UpgradeBuyer<'a> {
    pub fn new(session: &'a PlayerSession, interesting_ship_upgrades: &'a [String]) -> Self {
        Self {
            session,
            interesting_ship_upgrades,
        }
    }

    /// Module, hull/cargo, then crew upgrades. A failing category is logged and
    /// does not keep the next one from running.
    pub async fn run_all(&self, ship_id: u64) -> UpgradeReport {
        let module = self.upgrade_modules(ship_id).await;
        Self::log_failure(ship_id, UpgradeCategory::Module, &module);
        let ship = self.upgrade_ship(ship_id).await;
        Self::log_failure(ship_id, UpgradeCategory::Ship, &ship);
        let crew = self.upgrade_crew(ship_id).await;
        Self::log_failure(ship_id, UpgradeCategory::Crew, &crew);

        UpgradeReport {
            ship_id,
            module,
            ship,
            crew,
        }
    }

    fn log_failure(ship_id: u64, category: UpgradeCategory, result: &Result<UpgradeDecision, RemoteError>) {
        if let Err(e) = result {
            o_error!("⚠️ Ship {}: {} upgrade pass failed: {}", ship_id, category, e);
        }
    }

    pub async fn upgrade_modules(&self, ship_id: u64) -> Result<UpgradeDecision, RemoteError> {
        let api = self.session.api();
        let station_id = self.session.station_id();

        let account = self.session.account().await?;
        let offers = api.module_upgrades(station_id, ship_id).await?;
        let decision = self.decide(UpgradeCategory::Module, ship_id, &offers, &account);
        if let Some(offer) = pick_upgrade(&offers, &account) {
            api.buy_module_upgrade(station_id, ship_id, &offer.module_id).await?;
        }
        Ok(decision)
    }

    pub async fn upgrade_ship(&self, ship_id: u64) -> Result<UpgradeDecision, RemoteError> {
        let api = self.session.api();
        let station_id = self.session.station_id();

        let account = self.session.account().await?;
        let offers: Vec<_> = api
            .ship_upgrades(station_id)
            .await?
            .into_iter()
            .filter(|offer| self.interesting_ship_upgrades.contains(&offer.name))
            .collect();
        let decision = self.decide(UpgradeCategory::Ship, ship_id, &offers, &account);
        if let Some(offer) = pick_upgrade(&offers, &account) {
            api.buy_ship_upgrade(station_id, ship_id, &offer.name).await?;
        }
        Ok(decision)
    }

    /// Only the first Operator listed is considered
    pub async fn upgrade_crew(&self, ship_id: u64) -> Result<UpgradeDecision, RemoteError> {
        let api = self.session.api();
        let station_id = self.session.station_id();

        let account = self.session.account().await?;
        let offers: Vec<_> = api
            .crew_upgrades(station_id, ship_id)
            .await?
            .into_iter()
            .filter(|offer| offer.member_type == CrewRole::Operator)
            .take(1)
            .collect();
        let decision = self.decide(UpgradeCategory::Crew, ship_id, &offers, &account);
        if let Some(offer) = pick_upgrade(&offers, &account) {
            api.buy_crew_upgrade(station_id, ship_id, &offer.crew_id).await?;
        }
        Ok(decision)
    }

    fn decide<O: Offer>(
        &self,
        category: UpgradeCategory,
        ship_id: u64,
        offers: &[O],
        account: &AccountSnapshot,
    ) -> UpgradeDecision {
        if offers.is_empty() {
            o_debug!("🔧 Ship {}: no {} upgrade offered", ship_id, category);
            return UpgradeDecision::NothingOffered;
        }

        match pick_upgrade(offers, account) {
            Some(offer) => {
                o_info!(
                    "🔧 Ship {}: buying {} upgrade {} for {:.2} credits (balance {:.2})",
                    ship_id,
                    category,
                    offer.label(),
                    offer.price(),
                    account.balance
                );
                UpgradeDecision::Bought {
                    label: offer.label(),
                    price: offer.price(),
                }
            }
            None => {
                for offer in offers {
                    o_debug!(
                        "💸 Ship {}: not enough funds for {} ({:.2} credits, balance {:.2})",
                        ship_id,
                        offer.label(),
                        offer.price(),
                        account.balance
                    );
                }
                UpgradeDecision::Unaffordable {
                    candidates: offers.len(),
                }
            }
        }
    }
}
