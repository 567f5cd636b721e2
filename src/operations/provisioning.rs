// Crew and module prerequisites, checked against the server before any purchase
use std::fmt;

use crate::client::RemoteError;
use crate::models::{CrewRole, ModuleKind};
use crate::operations::session::PlayerSession;
use crate::{o_debug, o_info};

/// Crew slot name for the ship's pilot
pub const PILOT_SLOT: &str = "pilot";

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionError {
    Remote(RemoteError),
    /// Balance does not exceed the shop price
    CannotAfford { item: String, price: f64, balance: f64 },
    /// The station shop does not list the module
    NotOffered { item: String },
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::Remote(e) => write!(f, "{}", e),
            ProvisionError::CannotAfford { item, price, balance } => {
                write!(f, "cannot afford {} ({:.2} credits, balance {:.2})", item, price, balance)
            }
            ProvisionError::NotOffered { item } => write!(f, "{} is not sold at the station", item),
        }
    }
}

impl std::error::Error for ProvisionError {}

impl From<RemoteError> for ProvisionError {
    fn from(err: RemoteError) -> Self {
        ProvisionError::Remote(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleProvision {
    AlreadyInstalled,
    Installed { module_id: u64, operator_hired: bool },
}

pub struct Provisioner<'a> {
    session: &'a PlayerSession,
}

impl<'a> Provisioner<'a> {
    pub fn new(session: &'a PlayerSession) -> Self {
        Self { session }
    }

    /// Make sure the home station has a Trader assigned to trading.
    /// Returns `true` when one had to be hired.
    pub async fn ensure_station_trader(&self) -> Result<bool, ProvisionError> {
        let api = self.session.api();
        let station_id = self.session.station_id();

        let station = api.get_station(station_id).await?;
        if station.has_crew(&CrewRole::Trader) {
            o_debug!("🧑‍💼 Station {} already has a trader", station_id);
            return Ok(false);
        }

        let trader_id = api.hire_crew(station_id, &CrewRole::Trader).await?;
        api.assign_trader(station_id, trader_id).await?;
        o_info!("🧑‍💼 Hired trader {} and assigned it to station {}", trader_id, station_id);
        Ok(true)
    }

    /// Make sure a Pilot flies the ship. Returns `true` when one had to be hired.
    pub async fn ensure_pilot(&self, ship_id: u64) -> Result<bool, ProvisionError> {
        let api = self.session.api();
        let station_id = self.session.station_id();

        let ship = api.get_ship(ship_id).await?;
        if ship.has_crew(&CrewRole::Pilot) {
            return Ok(false);
        }

        let pilot_id = api.hire_crew(station_id, &CrewRole::Pilot).await?;
        api.assign_crew(station_id, pilot_id, ship_id, PILOT_SLOT).await?;
        o_info!("🧑‍✈️ Hired pilot {} for ship {}", pilot_id, ship_id);
        Ok(true)
    }

    /// Make sure the ship carries a module of `kind`; buys it from the home
    /// station shop and staffs it with an Operator when the crew has none.
    pub async fn ensure_module(&self, ship_id: u64, kind: &ModuleKind) -> Result<ModuleProvision, ProvisionError> {
        let api = self.session.api();
        let station_id = self.session.station_id();

        let ship = api.get_ship(ship_id).await?;
        if ship.has_module(kind) {
            return Ok(ModuleProvision::AlreadyInstalled);
        }

        let prices = api.module_prices(station_id).await?;
        let price = prices
            .iter()
            .find(|(offered, _)| offered == kind)
            .map(|(_, price)| *price)
            .ok_or_else(|| ProvisionError::NotOffered { item: kind.to_string() })?;

        let balance = self.session.status().await?.money;
        if balance <= price {
            return Err(ProvisionError::CannotAfford {
                item: kind.to_string(),
                price,
                balance,
            });
        }

        let module_id = api.buy_module(station_id, ship_id, kind).await?;
        o_info!("🛒 Bought {} module {} for ship {} ({:.2} credits)", kind, module_id, ship_id, price);

        let operator_hired = if ship.has_crew(&CrewRole::Operator) {
            false
        } else {
            let operator_id = api.hire_crew(station_id, &CrewRole::Operator).await?;
            api.assign_crew(station_id, operator_id, ship_id, &module_id.to_string())
                .await?;
            o_info!("👷 Hired operator {} for module {} on ship {}", operator_id, module_id, ship_id);
            true
        };

        Ok(ModuleProvision::Installed {
            module_id,
            operator_hired,
        })
    }
}
