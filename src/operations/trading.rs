// Selling and maintenance cycle: return home, liquidate cargo, repair, refuel
use crate::config::TimingConfig;
use crate::models::{Ship, FUEL, HULL_PLATE};
use crate::operations::errors::CycleError;
use crate::operations::navigation::Navigator;
use crate::operations::session::PlayerSession;
use crate::shutdown::StopSignal;
use crate::{o_debug, o_info};

/// Hull plates needed to repair the ship completely
pub fn required_hull_plates(ship: &Ship) -> f64 {
    ship.hull_decay.trunc()
}

/// Fuel units needed to fill the tank
pub fn required_fuel(ship: &Ship) -> f64 {
    (ship.fuel_tank_capacity - ship.fuel_tank).trunc()
}

/// Quantity to buy so the station holds `required`
pub fn shortfall(required: f64, stock: f64) -> f64 {
    if stock < required { required - stock } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceKind {
    Repair,
    Refuel,
}

impl MaintenanceKind {
    pub fn resource(&self) -> &'static str {
        match self {
            MaintenanceKind::Repair => HULL_PLATE,
            MaintenanceKind::Refuel => FUEL,
        }
    }

    pub fn required(&self, ship: &Ship) -> f64 {
        match self {
            MaintenanceKind::Repair => required_hull_plates(ship),
            MaintenanceKind::Refuel => required_fuel(ship),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub resource: String,
    pub amount: f64,
    pub unloaded: f64,
    pub earned: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestockOutcome {
    NotNeeded,
    Applied { bought: f64, spent: f64, added: f64 },
    /// Nothing in stock even after buying
    NoStock { bought: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceReport {
    pub sales: Vec<Sale>,
    pub repair: RestockOutcome,
    pub refuel: RestockOutcome,
}

impl MaintenanceReport {
    pub fn earned(&self) -> f64 {
        self.sales.iter().map(|sale| sale.earned).sum()
    }
}

pub struct MaintenanceCycle<'a> {
    session: &'a PlayerSession,
    navigator: Navigator<'a>,
}

impl<'a> MaintenanceCycle<'a> {
    pub fn new(session: &'a PlayerSession, timing: &'a TimingConfig, stop: &'a StopSignal) -> Self {
        Self {
            session,
            navigator: Navigator::new(session, timing, stop),
        }
    }

    /// Sell everything on board, then repair and refuel. The ship must be settled.
    pub async fn run(&self, ship_id: u64) -> Result<MaintenanceReport, CycleError> {
        let ship = self.navigator.travel_to(ship_id, self.session.home()).await?;

        let sales = self.sell_cargo(&ship).await?;
        let repair = self.restock(ship_id, MaintenanceKind::Repair).await?;
        let refuel = self.restock(ship_id, MaintenanceKind::Refuel).await?;

        Ok(MaintenanceReport { sales, repair, refuel })
    }

    /// Unload then sell the same quantity, once per resource actually on board
    pub async fn sell_cargo(&self, ship: &Ship) -> Result<Vec<Sale>, CycleError> {
        let api = self.session.api();
        let station_id = self.session.station_id();
        let mut sales = Vec::new();

        for (resource, amount) in ship.cargo.loaded_resources() {
            let unloaded = api.unload(ship.id, resource, amount).await?;
            let earned = api.sell(station_id, resource, amount).await?;
            o_info!("💰 Ship {}: unloaded and sold {} of {}, for {:.2} credits", ship.id, unloaded, resource, earned);
            sales.push(Sale {
                resource: resource.clone(),
                amount,
                unloaded,
                earned,
            });
        }

        Ok(sales)
    }

    /// Buy the station's shortfall of the consumable, then apply whatever is in stock
    pub async fn restock(&self, ship_id: u64, kind: MaintenanceKind) -> Result<RestockOutcome, CycleError> {
        let api = self.session.api();
        let station_id = self.session.station_id();
        let resource = kind.resource();

        let ship = api.get_ship(ship_id).await?;
        let required = kind.required(&ship);
        if required <= 0.0 {
            o_debug!("🔧 Ship {}: no {} needed", ship_id, resource);
            return Ok(RestockOutcome::NotNeeded);
        }

        let mut station = api.get_station(station_id).await?;
        let need = shortfall(required, station.stock(resource));
        let mut spent = 0.0;
        if need > 0.0 {
            spent = api.buy_resource(station_id, resource, need).await?;
            o_info!("🛒 Bought {} of {} for {:.2} credits", need, resource, spent);
            station = api.get_station(station_id).await?;
        }

        if station.stock(resource) <= 0.0 {
            return Ok(RestockOutcome::NoStock { bought: need });
        }

        let added = match kind {
            MaintenanceKind::Repair => {
                let added = api.repair(station_id, ship_id).await?;
                o_info!("🔧 Ship {}: repaired {} hull plates", ship_id, added);
                added
            }
            MaintenanceKind::Refuel => {
                let added = api.refuel(station_id, ship_id).await?;
                o_info!("⛽ Ship {}: refilled {} fuel", ship_id, added);
                added
            }
        };

        Ok(RestockOutcome::Applied {
            bought: need,
            spent,
            added,
        })
    }
}
