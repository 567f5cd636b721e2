use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::client::remote::{GameRemote, RemoteError};
use crate::models::*;

/// Typed view of the game endpoints on top of a [`GameRemote`]
#[derive(Clone)]
pub struct GameApi {
    remote: Arc<dyn GameRemote>,
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<T, RemoteError> {
    serde_json::from_value(body)
        .map_err(|e| RemoteError::unreachable(format!("unexpected reply shape from {}: {}", endpoint, e)))
}

/// Decode a JSON object into `(key, entry)` pairs, keeping the server's order
fn decode_entries<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<Vec<(String, T)>, RemoteError> {
    let Value::Object(map) = body else {
        return Err(RemoteError::unreachable(format!("expected an object from {}", endpoint)));
    };

    map.into_iter()
        .map(|(key, entry)| decode(endpoint, entry).map(|entry| (key, entry)))
        .collect()
}

/// Amounts go into the path; whole numbers print without a fraction
fn amount_segment(amount: f64) -> String {
    format!("{}", amount)
}

impl GameApi {
    pub fn new(remote: Arc<dyn GameRemote>) -> Self {
        Self { remote }
    }

    pub fn authenticate(&self, key: &str) {
        self.remote.authenticate(key);
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, RemoteError> {
        let body = self.remote.call(endpoint, &[]).await?;
        decode(endpoint, body)
    }

    async fn get_entries<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<(String, T)>, RemoteError> {
        let body = self.remote.call(endpoint, &[]).await?;
        decode_entries(endpoint, body)
    }

    /// Fire a command whose reply carries nothing the agent uses
    async fn command(&self, endpoint: &str) -> Result<(), RemoteError> {
        self.remote.call(endpoint, &[]).await.map(|_| ())
    }

    // Session

    pub async fn ping(&self) -> Result<bool, RemoteError> {
        let reply: PingReply = self.get("/ping").await?;
        Ok(reply.ping == "pong")
    }

    pub async fn register_player(&self, username: &str) -> Result<Registration, RemoteError> {
        self.get(&format!("/player/new/{}", username)).await
    }

    pub async fn get_player(&self, player_id: u64) -> Result<PlayerStatus, RemoteError> {
        self.get(&format!("/player/{}", player_id)).await
    }

    // Station

    pub async fn get_station(&self, station_id: &str) -> Result<Station, RemoteError> {
        self.get(&format!("/station/{}", station_id)).await
    }

    pub async fn scan_planets(&self, station_id: &str) -> Result<Vec<Planet>, RemoteError> {
        let reply: ScanReply = self.get(&format!("/station/{}/scan", station_id)).await?;
        Ok(reply.planets)
    }

    /// Module shop prices, in catalog order
    pub async fn module_prices(&self, station_id: &str) -> Result<Vec<(ModuleKind, f64)>, RemoteError> {
        let entries: Vec<(String, f64)> = self.get_entries(&format!("/station/{}/shop/modules", station_id)).await?;
        Ok(entries.into_iter().map(|(kind, price)| (ModuleKind::from(kind), price)).collect())
    }

    /// Buy a module for a ship; returns the new module id
    pub async fn buy_module(&self, station_id: &str, ship_id: u64, kind: &ModuleKind) -> Result<u64, RemoteError> {
        let reply: IdReply = self.get(&format!("/station/{}/shop/modules/{}/buy/{}", station_id, ship_id, kind)).await?;
        Ok(reply.id)
    }

    pub async fn hire_crew(&self, station_id: &str, role: &CrewRole) -> Result<u64, RemoteError> {
        let reply: IdReply = self.get(&format!("/station/{}/crew/hire/{}", station_id, role.path_segment())).await?;
        Ok(reply.id)
    }

    /// Assign a crew member to a ship slot: `pilot` or a module id
    pub async fn assign_crew(&self, station_id: &str, crew_id: u64, ship_id: u64, slot: &str) -> Result<(), RemoteError> {
        self.command(&format!("/station/{}/crew/assign/{}/{}/{}", station_id, crew_id, ship_id, slot)).await
    }

    pub async fn assign_trader(&self, station_id: &str, crew_id: u64) -> Result<(), RemoteError> {
        self.command(&format!("/station/{}/crew/assign/{}/trading", station_id, crew_id)).await
    }

    pub async fn repair(&self, station_id: &str, ship_id: u64) -> Result<f64, RemoteError> {
        let reply: RepairReply = self.get(&format!("/station/{}/repair/{}", station_id, ship_id)).await?;
        Ok(reply.added_hull)
    }

    pub async fn refuel(&self, station_id: &str, ship_id: u64) -> Result<f64, RemoteError> {
        let reply: RefuelReply = self.get(&format!("/station/{}/refuel/{}", station_id, ship_id)).await?;
        Ok(reply.added_fuel)
    }

    // Upgrades

    pub async fn module_upgrades(&self, station_id: &str, ship_id: u64) -> Result<Vec<ModuleUpgradeOffer>, RemoteError> {
        let entries: Vec<(String, ModuleUpgradeEntry)> = self
            .get_entries(&format!("/station/{}/shop/modules/{}/upgrade", station_id, ship_id))
            .await?;
        Ok(entries
            .into_iter()
            .map(|(module_id, entry)| ModuleUpgradeOffer {
                module_id,
                module_type: entry.module_type,
                price: entry.price,
            })
            .collect())
    }

    pub async fn buy_module_upgrade(&self, station_id: &str, ship_id: u64, module_id: &str) -> Result<(), RemoteError> {
        self.command(&format!("/station/{}/shop/modules/{}/upgrade/{}", station_id, ship_id, module_id)).await
    }

    pub async fn ship_upgrades(&self, station_id: &str) -> Result<Vec<ShipUpgradeOffer>, RemoteError> {
        let entries: Vec<(String, ShipUpgradeEntry)> = self
            .get_entries(&format!("/station/{}/shipyard/upgrade", station_id))
            .await?;
        Ok(entries
            .into_iter()
            .map(|(name, entry)| ShipUpgradeOffer { name, price: entry.price })
            .collect())
    }

    pub async fn buy_ship_upgrade(&self, station_id: &str, ship_id: u64, upgrade: &str) -> Result<(), RemoteError> {
        self.command(&format!("/station/{}/shipyard/upgrade/{}/{}", station_id, ship_id, upgrade)).await
    }

    pub async fn crew_upgrades(&self, station_id: &str, ship_id: u64) -> Result<Vec<CrewUpgradeOffer>, RemoteError> {
        let entries: Vec<(String, CrewUpgradeEntry)> = self
            .get_entries(&format!("/station/{}/crew/upgrade/ship/{}", station_id, ship_id))
            .await?;
        Ok(entries
            .into_iter()
            .map(|(crew_id, entry)| CrewUpgradeOffer {
                crew_id,
                member_type: entry.member_type,
                price: entry.price,
            })
            .collect())
    }

    pub async fn buy_crew_upgrade(&self, station_id: &str, ship_id: u64, crew_id: &str) -> Result<(), RemoteError> {
        self.command(&format!("/station/{}/crew/upgrade/ship/{}/{}", station_id, ship_id, crew_id)).await
    }

    // Shipyard

    pub async fn shipyard_offers(&self, station_id: &str) -> Result<Vec<ShipOffer>, RemoteError> {
        let listing: ShipyardListing = self.get(&format!("/station/{}/shipyard/list", station_id)).await?;
        Ok(listing.ships)
    }

    pub async fn buy_ship(&self, station_id: &str, offer_id: u64) -> Result<(), RemoteError> {
        self.command(&format!("/station/{}/shipyard/buy/{}", station_id, offer_id)).await
    }

    // Ship

    pub async fn get_ship(&self, ship_id: u64) -> Result<Ship, RemoteError> {
        self.get(&format!("/ship/{}", ship_id)).await
    }

    pub async fn navigate(&self, ship_id: u64, destination: &Position) -> Result<TravelCost, RemoteError> {
        self.get(&format!(
            "/ship/{}/navigate/{}/{}/{}",
            ship_id,
            destination.x(),
            destination.y(),
            destination.z()
        ))
        .await
    }

    /// Start extracting; returns per-resource rates (units/sec)
    pub async fn start_extraction(&self, ship_id: u64) -> Result<Vec<(String, f64)>, RemoteError> {
        self.get_entries(&format!("/ship/{}/extraction/start", ship_id)).await
    }

    pub async fn unload(&self, ship_id: u64, resource: &str, amount: f64) -> Result<f64, RemoteError> {
        let reply: UnloadReply = self
            .get(&format!("/ship/{}/unload/{}/{}", ship_id, resource, amount_segment(amount)))
            .await?;
        Ok(reply.unloaded)
    }

    // Market

    pub async fn sell(&self, station_id: &str, resource: &str, amount: f64) -> Result<f64, RemoteError> {
        let reply: SaleReply = self
            .get(&format!("/market/{}/sell/{}/{}", station_id, resource, amount_segment(amount)))
            .await?;
        Ok(reply.added_money)
    }

    pub async fn buy_resource(&self, station_id: &str, resource: &str, amount: f64) -> Result<f64, RemoteError> {
        let reply: PurchaseReply = self
            .get(&format!("/market/{}/buy/{}/{}", station_id, resource, amount_segment(amount)))
            .await?;
        Ok(reply.removed_money)
    }

    pub async fn resource_catalog(&self) -> Result<Vec<(String, ResourceInfo)>, RemoteError> {
        self.get_entries("/resources").await
    }

    pub async fn market_prices(&self) -> Result<Vec<(String, f64)>, RemoteError> {
        let board: PriceBoard = self.get("/market/prices").await?;
        decode_entries("/market/prices", Value::Object(board.prices))
    }
}
