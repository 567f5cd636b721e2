use serde::Deserialize;

use super::station::Planet;
use super::market::ShipOffer;

// Reply shapes of individual endpoints

#[derive(Debug, Deserialize)]
pub struct PingReply {
    pub ping: String,
}

/// `/player/new/{name}`
#[derive(Debug, Deserialize, Clone)]
pub struct Registration {
    #[serde(rename = "playerId")]
    pub player_id: u64,
    pub key: String,
}

/// Purchases and hires answer with the id of the new entity
#[derive(Debug, Deserialize)]
pub struct IdReply {
    pub id: u64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TravelCost {
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
pub struct ScanReply {
    pub planets: Vec<Planet>,
}

#[derive(Debug, Deserialize)]
pub struct UnloadReply {
    pub unloaded: f64,
}

#[derive(Debug, Deserialize)]
pub struct SaleReply {
    pub added_money: f64,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseReply {
    pub removed_money: f64,
}

#[derive(Debug, Deserialize)]
pub struct RepairReply {
    #[serde(rename = "added-hull")]
    pub added_hull: f64,
}

#[derive(Debug, Deserialize)]
pub struct RefuelReply {
    #[serde(rename = "added-fuel")]
    pub added_fuel: f64,
}

#[derive(Debug, Deserialize)]
pub struct ShipyardListing {
    pub ships: Vec<ShipOffer>,
}

#[derive(Debug, Deserialize)]
pub struct PriceBoard {
    pub prices: serde_json::Map<String, serde_json::Value>,
}
