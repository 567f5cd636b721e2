use serde::Deserialize;

use super::ship::{CrewRole, ModuleKind};

/// Something for sale that the upgrade policy can weigh
pub trait Offer {
    fn label(&self) -> String;
    fn price(&self) -> f64;
}

/// Entry of `/station/{sta}/shop/modules/{sid}/upgrade`, keyed by module id
#[derive(Debug, Clone)]
pub struct ModuleUpgradeOffer {
    pub module_id: String,
    pub module_type: ModuleKind,
    pub price: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModuleUpgradeEntry {
    pub price: f64,
    #[serde(rename = "module-type")]
    pub module_type: ModuleKind,
}

/// Entry of `/station/{sta}/shipyard/upgrade`, keyed by upgrade name
#[derive(Debug, Clone)]
pub struct ShipUpgradeOffer {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShipUpgradeEntry {
    pub price: f64,
}

/// Entry of `/station/{sta}/crew/upgrade/ship/{sid}`, keyed by crew member id
#[derive(Debug, Clone)]
pub struct CrewUpgradeOffer {
    pub crew_id: String,
    pub member_type: CrewRole,
    pub price: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrewUpgradeEntry {
    pub price: f64,
    #[serde(rename = "member-type")]
    pub member_type: CrewRole,
}

/// Ship for sale at the shipyard
#[derive(Debug, Deserialize, Clone)]
pub struct ShipOffer {
    pub id: u64,
    pub price: f64,
}

/// Entry of `/resources`
#[derive(Debug, Deserialize, Clone)]
pub struct ResourceInfo {
    #[serde(rename = "base-price")]
    pub base_price: f64,
}

impl Offer for ModuleUpgradeOffer {
    fn label(&self) -> String {
        format!("{} module #{}", self.module_type, self.module_id)
    }

    fn price(&self) -> f64 {
        self.price
    }
}

impl Offer for ShipUpgradeOffer {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn price(&self) -> f64 {
        self.price
    }
}

impl Offer for CrewUpgradeOffer {
    fn label(&self) -> String {
        format!("{} #{}", self.member_type, self.crew_id)
    }

    fn price(&self) -> f64 {
        self.price
    }
}

impl Offer for ShipOffer {
    fn label(&self) -> String {
        format!("ship #{}", self.id)
    }

    fn price(&self) -> f64 {
        self.price
    }
}
