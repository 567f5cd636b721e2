// In-memory Simeis server shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use simeis_cc::client::remote::unwrap_status;
use simeis_cc::client::{GameApi, GameRemote, RemoteError};
use simeis_cc::config::TimingConfig;
use simeis_cc::models::Position;
use simeis_cc::operations::PlayerSession;

pub const STATION_ID: &str = "7";
pub const PLAYER_ID: u64 = 1;

#[derive(Debug, Clone)]
pub enum Pending {
    Flight { to: [f64; 3], polls_left: u32 },
    Extraction { polls_left: u32, resource: String },
}

#[derive(Debug, Clone)]
pub struct FakeShip {
    pub id: u64,
    pub position: [f64; 3],
    /// Raw state as the server sends it
    pub state: Value,
    pub capacity: f64,
    pub usage: f64,
    pub resources: BTreeMap<String, f64>,
    pub modules: BTreeMap<String, String>,
    pub crew: BTreeMap<String, String>,
    pub hull_decay: f64,
    pub fuel_tank: f64,
    pub fuel_tank_capacity: f64,
    pub pending: Option<Pending>,
}

impl FakeShip {
    pub fn new(id: u64, position: [f64; 3]) -> Self {
        Self {
            id,
            position,
            state: json!("Idle"),
            capacity: 100.0,
            usage: 0.0,
            resources: BTreeMap::new(),
            modules: BTreeMap::new(),
            crew: BTreeMap::new(),
            hull_decay: 0.0,
            fuel_tank: 50.0,
            fuel_tank_capacity: 50.0,
            pending: None,
        }
    }

    pub fn with_module(mut self, module_id: &str, modtype: &str) -> Self {
        self.modules.insert(module_id.to_string(), modtype.to_string());
        self
    }

    pub fn with_crew(mut self, crew_id: &str, role: &str) -> Self {
        self.crew.insert(crew_id.to_string(), role.to_string());
        self
    }

    pub fn with_cargo(mut self, resource: &str, amount: f64) -> Self {
        *self.resources.entry(resource.to_string()).or_insert(0.0) += amount;
        self.usage += amount;
        self
    }

    fn to_json(&self) -> Value {
        let modules: Map<String, Value> = self
            .modules
            .iter()
            .map(|(id, modtype)| (id.clone(), json!({ "modtype": modtype })))
            .collect();
        let crew: Map<String, Value> = self
            .crew
            .iter()
            .map(|(id, role)| (id.clone(), json!({ "member_type": role })))
            .collect();

        json!({
            "id": self.id,
            "position": self.position,
            "state": self.state,
            "cargo": {
                "capacity": self.capacity,
                "usage": self.usage,
                "resources": self.resources,
            },
            "modules": modules,
            "crew": crew,
            "hull_decay": self.hull_decay,
            "fuel_tank": self.fuel_tank,
            "fuel_tank_capacity": self.fuel_tank_capacity,
        })
    }

    /// One server poll: busy ships progress, finished actions settle
    fn advance(&mut self, extraction_fill: Option<f64>) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        match pending {
            Pending::Flight { to, polls_left } if polls_left > 0 => {
                self.pending = Some(Pending::Flight { to, polls_left: polls_left - 1 });
            }
            Pending::Flight { to, .. } => {
                self.position = to;
                self.state = json!("Idle");
            }
            Pending::Extraction { polls_left, resource } if polls_left > 0 => {
                self.pending = Some(Pending::Extraction {
                    polls_left: polls_left - 1,
                    resource,
                });
            }
            Pending::Extraction { resource, .. } => {
                let target = extraction_fill.unwrap_or(self.capacity).min(self.capacity);
                let gained = (target - self.usage).max(0.0);
                *self.resources.entry(resource).or_insert(0.0) += gained;
                self.usage += gained;
                self.state = json!("Idle");
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct World {
    pub player_id: u64,
    pub known_players: Vec<u64>,
    pub money: f64,
    pub costs: f64,
    pub station_position: [f64; 3],
    pub station_crew: BTreeMap<String, String>,
    pub station_stock: BTreeMap<String, f64>,
    pub ships: Vec<FakeShip>,
    /// (position, solid)
    pub planets: Vec<([f64; 3], bool)>,
    pub module_prices: Vec<(String, f64)>,
    /// (module id, module type, price)
    pub module_upgrades: Vec<(String, String, f64)>,
    pub ship_upgrades: Vec<(String, f64)>,
    /// (crew id, role, price)
    pub crew_upgrades: Vec<(String, String, f64)>,
    pub shipyard: Vec<(u64, f64)>,
    pub catalog: Vec<(String, f64)>,
    pub market_prices: Vec<(String, f64)>,
    pub sell_price: f64,
    pub buy_price: f64,
    pub flight_polls: u32,
    /// Flight time announced by navigate
    pub flight_duration: f64,
    pub extraction_polls: u32,
    /// Cargo level an extraction stops at; `None` fills the hold
    pub extraction_fill: Option<f64>,
    pub hired: BTreeMap<u64, String>,
    pub next_id: u64,
    pub ping_reply: String,
}

impl Default for World {
    fn default() -> Self {
        Self {
            player_id: PLAYER_ID,
            known_players: vec![PLAYER_ID],
            money: 10_000.0,
            costs: 1.0,
            station_position: [0.0, 0.0, 0.0],
            station_crew: BTreeMap::new(),
            station_stock: BTreeMap::new(),
            ships: Vec::new(),
            planets: vec![([3.0, 4.0, 0.0], true), ([1.0, 1.0, 1.0], false)],
            module_prices: vec![("Miner".to_string(), 100.0), ("GasSucker".to_string(), 120.0)],
            module_upgrades: Vec::new(),
            ship_upgrades: Vec::new(),
            crew_upgrades: Vec::new(),
            shipyard: vec![(501, 800.0), (502, 300.0)],
            catalog: Vec::new(),
            market_prices: Vec::new(),
            sell_price: 2.0,
            buy_price: 1.0,
            flight_polls: 1,
            flight_duration: 0.0,
            extraction_polls: 1,
            extraction_fill: None,
            hired: BTreeMap::new(),
            next_id: 100,
            ping_reply: "pong".to_string(),
        }
    }
}

impl World {
    pub fn ship(&self, ship_id: u64) -> Option<&FakeShip> {
        self.ships.iter().find(|ship| ship.id == ship_id)
    }

    pub fn ship_mut(&mut self, ship_id: u64) -> Option<&mut FakeShip> {
        self.ships.iter_mut().find(|ship| ship.id == ship_id)
    }

    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct FakeSimeis {
    world: Mutex<World>,
    calls: Mutex<Vec<String>>,
    keys: Mutex<Vec<String>>,
    /// Endpoints answered with a rejection when they start with one of these
    reject_prefixes: Mutex<Vec<String>>,
}

impl FakeSimeis {
    pub fn new(world: World) -> Arc<Self> {
        Arc::new(Self {
            world: Mutex::new(world),
            calls: Mutex::new(Vec::new()),
            keys: Mutex::new(Vec::new()),
            reject_prefixes: Mutex::new(Vec::new()),
        })
    }

    pub fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Number of recorded endpoints containing `fragment`
    pub fn count_calls(&self, fragment: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.contains(fragment))
            .count()
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }

    pub fn reject(&self, prefix: &str) {
        self.reject_prefixes.lock().unwrap().push(prefix.to_string());
    }

    fn route(&self, endpoint: &str) -> Value {
        let mut world = self.world.lock().unwrap();
        let segments: Vec<&str> = endpoint.trim_start_matches('/').split('/').collect();
        let fill = world.extraction_fill;
        let station_position = world.station_position;

        match segments.as_slice() {
            ["ping"] => ok(json!({ "ping": world.ping_reply })),
            ["player", "new", name] => {
                let player_id = world.fresh_id();
                world.player_id = player_id;
                world.known_players.push(player_id);
                ok(json!({ "playerId": player_id, "key": format!("key-{}", name) }))
            }
            ["player", pid] => {
                let pid: u64 = pid.parse().unwrap_or(0);
                if !world.known_players.contains(&pid) {
                    return rejected("player not found");
                }
                let ships: Vec<Value> = world.ships.iter().map(FakeShip::to_json).collect();
                ok(json!({
                    "money": world.money,
                    "costs": world.costs,
                    "stations": { STATION_ID: {} },
                    "ships": ships,
                }))
            }
            ["station", _] => {
                let crew: Map<String, Value> = world
                    .station_crew
                    .iter()
                    .map(|(id, role)| (id.clone(), json!({ "member_type": role })))
                    .collect();
                ok(json!({
                    "position": world.station_position,
                    "crew": crew,
                    "cargo": { "resources": world.station_stock },
                }))
            }
            ["station", _, "scan"] => {
                let planets: Vec<Value> = world
                    .planets
                    .iter()
                    .map(|(position, solid)| json!({ "position": position, "solid": solid }))
                    .collect();
                ok(json!({ "planets": planets }))
            }
            ["station", _, "shop", "modules"] => ok(entries(
                world.module_prices.iter().map(|(kind, price)| (kind.clone(), json!(price))),
            )),
            ["station", _, "shop", "modules", sid, "buy", modtype] => {
                let Some(price) = world
                    .module_prices
                    .iter()
                    .find(|(kind, _)| kind == modtype)
                    .map(|(_, price)| *price)
                else {
                    return rejected("unknown module");
                };
                if world.money < price {
                    return rejected("not enough money");
                }
                world.money -= price;
                let module_id = world.fresh_id();
                let modtype = modtype.to_string();
                match world.ship_mut(sid.parse().unwrap_or(0)) {
                    Some(ship) => {
                        ship.modules.insert(module_id.to_string(), modtype);
                        ok(json!({ "id": module_id }))
                    }
                    None => rejected("no such ship"),
                }
            }
            ["station", _, "shop", "modules", _, "upgrade"] => ok(entries(
                world
                    .module_upgrades
                    .iter()
                    .map(|(id, kind, price)| (id.clone(), json!({ "price": price, "module-type": kind }))),
            )),
            ["station", _, "shop", "modules", _, "upgrade", module_id] => {
                let price = world
                    .module_upgrades
                    .iter()
                    .find(|(id, _, _)| id == module_id)
                    .map(|(_, _, price)| *price);
                buy(&mut world, price)
            }
            ["station", _, "crew", "hire", role] => {
                let crew_id = world.fresh_id();
                let mut role = role.to_string();
                role[..1].make_ascii_uppercase();
                world.hired.insert(crew_id, role);
                ok(json!({ "id": crew_id }))
            }
            ["station", _, "crew", "assign", crew, "trading"] => {
                let crew_id: u64 = crew.parse().unwrap_or(0);
                match world.hired.remove(&crew_id) {
                    Some(role) => {
                        world.station_crew.insert(crew_id.to_string(), role);
                        ok(json!({}))
                    }
                    None => rejected("unknown crew member"),
                }
            }
            ["station", _, "crew", "assign", crew, sid, _slot] => {
                let crew_id: u64 = crew.parse().unwrap_or(0);
                let Some(role) = world.hired.remove(&crew_id) else {
                    return rejected("unknown crew member");
                };
                match world.ship_mut(sid.parse().unwrap_or(0)) {
                    Some(ship) => {
                        ship.crew.insert(crew_id.to_string(), role);
                        ok(json!({}))
                    }
                    None => rejected("no such ship"),
                }
            }
            ["station", _, "crew", "upgrade", "ship", _] => ok(entries(
                world
                    .crew_upgrades
                    .iter()
                    .map(|(id, role, price)| (id.clone(), json!({ "price": price, "member-type": role }))),
            )),
            ["station", _, "crew", "upgrade", "ship", _, crew_id] => {
                let price = world
                    .crew_upgrades
                    .iter()
                    .find(|(id, _, _)| id == crew_id)
                    .map(|(_, _, price)| *price);
                buy(&mut world, price)
            }
            ["station", _, "shipyard", "list"] => {
                let ships: Vec<Value> = world
                    .shipyard
                    .iter()
                    .map(|(id, price)| json!({ "id": id, "price": price }))
                    .collect();
                ok(json!({ "ships": ships }))
            }
            ["station", _, "shipyard", "buy", offer] => {
                let offer_id: u64 = offer.parse().unwrap_or(0);
                let Some(index) = world.shipyard.iter().position(|(id, _)| *id == offer_id) else {
                    return rejected("no such offer");
                };
                let (_, price) = world.shipyard.remove(index);
                if world.money < price {
                    return rejected("not enough money");
                }
                world.money -= price;
                world.ships.push(FakeShip::new(offer_id, station_position));
                ok(json!({}))
            }
            ["station", _, "shipyard", "upgrade"] => ok(entries(
                world
                    .ship_upgrades
                    .iter()
                    .map(|(name, price)| (name.clone(), json!({ "price": price }))),
            )),
            ["station", _, "shipyard", "upgrade", _, name] => {
                let price = world
                    .ship_upgrades
                    .iter()
                    .find(|(upgrade, _)| upgrade == name)
                    .map(|(_, price)| *price);
                buy(&mut world, price)
            }
            ["station", _, "repair", sid] => {
                let stock = world.station_stock.get("HullPlate").copied().unwrap_or(0.0);
                let Some(ship) = world.ship_mut(sid.parse().unwrap_or(0)) else {
                    return rejected("no such ship");
                };
                let added = stock.min(ship.hull_decay);
                ship.hull_decay -= added;
                world.station_stock.insert("HullPlate".to_string(), stock - added);
                ok(json!({ "added-hull": added }))
            }
            ["station", _, "refuel", sid] => {
                let stock = world.station_stock.get("Fuel").copied().unwrap_or(0.0);
                let Some(ship) = world.ship_mut(sid.parse().unwrap_or(0)) else {
                    return rejected("no such ship");
                };
                let added = stock.min(ship.fuel_tank_capacity - ship.fuel_tank);
                ship.fuel_tank += added;
                world.station_stock.insert("Fuel".to_string(), stock - added);
                ok(json!({ "added-fuel": added }))
            }
            ["ship", sid] => match world.ship_mut(sid.parse().unwrap_or(0)) {
                Some(ship) => {
                    ship.advance(fill);
                    ok(ship.to_json())
                }
                None => rejected("no such ship"),
            },
            ["ship", sid, "navigate", x, y, z] => {
                let to = [parse(x), parse(y), parse(z)];
                let polls = world.flight_polls;
                let duration = world.flight_duration;
                let Some(ship) = world.ship_mut(sid.parse().unwrap_or(0)) else {
                    return rejected("no such ship");
                };
                if !ship.crew.values().any(|role| role == "Pilot") {
                    return rejected("no pilot on board");
                }
                if ship.pending.is_some() {
                    return rejected("ship is busy");
                }
                ship.pending = Some(Pending::Flight { to, polls_left: polls });
                ship.state = json!({ "InFlight": { "destination": to } });
                ok(json!({ "duration": duration }))
            }
            ["ship", sid, "extraction", "start"] => {
                let polls = world.extraction_polls;
                let planets = world.planets.clone();
                let Some(ship) = world.ship_mut(sid.parse().unwrap_or(0)) else {
                    return rejected("no such ship");
                };
                let Some((_, solid)) = planets.iter().find(|(position, _)| *position == ship.position) else {
                    return rejected("no planet here");
                };
                let (module, resource) = if *solid { ("Miner", "Stone") } else { ("GasSucker", "Helium") };
                if !ship.modules.values().any(|modtype| modtype == module) {
                    return rejected("no compatible module");
                }
                ship.pending = Some(Pending::Extraction {
                    polls_left: polls,
                    resource: resource.to_string(),
                });
                ship.state = json!({ "Extracting": { "since": 0 } });
                ok(json!({ resource: 1.5 }))
            }
            ["ship", sid, "unload", resource, amount] => {
                let amount = parse(amount);
                let Some(ship) = world.ship_mut(sid.parse().unwrap_or(0)) else {
                    return rejected("no such ship");
                };
                let held = ship.resources.entry(resource.to_string()).or_insert(0.0);
                let unloaded = amount.min(*held);
                *held -= unloaded;
                ship.usage -= unloaded;
                ok(json!({ "unloaded": unloaded }))
            }
            ["market", _, "sell", _, amount] => {
                let earned = parse(amount) * world.sell_price;
                world.money += earned;
                ok(json!({ "added_money": earned }))
            }
            ["market", _, "buy", resource, amount] => {
                let amount = parse(amount);
                let spent = amount * world.buy_price;
                world.money -= spent;
                *world.station_stock.entry(resource.to_string()).or_insert(0.0) += amount;
                ok(json!({ "removed_money": spent }))
            }
            ["resources"] => ok(entries(
                world
                    .catalog
                    .iter()
                    .map(|(name, base)| (name.clone(), json!({ "base-price": base }))),
            )),
            ["market", "prices"] => {
                let prices = entries(world.market_prices.iter().map(|(name, price)| (name.clone(), json!(price))));
                ok(json!({ "prices": prices }))
            }
            _ => rejected("unknown endpoint"),
        }
    }
}

fn parse(raw: &str) -> f64 {
    raw.parse().unwrap_or(0.0)
}

fn entries(items: impl Iterator<Item = (String, Value)>) -> Value {
    Value::Object(items.collect())
}

/// The status leads the reply, as the real server sends it
fn ok(body: Value) -> Value {
    let mut reply = Map::new();
    reply.insert("error".to_string(), json!("ok"));
    if let Value::Object(fields) = body {
        reply.extend(fields);
    }
    Value::Object(reply)
}

fn rejected(code: &str) -> Value {
    json!({ "error": code })
}

fn buy(world: &mut World, price: Option<f64>) -> Value {
    match price {
        Some(price) if price <= world.money => {
            world.money -= price;
            ok(json!({}))
        }
        Some(_) => rejected("not enough money"),
        None => rejected("no such upgrade"),
    }
}

#[async_trait]
impl GameRemote for FakeSimeis {
    async fn call(&self, endpoint: &str, _params: &[(&str, String)]) -> Result<Value, RemoteError> {
        self.calls.lock().unwrap().push(endpoint.to_string());

        let forced = self
            .reject_prefixes
            .lock()
            .unwrap()
            .iter()
            .any(|prefix| endpoint.starts_with(prefix.as_str()));
        if forced {
            return unwrap_status(rejected("forced rejection"));
        }

        unwrap_status(self.route(endpoint))
    }

    fn authenticate(&self, key: &str) {
        self.keys.lock().unwrap().push(key.to_string());
    }
}

/// Poll fast so the cycles finish within a test
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        tick_delay_seconds: 0.001,
        error_retry_delay_seconds: 0.001,
        idle_poll_seconds: 0.001,
        max_poll_seconds: 0.004,
        max_wait_seconds: 5.0,
        config_reload_interval_seconds: 30,
        shutdown_grace_seconds: 1.0,
    }
}

pub fn api_for(fake: &Arc<FakeSimeis>) -> GameApi {
    let remote: Arc<dyn GameRemote> = fake.clone();
    GameApi::new(remote)
}

/// Session bound to the fake world's player and station, skipping setup
pub fn session_for(fake: &Arc<FakeSimeis>) -> PlayerSession {
    let (player_id, home) = {
        let world = fake.world();
        (world.player_id, Position(world.station_position))
    };
    PlayerSession::new(api_for(fake), "tester".to_string(), player_id, STATION_ID.to_string(), home)
}

/// Docked ship with a pilot and a miner, ready to work
pub fn equipped_ship(id: u64) -> FakeShip {
    FakeShip::new(id, [0.0, 0.0, 0.0])
        .with_crew("11", "Pilot")
        .with_crew("12", "Operator")
        .with_module("21", "Miner")
}
