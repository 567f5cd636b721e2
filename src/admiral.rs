// Admiral module - fleet scheduler dispatching every ship once per tick
use crate::client::RemoteError;
use crate::config::ConfigManager;
use crate::operations::*;
use crate::output_broker::get_output_broker;
use crate::shutdown::StopSignal;
use crate::{o_error, o_info, o_summary};

/// What the scheduler did with one ship during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum ShipDispatch {
    /// In flight or extracting; left alone
    Busy(ShipCondition),
    /// State label the agent does not know
    Unrecognized(String),
    Mined { outcome: MiningOutcome, upgrades: usize },
    Sold { earned: f64, upgrades: usize },
    /// Full hold in the field, navigation home issued
    ReturningHome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Continue { ships: usize },
    Lost { money: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Stopped,
    Lost,
}

pub struct Admiral {
    session: PlayerSession,
    config: ConfigManager,
    stop: StopSignal,
}

impl Admiral {
    pub fn new(session: PlayerSession, config: ConfigManager, stop: StopSignal) -> Self {
        Self { session, config, stop }
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    /// Station trader, then a first ship when the player owns none
    pub async fn initialize(&self) -> Result<(), ProvisionError> {
        let api = self.session.api();
        let station_id = self.session.station_id();

        Provisioner::new(&self.session).ensure_station_trader().await?;

        let status = self.session.status().await?;
        if status.ships.is_empty() && self.config.config().policy.buy_first_ship {
            let offers = api.shipyard_offers(station_id).await?;
            match offers.iter().min_by(|a, b| a.price.total_cmp(&b.price)) {
                Some(cheapest) if status.money > cheapest.price => {
                    api.buy_ship(station_id, cheapest.id).await?;
                    o_info!("🚢 Purchased the first ship for {:.2} credits", cheapest.price);
                }
                Some(cheapest) => {
                    o_error!(
                        "⚠️ Cannot afford a first ship ({:.2} credits, balance {:.2})",
                        cheapest.price,
                        status.money
                    );
                }
                None => o_error!("⚠️ The shipyard offers no ship"),
            }
        }

        o_info!("✅ Game initialisation finished");
        Ok(())
    }

    /// One pass over every owned ship
    pub async fn run_tick(&self) -> Result<TickOutcome, RemoteError> {
        let status = self.session.status().await?;
        self.session.report_status(&status);
        if status.has_lost() {
            return Ok(TickOutcome::Lost { money: status.money });
        }

        let ship_ids = status.ship_ids();
        for ship_id in &ship_ids {
            if self.stop.is_stopped() {
                break;
            }

            match self.dispatch_ship(*ship_id).await {
                Ok(dispatch) => o_summary!("{}", Self::describe(*ship_id, &dispatch)),
                Err(CycleError::Stopped) => o_summary!("🛑 Ship {}: interrupted by shutdown", ship_id),
                Err(e) => o_summary!("❌ Ship {}: cycle aborted: {}", ship_id, e),
            }
        }

        Ok(TickOutcome::Continue { ships: ship_ids.len() })
    }

    /// Classify the ship and run the one cycle its condition calls for
    pub async fn dispatch_ship(&self, ship_id: u64) -> Result<ShipDispatch, CycleError> {
        let config = self.config.config();
        let api = self.session.api();

        let ship = api.get_ship(ship_id).await?;
        match classify(&ship, self.session.home()) {
            ShipCondition::Docked => {
                let report = UpgradeBuyer::new(&self.session, &config.policy.ship_upgrades)
                    .run_all(ship_id)
                    .await;
                let upgrades = report.purchases();

                let ship = api.get_ship(ship_id).await?;
                if ship.cargo.usage < config.policy.sell_threshold {
                    let outcome = MiningCycle::new(&self.session, &config.timing, &self.stop)
                        .run(ship_id)
                        .await?;
                    Ok(ShipDispatch::Mined { outcome, upgrades })
                } else {
                    let report = MaintenanceCycle::new(&self.session, &config.timing, &self.stop)
                        .run(ship_id)
                        .await?;
                    Ok(ShipDispatch::Sold {
                        earned: report.earned(),
                        upgrades,
                    })
                }
            }
            ShipCondition::Idle if ship.cargo.is_full() => {
                Navigator::new(&self.session, &config.timing, &self.stop)
                    .depart(ship_id, self.session.home())
                    .await?;
                Ok(ShipDispatch::ReturningHome)
            }
            ShipCondition::Idle => {
                let outcome = MiningCycle::new(&self.session, &config.timing, &self.stop)
                    .resume(ship_id)
                    .await?;
                Ok(ShipDispatch::Mined { outcome, upgrades: 0 })
            }
            ShipCondition::Unknown(label) => {
                o_error!("❓ Ship {} reports unknown state {:?}, leaving it alone", ship_id, label);
                Ok(ShipDispatch::Unrecognized(label))
            }
            busy => Ok(ShipDispatch::Busy(busy)),
        }
    }

    fn describe(ship_id: u64, dispatch: &ShipDispatch) -> String {
        match dispatch {
            ShipDispatch::Busy(condition) => format!("{} Ship {}: {}", condition.emoji(), ship_id, condition),
            ShipDispatch::Unrecognized(label) => format!("❓ Ship {}: unknown state {}", ship_id, label),
            ShipDispatch::Mined { outcome, upgrades } => match outcome {
                MiningOutcome::CargoFull { usage, capacity } => format!(
                    "⛏️ Ship {}: mined until full ({:.1}/{:.1}), {} upgrade(s)",
                    ship_id, usage, capacity, upgrades
                ),
                MiningOutcome::StoppedEarly { usage, capacity } => format!(
                    "⚠️ Ship {}: mining stopped early ({:.1}/{:.1}), {} upgrade(s)",
                    ship_id, usage, capacity, upgrades
                ),
            },
            ShipDispatch::Sold { earned, upgrades } => format!(
                "💰 Ship {}: sold cargo for {:.2} credits, {} upgrade(s)",
                ship_id, earned, upgrades
            ),
            ShipDispatch::ReturningHome => format!("🏠 Ship {}: hold full, returning to station", ship_id),
        }
    }

    /// Tick until stopped or the player loses
    pub async fn run_continuous_operations(&mut self) -> RunOutcome {
        o_info!("🎖️ Admiral starting continuous operations");
        let mut tick_count: u64 = 0;

        loop {
            if self.stop.is_stopped() {
                return RunOutcome::Stopped;
            }

            self.config.check_and_reload();
            tick_count += 1;
            o_info!("\n🔄 ═══════ TICK #{} ═══════", tick_count);

            let delay = match self.run_tick().await {
                Ok(TickOutcome::Continue { ships }) => {
                    if ships == 0 {
                        o_summary!("🚢 No ship owned");
                    }
                    self.config.config().timing.tick_delay()
                }
                Ok(TickOutcome::Lost { money }) => {
                    o_error!("💀 Player has lost ({:.2} credits), stopping", money);
                    get_output_broker().flush_summaries();
                    return RunOutcome::Lost;
                }
                Err(e) => {
                    let delay = self.config.config().timing.error_retry_delay();
                    o_error!("❌ Tick #{} failed: {}, retrying in {:.1}s", tick_count, e, delay.as_secs_f64());
                    delay
                }
            };

            get_output_broker().flush_summaries();
            if !self.stop.sleep(delay).await {
                return RunOutcome::Stopped;
            }
        }
    }
}
