// Mining cycle: idle -> travel -> extraction -> idle with a full hold
use crate::client::RemoteError;
use crate::config::TimingConfig;
use crate::models::Ship;
use crate::operations::errors::CycleError;
use crate::operations::navigation::Navigator;
use crate::operations::provisioning::{ModuleProvision, Provisioner};
use crate::operations::session::PlayerSession;
use crate::operations::targeting::{select_target, MiningCapability, MiningTarget};
use crate::shutdown::StopSignal;
use crate::{o_debug, o_error, o_info};

/// How the extraction ended once the ship went idle again
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MiningOutcome {
    CargoFull { usage: f64, capacity: f64 },
    /// Extraction stopped with room left in the hold
    StoppedEarly { usage: f64, capacity: f64 },
}

enum MiningStep {
    AwaitIdle,
    SelectTarget { ship: Ship },
    EnsureModule { target: MiningTarget },
    Travel { target: MiningTarget },
    Extract,
    AwaitCargoFull,
    Done(MiningOutcome),
}

impl MiningStep {
    fn name(&self) -> &'static str {
        match self {
            MiningStep::AwaitIdle => "AwaitIdle",
            MiningStep::SelectTarget { .. } => "SelectTarget",
            MiningStep::EnsureModule { .. } => "EnsureModule",
            MiningStep::Travel { .. } => "Travel",
            MiningStep::Extract => "Extract",
            MiningStep::AwaitCargoFull => "AwaitCargoFull",
            MiningStep::Done(_) => "Done",
        }
    }
}

pub struct MiningCycle<'a> {
    session: &'a PlayerSession,
    navigator: Navigator<'a>,
}

impl<'a> MiningCycle<'a> {
    pub fn new(session: &'a PlayerSession, timing: &'a TimingConfig, stop: &'a StopSignal) -> Self {
        Self {
            session,
            navigator: Navigator::new(session, timing, stop),
        }
    }

    /// Full cycle from wherever the ship is. Any failure aborts the remaining steps.
    pub async fn run(&self, ship_id: u64) -> Result<MiningOutcome, CycleError> {
        self.drive(ship_id, MiningStep::AwaitIdle).await
    }

    /// Restart extraction where a field-idle ship already sits. Falls back to
    /// the full cycle when the ship cannot mine here.
    pub async fn resume(&self, ship_id: u64) -> Result<MiningOutcome, CycleError> {
        let ship = self.session.api().get_ship(ship_id).await?;
        if MiningCapability::of(&ship).is_unequipped() {
            o_info!("⛏️ Ship {} has no mining module, running the full mining cycle", ship_id);
            return self.run(ship_id).await;
        }

        match self.start_extraction(ship_id).await {
            Ok(()) => self.drive(ship_id, MiningStep::AwaitCargoFull).await,
            Err(CycleError::Remote(RemoteError::Rejected { code })) => {
                o_info!("⛏️ Ship {} cannot extract at {} ({}), running the full mining cycle", ship_id, ship.position, code);
                self.run(ship_id).await
            }
            Err(e) => Err(e),
        }
    }

    async fn drive(&self, ship_id: u64, start: MiningStep) -> Result<MiningOutcome, CycleError> {
        let mut step = start;
        loop {
            o_debug!("⛏️ Ship {} mining step: {}", ship_id, step.name());
            step = match step {
                MiningStep::AwaitIdle => {
                    let ship = self.navigator.wait_until_settled(ship_id, None).await?;
                    MiningStep::SelectTarget { ship }
                }
                MiningStep::SelectTarget { ship } => {
                    let planets = self.session.api().scan_planets(self.session.station_id()).await?;
                    let target = select_target(&ship, self.session.home(), &planets)?;
                    o_info!(
                        "🎯 Ship {} targeting {} planet at {} ({:.1} from station)",
                        ship_id,
                        if target.planet.solid { "solid" } else { "gaseous" },
                        target.planet.position,
                        target.distance
                    );
                    if target.needs_module {
                        MiningStep::EnsureModule { target }
                    } else {
                        MiningStep::Travel { target }
                    }
                }
                MiningStep::EnsureModule { target } => {
                    let provision = Provisioner::new(self.session)
                        .ensure_module(ship_id, &target.module)
                        .await?;
                    if provision == ModuleProvision::AlreadyInstalled {
                        o_debug!("⛏️ Ship {} already carries a {}", ship_id, target.module);
                    }
                    MiningStep::Travel { target }
                }
                MiningStep::Travel { target } => {
                    self.navigator.travel_to(ship_id, &target.planet.position).await?;
                    MiningStep::Extract
                }
                MiningStep::Extract => {
                    self.start_extraction(ship_id).await?;
                    MiningStep::AwaitCargoFull
                }
                MiningStep::AwaitCargoFull => {
                    let ship = self.navigator.wait_until_settled(ship_id, None).await?;
                    MiningStep::Done(Self::cargo_outcome(&ship))
                }
                MiningStep::Done(outcome) => {
                    match outcome {
                        MiningOutcome::CargoFull { usage, capacity } => {
                            o_info!("📦 Ship {} cargo is full ({:.1}/{:.1}), mining done", ship_id, usage, capacity);
                        }
                        MiningOutcome::StoppedEarly { usage, capacity } => {
                            o_error!(
                                "⚠️ Ship {} stopped extracting with room left ({:.1}/{:.1})",
                                ship_id,
                                usage,
                                capacity
                            );
                        }
                    }
                    return Ok(outcome);
                }
            };
        }
    }

    async fn start_extraction(&self, ship_id: u64) -> Result<(), CycleError> {
        let rates = self.session.api().start_extraction(ship_id).await?;
        o_info!("⛏️ Ship {} starting extraction", ship_id);
        for (resource, rate) in &rates {
            o_info!("\t- Extraction of {}: {}/sec", resource, rate);
        }
        Ok(())
    }

    fn cargo_outcome(ship: &Ship) -> MiningOutcome {
        let usage = ship.cargo.usage;
        let capacity = ship.cargo.capacity;
        if ship.cargo.is_full() {
            MiningOutcome::CargoFull { usage, capacity }
        } else {
            MiningOutcome::StoppedEarly { usage, capacity }
        }
    }
}
