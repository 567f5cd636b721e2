// Ship travel and the poll-until-settled wait
use std::time::{Duration, Instant};

use crate::client::RemoteError;
use crate::config::TimingConfig;
use crate::models::{Position, Ship};
use crate::operations::errors::CycleError;
use crate::operations::provisioning::Provisioner;
use crate::operations::session::PlayerSession;
use crate::shutdown::StopSignal;
use crate::{o_debug, o_info};

pub struct Navigator<'a> {
    session: &'a PlayerSession,
    timing: &'a TimingConfig,
    stop: &'a StopSignal,
}

impl<'a> Navigator<'a> {
    pub fn new(session: &'a PlayerSession, timing: &'a TimingConfig, stop: &'a StopSignal) -> Self {
        Self { session, timing, stop }
    }

    /// Fly to `destination` and wait for arrival. No-op when already there.
    pub async fn travel_to(&self, ship_id: u64, destination: &Position) -> Result<Ship, CycleError> {
        let ship = self.session.api().get_ship(ship_id).await?;
        if ship.is_at(destination) {
            o_debug!("📍 Ship {} already at {}", ship_id, destination);
            return Ok(ship);
        }

        let duration = self.depart(ship_id, destination).await?;
        self.wait_until_settled(ship_id, Some(duration)).await
    }

    /// Issue the navigation order without waiting. Returns the announced flight time.
    pub async fn depart(&self, ship_id: u64, destination: &Position) -> Result<Duration, CycleError> {
        Provisioner::new(self.session).ensure_pilot(ship_id).await?;

        let cost = self.session.api().navigate(ship_id, destination).await?;
        let duration = Duration::try_from_secs_f64(cost.duration.max(0.0))
            .map_err(|e| RemoteError::unreachable(format!("unusable flight duration {}: {}", cost.duration, e)))?;
        o_info!("🚀 Ship {} traveling to {}, will take {:.1}s", ship_id, destination, cost.duration);
        Ok(duration)
    }

    /// Poll the ship until it is neither in flight nor extracting.
    ///
    /// Poll intervals start at `idle_poll_seconds` and double up to
    /// `max_poll_seconds`; `first_delay` may stretch only the first one.
    /// The whole wait is bounded by `max_wait_seconds` and the stop signal.
    pub async fn wait_until_settled(&self, ship_id: u64, first_delay: Option<Duration>) -> Result<Ship, CycleError> {
        let started = Instant::now();
        let max_wait = self.timing.max_wait();
        let mut backoff = self.timing.idle_poll();
        let mut stretch = first_delay;

        loop {
            if self.stop.is_stopped() {
                return Err(CycleError::Stopped);
            }

            let ship = self.session.api().get_ship(ship_id).await?;
            if !ship.state.is_busy() {
                return Ok(ship);
            }

            let elapsed = started.elapsed();
            if elapsed >= max_wait {
                return Err(CycleError::WaitExpired {
                    ship_id,
                    waited_seconds: elapsed.as_secs_f64(),
                });
            }

            let delay = match stretch.take() {
                Some(first) => first.max(backoff),
                None => backoff,
            };
            o_debug!("⏳ Ship {} is {}, next check in {:.1}s", ship_id, ship.state, delay.as_secs_f64());
            if !self.stop.sleep(delay.min(max_wait - elapsed)).await {
                return Err(CycleError::Stopped);
            }
            backoff = (backoff * 2).min(self.timing.max_poll());
        }
    }
}
