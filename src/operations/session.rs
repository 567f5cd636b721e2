// Player session: identity, home station and account status
use crate::client::{GameApi, RemoteError};
use crate::models::{PlayerStatus, Position, Registration};
use crate::operations::errors::SetupError;
use crate::operations::upgrades::AccountSnapshot;
use crate::storage::{sanitize_username, SessionRecord, SessionStore};
use crate::{o_info, o_summary};

/// An authenticated player bound to its home station
#[derive(Clone)]
pub struct PlayerSession {
    api: GameApi,
    username: String,
    player_id: u64,
    station_id: String,
    home: Position,
}

impl PlayerSession {
    pub fn new(api: GameApi, username: String, player_id: u64, station_id: String, home: Position) -> Self {
        Self {
            api,
            username,
            player_id,
            station_id,
            home,
        }
    }

    /// Ping the server, load or create the player and bind its home station.
    /// A stored identity the server rejects is replaced by one fresh registration.
    pub async fn establish(api: GameApi, store: &SessionStore, raw_username: &str) -> Result<Self, SetupError> {
        match api.ping().await {
            Ok(true) => o_info!("🏓 Server answered the ping"),
            Ok(false) => return Err(SetupError::ServerDown("unexpected ping reply".to_string())),
            Err(e) => return Err(SetupError::ServerDown(e.to_string())),
        }

        let username = sanitize_username(raw_username);
        if username.is_empty() {
            return Err(SetupError::InvalidUsername(raw_username.to_string()));
        }

        let stored = store
            .load(&username)
            .map_err(|e| SetupError::Storage(e.to_string()))?;

        let (record, status) = match stored {
            Some(record) => {
                o_info!("💾 Loaded data for player {}", username);
                api.authenticate(&record.key);
                match api.get_player(record.player_id).await {
                    Ok(status) => (record, status),
                    Err(RemoteError::Rejected { code }) => {
                        o_info!("⚠️ Stored player {} was rejected ({}), registering again", record.player_id, code);
                        let record = Self::register(&api, store, &username).await?;
                        let status = api.get_player(record.player_id).await?;
                        (record, status)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => {
                let record = Self::register(&api, store, &username).await?;
                let status = api.get_player(record.player_id).await?;
                (record, status)
            }
        };

        if status.has_lost() {
            return Err(SetupError::PlayerLost { money: status.money });
        }

        let station_id = status.home_station_id().ok_or(SetupError::NoStation)?.to_string();
        let station = api.get_station(&station_id).await?;
        o_info!("🏠 Home station {} at {}", station_id, station.position);

        Ok(Self::new(api, record.username, record.player_id, station_id, station.position))
    }

    async fn register(api: &GameApi, store: &SessionStore, username: &str) -> Result<SessionRecord, SetupError> {
        let registration: Registration = api.register_player(username).await?;
        let record = SessionRecord::from_registration(username, registration);
        store
            .save(&record)
            .map_err(|e| SetupError::Storage(e.to_string()))?;
        api.authenticate(&record.key);
        o_info!("🆕 Created player {} (id {})", username, record.player_id);
        Ok(record)
    }

    pub fn api(&self) -> &GameApi {
        &self.api
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn player_id(&self) -> u64 {
        self.player_id
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn home(&self) -> &Position {
        &self.home
    }

    pub async fn status(&self) -> Result<PlayerStatus, RemoteError> {
        self.api.get_player(self.player_id).await
    }

    /// Fresh balance and burn rate
    pub async fn account(&self) -> Result<AccountSnapshot, RemoteError> {
        let status = self.status().await?;
        Ok(AccountSnapshot::from(&status))
    }

    pub fn report_status(&self, status: &PlayerStatus) {
        let runway = match status.runway_seconds() {
            Some(seconds) => format!("{} secs", seconds.trunc()),
            None => "unlimited".to_string(),
        };
        o_summary!(
            "💰 {}: {:.2} credits, costs {:.2}/s, time left before lost: {}",
            self.username,
            status.money,
            status.costs,
            runway
        );
    }
}
