use std::collections::HashMap;

use crate::types::{ConnectionCounts, ConnectionId, Role};

/// Observers currently attached to the engine.
///
/// Connection ids are unrelated to player ids, so a dropped player can come
/// back on a new connection and keep playing.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Role>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, role: Role) -> ConnectionId {
        let id = ulid::Ulid::new().to_string();
        self.connections.insert(id.clone(), role);
        id
    }

    pub fn detach(&mut self, id: &str) -> Option<Role> {
        self.connections.remove(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn counts(&self) -> ConnectionCounts {
        let mut counts = ConnectionCounts::default();
        for role in self.connections.values() {
            match role {
                Role::Host => counts.hosts += 1,
                Role::Beamer => counts.beamers += 1,
                Role::Player => counts.players += 1,
            }
        }
        counts
    }
}
