use super::Game;
use crate::types::*;

impl Game {
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    /// Remove a player everywhere it is referenced. Returns false if unknown.
    pub(crate) fn remove_player(&mut self, player_id: &str) -> bool {
        let Some(position) = self.players.iter().position(|p| p.id == player_id) else {
            return false;
        };
        self.players.remove(position);
        self.buzzer_queue.retain(|id| id != player_id);
        if self.active_player_id.as_deref() == Some(player_id) {
            self.active_player_id = None;
        }
        true
    }

    /// Roster for a fresh game: same ids and names in the same order, everything else zeroed.
    pub(crate) fn reset_roster(&self) -> Vec<Player> {
        self.players
            .iter()
            .map(|p| Player::new(p.id.clone(), p.name.clone()))
            .collect()
    }

    /// Clear per-round player flags on a round change.
    pub(crate) fn clear_round_flags(&mut self) {
        for player in &mut self.players {
            player.star_of_hope = false;
            player.clear_speed_up_answer();
        }
    }
}
