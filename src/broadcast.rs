use tokio::sync::broadcast;

use crate::protocol::ServerMessage;
use crate::state::{Game, Signal, Update};

/// Buffered frames per observer before it counts as lagging
pub const BROADCAST_CAPACITY: usize = 256;

/// Fan-out of engine output to every attached observer
#[derive(Debug, Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<ServerMessage>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _rx) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.sender.subscribe()
    }

    pub fn send(&self, msg: ServerMessage) {
        // Ignore send errors (no observers attached is fine)
        let _ = self.sender.send(msg);
    }

    pub fn update(&self, update: Update, game: &Game) {
        let msg = match update {
            Update::FullState => ServerMessage::GameStateUpdate {
                game_state: game.view(),
            },
            Update::Score {
                player_id,
                new_score,
            } => ServerMessage::ScoreUpdated {
                player_id,
                new_score,
            },
        };
        self.send(msg);
    }

    pub fn signal(&self, signal: Signal) {
        let msg = match signal {
            Signal::Buzzed { player_id } => ServerMessage::Buzzed { player_id },
            Signal::PlayCue { name } => ServerMessage::PlayCue { name },
        };
        self.send(msg);
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(BROADCAST_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;

    #[tokio::test]
    async fn test_update_and_signal_messages() {
        let broadcaster = Broadcaster::default();
        let mut rx = broadcaster.subscribe();
        let game = Game {
            players: vec![Player::new("a", "Alice")],
            ..Game::new()
        };

        broadcaster.update(Update::FullState, &game);
        broadcaster.update(
            Update::Score {
                player_id: "a".into(),
                new_score: 10,
            },
            &game,
        );
        broadcaster.signal(Signal::PlayCue {
            name: "correct.mp3".into(),
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::GameStateUpdate {
                game_state: game.view()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::ScoreUpdated {
                player_id: "a".into(),
                new_score: 10
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::PlayCue {
                name: "correct.mp3".into()
            }
        );
    }

    #[test]
    fn test_send_without_observers_is_fine() {
        let broadcaster = Broadcaster::default();
        broadcaster.signal(Signal::Buzzed {
            player_id: "a".into(),
        });
    }
}
