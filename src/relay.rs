//! Two-seat TCP relay.
//!
//! The relay never looks inside the messages it forwards. The first client
//! to connect sits as player `a`, the second as `b`, and anyone else is
//! disconnected straight away. Each line a seated client sends is echoed
//! verbatim to both seats once the table is full; lines sent while a seat is
//! empty are dropped, not queued.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::constants::RELAY_SEATS;
use crate::state::Player;

/// Notices the relay itself sends to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RelayEvent {
    /// You are seated as `player`.
    Connected { player: Player },
    /// Your opponent, `player`, is seated too.
    OpponentConnected { player: Player },
}

impl RelayEvent {
    fn to_line(self) -> String {
        // Serializing two plain enums cannot fail.
        serde_json::to_string(&self).unwrap_or_default()
    }
}

fn seat_index(player: Player) -> usize {
    match player {
        Player::A => 0,
        Player::B => 1,
    }
}

/// Outgoing queues of the seated clients.
#[derive(Debug, Default)]
pub struct Seats {
    seats: [Option<UnboundedSender<String>>; RELAY_SEATS],
}

impl Seats {
    /// Seat a client in the first free chair.
    pub fn seat(&mut self, outbox: UnboundedSender<String>) -> Option<Player> {
        let player = Player::ALL
            .into_iter()
            .find(|&p| self.seats[seat_index(p)].is_none())?;
        self.seats[seat_index(player)] = Some(outbox);
        Some(player)
    }

    pub fn leave(&mut self, player: Player) {
        self.seats[seat_index(player)] = None;
    }

    pub fn is_full(&self) -> bool {
        self.seats.iter().all(Option::is_some)
    }

    /// Queue `line` for `player`. Returns false if the seat is empty or closed.
    pub fn send(&self, player: Player, line: String) -> bool {
        self.seats[seat_index(player)]
            .as_ref()
            .is_some_and(|outbox| outbox.send(line).is_ok())
    }

    /// Queue `line` for both players if the table is full. Returns how many
    /// seats it was queued for.
    pub fn broadcast(&self, line: &str) -> usize {
        if !self.is_full() {
            return 0;
        }
        Player::ALL
            .into_iter()
            .filter(|&p| self.send(p, line.to_string()))
            .count()
    }
}

/// Accept clients on `listener` forever.
pub async fn serve(listener: TcpListener) -> io::Result<()> {
    let seats = Arc::new(Mutex::new(Seats::default()));
    info!(addr = %listener.local_addr()?, "relay listening");
    loop {
        let (stream, addr) = listener.accept().await?;
        tokio::spawn(handle_client(stream, addr, Arc::clone(&seats)));
    }
}

async fn handle_client(stream: TcpStream, addr: SocketAddr, seats: Arc<Mutex<Seats>>) {
    let (tx, mut rx) = unbounded_channel::<String>();

    let player = {
        let mut seats = seats.lock().await;
        let Some(player) = seats.seat(tx) else {
            info!(%addr, "table full, closing connection");
            return;
        };
        seats.send(player, RelayEvent::Connected { player }.to_line());
        if seats.is_full() {
            for p in Player::ALL {
                seats.send(p, RelayEvent::OpponentConnected { player: p.opponent() }.to_line());
            }
        }
        player
    };
    info!(%addr, %player, "client seated");

    let (reader, mut writer) = stream.into_split();
    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            let framed = format!("{line}\n");
            if writer.write_all(framed.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                let delivered = seats.lock().await.broadcast(&line);
                if delivered == 0 {
                    debug!(%player, "opponent missing, dropping message");
                } else {
                    debug!(%player, delivered, "relayed message");
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(%addr, %player, error = %err, "read failed");
                break;
            }
        }
    }

    // Dropping the seat drops the last sender, which ends the writer task.
    seats.lock().await.leave(player);
    let _ = writer_task.await;
    info!(%addr, %player, "client left");
}
