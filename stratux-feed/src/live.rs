//! Live websocket feed from a hub.
//!
//! One task per channel connects to `ws://<host>/<channel>` and forwards
//! every text frame into a shared queue. A single consumer owns the
//! coordinator, so frames from all four channels are processed one at a
//! time in arrival order. Dropped connections are retried after a delay.

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use stratux_core::config::HubConfig;
use stratux_core::{Channel, StreamCoordinator, StreamEvent, CHANNELS};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const QUEUE_DEPTH: usize = 256;

/// A frame received from one channel.
#[derive(Debug)]
pub struct Incoming {
    pub channel: Channel,
    pub frame: String,
}

/// Start one reader task per channel.
pub fn spawn_readers(hub: &HubConfig, tx: mpsc::Sender<Incoming>) -> Vec<JoinHandle<()>> {
    CHANNELS
        .iter()
        .map(|&channel| tokio::spawn(read_channel(channel, hub.url(channel), tx.clone())))
        .collect()
}

/// Read one channel until the consumer goes away.
async fn read_channel(channel: Channel, url: String, tx: mpsc::Sender<Incoming>) {
    loop {
        match connect_async(url.as_str()).await {
            Ok((mut ws, _)) => {
                info!(%channel, %url, "connected");
                while let Some(msg) = ws.next().await {
                    match msg {
                        Ok(Message::Text(frame)) => {
                            if tx.send(Incoming { channel, frame }).await.is_err() {
                                return;
                            }
                        }
                        Ok(Message::Close(_)) => {
                            info!(%channel, "hub closed stream");
                            break;
                        }
                        Ok(other) => debug!(%channel, kind = ?other, "ignoring non-text message"),
                        Err(e) => {
                            warn!(%channel, error = %e, "websocket read failed");
                            break;
                        }
                    }
                }
            }
            Err(e) => warn!(%channel, %url, error = %e, "connect failed"),
        }

        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Feed queued frames into the coordinator until `shutdown` resolves or
/// every reader has stopped.
pub async fn run(
    hub: &HubConfig,
    coordinator: &mut StreamCoordinator,
    mut on_event: impl FnMut(&StreamEvent),
    shutdown: impl Future<Output = ()>,
) {
    let (tx, mut rx) = mpsc::channel(QUEUE_DEPTH);
    let readers = spawn_readers(hub, tx);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            incoming = rx.recv() => {
                let Some(Incoming { channel, frame }) = incoming else {
                    info!("all hub streams ended");
                    break;
                };
                for event in coordinator.process(channel, &frame) {
                    on_event(&event);
                }
            }
            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
        }
    }

    rx.close();
    for reader in readers {
        reader.abort();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
