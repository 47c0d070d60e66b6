use rand::RngCore;
use tokio::sync::{mpsc, Mutex};

/// A buffered stream of random hex identifiers.
///
/// Generation happens on a single background task feeding a bounded channel, so callers
/// on the hot path never block on the RNG; they only wait for the channel to have an id
/// ready, which in steady state it already does. Uniqueness is not guaranteed — only
/// astronomically likely at `id_length >= 8` — callers must not depend on it for safety,
/// only for identification.
pub struct IdGenerator {
    receiver: Mutex<mpsc::Receiver<String>>,
}

impl IdGenerator {
    /// Spawn the background producer, generating `id_length`-hex-character ids, and
    /// return a handle to its output channel.
    pub fn start(buffer: usize, id_length: usize) -> Self {
        let (tx, rx) = mpsc::channel(buffer);
        let byte_len = (id_length + 1) / 2;

        tokio::spawn(async move {
            let mut rng = rand::rngs::OsRng;
            let mut bytes = vec![0u8; byte_len];
            loop {
                rng.fill_bytes(&mut bytes);
                let mut id = hex::encode(&bytes);
                id.truncate(id_length);
                if tx.send(id).await.is_err() {
                    break;
                }
            }
        });

        Self {
            receiver: Mutex::new(rx),
        }
    }

    /// Take the next identifier from the stream.
    pub async fn next(&self) -> String {
        self.receiver
            .lock()
            .await
            .recv()
            .await
            .expect("id generator task never stops while the handle is alive")
    }
}
