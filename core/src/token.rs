use crate::id::IdGenerator;
use crate::locations::Locations;
use crate::model::Location;
use crate::time::Timestamp;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use dashmap::DashMap;
use qrcode::QrCode;
use std::fmt::{self, Display, Formatter};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// How many extra rotation periods a token stays acceptable after it stops being
/// "current" — the grace window. `1` matches the configured default everywhere else in
/// the system: one current slot, one grace slot.
pub const LAST_VALID: u32 = 1;

/// A short-lived access token scoped to a single location.
///
/// `valid_remaining` starts at [`LAST_VALID`] when minted and is decremented on every
/// tick; the token is dropped once it would go below zero. Exactly one live token per
/// location has `valid_remaining == LAST_VALID` at any instant once the engine has
/// completed its first tick — that is the "current" one.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub id: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub valid_remaining: u32,
    pub location: Location,
    /// PNG-encoded QR symbol embedding `<login_url>?token=<id>`.
    pub qr_payload: Vec<u8>,
}

/// The rotating token engine: one ticker task owns all mutation, readers go through a
/// lock-free concurrent map.
///
/// Every tick runs an update phase (age every live token, evicting the ones that just
/// fell off the grace window) followed by an issue phase (mint one fresh current token
/// per location). See spec §4.E for the full rationale: this keeps exactly one current
/// and at most one grace token alive per location, bounding any token's lifetime to
/// `2 * rotation_interval`.
pub struct Engine {
    tokens: DashMap<String, AccessToken>,
    rotation_interval: Duration,
}

impl Engine {
    /// Start the ticker task and return a handle shared across the web listeners.
    pub fn start(
        locations: Arc<Locations>,
        id_generator: Arc<IdGenerator>,
        login_url: Url,
        rotation_interval: Duration,
    ) -> Arc<Self> {
        let engine = Arc::new(Self {
            tokens: DashMap::new(),
            rotation_interval,
        });

        let ticking = Arc::clone(&engine);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(rotation_interval);
            loop {
                interval.tick().await;
                ticking.tick(&locations, &id_generator, &login_url).await;
            }
        });

        engine
    }

    async fn tick(&self, locations: &Locations, id_generator: &IdGenerator, login_url: &Url) {
        let extension = self.rotation_interval.as_secs() as i64;

        // Update phase: age every live token by one tick; evict the ones that just
        // exhausted their grace window, extend the rest's expiry by one more period.
        let mut expired = Vec::new();
        for mut entry in self.tokens.iter_mut() {
            if entry.valid_remaining == 0 {
                expired.push(entry.id.clone());
            } else {
                entry.valid_remaining -= 1;
                entry.expires_at = entry.expires_at.plus_seconds(extension);
            }
        }
        for id in expired {
            self.tokens.remove(&id);
        }

        // Issue phase: mint a fresh current token for every registered location.
        for location in locations.all() {
            let token = self.issue(location.clone(), id_generator, login_url).await;
            self.tokens.insert(token.id.clone(), token);
        }
    }

    async fn issue(&self, location: Location, id_generator: &IdGenerator, login_url: &Url) -> AccessToken {
        let id = id_generator.next().await;
        let issued_at = Timestamp::now();
        let expires_at = issued_at.plus_seconds(self.rotation_interval.as_secs() as i64);
        let qr_payload = encode_qr_payload(login_url, &id)
            .unwrap_or_else(|error| panic!("failed to encode QR payload for token {id:?}: {error}"));

        AccessToken {
            id,
            issued_at,
            expires_at,
            valid_remaining: LAST_VALID,
            location,
            qr_payload,
        }
    }

    /// Look up a token regardless of which location issued it or whether it is current
    /// or in its grace window.
    pub fn get_by_id(&self, id: &str) -> Option<AccessToken> {
        self.tokens.get(id).map(|entry| entry.value().clone())
    }

    /// The currently active token for a location: the one live token (if any) with
    /// `valid_remaining == LAST_VALID`. Ties are broken by iteration order, which this
    /// engine does not need to make deterministic since at most one match ever exists.
    pub fn get_current_for_location(&self, location: &Location) -> Option<AccessToken> {
        self.tokens
            .iter()
            .find(|entry| &entry.location == location && entry.valid_remaining == LAST_VALID)
            .map(|entry| entry.value().clone())
    }

    /// Every token presently valid, across all locations (current and grace).
    pub fn get_all(&self) -> Vec<AccessToken> {
        self.tokens.iter().map(|entry| entry.value().clone()).collect()
    }
}

/// Render a QR symbol encoding `<login_url>?token=<id>` as a PNG, matching the wire
/// format's `"qr":"<base64-png>"` field — the caller base64-encodes the returned bytes.
fn encode_qr_payload(login_url: &Url, token_id: &str) -> Result<Vec<u8>, Error> {
    let mut url = login_url.clone();
    url.query_pairs_mut().append_pair("token", token_id);

    let code = QrCode::new(url.as_str()).map_err(|_| Error::Encoding(token_id.to_owned()))?;
    let image = code.render::<image::Luma<u8>>().build();

    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|_| Error::Encoding(token_id.to_owned()))?;

    Ok(png)
}

/// Base64-encode a rendered QR payload for embedding in the token JSON API or an
/// `<img src="data:...">` tag.
pub fn qr_payload_base64(token: &AccessToken) -> String {
    BASE64_STANDARD.encode(&token.qr_payload)
}

#[derive(Debug)]
pub enum Error {
    /// The token id could not be encoded into a QR symbol; it should never happen for
    /// hex-encoded ids, but the QR format does bound input length. Fatal at mint time:
    /// the registry (or the configured login URL) is misconfigured.
    Encoding(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding(id) => write!(f, "failed to encode QR payload for token {id:?}"),
        }
    }
}

impl std::error::Error for Error {}
