pub mod hash;
pub mod id;
pub mod locations;
pub mod model;
pub mod time;
pub mod token;

pub use id::IdGenerator;
pub use locations::Locations;
pub use model::{Address, Location, Person};
pub use time::{Date, Timestamp};
pub use token::{qr_payload_base64, AccessToken, Engine as TokenEngine, LAST_VALID};
