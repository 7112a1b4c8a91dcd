pub mod prefs;
pub mod process;

pub use prefs::{PrefsProbe, VersionProbe};
pub use process::{ProcessControl, SpotifyProcess};
