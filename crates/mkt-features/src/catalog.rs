//! The feature catalog
//!
//! An ordered table of device/browser capabilities a web app can require.
//! A feature's position in [`APP_FEATURES`] is its bit index in every
//! signature ever issued, so the table is append-only: new features go at
//! the end, existing entries are never reordered or removed.

use std::fmt::{self, Display, Formatter};

/// Version tag emitted with signatures unless configured otherwise
pub const DEFAULT_VERSION: u32 = 1;

/// One capability flag in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    /// Upper-case constant name, e.g. `"APPS"`
    pub id: &'static str,
    /// Short human-readable name
    pub name: &'static str,
    /// What an app requiring this feature needs from the device
    pub description: &'static str,
}

impl FeatureSpec {
    /// Define a catalog entry
    #[must_use]
    pub const fn new(id: &'static str, name: &'static str, description: &'static str) -> Self {
        Self {
            id,
            name,
            description,
        }
    }

    /// Profile key: the id lower-cased
    #[must_use]
    pub fn key(&self) -> String {
        self.id.to_ascii_lowercase()
    }
}

macro_rules! features {
    ($(($id:literal, $name:literal, $desc:literal)),* $(,)?) => {
        &[$(FeatureSpec::new($id, $name, $desc)),*]
    };
}

/// Production catalog. Append only.
pub static APP_FEATURES: &[FeatureSpec] = features![
    ("APPS", "App Management API", "The app requires the `navigator.mozApps` API to install and manage other apps."),
    ("PACKAGED_APPS", "Packaged Apps Install API", "The app requires the `navigator.mozApps.installPackage` API to install other packaged apps."),
    ("PAY", "Web Payment", "The app requires the `navigator.mozPay` API."),
    ("ACTIVITY", "Web Activities", "The app requires Web Activities (the `MozActivity` API)."),
    ("LIGHT_EVENTS", "Ambient Light Sensor", "The app requires an ambient light sensor (the `ondevicelight` API)."),
    ("ARCHIVE", "Archive", "The app requires the `ArchiveReader` API."),
    ("BATTERY", "Battery", "The app requires the `navigator.battery` API."),
    ("BLUETOOTH", "Bluetooth", "The app requires the `navigator.mozBluetooth` API."),
    ("CONTACTS", "Contacts", "The app requires the `navigator.mozContacts` API."),
    ("DEVICE_STORAGE", "Device Storage", "The app requires the Device Storage API to access files on the filesystem."),
    ("INDEXEDDB", "IndexedDB", "The app requires the platform to support IndexedDB."),
    ("GEOLOCATION", "Geolocation", "The app requires the platform to support the `navigator.geolocation` API."),
    ("IDLE", "Idle", "The app requires the platform to support the `addIdleObserver` API."),
    ("NETWORK_INFO", "Network Information", "The app requires the ability to get information about the network connection (the `navigator.mozConnection` API)."),
    ("NETWORK_STATS", "Network Stats", "The app requires the `navigator.mozNetworkStats` API."),
    ("PROXIMITY", "Proximity", "The app requires a proximity sensor (the `ondeviceproximity` API)."),
    ("PUSH", "Simple Push", "The app requires the `navigator.mozPush` API."),
    ("ORIENTATION", "Screen Orientation", "The app requires the platform to support the `ondeviceorientation` API."),
    ("TIME_CLOCK", "Time/Clock", "The app requires the `navigator.mozTime` API."),
    ("VIBRATE", "Vibration", "The app requires the device to support vibration (the `navigator.vibrate` API)."),
    ("FM", "WebFM", "The app requires the `navigator.mozFM` or `navigator.mozFMRadio` APIs."),
    ("SMS", "WebSMS", "The app requires the `navigator.mozSms` API."),
    ("TOUCH", "Touch", "The app requires the platform to support touch events."),
    ("QHD", "Smartphone-Sized Displays", "The app requires the platform to have a smartphone-sized display (having qHD resolution)."),
    ("MP3", "MP3", "The app requires that the platform can decode and play MP3 files."),
    ("AUDIO", "Audio", "The app requires that the platform supports the HTML5 audio API."),
    ("WEBAUDIO", "Web Audio", "The app requires that the platform supports the Web Audio API (`window.AudioContext`)."),
    ("VIDEO_H264", "H.264", "The app requires that the platform can decode and play H.264 video files."),
    ("VIDEO_WEBM", "WebM", "The app requires that the platform can decode and play WebM video files (VP8)."),
    ("FULLSCREEN", "Full Screen", "The app requires the Full Screen API (`requestFullScreen` or `mozRequestFullScreen`)."),
    ("GAMEPAD", "Gamepad", "The app requires the platform to support the gamepad API (`navigator.getGamepads`)."),
    ("QUOTA", "Quota Management", "The app requires the platform to allow persistent storage limit increases above the normally allowed limits for an app (`window.StorageInfo` or `window.persistentStorage`)."),
    ("CAMERA", "Camera", "The app requires the platform to allow access to video from the device camera via a LocalMediaStream object."),
    ("MIC", "Microphone", "The app requires the platform to allow access to audio from the device microphone."),
    ("SCREEN_CAPTURE", "Screen Capture", "The app requires the platform to allow access to the device screen for capture."),
    ("WEBRTC_MEDIA", "WebRTC MediaStream", "The app requires the platform to allow web real-time communication browser-to-browser inbound media streams."),
    ("WEBRTC_DATA", "WebRTC DataChannel", "The app requires the platform to allow peer-to-peer exchange of data other than audio and video."),
    ("WEBRTC_PEER", "WebRTC PeerConnection", "The app requires the platform to allow communication of streaming data between peers."),
    ("SPEECH_SYN", "Web Speech Synthesis", "The app requires the platform to allow the use of text-to-speech."),
    ("SPEECH_REC", "Web Speech Recognition", "The app requires the platform to allow the use of speech-to-text."),
    ("POINTER_LOCK", "Pointer Lock", "The app requires the platform to provide additional information and control about the pointer."),
    ("NOTIFICATION", "Notifications", "The app requires the platform to allow the displaying phone and desktop notifications to the user."),
    ("ALARM", "Alarms", "The app requires the platform to provide access to the device alarm settings to schedule notifications and events at specific time."),
    ("SYSTEMXHR", "SystemXHR", "The app requires the platform to allow the sending of asynchronous HTTP requests without the restrictions of the same-origin policy."),
    ("TCPSOCKET", "TCP Sockets", "The app requires the platform to allow opening raw TCP sockets."),
    ("THIRDPARTY_KEYBOARD_SUPPORT", "Third-Party Keyboard Support", "The app requires the platform to support third-party keyboards."),
    ("NETWORK_INFO_MULTIPLE", "Multiple Network Information", "The app requires the ability to get information about multiple network connections."),
    ("MOBILEID", "Mobile ID", "The app requires access to the `navigator.getMobileIdAssertion` API."),
    ("PRECOMPILE_ASMJS", "Asm.js Precompilation", "The app requires the device to support precompilation of asm.js code."),
    ("HARDWARE_512MB_RAM", "512MB RAM Device", "The app requires the device to have at least 512MB RAM."),
    ("HARDWARE_1GB_RAM", "1GB RAM Device", "The app requires the device to have at least 1GB RAM."),
    ("NFC", "NFC", "The app requires access to the Near Field Communication (NFC) API."),
];

/// Handle over an ordered feature table plus the version tag it signs with
///
/// Cheap to copy. Tests and older snapshots use their own tables; production
/// code uses [`FeatureCatalog::app`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureCatalog {
    features: &'static [FeatureSpec],
    version: u32,
}

impl FeatureCatalog {
    /// Catalog over an arbitrary table
    #[inline]
    #[must_use]
    pub const fn new(features: &'static [FeatureSpec], version: u32) -> Self {
        Self { features, version }
    }

    /// The production catalog
    #[inline]
    #[must_use]
    pub const fn app() -> Self {
        Self::new(APP_FEATURES, DEFAULT_VERSION)
    }

    /// Same features, different version tag
    #[inline]
    #[must_use]
    pub const fn with_version(self, version: u32) -> Self {
        Self {
            features: self.features,
            version,
        }
    }

    /// Version tag emitted with signatures
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Number of features
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Feature at a bit position
    #[inline]
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&'static FeatureSpec> {
        self.features.get(position)
    }

    /// Bit position of a profile key
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.features
            .iter()
            .position(|f| f.id.eq_ignore_ascii_case(key))
    }

    /// Entries in bit order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &'static FeatureSpec> {
        self.features.iter()
    }

    /// Profile keys in bit order
    pub fn keys(&self) -> impl Iterator<Item = String> {
        self.features.iter().map(FeatureSpec::key)
    }

    /// The first `limit` features, as the catalog stood when it was that long
    ///
    /// `limit` past the end yields the whole catalog.
    #[must_use]
    pub fn snapshot(&self, limit: usize) -> Self {
        let features = self.features;
        Self {
            features: &features[..limit.min(features.len())],
            version: self.version,
        }
    }
}

impl Default for FeatureCatalog {
    fn default() -> Self {
        Self::app()
    }
}

impl Display for FeatureSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key())
    }
}
