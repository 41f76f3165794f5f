//! Demo tracks featured on the landing page.

/// A playable demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub id: &'static str,
    pub title: &'static str,
    pub path: &'static str,
}

pub const DEMO_TRACKS: &[Track] = &[
    Track {
        id: "party-dj",
        title: "Party DJ Drop",
        path: "/demos/party-dj.mp3",
    },
    Track {
        id: "radio-dj",
        title: "Radio DJ Drop",
        path: "/demos/radio-dj.mp3",
    },
    Track {
        id: "station-jingle",
        title: "Station Jingle",
        path: "/demos/station-jingle.mp3",
    },
    Track {
        id: "podcast-intro",
        title: "Podcast Intro",
        path: "/demos/podcast-intro.mp3",
    },
];

pub const PREMIUM_TRACKS: &[Track] = &[
    Track {
        id: "promo-maker",
        title: "Promo Maker",
        path: "/demos/promo-maker.mp3",
    },
    Track {
        id: "sung-jingles",
        title: "Sung Jingles",
        path: "/demos/sung-jingles.mp3",
    },
];

/// Every track on the page, demos first.
pub fn all_tracks() -> impl Iterator<Item = &'static Track> {
    DEMO_TRACKS.iter().chain(PREMIUM_TRACKS.iter())
}
