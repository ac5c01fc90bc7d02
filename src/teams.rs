const FOTMOB_LOGO_URL: &str = "https://images.fotmob.com/image_resources/logo/teamlogo/";

pub const AGAINST_COLOR: &str = "#A9A9A9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamInfo {
    /// fbref URL slug, e.g. `Union-Berlin`.
    pub key: &'static str,
    pub fbref_id: &'static str,
    /// FotMob team id used for the logo image.
    pub logo_id: &'static str,
    pub primary_color: &'static str,
    pub secondary_color: &'static str,
}

impl TeamInfo {
    pub fn display_name(&self) -> String {
        self.key.replace('-', " ")
    }

    pub fn logo_url(&self) -> String {
        format!("{FOTMOB_LOGO_URL}{}.png", self.logo_id)
    }
}

pub static TEAMS: &[TeamInfo] = &[
    TeamInfo {
        key: "Union-Berlin",
        fbref_id: "7a41008f",
        logo_id: "8149",
        primary_color: "#EB1923",
        secondary_color: AGAINST_COLOR,
    },
    TeamInfo {
        key: "Bayer-Leverkusen",
        fbref_id: "c7a9f859",
        logo_id: "8178",
        primary_color: "#E32221",
        secondary_color: AGAINST_COLOR,
    },
    TeamInfo {
        key: "Bayern-Munich",
        fbref_id: "054efa67",
        logo_id: "9823",
        primary_color: "#DC052D",
        secondary_color: AGAINST_COLOR,
    },
    TeamInfo {
        key: "Dortmund",
        fbref_id: "add600ae",
        logo_id: "9789",
        primary_color: "#FFD700",
        secondary_color: AGAINST_COLOR,
    },
    TeamInfo {
        key: "Stuttgart",
        fbref_id: "598bc722",
        logo_id: "10269",
        primary_color: "#E32219",
        secondary_color: AGAINST_COLOR,
    },
    TeamInfo {
        key: "Bochum",
        fbref_id: "b42c6323",
        logo_id: "9911",
        primary_color: "#005CA9",
        secondary_color: AGAINST_COLOR,
    },
];

/// Case-insensitive; spaces and dashes are interchangeable.
pub fn team_info(key: &str) -> Option<&'static TeamInfo> {
    let wanted = normalize_key(key);
    TEAMS.iter().find(|t| normalize_key(t.key) == wanted)
}

pub fn team_index(key: &str) -> Option<usize> {
    let wanted = normalize_key(key);
    TEAMS.iter().position(|t| normalize_key(t.key) == wanted)
}

fn normalize_key(key: &str) -> String {
    key.trim().replace(' ', "-").to_ascii_lowercase()
}
