//! Company lookup collaborator.
//!
//! A small curated directory of the organizations that actually hire in
//! this space. Lookup is exact on the key first, then substring against
//! keys and display names.

use questline_core::listing::CompanyProfile;

pub struct CompanyDirectory {
    entries: Vec<(String, CompanyProfile)>,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self {
            entries: seed_companies(),
        }
    }

    /// Find a company: exact case-insensitive key match, else substring
    /// match against keys or display names.
    pub fn find(&self, name: &str) -> Option<&CompanyProfile> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some((_, profile)) = self.entries.iter().find(|(key, _)| *key == needle) {
            return Some(profile);
        }

        self.entries
            .iter()
            .find(|(key, profile)| {
                key.contains(&needle) || profile.name.to_lowercase().contains(&needle)
            })
            .map(|(_, profile)| profile)
    }

    /// Display names of every known company.
    pub fn all_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(_, p)| p.name.as_str())
            .collect()
    }
}

impl Default for CompanyDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn company(
    key: &str,
    name: &str,
    description: &str,
    headquarters: &str,
    founded: &str,
    games: &[&str],
    achievements: &[&str],
    careers_url: &str,
    culture: &str,
) -> (String, CompanyProfile) {
    (
        key.into(),
        CompanyProfile {
            name: name.into(),
            description: description.into(),
            headquarters: headquarters.into(),
            founded: founded.into(),
            games: games.iter().map(|s| s.to_string()).collect(),
            notable_achievements: achievements.iter().map(|s| s.to_string()).collect(),
            careers_url: careers_url.into(),
            culture: culture.into(),
        },
    )
}

fn seed_companies() -> Vec<(String, CompanyProfile)> {
    vec![
        company(
            "team liquid",
            "Team Liquid",
            "One of the world's leading esports organizations with teams across multiple games including League of Legends, Dota 2, CS2, and Valorant.",
            "Netherlands / Los Angeles, USA",
            "2000",
            &["League of Legends", "Dota 2", "CS2", "Valorant", "Rocket League", "Super Smash Bros"],
            &["Multiple TI wins in Dota 2", "LCS Championships", "CS Major wins"],
            "https://www.teamliquid.com/careers",
            "Known for player development and long-term partnerships with sponsors like Honda, SAP, and Monster Energy.",
        ),
        company(
            "riot games",
            "Riot Games",
            "Developer of League of Legends and Valorant. Operates major global esports leagues including LCS, LEC, LCK, and VCT.",
            "Los Angeles, California, USA",
            "2006",
            &["League of Legends", "Valorant", "Teamfight Tactics", "Legends of Runeterra"],
            &["World's largest esports viewership", "Worlds Championship", "VCT Champions"],
            "https://www.riotgames.com/en/work-with-us",
            "Player-focused company culture with strong emphasis on competitive integrity and esports production quality.",
        ),
        company(
            "fnatic",
            "Fnatic",
            "Premier esports organization based in London with successful teams in League of Legends, Valorant, and other titles.",
            "London, United Kingdom",
            "2004",
            &["League of Legends", "Valorant", "CS2", "Dota 2"],
            &["League of Legends World Champions 2011", "Multiple Major wins", "LEC Championships"],
            "https://fnatic.com/careers",
            "European esports pioneer with strong brand identity and performance-driven culture.",
        ),
        company(
            "cloud9",
            "Cloud9",
            "Major North American esports organization competing in League of Legends, Valorant, CS2, and more.",
            "Santa Monica, California, USA",
            "2013",
            &["League of Legends", "Valorant", "CS2", "Overwatch"],
            &["Only NA team to reach Worlds semifinals", "CS Major Champions", "Multiple LCS titles"],
            "https://www.cloud9.gg/pages/careers",
            "Content-focused organization known for developing talent and strong community engagement.",
        ),
        company(
            "g2 esports",
            "G2 Esports",
            "European esports powerhouse with championship teams across multiple titles.",
            "Berlin, Germany",
            "2014",
            &["League of Legends", "Valorant", "CS2", "Rocket League", "Rainbow Six Siege"],
            &["Multiple LEC Championships", "MSI Winners", "Worlds Finalists"],
            "https://g2esports.com/careers",
            "Known for bold social media presence and competitive excellence. Fan-first approach.",
        ),
        company(
            "100 thieves",
            "100 Thieves",
            "Gaming and lifestyle brand founded by Nadeshot. Combines esports with streetwear fashion and content creation.",
            "Los Angeles, California, USA",
            "2017",
            &["League of Legends", "Valorant", "Call of Duty"],
            &["LCS Championship", "CDL Championship", "VCT Americas finalists"],
            "https://100thieves.com/pages/careers",
            "Lifestyle brand culture blending esports, apparel, and entertainment content.",
        ),
        company(
            "logitech",
            "Logitech",
            "Swiss technology company and major esports peripheral sponsor. Logitech G is their gaming brand providing gear for professional players.",
            "Lausanne, Switzerland",
            "1981",
            &["Sponsors across all major esports titles"],
            &["Official peripherals partner of major esports leagues", "Sponsors of top teams globally"],
            "https://www.logitech.com/en-us/careers.html",
            "Innovation-focused with strong esports marketing division.",
        ),
        company(
            "octagon",
            "Octagon",
            "Global sports and entertainment marketing agency with a dedicated esports division handling partnerships and activations.",
            "Stamford, Connecticut, USA",
            "1983",
            &["Agency for multiple esports titles and brands"],
            &["Major brand activations in esports", "APAC esports expansion"],
            "https://www.octagon.com/careers",
            "Agency environment focused on sports and entertainment marketing with growing esports focus.",
        ),
        company(
            "garena",
            "Garena",
            "Southeast Asian digital entertainment platform and game publisher. Operates Free Fire and Arena of Valor esports leagues.",
            "Singapore",
            "2009",
            &["Free Fire", "Arena of Valor", "League of Legends (SEA)"],
            &["Free Fire World Series", "Arena of Valor World Cup", "Largest mobile esports in SEA"],
            "https://career.sea.com/teams/garena",
            "Fast-paced gaming company focused on mobile esports and Southeast Asian markets.",
        ),
        company(
            "grand canyon university",
            "Grand Canyon University Esports",
            "Collegiate esports program at Grand Canyon University offering varsity-level competition.",
            "Phoenix, Arizona, USA",
            "2018",
            &["Overwatch", "League of Legends", "Rocket League", "Valorant", "Super Smash Bros"],
            &["Growing collegiate esports program", "State-of-the-art esports arena"],
            "https://gcu.wd1.myworkdayjobs.com/GCUC",
            "Collegiate environment combining education with competitive gaming opportunities.",
        ),
    ]
}
