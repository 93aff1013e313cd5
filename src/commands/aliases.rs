//! Spoken site name → URL alias table and URL heuristics for "open" commands

use std::collections::HashMap;

use crate::{Error, Result};

/// Built-in aliases: spoken name → canonical URL
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("youtube", "https://youtube.com"),
    ("facebook", "https://facebook.com"),
    ("instagram", "https://instagram.com"),
    ("twitter", "https://twitter.com"),
    ("google", "https://google.com"),
    ("gmail", "https://gmail.com"),
    ("github", "https://github.com"),
    ("linkedin", "https://linkedin.com"),
    ("netflix", "https://netflix.com"),
    ("amazon", "https://amazon.com"),
    ("wikipedia", "https://wikipedia.org"),
    ("whatsapp", "https://web.whatsapp.com"),
    ("spotify", "https://open.spotify.com"),
    ("reddit", "https://reddit.com"),
    ("yahoo", "https://yahoo.com"),
    ("bing", "https://bing.com"),
    ("msn", "https://msn.com"),
    ("ebay", "https://ebay.com"),
    ("imdb", "https://imdb.com"),
    ("pinterest", "https://pinterest.com"),
    ("twitch", "https://twitch.tv"),
    ("discord", "https://discord.com"),
    ("zoom", "https://zoom.us"),
    ("slack", "https://slack.com"),
    ("dropbox", "https://dropbox.com"),
    ("drive", "https://drive.google.com"),
    ("docs", "https://docs.google.com"),
    ("sheets", "https://sheets.google.com"),
    ("slides", "https://slides.google.com"),
    ("outlook", "https://outlook.live.com"),
    ("office", "https://office.com"),
    ("onedrive", "https://onedrive.live.com"),
    ("teams", "https://teams.microsoft.com"),
    ("skype", "https://web.skype.com"),
    ("telegram", "https://web.telegram.org"),
    ("signal", "https://signal.org"),
    ("tiktok", "https://tiktok.com"),
    ("snapchat", "https://web.snapchat.com"),
    ("tumblr", "https://tumblr.com"),
    ("wordpress", "https://wordpress.com"),
    ("blogger", "https://blogger.com"),
    ("medium", "https://medium.com"),
    ("quora", "https://quora.com"),
    ("stackoverflow", "https://stackoverflow.com"),
    ("gitlab", "https://gitlab.com"),
    ("bitbucket", "https://bitbucket.org"),
    ("docker", "https://hub.docker.com"),
    ("npm", "https://npmjs.com"),
    ("yarn", "https://yarnpkg.com"),
    ("nodejs", "https://nodejs.org"),
    ("python", "https://python.org"),
    ("java", "https://java.com"),
    ("oracle", "https://oracle.com"),
    ("microsoft", "https://microsoft.com"),
    ("apple", "https://apple.com"),
    ("samsung", "https://samsung.com"),
    ("xiaomi", "https://mi.com"),
    ("oneplus", "https://oneplus.com"),
    ("sony", "https://sony.com"),
    ("dell", "https://dell.com"),
    ("hp", "https://hp.com"),
    ("lenovo", "https://lenovo.com"),
    ("intel", "https://intel.com"),
    ("amd", "https://amd.com"),
    ("nvidia", "https://nvidia.com"),
    ("steam", "https://store.steampowered.com"),
    ("epic games", "https://epicgames.com"),
    ("ubisoft", "https://ubisoft.com"),
    ("ea", "https://ea.com"),
    ("blizzard", "https://blizzard.com"),
    ("battlenet", "https://battle.net"),
    ("gog", "https://gog.com"),
    ("humble", "https://humblebundle.com"),
    ("itch.io", "https://itch.io"),
    ("youtube gaming", "https://gaming.youtube.com"),
    ("facebook gaming", "https://fb.gg"),
    ("vimeo", "https://vimeo.com"),
    ("dailymotion", "https://dailymotion.com"),
    ("hotstar", "https://hotstar.com"),
    ("zee5", "https://zee5.com"),
    ("sonyliv", "https://sonyliv.com"),
    ("jio cinema", "https://jiocinema.com"),
    ("mx player", "https://mxplayer.in"),
    ("disney+", "https://disneyplus.com"),
    ("disney plus", "https://disneyplus.com"),
    ("hbo max", "https://hbomax.com"),
    ("hbo", "https://hbomax.com"),
    ("hulu", "https://hulu.com"),
    ("peacock", "https://peacocktv.com"),
    ("paramount+", "https://paramountplus.com"),
    ("paramount plus", "https://paramountplus.com"),
    ("apple tv", "https://tv.apple.com"),
    ("apple tv plus", "https://tv.apple.com"),
    ("apple music", "https://music.apple.com"),
    ("youtube music", "https://music.youtube.com"),
    ("yt music", "https://music.youtube.com"),
    ("amazon music", "https://music.amazon.com"),
    ("pandora", "https://pandora.com"),
    ("tidal", "https://tidal.com"),
    ("deezer", "https://deezer.com"),
    ("soundcloud", "https://soundcloud.com"),
    ("bandcamp", "https://bandcamp.com"),
    ("iheartradio", "https://iheart.com"),
    ("iheart radio", "https://iheart.com"),
    ("iheart", "https://iheart.com"),
    ("tunein", "https://tunein.com"),
    ("audible", "https://audible.com"),
    ("audiobooks", "https://audible.com"),
];

/// Top-level-domain-like tokens accepted after a dot
const KNOWN_TLDS: &[&str] = &[
    "com", "org", "net", "io", "co", "ai", "dev", "me", "tv", "app", "store", "shop", "blog",
    "tech", "online", "site", "website", "live", "xyz", "info", "biz", "edu", "gov", "us", "uk",
    "ca", "au", "nz", "in", "sg", "my", "id", "ph", "th", "vn", "jp", "kr", "cn", "ru", "br",
    "mx", "ar", "za", "de", "fr", "es", "it", "nl", "ae", "sa", "eg", "ma", "qa", "kw", "om",
];

/// Map from spoken site name to URL with unique keys
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// Build a table from (alias, url) pairs
    ///
    /// Repeated pairs that agree are collapsed. A repeated alias pointing at a
    /// different URL is a data-entry defect and is rejected.
    ///
    /// # Errors
    ///
    /// Returns `AliasConflict` naming the first conflicting alias
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entries: HashMap<String, String> = HashMap::new();

        for (alias, url) in pairs {
            let key = normalize(alias);
            match entries.get(&key) {
                Some(existing) if existing == url => {
                    tracing::debug!(alias = %key, "duplicate alias collapsed");
                }
                Some(existing) => {
                    return Err(Error::AliasConflict {
                        alias: key,
                        first: existing.clone(),
                        second: url.to_string(),
                    });
                }
                None => {
                    entries.insert(key, url.to_string());
                }
            }
        }

        Ok(Self { entries })
    }

    /// The built-in alias table
    ///
    /// # Errors
    ///
    /// Returns `AliasConflict` if the built-in data contains a conflict
    pub fn builtin() -> Result<Self> {
        Self::from_pairs(BUILTIN_ALIASES.iter().copied())
    }

    /// Exact lookup of a spoken name
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(&normalize(alias)).map(String::as_str)
    }

    /// Number of aliases
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no aliases
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(alias: &str) -> String {
    alias.trim().to_lowercase()
}

/// Whether a target already carries an http(s) scheme
#[must_use]
pub fn has_scheme(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether a target looks like a host name: a dot followed by a known TLD token
#[must_use]
pub fn looks_like_domain(target: &str) -> bool {
    if target.chars().any(char::is_whitespace) {
        return false;
    }

    target.split('.').skip(1).any(|segment| {
        let token: String = segment
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .collect::<String>()
            .to_ascii_lowercase();
        KNOWN_TLDS.contains(&token.as_str())
    })
}
