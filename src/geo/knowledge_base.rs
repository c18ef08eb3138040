// Canonical location vocabulary: cities, regions and their match keywords
use crate::model::GeoError;
use crate::utils::fold;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    Center,
    Sharon,
    Shfela,
    South,
    North,
    Jerusalem,
    #[default]
    General,
}

impl Region {
    /// Fixed override priority used when a group carries explicit region signals.
    pub const PRIORITY: [Region; 6] = [
        Region::Center,
        Region::Sharon,
        Region::Shfela,
        Region::South,
        Region::North,
        Region::Jerusalem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Center => "center",
            Region::Sharon => "sharon",
            Region::Shfela => "shfela",
            Region::South => "south",
            Region::North => "north",
            Region::Jerusalem => "jerusalem",
            Region::General => "general",
        }
    }

    /// Parses a declared region value (id or Hebrew name). Unknown values are `None`.
    pub fn parse(raw: &str) -> Option<Region> {
        match fold(raw).as_str() {
            "center" | "מרכז" => Some(Region::Center),
            "sharon" | "שרון" | "השרון" => Some(Region::Sharon),
            "shfela" | "שפלה" | "השפלה" => Some(Region::Shfela),
            "south" | "דרום" | "הדרום" => Some(Region::South),
            "north" | "צפון" | "הצפון" => Some(Region::North),
            "jerusalem" | "ירושלים" => Some(Region::Jerusalem),
            "general" | "כללי" | "ארצי" => Some(Region::General),
            _ => None,
        }
    }

    pub fn is_general(&self) -> bool {
        *self == Region::General
    }

    /// Bare region tokens that signal this region without naming a city.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            // "center" alone is left out: it collides with "call center".
            Region::Center => &["מרכז", "גוש דן", "merkaz", "gush dan"],
            Region::Sharon => &["שרון", "sharon"],
            Region::Shfela => &["שפלה", "shfela", "shfelah", "shephelah"],
            Region::South => &["דרום", "נגב", "south", "negev"],
            Region::North => &["צפון", "גליל", "קריות", "north", "galil", "galilee", "krayot"],
            Region::Jerusalem => &["אזור ירושלים", "הרי ירושלים", "jerusalem area"],
            Region::General => &[],
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationEntry {
    pub name: String,
    pub region: Region,
    pub keywords: Vec<String>,
}

impl LocationEntry {
    pub fn new(name: &str, region: Region, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            region,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// True if any keyword occurs in the already folded `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// Like `matches`, but also blanks every occurrence of the matching
    /// keywords out of `text`.
    pub fn consume(&self, text: &mut String) -> bool {
        let mut matched = false;
        for keyword in &self.keywords {
            if text.contains(keyword.as_str()) {
                *text = text.replace(keyword.as_str(), "|");
                matched = true;
            }
        }
        matched
    }
}

/// Ordered, validated table of locations. Order is significant: lookups
/// scan front to back, so an entry whose keyword contains another entry's
/// keyword must come first.
#[derive(Debug)]
pub struct KnowledgeBase {
    entries: Vec<LocationEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<LocationEntry>) -> Result<Self, GeoError> {
        let mut seen = HashSet::new();
        for (idx, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(GeoError::EmptyName(idx));
            }
            if entry.keywords.is_empty() {
                return Err(GeoError::NoKeywords(entry.name.clone()));
            }
            for keyword in &entry.keywords {
                if keyword.is_empty() || *keyword != fold(keyword) {
                    return Err(GeoError::BadKeyword {
                        name: entry.name.clone(),
                        keyword: keyword.clone(),
                    });
                }
            }
            let own = fold(&entry.name);
            if !entry.keywords.iter().any(|k| *k == own) {
                return Err(GeoError::MissingSelfKeyword(entry.name.clone()));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(GeoError::Duplicate(entry.name.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in table, validated on first access. A corrupt table is a
    /// programming error and aborts the process.
    pub fn builtin() -> &'static KnowledgeBase {
        static BUILTIN: LazyLock<KnowledgeBase> = LazyLock::new(|| {
            KnowledgeBase::new(builtin_entries())
                .unwrap_or_else(|e| panic!("built-in location table is invalid: {e}"))
        });
        &BUILTIN
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn builtin_entries() -> Vec<LocationEntry> {
    use Region::*;
    vec![
        // Center / Gush Dan
        LocationEntry::new("תל אביב", Center, &["תל אביב", "תל-אביב", "ת\"א", "ת״א", "תל אביב יפו", "יפו", "tel aviv", "tel-aviv", "tlv"]),
        LocationEntry::new("רמת גן", Center, &["רמת גן", "רמת-גן", "ר\"ג", "ramat gan"]),
        LocationEntry::new("גבעתיים", Center, &["גבעתיים", "givatayim"]),
        LocationEntry::new("בני ברק", Center, &["בני ברק", "בני-ברק", "ב\"ב", "bnei brak"]),
        LocationEntry::new("פתח תקווה", Center, &["פתח תקווה", "פתח תקוה", "פתח-תקווה", "פ\"ת", "פ״ת", "petah tikva", "petach tikva"]),
        LocationEntry::new("חולון", Center, &["חולון", "holon"]),
        LocationEntry::new("בת ים", Center, &["בת ים", "בת-ים", "bat yam"]),
        // Both contain "יהוד" and must precede it.
        LocationEntry::new("אור יהודה", Center, &["אור יהודה", "or yehuda"]),
        LocationEntry::new("אבן יהודה", Sharon, &["אבן יהודה", "even yehuda"]),
        LocationEntry::new("יהוד", Center, &["יהוד", "yehud"]),
        LocationEntry::new("קריית אונו", Center, &["קריית אונו", "קרית אונו", "kiryat ono"]),
        LocationEntry::new("ראש העין", Center, &["ראש העין", "rosh haayin", "rosh ha'ayin"]),
        LocationEntry::new("אלעד", Center, &["אלעד", "elad"]),
        LocationEntry::new("שוהם", Center, &["שוהם", "shoham"]),
        // Sharon
        LocationEntry::new("הרצליה", Sharon, &["הרצליה", "herzliya", "herzliya pituach"]),
        LocationEntry::new("רמת השרון", Sharon, &["רמת השרון", "ramat hasharon"]),
        LocationEntry::new("הוד השרון", Sharon, &["הוד השרון", "hod hasharon"]),
        LocationEntry::new("כפר סבא", Sharon, &["כפר סבא", "כפ\"ס", "kfar saba"]),
        LocationEntry::new("רעננה", Sharon, &["רעננה", "raanana", "ra'anana"]),
        LocationEntry::new("נתניה", Sharon, &["נתניה", "netanya"]),
        LocationEntry::new("כפר יונה", Sharon, &["כפר יונה", "kfar yona"]),
        LocationEntry::new("חדרה", Sharon, &["חדרה", "hadera"]),
        LocationEntry::new("קיסריה", Sharon, &["קיסריה", "caesarea"]),
        // Shfela
        LocationEntry::new("ראשון לציון", Shfela, &["ראשון לציון", "ראשל\"צ", "ראשל״צ", "rishon lezion", "rishon"]),
        LocationEntry::new("נס ציונה", Shfela, &["נס ציונה", "ness ziona", "nes ziona"]),
        LocationEntry::new("רחובות", Shfela, &["רחובות", "rehovot"]),
        LocationEntry::new("יבנה", Shfela, &["יבנה", "yavne"]),
        LocationEntry::new("גדרה", Shfela, &["גדרה", "gedera"]),
        LocationEntry::new("רמלה", Shfela, &["רמלה", "ramla"]),
        LocationEntry::new("לוד", Shfela, &["לוד"]),
        LocationEntry::new("מודיעין", Shfela, &["מודיעין", "modiin", "modi'in"]),
        LocationEntry::new("קריית עקרון", Shfela, &["קריית עקרון", "קרית עקרון", "kiryat ekron"]),
        // South
        LocationEntry::new("באר שבע", South, &["באר שבע", "באר-שבע", "ב\"ש", "beer sheva", "be'er sheva", "beersheba"]),
        LocationEntry::new("אשדוד", South, &["אשדוד", "ashdod"]),
        LocationEntry::new("אשקלון", South, &["אשקלון", "ashkelon"]),
        LocationEntry::new("קריית גת", South, &["קריית גת", "קרית גת", "kiryat gat"]),
        LocationEntry::new("אילת", South, &["אילת", "eilat"]),
        LocationEntry::new("דימונה", South, &["דימונה", "dimona"]),
        LocationEntry::new("נתיבות", South, &["נתיבות", "netivot"]),
        LocationEntry::new("אופקים", South, &["אופקים", "ofakim"]),
        LocationEntry::new("שדרות", South, &["שדרות", "sderot"]),
        LocationEntry::new("ערד", South, &["ערד", "arad"]),
        // North
        LocationEntry::new("חיפה", North, &["חיפה", "haifa"]),
        LocationEntry::new("קריית ביאליק", North, &["קריית ביאליק", "קרית ביאליק", "kiryat bialik"]),
        LocationEntry::new("קריית מוצקין", North, &["קריית מוצקין", "קרית מוצקין", "kiryat motzkin"]),
        LocationEntry::new("קריית אתא", North, &["קריית אתא", "קרית אתא", "kiryat ata"]),
        LocationEntry::new("קריית שמונה", North, &["קריית שמונה", "קרית שמונה", "kiryat shmona"]),
        LocationEntry::new("יקנעם", North, &["יקנעם", "יוקנעם", "yokneam"]),
        LocationEntry::new("עפולה", North, &["עפולה", "afula"]),
        LocationEntry::new("נוף הגליל", North, &["נוף הגליל", "נצרת עילית", "nof hagalil"]),
        LocationEntry::new("נצרת", North, &["נצרת", "nazareth"]),
        LocationEntry::new("כרמיאל", North, &["כרמיאל", "karmiel"]),
        LocationEntry::new("נהריה", North, &["נהריה", "nahariya"]),
        LocationEntry::new("עכו", North, &["עכו", "akko"]),
        LocationEntry::new("טבריה", North, &["טבריה", "tiberias"]),
        LocationEntry::new("צפת", North, &["צפת", "safed", "tzfat"]),
        // Jerusalem
        LocationEntry::new("ירושלים", Jerusalem, &["ירושלים", "י-ם", "jerusalem"]),
        LocationEntry::new("בית שמש", Jerusalem, &["בית שמש", "beit shemesh"]),
        LocationEntry::new("מבשרת ציון", Jerusalem, &["מבשרת ציון", "מבשרת", "mevaseret"]),
        LocationEntry::new("מעלה אדומים", Jerusalem, &["מעלה אדומים", "maale adumim"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid_and_covers_every_region() {
        let kb = KnowledgeBase::builtin();
        for region in Region::PRIORITY {
            let cities = kb.entries().iter().filter(|e| e.region == region).count();
            assert!(cities >= 2, "region {region} has {cities} cities");
        }
        assert!(kb.entries().iter().all(|e| !e.region.is_general()));
    }

    #[test]
    fn contained_names_come_after_their_containers() {
        let kb = KnowledgeBase::builtin();
        for (i, first) in kb.entries().iter().enumerate() {
            let own = fold(&first.name);
            for rest in &kb.entries()[i + 1..] {
                assert!(
                    !fold(&rest.name).contains(&own),
                    "'{}' contains '{}' but is listed after it",
                    rest.name,
                    first.name
                );
            }
        }
    }

    #[test]
    fn rejects_malformed_entries() {
        let err = KnowledgeBase::new(vec![LocationEntry::new("", Region::North, &["x"])]);
        assert!(matches!(err, Err(GeoError::EmptyName(0))));

        let err = KnowledgeBase::new(vec![LocationEntry::new("חיפה", Region::North, &[])]);
        assert!(matches!(err, Err(GeoError::NoKeywords(_))));

        let err = KnowledgeBase::new(vec![LocationEntry::new("Haifa", Region::North, &["Haifa"])]);
        assert!(matches!(err, Err(GeoError::BadKeyword { .. })));

        let err = KnowledgeBase::new(vec![LocationEntry::new("חיפה", Region::North, &["haifa"])]);
        assert!(matches!(err, Err(GeoError::MissingSelfKeyword(_))));

        let err = KnowledgeBase::new(vec![
            LocationEntry::new("חיפה", Region::North, &["חיפה"]),
            LocationEntry::new("חיפה", Region::North, &["חיפה"]),
        ]);
        assert!(matches!(err, Err(GeoError::Duplicate(_))));
    }

    #[test]
    fn consume_blanks_matched_keywords() {
        let entry = LocationEntry::new("אבן יהודה", Region::Sharon, &["אבן יהודה", "even yehuda"]);
        let mut text = "דרושים אבן יהודה".to_string();
        assert!(entry.consume(&mut text));
        assert_eq!(text, "דרושים |");
        assert!(!entry.consume(&mut text));
    }

    #[test]
    fn parses_declared_regions() {
        assert_eq!(Region::parse(" South "), Some(Region::South));
        assert_eq!(Region::parse("מרכז"), Some(Region::Center));
        assert_eq!(Region::parse("moon"), None);
    }
}
