use std::fmt;
use std::str::FromStr;

/// Visual branding for a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodTheme {
    pub color: &'static str,
    pub emoji: &'static str,
    pub category: &'static str,
}

const JOYFUL: MoodTheme = MoodTheme {
    color: "#fbbf24",
    emoji: "☀️",
    category: "Joyful",
};
const MELANCHOLIC: MoodTheme = MoodTheme {
    color: "#60a5fa",
    emoji: "🌧️",
    category: "Melancholic",
};
const ENERGETIC: MoodTheme = MoodTheme {
    color: "#f87171",
    emoji: "🔥",
    category: "Energetic",
};
const CALM: MoodTheme = MoodTheme {
    color: "#34d399",
    emoji: "🍃",
    category: "Calm",
};
const FOCUSED: MoodTheme = MoodTheme {
    color: "#818cf8",
    emoji: "💻",
    category: "Focused",
};
const ROMANTIC: MoodTheme = MoodTheme {
    color: "#f472b6",
    emoji: "💖",
    category: "Romantic",
};

/// Used when no keyword matches.
pub const DEFAULT_THEME: MoodTheme = MoodTheme {
    color: "#1DB954",
    emoji: "🎵",
    category: "Found",
};

/// Keyword table. Scanned in order; the first keyword contained in the query wins.
pub const MOOD_KEYWORDS: [(&str, MoodTheme); 12] = [
    ("happy", JOYFUL),
    ("joy", JOYFUL),
    ("sad", MELANCHOLIC),
    ("blue", MELANCHOLIC),
    ("energy", ENERGETIC),
    ("workout", ENERGETIC),
    ("calm", CALM),
    ("chill", CALM),
    ("focus", FOCUSED),
    ("study", FOCUSED),
    ("romantic", ROMANTIC),
    ("love", ROMANTIC),
];

/// Picks a theme by case-insensitive substring match against the keyword table.
pub fn theme_for_query(query: &str) -> MoodTheme {
    let lowered = query.to_lowercase();
    MOOD_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, theme)| *theme)
        .unwrap_or(DEFAULT_THEME)
}

/// The closed set of moods the generative strategy may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoodCategory {
    Joyful,
    Melancholic,
    Energetic,
    Calm,
    Focused,
    Anxious,
    Romantic,
    Aggressive,
}

impl MoodCategory {
    pub const ALL: [MoodCategory; 8] = [
        MoodCategory::Joyful,
        MoodCategory::Melancholic,
        MoodCategory::Energetic,
        MoodCategory::Calm,
        MoodCategory::Focused,
        MoodCategory::Anxious,
        MoodCategory::Romantic,
        MoodCategory::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodCategory::Joyful => "Joyful",
            MoodCategory::Melancholic => "Melancholic",
            MoodCategory::Energetic => "Energetic",
            MoodCategory::Calm => "Calm",
            MoodCategory::Focused => "Focused",
            MoodCategory::Anxious => "Anxious",
            MoodCategory::Romantic => "Romantic",
            MoodCategory::Aggressive => "Aggressive",
        }
    }

    /// Theme used to fill colour/emoji the upstream left out.
    pub fn theme(&self) -> MoodTheme {
        match self {
            MoodCategory::Joyful => JOYFUL,
            MoodCategory::Melancholic => MELANCHOLIC,
            MoodCategory::Energetic => ENERGETIC,
            MoodCategory::Calm => CALM,
            MoodCategory::Focused => FOCUSED,
            MoodCategory::Romantic => ROMANTIC,
            MoodCategory::Anxious => MoodTheme {
                color: "#a78bfa",
                emoji: "🌀",
                category: "Anxious",
            },
            MoodCategory::Aggressive => MoodTheme {
                color: "#dc2626",
                emoji: "⚡",
                category: "Aggressive",
            },
        }
    }

    /// Comma separated list for prompts and help text.
    pub fn joined() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown mood category: {}", trimmed))
    }
}

/// Theme for a mood label, falling back to the default theme.
pub fn theme_for_mood(mood: &str) -> MoodTheme {
    mood.parse::<MoodCategory>()
        .map(|c| c.theme())
        .unwrap_or(DEFAULT_THEME)
}

/// Parses `#rrggbb` or `#rgb`.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let expand = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chill_maps_to_calm() {
        let theme = theme_for_query("Just want to CHILL tonight");
        assert_eq!(theme.category, "Calm");
        assert_eq!(theme.color, "#34d399");
        assert_eq!(theme.emoji, "🍃");
    }

    #[test]
    fn test_first_keyword_in_table_order_wins() {
        let theme = theme_for_query("I need energy for my workout");
        assert_eq!(theme, ENERGETIC);
        assert_eq!(theme.color, "#f87171");
        assert_eq!(theme.emoji, "🔥");
    }

    #[test]
    fn test_table_order_beats_position_in_query() {
        // "love" appears first in the text, "sad" first in the table.
        let theme = theme_for_query("love songs that make me sad");
        assert_eq!(theme.category, "Melancholic");
    }

    #[test]
    fn test_no_match_uses_default() {
        assert_eq!(theme_for_query("midnight driving"), DEFAULT_THEME);
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("calm".parse::<MoodCategory>(), Ok(MoodCategory::Calm));
        assert_eq!(" Aggressive ".parse::<MoodCategory>(), Ok(MoodCategory::Aggressive));
        assert!("Sleepy".parse::<MoodCategory>().is_err());
    }

    #[test]
    fn test_theme_for_unknown_mood() {
        assert_eq!(theme_for_mood("Nostalgic"), DEFAULT_THEME);
        assert_eq!(theme_for_mood("Focused").color, "#818cf8");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#34d399"), Some((0x34, 0xd3, 0x99)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("34d399"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }
}
