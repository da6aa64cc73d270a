use serde::Deserialize;

/// Intent carried by an inbound text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `YES`
    Confirm,
    /// `STOP`
    OptOut,
    /// `START`
    OptIn,
}

impl Keyword {
    pub fn canonical(self) -> &'static str {
        match self {
            Self::Confirm => "YES",
            Self::OptOut => "STOP",
            Self::OptIn => "START",
        }
    }
}

const KEYWORDS: [Keyword; 3] = [Keyword::Confirm, Keyword::OptOut, Keyword::OptIn];

/// Recognized keywords. The canonical words are always matched; the
/// synonym lists come from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordSet {
    #[serde(default)]
    pub confirm: Vec<String>,
    #[serde(default)]
    pub opt_out: Vec<String>,
    #[serde(default)]
    pub opt_in: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            confirm: vec!["Y".to_string()],
            opt_out: vec!["UNSUBSCRIBE".to_string()],
            opt_in: Vec::new(),
        }
    }
}

impl KeywordSet {
    /// Whole-message, case-insensitive match after trimming. Canonical words
    /// are checked before any synonym, so configuration cannot rebind them.
    pub fn parse(&self, body: &str) -> Option<Keyword> {
        let body = body.trim().to_uppercase();
        let canonical = KEYWORDS
            .into_iter()
            .find(|keyword| keyword.canonical() == body);
        canonical.or_else(|| {
            KEYWORDS.into_iter().find(|&keyword| {
                self.synonyms(keyword)
                    .iter()
                    .map(|synonym| synonym.trim())
                    .any(|synonym| !synonym.is_empty() && synonym.to_uppercase() == body)
            })
        })
    }

    fn synonyms(&self, keyword: Keyword) -> &[String] {
        match keyword {
            Keyword::Confirm => &self.confirm,
            Keyword::OptOut => &self.opt_out,
            Keyword::OptIn => &self.opt_in,
        }
    }
}
