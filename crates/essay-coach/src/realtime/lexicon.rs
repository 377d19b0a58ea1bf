//! Curated marker lists consumed by the heuristic scorers.
//!
//! Multi-word entries match as consecutive tokens; single words match whole
//! tokens only, so "end" never fires inside "friend".

pub(crate) type MarkerList = &'static [&'static str];

pub(crate) const TRANSITIONS: MarkerList = &[
    "firstly",
    "secondly",
    "finally",
    "next",
    "then",
    "meanwhile",
    "however",
    "furthermore",
    "in addition",
    "consequently",
    "as a result",
];

pub(crate) const SOPHISTICATION: MarkerList = &[
    "however",
    "furthermore",
    "consequently",
    "therefore",
    "nevertheless",
    "although",
    "despite",
    "moreover",
    "alternatively",
    "ultimately",
];

pub(crate) const CREATIVITY: MarkerList = &[
    "imagine",
    "suddenly",
    "mysterious",
    "unexpected",
    "remarkable",
    "extraordinary",
    "peculiar",
    "astonishing",
    "intriguing",
    "fascinating",
];

pub(crate) const ADVANCED_VOCABULARY: MarkerList = &[
    "eloquent",
    "meticulous",
    "profound",
    "intricate",
    "compelling",
    "formidable",
    "substantial",
    "remarkable",
    "significant",
    "demonstrate",
    "illustrate",
    "emphasize",
    "convey",
    "establish",
    "contemplate",
];

pub(crate) const DESCRIPTIVE_ADJECTIVES: MarkerList = &[
    "magnificent",
    "dreadful",
    "brilliant",
    "gloomy",
    "radiant",
    "pristine",
    "ancient",
    "luminous",
    "turbulent",
    "serene",
];

pub(crate) const STRONG_VERBS: MarkerList = &[
    "surged",
    "whispered",
    "glimpsed",
    "pondered",
    "revealed",
    "transformed",
    "shimmered",
    "echoed",
    "emerged",
    "illuminated",
];

pub(crate) const FIGURATIVE: MarkerList = &[
    "like a",
    "like an",
    "as if",
    "as though",
    "seemed to",
    "appeared to",
    "resembled",
];

pub(crate) const CLIMAX: MarkerList = &[
    "suddenly",
    "then",
    "finally",
    "moment",
    "realized",
    "discovered",
];

pub(crate) const RESOLUTION: MarkerList = &["end", "finally", "last", "after", "now", "today"];

/// Frequent misspellings and their corrections.
pub(crate) const COMMON_MISSPELLINGS: &[(&str, &str)] = &[
    ("beleive", "believe"),
    ("recieve", "receive"),
    ("occured", "occurred"),
    ("goverment", "government"),
    ("seperate", "separate"),
    ("definately", "definitely"),
    ("neccessary", "necessary"),
    ("occassion", "occasion"),
    ("accomodate", "accommodate"),
    ("embarass", "embarrass"),
    ("untill", "until"),
    ("writting", "writing"),
    ("wich", "which"),
    ("thier", "their"),
    ("alot", "a lot"),
    ("becuase", "because"),
    ("begining", "beginning"),
    ("wierd", "weird"),
    ("freind", "friend"),
    ("maintainance", "maintenance"),
];
