//! Built-in category catalog.
//!
//! A single table drives both store seeding (name, icon, color) and keyword
//! classification. Declaration order is significant: it is the seeding order
//! and the tie-break order when two categories score the same.

use serde::{Deserialize, Serialize};

/// Bumped whenever an entry, keyword list, or the declaration order changes.
pub const CATALOG_VERSION: u32 = 1;

/// Category assigned when no keyword of any other category matches.
pub const FALLBACK_CATEGORY: &str = "Miscellaneous";

/// Icon used for categories created on the fly (e.g. by a received document).
pub const DEFAULT_ICON: &str = "tray.full.fill";

/// Color used for categories created on the fly.
pub const DEFAULT_COLOR: &str = "gray";

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub keywords: Vec<String>,
    pub icon: String,
    pub color: String,
}

/// Ordered set of category specs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    pub version: u32,
    pub entries: Vec<CategorySpec>,
}

type Row = (&'static str, &'static str, &'static str, &'static [&'static str]);

const BUILTIN: &[Row] = &[
    ("Home", "house.fill", "systemYellow", &[
        "lease", "rent", "mortgage", "property", "house", "apartment", "landlord",
        "tenant", "utility", "maintenance", "real estate", "residence", "homeowner",
        "rental",
    ]),
    ("Vehicle", "car.fill", "systemBrown", &[
        "auto", "car", "insurance", "registration", "loan", "vehicle", "vin",
        "license", "plate", "maintenance", "repair", "truck", "suv", "motor",
    ]),
    ("Personal IDs", "person.text.rectangle.fill", "systemBlue", &[]),
    ("School", "book.fill", "systemGray", &[
        "school", "tuition", "fee", "admission", "exam", "result", "report",
        "certificate", "diploma", "transcript", "student", "teacher", "class",
    ]),
    ("Bank", "dollarsign.bank.building.fill", "systemGreen", &[
        "bank", "account", "statement", "loan", "credit", "debit", "transaction",
        "interest", "balance", "deposit", "withdrawal", "savings", "mortgage",
    ]),
    ("Medical", "cross.case.fill", "systemPink", &[
        "health", "medical", "hospital", "prescription", "doctor", "patient",
        "diagnosis", "treatment", "insurance", "bill", "pharmacy", "medicine",
    ]),
    ("College", "graduationcap.fill", "systemTeal", &[
        "college", "university", "admission", "fee", "scholarship", "exam", "result",
        "certificate", "transcript", "graduation", "degree", "semester",
    ]),
    ("Land", "map.fill", "green", &[
        "land", "property", "deed", "survey", "plot", "ownership", "lease", "rent",
        "mortgage", "registry", "acre", "title",
    ]),
    ("Warranty", "scroll.fill", "systemPurple", &[
        "warranty", "guarantee", "product", "repair", "replacement", "validity",
        "expiry", "terms", "service", "coverage",
    ]),
    ("Family", "figure.2.and.child.holdinghands", "orange", &[
        "family", "marriage", "birth", "certificate", "divorce", "adoption",
        "inheritance", "will", "estate", "parent", "child",
    ]),
    ("Travel", "airplane", "systemBrown", &[
        "travel", "ticket", "flight", "hotel", "booking", "itinerary", "visa",
        "passport", "reservation", "tour", "vacation", "trip",
    ]),
    ("Business", "coat", "systemIndigo", &[
        "business", "contract", "agreement", "invoice", "tax", "partnership",
        "license", "permit", "company", "client", "vendor",
    ]),
    ("Insurance", "shield.fill", "darkGray", &[
        "insurance", "policy", "premium", "claim", "coverage", "health", "life",
        "vehicle", "property", "renewal", "deductible",
    ]),
    ("Education", "a.book.closed.fill", "systemOrange", &[
        "education", "school", "college", "tuition", "fee", "certificate", "diploma",
        "transcript", "course", "training",
    ]),
    ("Emergency", "phone.fill", "systemRed", &[
        "emergency", "contact", "medical", "accident", "police", "fire", "ambulance",
        "hospital", "report", "safety",
    ]),
    ("Miscellaneous", "tray.full.fill", "systemYellow", &[
        "miscellaneous", "other", "general", "uncategorized", "unknown", "document",
        "file", "note", "record",
    ]),
];

impl CategoryCatalog {
    /// The built-in catalog shipped with the app.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(name, icon, color, keywords)| CategorySpec {
                name: name.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                icon: icon.to_string(),
                color: color.to_string(),
            })
            .collect();
        Self {
            version: CATALOG_VERSION,
            entries,
        }
    }

    /// Build a catalog from `(name, keywords)` pairs with default chrome.
    pub fn from_keywords<N, K>(pairs: impl IntoIterator<Item = (N, Vec<K>)>) -> Self
    where
        N: Into<String>,
        K: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(name, keywords)| CategorySpec {
                name: name.into(),
                keywords: keywords.into_iter().map(Into::into).collect(),
                icon: DEFAULT_ICON.to_string(),
                color: DEFAULT_COLOR.to_string(),
            })
            .collect();
        Self {
            version: CATALOG_VERSION,
            entries,
        }
    }

    pub fn get(&self, name: &str) -> Option<&CategorySpec> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Position of a category in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySpec> {
        self.entries.iter()
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
