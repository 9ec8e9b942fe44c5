const STRONG: &[&str] = &[
    "invoice", "facture", "tps", "tvq", "gst", "hst", "qst", "payment", "paiement", "total",
    "subtotal", "balance", "debit", "credit", "débit", "crédit", "account", "compte", "revenue",
    "revenu", "expense", "dépense", "depense", "profit", "bénéfice", "benefice",
];

const MEDIUM: &[&str] = &[
    "date", "amount", "montant", "quantity", "quantité", "price", "prix", "tax", "taxe",
    "discount", "rabais", "category", "catégorie", "categorie",
];

const FINANCE_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Finance,
    General,
    Unknown,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::General => "general",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinanceGuess {
    pub kind: Kind,
    pub confidence: f64,
    pub keywords: Vec<&'static str>,
}

/// Guess whether text is financial. Strong hits weigh 3, medium hits 1;
/// ten points is full confidence.
pub fn detect(text: &str) -> FinanceGuess {
    let lower = text.to_lowercase();
    let strong: Vec<&'static str> = STRONG.iter().copied().filter(|kw| lower.contains(kw)).collect();
    let medium: Vec<&'static str> = MEDIUM.iter().copied().filter(|kw| lower.contains(kw)).collect();

    let score = (strong.len() * 3 + medium.len()) as f64;
    let confidence = ((score / 10.0).min(1.0) * 100.0).round() / 100.0;

    let kind = if text.trim().is_empty() {
        Kind::Unknown
    } else if confidence >= FINANCE_THRESHOLD {
        Kind::Finance
    } else {
        Kind::General
    };

    let keywords = strong
        .iter()
        .take(3)
        .chain(medium.iter().take(2))
        .copied()
        .collect();

    FinanceGuess {
        kind,
        confidence,
        keywords,
    }
}
