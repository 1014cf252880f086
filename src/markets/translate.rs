//! Provider market/label strings → Spanish display strings.
//!
//! Three tiers, applied in order: exact dictionary hit, lower-case substring
//! heuristics, passthrough. Total: every input maps to some output.

/// Exact provider market names and option labels.
const DICTIONARY: &[(&str, &str)] = &[
    // Market names
    ("Match Winner", "Ganador del partido"),
    ("Second Half Winner", "Ganador segunda parte"),
    ("First Half Winner", "Ganador primera parte"),
    ("Both Teams Score", "Ambos equipos marcan"),
    ("Both Teams To Score", "Ambos equipos marcan"),
    ("Goals Over/Under", "Goles"),
    ("Total - Home", "Goles del local"),
    ("Total - Away", "Goles del visitante"),
    ("Double Chance", "Doble oportunidad"),
    ("Exact Score", "Resultado exacto"),
    ("Corners Over Under", "Córners"),
    ("Cards Over/Under", "Tarjetas"),
    ("Odd/Even", "Par/Impar"),
    // Option labels
    ("Home", "Local"),
    ("Away", "Visitante"),
    ("Draw", "Empate"),
    ("Home/Draw", "Local o empate"),
    ("Home/Away", "Local o visitante"),
    ("Draw/Away", "Empate o visitante"),
    ("Yes", "Sí"),
    ("No", "No"),
    ("Odd", "Impar"),
    ("Even", "Par"),
    // Time-bucket ranges (first-goal style markets)
    ("0-15", "Minuto 0-15"),
    ("16-30", "Minuto 16-30"),
    ("31-45", "Minuto 31-45"),
    ("46-60", "Minuto 46-60"),
    ("61-75", "Minuto 61-75"),
    ("76-90", "Minuto 76-90"),
];

/// Ordered substring heuristics, grouped by semantic family. Evaluated in
/// sequence over the lower-cased input; the first rule with a matching
/// needle wins, so narrower families must sit above the broader ones that
/// shadow them ("win to nil" above "winner").
const HEURISTICS: &[(&[&str], &str)] = &[
    (&["win to nil"], "Gana sin encajar"),
    (&["highest scoring half"], "Mitad con más goles"),
    (&["goal"], "Goles"),
    (&["corner"], "Córners"),
    (&["card"], "Tarjetas"),
    (&["clean sheet"], "Portería a cero"),
    (&["winner"], "Ganador"),
    (&["handicap result"], "Resultado con hándicap"),
    (&["result"], "Resultado"),
    (&["odd", "even"], "Par/Impar"),
    (&["win both halves"], "Gana ambas mitades"),
    (&["first goal scorer", "anytime goal scorer", "scorer"], "Goleador"),
];

/// Translate a provider market name or option label. Never fails: unknown
/// strings pass through unchanged.
pub fn translate(raw: &str) -> String {
    for (name, localized) in DICTIONARY {
        if raw == *name {
            return (*localized).to_string();
        }
    }

    // Numeric Over/Under labels: recompose with a localized prefix.
    if let Some(line) = raw.strip_prefix("Over ") {
        return format!("Más de {line}");
    }
    if let Some(line) = raw.strip_prefix("Under ") {
        return format!("Menos de {line}");
    }

    let lower = raw.to_lowercase();
    for (needles, localized) in HEURISTICS {
        if needles.iter().any(|needle| lower.contains(needle)) {
            return (*localized).to_string();
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_market_names() {
        assert_eq!(translate("Match Winner"), "Ganador del partido");
        assert_eq!(translate("Both Teams Score"), "Ambos equipos marcan");
        assert_eq!(translate("Double Chance"), "Doble oportunidad");
    }

    #[test]
    fn exact_option_labels() {
        assert_eq!(translate("Home"), "Local");
        assert_eq!(translate("Draw"), "Empate");
        assert_eq!(translate("Yes"), "Sí");
        assert_eq!(translate("16-30"), "Minuto 16-30");
    }

    #[test]
    fn over_under_labels_are_recomposed() {
        assert_eq!(translate("Over 2.5"), "Más de 2.5");
        assert_eq!(translate("Under 0.5"), "Menos de 0.5");
        assert_eq!(translate("Over 8.5"), "Más de 8.5");
    }

    #[test]
    fn win_to_nil_matches_before_winner() {
        assert_eq!(translate("Away Win to Nil"), "Gana sin encajar");
    }

    #[test]
    fn heuristic_families() {
        assert_eq!(translate("Total Corners (3 way)"), "Córners");
        assert_eq!(translate("Red Cards"), "Tarjetas");
        assert_eq!(translate("Home Team Clean Sheet"), "Portería a cero");
        assert_eq!(translate("Highest Scoring Half"), "Mitad con más goles");
        assert_eq!(translate("To Win Either Half - Winner"), "Ganador");
        assert_eq!(translate("Half Time Result"), "Resultado");
        assert_eq!(translate("European Handicap Result"), "Resultado con hándicap");
        assert_eq!(translate("Goals Odd or Even"), "Goles");
    }

    #[test]
    fn unknown_strings_pass_through() {
        assert_eq!(translate("Método del primer gol"), "Método del primer gol");
        assert_eq!(translate(""), "");
    }
}
