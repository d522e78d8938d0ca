// 🏷️ Name Normalizer - Free-text department names → canonical boundary names
//
// Office records spell departments loosely: mixed case, historical
// municipalities, short forms, typos. Boundary names are upper case but carry
// accents. Both sides are folded into one canonical form before joining.
//
// Names outside the fixed tables pass through unchanged. An office name that
// still doesn't match a boundary after folding is simply unmatched.

use std::collections::HashMap;

// ============================================================================
// FIXED TABLES
// ============================================================================

/// Historical renames and misspellings, applied right after upper-casing.
pub const CORRECTIONS: &[(&str, &str)] = &[
    // Municipality recorded in the department column
    ("HONDA", "TOLIMA"),
];

/// Accented vowels stripped from boundary-side names (Ñ is kept).
pub const ACCENT_FOLDS: &[(char, char)] = &[
    ('Á', 'A'),
    ('É', 'E'),
    ('Í', 'I'),
    ('Ó', 'O'),
    ('Ú', 'U'),
];

/// Alternate or abbreviated spellings → full boundary name.
pub const ALIASES: &[(&str, &str)] = &[
    ("BOGOTA  D.C.", "BOGOTA, D.C."),
    ("BOGOTA D.C.", "BOGOTA, D.C."),
    ("GUAJIRA", "LA GUAJIRA"),
    (
        "SAN ANDRES",
        "ARCHIPIELAGO DE SAN ANDRES, PROVIDENCIA Y SANTA CATALINA",
    ),
    ("NORTE DE SANTADER", "NORTE DE SANTANDER"),
    ("GUANIA", "GUAINIA"),
    ("VALLE", "VALLE DEL CAUCA"),
];

/// Replace accented upper-case vowels with their plain ASCII vowel.
pub fn fold_accents(name: &str) -> String {
    name.chars()
        .map(|c| {
            ACCENT_FOLDS
                .iter()
                .find(|(accented, _)| *accented == c)
                .map(|(_, plain)| *plain)
                .unwrap_or(c)
        })
        .collect()
}

// ============================================================================
// NORMALIZER
// ============================================================================

/// Holds the correction and alias lookups.
///
/// Starts from the fixed tables; deployments can register extra aliases
/// (see `[data.aliases]` in the config file).
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    corrections: HashMap<String, String>,
    aliases: HashMap<String, String>,
}

impl NameNormalizer {
    /// Normalizer with the built-in tables
    pub fn new() -> Self {
        NameNormalizer {
            corrections: CORRECTIONS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            aliases: ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// Register an extra alias. Both sides are upper-cased.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(alias.to_uppercase(), canonical.to_uppercase());
    }

    /// Builder form of [`add_alias`](Self::add_alias)
    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.add_alias(alias, canonical);
        self
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Canonical form of a name taken from the office table.
    pub fn normalize_office_name(&self, raw: &str) -> String {
        self.apply_tables(raw.to_uppercase())
    }

    /// Canonical form of a name taken from the boundary dataset.
    pub fn normalize_boundary_name(&self, raw: &str) -> String {
        self.apply_tables(fold_accents(&raw.to_uppercase()))
    }

    fn apply_tables(&self, upper: String) -> String {
        let corrected = match self.corrections.get(&upper) {
            Some(target) => target.clone(),
            None => upper,
        };

        match self.aliases.get(&corrected) {
            Some(canonical) => canonical.clone(),
            None => corrected,
        }
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_municipality_correction() {
        let normalizer = NameNormalizer::new();

        assert_eq!(normalizer.normalize_office_name("HONDA"), "TOLIMA");
        assert_eq!(normalizer.normalize_office_name("Honda"), "TOLIMA");
    }

    #[test]
    fn test_bogota_spellings() {
        let normalizer = NameNormalizer::new();

        assert_eq!(normalizer.normalize_office_name("BOGOTA D.C."), "BOGOTA, D.C.");
        assert_eq!(normalizer.normalize_office_name("BOGOTA  D.C."), "BOGOTA, D.C.");
        assert_eq!(normalizer.normalize_office_name("Bogota D.C."), "BOGOTA, D.C.");
        assert_eq!(normalizer.normalize_boundary_name("BOGOTÁ, D.C."), "BOGOTA, D.C.");
    }

    #[test]
    fn test_short_forms() {
        let normalizer = NameNormalizer::new();

        assert_eq!(normalizer.normalize_office_name("valle"), "VALLE DEL CAUCA");
        assert_eq!(normalizer.normalize_office_name("Guajira"), "LA GUAJIRA");
        assert_eq!(normalizer.normalize_office_name("GUANIA"), "GUAINIA");
        assert_eq!(
            normalizer.normalize_office_name("Norte de Santader"),
            "NORTE DE SANTANDER"
        );
        assert_eq!(
            normalizer.normalize_office_name("San Andres"),
            "ARCHIPIELAGO DE SAN ANDRES, PROVIDENCIA Y SANTA CATALINA"
        );
    }

    #[test]
    fn test_accent_folding_matches_ascii_office_names() {
        let normalizer = NameNormalizer::new();

        for (boundary, office) in [
            ("BOYACÁ", "Boyaca"),
            ("ATLÁNTICO", "ATLANTICO"),
            ("BOLÍVAR", "bolivar"),
            ("CÓRDOBA", "Cordoba"),
            ("QUINDÍO", "QUINDIO"),
            ("CHOCÓ", "Choco"),
            ("VAUPÉS", "VAUPES"),
            ("GUAINÍA", "Guania"),
        ] {
            assert_eq!(
                normalizer.normalize_boundary_name(boundary),
                normalizer.normalize_office_name(office),
                "{} vs {}",
                boundary,
                office
            );
        }
    }

    #[test]
    fn test_enye_is_preserved() {
        let normalizer = NameNormalizer::new();

        assert_eq!(fold_accents("NARIÑO"), "NARIÑO");
        assert_eq!(normalizer.normalize_office_name("Nariño"), "NARIÑO");
        assert_eq!(normalizer.normalize_boundary_name("NARIÑO"), "NARIÑO");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let normalizer = NameNormalizer::new();

        assert_eq!(normalizer.normalize_office_name("Atlantis"), "ATLANTIS");
        assert_eq!(normalizer.normalize_office_name(""), "");
    }

    #[test]
    fn test_idempotent() {
        let normalizer = NameNormalizer::new();

        let mut names: Vec<String> = ALIASES.iter().map(|(_, to)| to.to_string()).collect();
        names.extend(CORRECTIONS.iter().map(|(_, to)| to.to_string()));
        names.extend(["ANTIOQUIA", "NARIÑO", "BOGOTA, D.C.", "QUINDIO"].map(String::from));

        for name in names {
            let once = normalizer.normalize_office_name(&name);
            assert_eq!(normalizer.normalize_office_name(&once), once);
            assert_eq!(once, name);

            let boundary_once = normalizer.normalize_boundary_name(&name);
            assert_eq!(normalizer.normalize_boundary_name(&boundary_once), boundary_once);
        }
    }

    #[test]
    fn test_alias_targets_are_not_aliases() {
        for (_, target) in ALIASES.iter().chain(CORRECTIONS.iter()) {
            assert!(ALIASES.iter().all(|(alias, _)| alias != target));
            assert!(CORRECTIONS.iter().all(|(from, _)| from != target));
        }
    }

    #[test]
    fn test_extra_alias() {
        let normalizer = NameNormalizer::new().with_alias("Bogota DC", "BOGOTA, D.C.");

        assert_eq!(normalizer.alias_count(), ALIASES.len() + 1);
        assert_eq!(normalizer.normalize_office_name("bogota dc"), "BOGOTA, D.C.");
    }
}
