//! Built-in label tables
//!
//! Default localization for report rendering. Unknown keys fall back to the
//! key itself so a missing translation never fails a report.

use shared::Language;

const ENGLISH: &[(&str, &str)] = &[
    ("report.title", "Cupping Report"),
    ("report.coffee_name", "Coffee"),
    ("report.roast_level", "Roast level"),
    ("report.date", "Date"),
    ("report.water_temperature", "Water temperature"),
    ("report.overall_score", "Overall score"),
    ("report.classification", "Classification"),
    ("report.cup", "Cup"),
    ("report.cup_total", "Cup total"),
    ("report.cupper_score", "Cupper's score"),
    ("report.notes", "Notes"),
    ("attribute.aroma", "Fragrance/Aroma"),
    ("attribute.flavor", "Flavor"),
    ("attribute.aftertaste", "Aftertaste"),
    ("attribute.acidity", "Acidity"),
    ("attribute.body", "Body"),
    ("attribute.balance", "Balance"),
    ("attribute.uniformity", "Uniformity"),
    ("attribute.clean_cup", "Clean cup"),
    ("attribute.sweetness", "Sweetness"),
    ("attribute.defects", "Defects"),
    ("phase.hot", "Hot"),
    ("phase.warm", "Warm"),
    ("phase.cold", "Cold"),
    ("roast.light", "Light"),
    ("roast.medium", "Medium"),
    ("roast.medium_dark", "Medium-dark"),
    ("roast.dark", "Dark"),
    ("classification.outstanding", "Outstanding"),
    ("classification.excellent", "Excellent"),
    ("classification.very_good", "Very good"),
    ("classification.below_specialty", "Below specialty grade"),
];

const SPANISH: &[(&str, &str)] = &[
    ("report.title", "Reporte de catación"),
    ("report.coffee_name", "Café"),
    ("report.roast_level", "Nivel de tueste"),
    ("report.date", "Fecha"),
    ("report.water_temperature", "Temperatura del agua"),
    ("report.overall_score", "Puntaje total"),
    ("report.classification", "Clasificación"),
    ("report.cup", "Taza"),
    ("report.cup_total", "Total de la taza"),
    ("report.cupper_score", "Puntaje del catador"),
    ("report.notes", "Notas"),
    ("attribute.aroma", "Fragancia/Aroma"),
    ("attribute.flavor", "Sabor"),
    ("attribute.aftertaste", "Sabor residual"),
    ("attribute.acidity", "Acidez"),
    ("attribute.body", "Cuerpo"),
    ("attribute.balance", "Balance"),
    ("attribute.uniformity", "Uniformidad"),
    ("attribute.clean_cup", "Taza limpia"),
    ("attribute.sweetness", "Dulzor"),
    ("attribute.defects", "Defectos"),
    ("phase.hot", "Caliente"),
    ("phase.warm", "Tibio"),
    ("phase.cold", "Frío"),
    ("roast.light", "Claro"),
    ("roast.medium", "Medio"),
    ("roast.medium_dark", "Medio oscuro"),
    ("roast.dark", "Oscuro"),
    ("classification.outstanding", "Sobresaliente"),
    ("classification.excellent", "Excelente"),
    ("classification.very_good", "Muy bueno"),
    ("classification.below_specialty", "Bajo grado de especialidad"),
];

/// Label lookup for one language
#[derive(Debug, Clone, Copy)]
pub struct LabelTable {
    entries: &'static [(&'static str, &'static str)],
}

impl LabelTable {
    pub fn for_language(language: Language) -> Self {
        let entries = match language {
            Language::English => ENGLISH,
            Language::Spanish => SPANISH,
        };
        Self { entries }
    }

    pub fn label(&self, key: &str) -> String {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, label)| (*label).to_string())
            .unwrap_or_else(|| {
                tracing::debug!(key, "Missing label");
                key.to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_cover_same_keys() {
        assert_eq!(ENGLISH.len(), SPANISH.len());
        for (key, _) in ENGLISH {
            assert!(
                SPANISH.iter().any(|(k, _)| k == key),
                "missing Spanish label for {}",
                key
            );
        }
    }

    #[test]
    fn test_lookup_by_language() {
        let en = LabelTable::for_language(Language::English);
        let es = LabelTable::for_language(Language::Spanish);
        assert_eq!(en.label("attribute.flavor"), "Flavor");
        assert_eq!(es.label("attribute.flavor"), "Sabor");
    }

    #[test]
    fn test_table_drives_report_labels() {
        use shared::Translate;

        let es = LabelTable::for_language(Language::Spanish);
        let translate = |key: &str| es.label(key);
        assert_eq!(translate.translate("phase.cold"), "Frío");
    }

    #[test]
    fn test_unknown_key_falls_back() {
        let en = LabelTable::for_language(Language::English);
        assert_eq!(en.label("report.unknown"), "report.unknown");
    }
}
