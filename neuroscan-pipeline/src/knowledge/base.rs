use serde::Serialize;

/// A titled block of reference material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnowledgeSection {
    pub key: &'static str,
    /// Lowercase words that route a query to this section
    pub triggers: &'static [&'static str],
    pub text: &'static str,
}

const TUMOR_TYPES: &str = "\
Primary brain tumor types:
1. Gliomas (50% of cases)
   - Glioblastoma (Grade IV): most aggressive, median survival 15 months
   - Astrocytoma (Grade II-III): survival 5-10 years
   - Oligodendroglioma: better prognosis

2. Meningiomas (30% of cases)
   - Generally benign
   - Slow growth
   - Good prognosis after surgery

3. Pituitary adenomas (10%)
   - Often functional
   - Medical or surgical treatment";

const DIAGNOSTIC_PROCEDURES: &str = "\
Recommended additional examinations:
1. Brain MRI with gadolinium injection (gold standard)
2. Magnetic resonance spectroscopy (MRS)
3. FDG or methionine PET scan
4. Stereotactic biopsy if necessary
5. Complete neurological tests
6. Blood tests (tumor markers)";

const TREATMENT_PROTOCOLS: &str = "\
Treatment protocols:
1. Surgery:
   - Maximal resection if possible
   - Preservation of functional areas

2. Radiotherapy:
   - 3D conformal radiotherapy
   - Stereotactic radiosurgery (small tumors)
   - Dose: 54-60 Gy in 1.8-2 Gy fractions

3. Chemotherapy:
   - Temozolomide (standard for glioblastoma)
   - Adjuvant and neoadjuvant protocols

4. Targeted therapies and immunotherapy (clinical trials)";

const PROGNOSIS: &str = "\
Prognostic factors:
1. Tumor histological type
2. Tumor grade (WHO I-IV)
3. Location and size
4. Patient age (< 50 years: better prognosis)
5. Performance status (Karnofsky score)
6. Complete resectability
7. Genetic mutations (IDH, MGMT, 1p/19q)

5-year survival rates:
- Grade I Meningioma: >90%
- Grade II Astrocytoma: 50-70%
- Glioblastoma: 5-10%";

const SECTIONS: [KnowledgeSection; 4] = [
    KnowledgeSection {
        key: "tumor_types",
        triggers: &["type", "classification"],
        text: TUMOR_TYPES,
    },
    KnowledgeSection {
        key: "diagnostic_procedures",
        triggers: &["diagnostic", "examination"],
        text: DIAGNOSTIC_PROCEDURES,
    },
    KnowledgeSection {
        key: "treatment_protocols",
        triggers: &["treatment", "therapy"],
        text: TREATMENT_PROTOCOLS,
    },
    KnowledgeSection {
        key: "prognosis",
        triggers: &["prognosis", "survival"],
        text: PROGNOSIS,
    },
];

/// Static brain tumor reference material with keyword routing
#[derive(Debug, Clone, Copy, Default)]
pub struct MedicalKnowledgeBase;

impl MedicalKnowledgeBase {
    pub fn new() -> Self {
        Self
    }

    pub fn sections(&self) -> &'static [KnowledgeSection] {
        &SECTIONS
    }

    /// Sections whose trigger words occur in `query`, in catalogue order
    ///
    /// A query that triggers nothing gets every section.
    pub fn matching(&self, query: &str) -> Vec<&'static KnowledgeSection> {
        let query = query.to_lowercase();
        let matched: Vec<_> = SECTIONS
            .iter()
            .filter(|s| s.triggers.iter().any(|t| query.contains(t)))
            .collect();

        if matched.is_empty() {
            return SECTIONS.iter().collect();
        }
        matched
    }

    /// Passages for `query`, separated by a blank line
    pub fn search(&self, query: &str) -> String {
        self.matching(query)
            .iter()
            .map(|s| s.text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(query: &str) -> Vec<&'static str> {
        MedicalKnowledgeBase::new()
            .matching(query)
            .iter()
            .map(|s| s.key)
            .collect()
    }

    #[test]
    fn test_routing_is_case_insensitive() {
        assert_eq!(keys("Treatment options"), vec!["treatment_protocols"]);
        assert_eq!(keys("SURVIVAL rates"), vec!["prognosis"]);
    }

    #[test]
    fn test_multiple_sections_keep_catalogue_order() {
        assert_eq!(
            keys("prognosis and tumor type"),
            vec!["tumor_types", "prognosis"]
        );
    }

    #[test]
    fn test_unmatched_query_returns_everything() {
        assert_eq!(keys("hello").len(), 4);
        let all = MedicalKnowledgeBase::new().search("hello");
        assert!(all.starts_with("Primary brain tumor types"));
        assert!(all.contains("\n\nRecommended additional examinations"));
    }
}
