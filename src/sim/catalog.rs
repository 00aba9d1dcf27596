use rand::Rng;
use thiserror::Error;

/// The fixed menu of diagnoses the learner can pick from. Authored together
/// with the built-in catalog; `CaseCatalog::from_cases` checks that every
/// case's diagnosis appears here verbatim, otherwise that case could never
/// be answered correctly.
pub const DIAGNOSIS_MENU: [&str; 6] = [
    "Acute Myocardial Infarction (STEMI)",
    "Unstable Angina",
    "Pulmonary Embolism",
    "Aortic Dissection",
    "Pericarditis",
    "GERD",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
        }
    }
}

/// One fully specified clinical vignette. Built once at startup and never
/// mutated afterwards.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Case {
    pub diagnosis: String,
    pub age: u32,
    pub sex: Sex,
    pub chief_complaint: String,
    pub duration: String,
    pub associated_symptoms: String,
    pub risk_factors: Vec<String>,
    pub vitals: String,
    pub ecg_finding: String,
    pub troponin_result: String,
    pub management: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("the case catalog is empty")]
    Empty,
    #[error("diagnosis \"{0}\" is not offered in the diagnosis menu")]
    DiagnosisNotInMenu(String),
}

#[derive(Debug, Clone)]
pub struct CaseCatalog {
    cases: Vec<Case>,
}

impl CaseCatalog {
    /// Builds the built-in chest pain catalog, validated against
    /// [`DIAGNOSIS_MENU`].
    pub fn new() -> Result<Self, CatalogError> {
        Self::from_cases(builtin_cases())
    }

    pub fn from_cases(cases: Vec<Case>) -> Result<Self, CatalogError> {
        if cases.is_empty() {
            return Err(CatalogError::Empty);
        }
        for case in &cases {
            if !DIAGNOSIS_MENU.contains(&case.diagnosis.as_str()) {
                return Err(CatalogError::DiagnosisNotInMenu(case.diagnosis.clone()));
            }
        }
        Ok(Self { cases })
    }

    /// Uniform draw over the whole catalog. Repeated draws may repeat the
    /// same case, that is intentional.
    pub fn draw_index(&self) -> usize {
        rand::thread_rng().gen_range(0..self.cases.len())
    }

    pub fn get_random_case(&self) -> &Case {
        // Empty catalogs are rejected at construction, so the index is valid
        &self.cases[self.draw_index()]
    }

    pub fn case(&self, index: usize) -> &Case {
        &self.cases[index]
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

fn builtin_cases() -> Vec<Case> {
    vec![
        Case {
            diagnosis: "Acute Myocardial Infarction (STEMI)".to_string(),
            age: 58,
            sex: Sex::Male,
            chief_complaint: "Central crushing chest pain radiating to left arm and jaw"
                .to_string(),
            duration: "45 minutes".to_string(),
            associated_symptoms: "Diaphoresis, nausea, shortness of breath".to_string(),
            risk_factors: vec![
                "Hypertension".to_string(),
                "Diabetes".to_string(),
                "Smoking".to_string(),
            ],
            vitals: "BP 90/60 mmHg, HR 110/min, SpO₂ 94%".to_string(),
            ecg_finding: "ST elevation in leads II, III, aVF".to_string(),
            troponin_result: "Markedly elevated".to_string(),
            management: "Immediate MONA, reperfusion therapy (Primary PCI)".to_string(),
        },
        Case {
            diagnosis: "Unstable Angina".to_string(),
            age: 61,
            sex: Sex::Male,
            chief_complaint: "Retrosternal chest tightness occurring at rest".to_string(),
            duration: "20 minutes, recurrent over the last 2 days".to_string(),
            associated_symptoms: "Anxiety, mild breathlessness".to_string(),
            risk_factors: vec![
                "Hypertension".to_string(),
                "Hyperlipidemia".to_string(),
                "Smoking".to_string(),
            ],
            vitals: "BP 150/90 mmHg, HR 92/min, SpO₂ 97%".to_string(),
            ecg_finding: "T wave inversion in V4-V6, no ST elevation".to_string(),
            troponin_result: "Normal".to_string(),
            management: "Dual antiplatelet therapy, anticoagulation, early coronary angiography"
                .to_string(),
        },
        Case {
            diagnosis: "Pulmonary Embolism".to_string(),
            age: 42,
            sex: Sex::Female,
            chief_complaint: "Sharp pleuritic chest pain".to_string(),
            duration: "Sudden onset".to_string(),
            associated_symptoms: "Dyspnea, hemoptysis".to_string(),
            risk_factors: vec![
                "Recent surgery".to_string(),
                "Oral contraceptive use".to_string(),
            ],
            vitals: "BP 110/70 mmHg, HR 120/min, SpO₂ 88%".to_string(),
            ecg_finding: "Sinus tachycardia, S1Q3T3 pattern".to_string(),
            troponin_result: "Mildly elevated".to_string(),
            management: "CTPA, anticoagulation".to_string(),
        },
        Case {
            diagnosis: "Aortic Dissection".to_string(),
            age: 65,
            sex: Sex::Male,
            chief_complaint: "Severe tearing chest pain radiating to back".to_string(),
            duration: "Sudden onset".to_string(),
            associated_symptoms: "Syncope".to_string(),
            risk_factors: vec!["Hypertension".to_string()],
            vitals: "BP difference between arms".to_string(),
            ecg_finding: "Normal".to_string(),
            troponin_result: "Normal".to_string(),
            management: "CT aortogram, urgent surgical consult".to_string(),
        },
        Case {
            diagnosis: "Pericarditis".to_string(),
            age: 29,
            sex: Sex::Male,
            chief_complaint: "Sharp retrosternal pain, worse lying flat, relieved by sitting forward"
                .to_string(),
            duration: "2 days".to_string(),
            associated_symptoms: "Low-grade fever, recent flu-like illness".to_string(),
            risk_factors: vec!["Recent viral infection".to_string()],
            vitals: "BP 120/80 mmHg, HR 98/min, Temp 37.8°C".to_string(),
            ecg_finding: "Widespread saddle-shaped ST elevation, PR depression".to_string(),
            troponin_result: "Normal".to_string(),
            management: "NSAIDs plus colchicine, echocardiogram to rule out effusion".to_string(),
        },
        Case {
            diagnosis: "GERD".to_string(),
            age: 45,
            sex: Sex::Female,
            chief_complaint: "Burning retrosternal pain after meals, worse on lying down"
                .to_string(),
            duration: "Episodic over several weeks".to_string(),
            associated_symptoms: "Acid regurgitation, water brash".to_string(),
            risk_factors: vec!["Obesity".to_string(), "Alcohol use".to_string()],
            vitals: "BP 130/85 mmHg, HR 78/min, SpO₂ 99%".to_string(),
            ecg_finding: "Normal".to_string(),
            troponin_result: "Normal".to_string(),
            management: "Lifestyle modification, trial of a proton pump inhibitor".to_string(),
        },
    ]
}
