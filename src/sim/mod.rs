pub mod catalog;
pub mod tutor;

use catalog::CaseCatalog;

/// The four information groups a session can disclose to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Finding {
    History,
    Examination,
    Investigations,
    Management,
}

/// Which findings of the active case are currently visible. All flags start
/// false and only ever move to true; there is no way to hide a finding again
/// short of starting a new session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Disclosure {
    history: bool,
    examination: bool,
    investigations: bool,
    management: bool,
}

impl Disclosure {
    /// Revealing an already-revealed finding is a no-op. No finding requires
    /// any other to be revealed first.
    pub fn reveal(&mut self, finding: Finding) {
        match finding {
            Finding::History => self.history = true,
            Finding::Examination => self.examination = true,
            Finding::Investigations => self.investigations = true,
            Finding::Management => self.management = true,
        }
    }

    pub fn is_revealed(&self, finding: Finding) -> bool {
        match finding {
            Finding::History => self.history,
            Finding::Examination => self.examination,
            Finding::Investigations => self.investigations,
            Finding::Management => self.management,
        }
    }
}

/// Outcome of grading a submitted diagnosis. On a miss the true label is
/// carried along so the caller can show it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect { correct: String },
}

/// Exact string comparison, case-sensitive, no normalization. "NSTEMI" and
/// "Non-ST Elevation Myocardial Infarction (NSTEMI)" are different answers;
/// the catalog and the menu are authored to use identical labels.
pub fn grade(candidate: &str, true_diagnosis: &str) -> Verdict {
    if candidate == true_diagnosis {
        Verdict::Correct
    } else {
        Verdict::Incorrect {
            correct: true_diagnosis.to_string(),
        }
    }
}

/// One quiz attempt: one active case paired with its disclosure state.
///
/// The session stores the catalog index of its case rather than the case
/// itself, since dialogue state has to be serializable and the catalog keeps
/// ownership of the `Case` values. Starting a new case means replacing the
/// whole `Session` value; nothing is carried over.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    case_index: usize,
    disclosure: Disclosure,
    submitted_diagnosis: Option<String>,
}

impl Session {
    /// Draws a fresh case uniformly at random. All disclosure flags start
    /// false and no diagnosis is recorded.
    pub fn new(catalog: &CaseCatalog) -> Self {
        Self {
            case_index: catalog.draw_index(),
            disclosure: Disclosure::default(),
            submitted_diagnosis: None,
        }
    }

    pub fn case<'a>(&self, catalog: &'a CaseCatalog) -> &'a catalog::Case {
        catalog.case(self.case_index)
    }

    pub fn reveal(&mut self, finding: Finding) {
        self.disclosure.reveal(finding);
    }

    pub fn is_revealed(&self, finding: Finding) -> bool {
        self.disclosure.is_revealed(finding)
    }

    /// Records the candidate (overwriting any earlier submission for this
    /// case) and grades it. Does not reveal management; that is a separate
    /// intent.
    pub fn submit_diagnosis(&mut self, catalog: &CaseCatalog, candidate: &str) -> Verdict {
        self.submitted_diagnosis = Some(candidate.to_string());
        grade(candidate, &self.case(catalog).diagnosis)
    }

    pub fn submitted_diagnosis(&self) -> Option<&str> {
        self.submitted_diagnosis.as_deref()
    }

    /// Read-only view for rendering. The presentation layer never gets a
    /// mutable handle on the internals.
    pub fn snapshot<'a>(&'a self, catalog: &'a CaseCatalog) -> (&'a catalog::Case, &'a Disclosure) {
        (self.case(catalog), &self.disclosure)
    }
}

#[cfg(test)]
mod tests {
    use super::catalog::{Case, CaseCatalog, Sex};
    use super::*;

    fn single_case_catalog(diagnosis: &str) -> CaseCatalog {
        CaseCatalog::from_cases(vec![Case {
            diagnosis: diagnosis.to_string(),
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
        }])
        .unwrap()
    }

    const ALL_FINDINGS: [Finding; 4] = [
        Finding::History,
        Finding::Examination,
        Finding::Investigations,
        Finding::Management,
    ];

    #[test]
    fn fresh_session_has_nothing_revealed() {
        let catalog = CaseCatalog::new().unwrap();
        let session = Session::new(&catalog);
        for finding in ALL_FINDINGS {
            assert!(!session.is_revealed(finding));
        }
        assert_eq!(session.submitted_diagnosis(), None);
    }

    #[test]
    fn reveal_is_idempotent() {
        let catalog = CaseCatalog::new().unwrap();
        let mut once = Session::new(&catalog);
        once.reveal(Finding::History);
        let mut twice = once.clone();
        twice.reveal(Finding::History);
        assert_eq!(once.snapshot(&catalog).1, twice.snapshot(&catalog).1);
    }

    #[test]
    fn revealing_one_finding_leaves_the_others_alone() {
        let catalog = CaseCatalog::new().unwrap();
        for revealed in ALL_FINDINGS {
            let mut session = Session::new(&catalog);
            session.reveal(revealed);
            for other in ALL_FINDINGS {
                assert_eq!(session.is_revealed(other), other == revealed);
            }
        }
    }

    #[test]
    fn examination_can_be_revealed_before_history() {
        let catalog = CaseCatalog::new().unwrap();
        let mut session = Session::new(&catalog);
        session.reveal(Finding::Examination);
        assert!(session.is_revealed(Finding::Examination));
        assert!(!session.is_revealed(Finding::History));
    }

    #[test]
    fn grade_requires_an_exact_match() {
        assert_eq!(grade("Aortic Dissection", "Aortic Dissection"), Verdict::Correct);
        // Case differences and substrings are misses
        assert_ne!(grade("aortic dissection", "Aortic Dissection"), Verdict::Correct);
        assert_ne!(grade("Aortic", "Aortic Dissection"), Verdict::Correct);
        assert_eq!(
            grade("GERD", "Aortic Dissection"),
            Verdict::Incorrect {
                correct: "Aortic Dissection".to_string()
            }
        );
    }

    #[test]
    fn submitting_grades_against_the_active_case() {
        let catalog = single_case_catalog("Aortic Dissection");
        let mut session = Session::new(&catalog);
        assert_eq!(
            session.submit_diagnosis(&catalog, "Aortic Dissection"),
            Verdict::Correct
        );
        assert_eq!(
            session.submit_diagnosis(&catalog, "GERD"),
            Verdict::Incorrect {
                correct: "Aortic Dissection".to_string()
            }
        );
    }

    #[test]
    fn resubmitting_the_same_answer_gives_the_same_verdict() {
        let catalog = single_case_catalog("Pericarditis");
        let mut session = Session::new(&catalog);
        let first = session.submit_diagnosis(&catalog, "GERD");
        let second = session.submit_diagnosis(&catalog, "GERD");
        assert_eq!(first, second);
    }

    #[test]
    fn only_the_latest_submission_is_kept() {
        let catalog = single_case_catalog("Pulmonary Embolism");
        let mut session = Session::new(&catalog);
        session.submit_diagnosis(&catalog, "GERD");
        session.submit_diagnosis(&catalog, "Pulmonary Embolism");
        assert_eq!(session.submitted_diagnosis(), Some("Pulmonary Embolism"));
    }

    #[test]
    fn submitting_does_not_reveal_management() {
        let catalog = single_case_catalog("GERD");
        let mut session = Session::new(&catalog);
        session.submit_diagnosis(&catalog, "GERD");
        assert!(!session.is_revealed(Finding::Management));
    }

    #[test]
    fn a_new_session_discards_all_prior_state() {
        let catalog = CaseCatalog::new().unwrap();
        let mut session = Session::new(&catalog);
        session.reveal(Finding::Investigations);
        session.submit_diagnosis(&catalog, "GERD");
        assert!(session.is_revealed(Finding::Investigations));

        let session = Session::new(&catalog);
        for finding in ALL_FINDINGS {
            assert!(!session.is_revealed(finding));
        }
        assert_eq!(session.submitted_diagnosis(), None);
    }

    #[test]
    fn ordering_investigations_reveals_them_until_reset() {
        let catalog = CaseCatalog::new().unwrap();
        let mut session = Session::new(&catalog);
        assert!(!session.is_revealed(Finding::Investigations));
        session.reveal(Finding::Investigations);
        assert!(session.is_revealed(Finding::Investigations));

        let session = Session::new(&catalog);
        assert!(!session.is_revealed(Finding::Investigations));
    }

    #[test]
    fn snapshot_exposes_the_drawn_case() {
        let catalog = single_case_catalog("Unstable Angina");
        let session = Session::new(&catalog);
        let (case, disclosure) = session.snapshot(&catalog);
        assert_eq!(case.diagnosis, "Unstable Angina");
        assert_eq!(*disclosure, Disclosure::default());
    }
}
