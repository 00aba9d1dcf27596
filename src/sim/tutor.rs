use crate::sim::catalog::Case;
use chatgpt::prelude::*;
use chatgpt::types::CompletionResponse;

/// ChatGPT-backed tutor that turns a missed diagnosis into a short teaching
/// moment. Callers must be prepared for it to fail (timeout, API error) and
/// fall back to simply naming the correct diagnosis.
pub struct CaseTutor {
    personality: Personality,
    chat_gpt: ChatGPT,
}

impl CaseTutor {
    pub fn new(chat_gpt: ChatGPT, personality: Personality) -> Self {
        Self {
            personality,
            chat_gpt,
        }
    }

    pub async fn explain_missed_diagnosis(&self, case: &Case, submitted: &str) -> Result<String> {
        println!(
            "Generating feedback for missed diagnosis: {:?}",
            case.diagnosis
        );
        let prompt = format!(
            "You are a chatbot helping MBBS graduates practice clinical reasoning on chest pain cases.
        The learner saw a patient: {} year old {}, complaining of \"{}\" ({}), associated with {}. Vitals: {}. ECG: {}. Troponin: {}.
        The learner answered \"{}\", but the correct diagnosis is \"{}\".
        Explain in 2-3 sentences which findings point away from the learner's answer and toward the correct one. Write it in the voice of {}.",
            case.age,
            case.sex,
            case.chief_complaint,
            case.duration,
            case.associated_symptoms,
            case.vitals,
            case.ecg_finding,
            case.troponin_result,
            submitted,
            case.diagnosis,
            self.personality.get_personality()
        );

        let response: CompletionResponse = self.chat_gpt.send_message(&prompt).await?;
        let content = response.message().clone().content;

        println!("Completion: {:?}", content);

        Ok(content)
    }

    pub async fn teaching_point(&self, case: &Case) -> Result<String> {
        println!("Generating teaching point for: {:?}", case.diagnosis);
        let prompt = format!(
            "You are a chatbot helping MBBS graduates practice clinical reasoning on chest pain cases.
        The learner just correctly diagnosed \"{}\" in a {} year old {} presenting with \"{}\".
        Give one memorable clinical pearl about this diagnosis, at most 2 sentences. Write it in the voice of {}.",
            case.diagnosis,
            case.age,
            case.sex,
            case.chief_complaint,
            self.personality.get_personality()
        );

        let response: CompletionResponse = self.chat_gpt.send_message(&prompt).await?;
        let content = response.message().clone().content;

        println!("Completion: {:?}", content);

        Ok(content)
    }
}

pub enum Personality {
    Consultant,
    Examiner,
    Registrar,
}

impl Personality {
    pub fn get_personality(&self) -> String {
        match self {
            Personality::Consultant => "a calm senior cardiology consultant on a ward round",
            Personality::Examiner => "a strict but fair MBBS final examiner",
            Personality::Registrar => "a friendly medical registrar teaching between admissions",
        }
        .to_string()
    }
}
