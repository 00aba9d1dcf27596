mod sim;

use std::sync::Arc;

use chatgpt::{client::ChatGPT, config::ChatGPTEngine};
use dotenv::dotenv;
use sim::catalog::{Case, CaseCatalog, DIAGNOSIS_MENU};
use sim::tutor::{CaseTutor, Personality};
use sim::{Finding, Session, Verdict};
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup, ParseMode},
};

type CaseDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveFullName,
    ActiveCase {
        session: Session,
    },
    ReceiveDiagnosis {
        session: Session,
    },
}

type SessionStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() {
    dotenv().expect("Failed to load .env file");
    let CHATGPT_API_KEY = std::env::var("CHATGPT_API_KEY").expect("CHATGPT_API_KEY is not set");

    pretty_env_logger::init();
    log::info!("Starting chest pain case simulator bot...");

    let bot = Bot::from_env();

    println!("Establishing connection to the database...");
    let storage: SessionStorage = SqliteStorage::open("db.sqlite", Json)
        .await
        .unwrap()
        .erase();
    println!("Connection established");

    // A bad catalog (empty, or a case whose diagnosis is missing from the
    // answer menu) can never be graded, so refuse to start.
    println!("Building the chest pain case catalog");
    let catalog = Arc::new(CaseCatalog::new().expect("Invalid case catalog"));
    println!("Catalog ready: {} cases", catalog.len());

    let gpt = {
        let mut gpt = ChatGPT::new(CHATGPT_API_KEY).expect("Unable to connect with ChatGPT");

        gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        gpt.config.timeout = std::time::Duration::from_secs(15);

        gpt
    };

    let tutor = Arc::new(CaseTutor::new(gpt, Personality::Consultant));

    let catalog_for_first_case = catalog.clone();
    let catalog_for_intents = catalog.clone();
    let catalog_for_grading = catalog.clone();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveFullName].endpoint(
                move |bot: Bot, dialogue: CaseDialogue, msg: Message| {
                    receive_full_name(catalog_for_first_case.clone(), bot, dialogue, msg)
                },
            ))
            .branch(dptree::case![State::ActiveCase { session }].endpoint(
                move |bot: Bot, dialogue: CaseDialogue, session: Session, msg: Message| {
                    active_case(catalog_for_intents.clone(), bot, dialogue, session, msg)
                },
            ))
            .branch(dptree::case![State::ReceiveDiagnosis { session }].endpoint(
                move |bot: Bot, dialogue: CaseDialogue, session: Session, msg: Message| {
                    receive_diagnosis(
                        catalog_for_grading.clone(),
                        tutor.clone(),
                        bot,
                        dialogue,
                        session,
                        msg,
                    )
                },
            )),
    )
    .dependencies(dptree::deps![storage])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "Hi! I'm the chest pain case simulator, a clinical reasoning trainer for MBBS graduates. Let's get acquainted! What's your name?";
async fn start(bot: Bot, dialogue: CaseDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;

    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

const REVEAL_HISTORY: &str = "📜 Reveal History";
const REVEAL_EXAMINATION: &str = "🩺 Reveal Examination";
const ORDER_INVESTIGATIONS: &str = "🧪 Order Investigations";
const SUBMIT_DIAGNOSIS: &str = "🧠 Submit Diagnosis";
const SHOW_MANAGEMENT: &str = "💊 Show Management";
const NEW_CASE: &str = "🔄 Start New Case";

const NEW_CASE_TEXT: &str =
    "🫀 A patient presents to the emergency department with chest pain. Work the case step by step, or go straight to your diagnosis.";

async fn receive_full_name(
    catalog: Arc<CaseCatalog>,
    bot: Bot,
    dialogue: CaseDialogue,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(full_name) => {
            bot.send_message(msg.chat.id, format!("Good to meet you, Dr. {}!", full_name))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please type your name")
                .await?;
            return Ok(());
        }
    }

    let session = Session::new(&catalog);
    bot.send_message(msg.chat.id, NEW_CASE_TEXT)
        .reply_markup(case_keyboard())
        .await?;

    dialogue.update(State::ActiveCase { session }).await?;
    return Ok(());
}

async fn active_case(
    catalog: Arc<CaseCatalog>,
    bot: Bot,
    dialogue: CaseDialogue,
    mut session: Session,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(REVEAL_HISTORY) => {
            session.reveal(Finding::History);
            let (case, _) = session.snapshot(&catalog);
            bot.send_message(msg.chat.id, history_text(case))
                .parse_mode(ParseMode::Html)
                .reply_markup(case_keyboard())
                .await?;
        }
        Some(REVEAL_EXAMINATION) => {
            session.reveal(Finding::Examination);
            let (case, _) = session.snapshot(&catalog);
            bot.send_message(msg.chat.id, examination_text(case))
                .parse_mode(ParseMode::Html)
                .reply_markup(case_keyboard())
                .await?;
        }
        Some(ORDER_INVESTIGATIONS) => {
            session.reveal(Finding::Investigations);
            let (case, _) = session.snapshot(&catalog);
            bot.send_message(msg.chat.id, investigations_text(case))
                .parse_mode(ParseMode::Html)
                .reply_markup(case_keyboard())
                .await?;
        }
        Some(SHOW_MANAGEMENT) => {
            session.reveal(Finding::Management);
            let (case, _) = session.snapshot(&catalog);
            bot.send_message(msg.chat.id, management_text(case))
                .parse_mode(ParseMode::Html)
                .reply_markup(case_keyboard())
                .await?;
        }
        Some(SUBMIT_DIAGNOSIS) => {
            bot.send_message(msg.chat.id, "🧠 What is the most likely diagnosis?")
                .reply_markup(diagnosis_keyboard())
                .await?;

            dialogue.update(State::ReceiveDiagnosis { session }).await?;
            return Ok(());
        }
        Some(NEW_CASE) => {
            // The whole session value is replaced, nothing carries over
            let session = Session::new(&catalog);
            bot.send_message(msg.chat.id, NEW_CASE_TEXT)
                .reply_markup(case_keyboard())
                .await?;

            dialogue.update(State::ActiveCase { session }).await?;
            return Ok(());
        }
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the options")
                .reply_markup(case_keyboard())
                .await?;
            return Ok(());
        }
    }

    dialogue.update(State::ActiveCase { session }).await?;
    Ok(())
}

async fn receive_diagnosis(
    catalog: Arc<CaseCatalog>,
    tutor: Arc<CaseTutor>,
    bot: Bot,
    dialogue: CaseDialogue,
    mut session: Session,
    msg: Message,
) -> HandlerResult {
    let candidate = match msg.text() {
        Some(text) => text,
        None => {
            bot.send_message(msg.chat.id, "Please choose a diagnosis from the list")
                .reply_markup(diagnosis_keyboard())
                .await?;
            return Ok(());
        }
    };
    if !DIAGNOSIS_MENU.contains(&candidate) {
        bot.send_message(msg.chat.id, "Please choose a diagnosis from the list")
            .reply_markup(diagnosis_keyboard())
            .await?;
        return Ok(());
    }

    match session.submit_diagnosis(&catalog, candidate) {
        Verdict::Correct => {
            bot.send_message(msg.chat.id, "✅ Correct diagnosis!")
                .await?;

            // We don't really care about the result here, so we'll just ignore the error if this action is unsuccessful
            // But it adds to the user's experience if it works!
            let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

            // A failed teaching point is just skipped, the learner already has their verdict
            if let Ok(pearl) = tutor.teaching_point(session.case(&catalog)).await {
                bot.send_message(msg.chat.id, pearl).await?;
            }
        }
        Verdict::Incorrect { correct } => {
            let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

            let explanation = tutor
                .explain_missed_diagnosis(session.case(&catalog), candidate)
                // If the AI fails to generate a reply, we'll just tell the user the correct answer
                // Sometimes it may happen due to timeout or other reasons
                .await
                .unwrap_or(format!(
                    "Go back over the findings with \"{}\" in mind.",
                    correct
                ));

            bot.send_message(
                msg.chat.id,
                format!(
                    "❌ Incorrect. Correct diagnosis: <b>{}</b>\n\n{}",
                    correct, explanation
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
    }

    bot.send_message(msg.chat.id, "Keep working this case or start a new one")
        .reply_markup(case_keyboard())
        .await?;

    dialogue.update(State::ActiveCase { session }).await?;
    Ok(())
}

fn case_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(REVEAL_HISTORY),
            KeyboardButton::new(REVEAL_EXAMINATION),
        ],
        vec![
            KeyboardButton::new(ORDER_INVESTIGATIONS),
            KeyboardButton::new(SUBMIT_DIAGNOSIS),
        ],
        vec![
            KeyboardButton::new(SHOW_MANAGEMENT),
            KeyboardButton::new(NEW_CASE),
        ],
    ])
}

fn diagnosis_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(
        DIAGNOSIS_MENU
            .iter()
            .map(|d| vec![KeyboardButton::new(*d)])
            .collect::<Vec<_>>(),
    )
}

fn history_text(case: &Case) -> String {
    format!(
        "📜 <b>Patient History</b>\n\n<b>Age / Sex:</b> {} / {}\n<b>Chief Complaint:</b> {}\n<b>Duration:</b> {}\n<b>Associated Symptoms:</b> {}\n<b>Risk Factors:</b> {}",
        case.age,
        case.sex,
        case.chief_complaint,
        case.duration,
        case.associated_symptoms,
        case.risk_factors.join(", ")
    )
}

fn examination_text(case: &Case) -> String {
    format!(
        "🩺 <b>Physical Examination</b>\n\n<b>Vital Signs:</b> {}",
        case.vitals
    )
}

fn investigations_text(case: &Case) -> String {
    format!(
        "🧪 <b>Investigations</b>\n\n<b>ECG:</b> {}\n<b>Troponin:</b> {}",
        case.ecg_finding, case.troponin_result
    )
}

fn management_text(case: &Case) -> String {
    format!("💊 <b>Recommended Management</b>\n\n{}", case.management)
}
