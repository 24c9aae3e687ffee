//! Application state: config, random source, in-memory question/session stores
//! and the persistent progress and language stores.
//!
//! Issued questions and sessions live in memory only and are keyed by UUID.
//! Progress and the language tag go through the store traits so tests can swap
//! in `MemoryStore`.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{load_config_from_env, AppConfig};
use crate::domain::{Language, Question};
use crate::generator::{generate_question, RandomSource, RngSource};
use crate::session::QuizSession;
use crate::store::{JsonFileStore, LanguageStore, ProgressStore};

pub type SharedRandom = Box<dyn RandomSource + Send>;

pub struct AppState {
    pub config: AppConfig,
    rng: Mutex<SharedRandom>,
    pub questions: RwLock<HashMap<String, Question>>,
    pub sessions: RwLock<HashMap<String, QuizSession>>,
    pub progress: Arc<dyn ProgressStore>,
    pub language: Arc<dyn LanguageStore>,
}

impl AppState {
    /// Build state from env: load config, open the file stores, seed the rng.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_config_from_env().unwrap_or_default();
        let files = Arc::new(
            JsonFileStore::new(&config.storage.progress_path, &config.storage.language_path)
                .with_default_language(config.game.default_language),
        );
        let rng = seeded_rng(config.game.rng_seed);

        info!(
            target: "fracta_backend",
            progress_path = %config.storage.progress_path,
            language_path = %config.storage.language_path,
            questions_per_level = config.game.questions_per_level,
            seeded = config.game.rng_seed.is_some(),
            "State initialized"
        );

        Self::with_parts(config, files.clone(), files, rng)
    }

    pub fn with_parts(
        config: AppConfig,
        progress: Arc<dyn ProgressStore>,
        language: Arc<dyn LanguageStore>,
        rng: SharedRandom,
    ) -> Self {
        Self {
            config,
            rng: Mutex::new(rng),
            questions: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            progress,
            language,
        }
    }

    /// Draw one question. The rng lock is released before returning.
    pub fn generate(&self, level: u32, lang: Language) -> Question {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        generate_question(level, lang, &mut **rng)
    }

    /// Generate a question and keep it for later answer checks.
    #[instrument(level = "debug", skip(self))]
    pub async fn issue_question(&self, level: u32, lang: Language) -> (String, Question) {
        let q = self.generate(level, lang);
        let id = Uuid::new_v4().to_string();
        self.questions.write().await.insert(id.clone(), q.clone());
        debug!(target: "question", %id, kind = %q.kind, "question stored");
        (id, q)
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_question(&self, id: &str) -> Option<Question> {
        self.questions.read().await.get(id).cloned()
    }

    #[instrument(level = "debug", skip(self, s), fields(id = %s.id))]
    pub async fn insert_session(&self, s: QuizSession) {
        self.sessions.write().await.insert(s.id.clone(), s);
    }

    /// The language used when a request names none: the stored one.
    pub fn current_language(&self) -> Language {
        self.language.load()
    }
}

pub fn seeded_rng(seed: Option<u64>) -> SharedRandom {
    match seed {
        Some(s) => Box::new(RngSource(StdRng::seed_from_u64(s))),
        None => Box::new(RngSource(StdRng::from_entropy())),
    }
}
