//! Централизованная конфигурация для MailSeal Core
//!
//! Only operational limits live here. Protocol constants (cipher, key size,
//! digest, subject tags, attachment suffixes) are fixed and cannot be tuned.

use std::sync::OnceLock;

/// Глобальная конфигурация приложения (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // ============================================
    // ВЛОЖЕНИЯ
    // ============================================

    /// Maximum number of user attachments per envelope
    pub max_attachments: usize,

    /// Maximum size of a single attachment (в байтах)
    pub max_attachment_size: usize,

    // ============================================
    // ВАЛИДАЦИЯ
    // ============================================

    /// Maximum subject length before protocol tags are appended
    pub max_subject_length: usize,

    /// Maximum length of the part of an address before `@`
    pub email_local_part_max_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_attachments: 32,
            max_attachment_size: 25 * 1024 * 1024,
            max_subject_length: 100,
            email_local_part_max_length: 40,
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` yields for each `MAILSEAL_*`
    /// name. Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let parsed = |name: &str| lookup(name).and_then(|val| val.trim().parse::<usize>().ok());

        if let Some(value) = parsed("MAILSEAL_MAX_ATTACHMENTS") {
            config.max_attachments = value;
        }

        if let Some(value) = parsed("MAILSEAL_MAX_ATTACHMENT_SIZE") {
            config.max_attachment_size = value;
        }

        if let Some(value) = parsed("MAILSEAL_MAX_SUBJECT_LENGTH") {
            config.max_subject_length = value;
        }

        if let Some(value) = parsed("MAILSEAL_EMAIL_LOCAL_PART_MAX_LENGTH") {
            config.email_local_part_max_length = value;
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Falls back to defaults if nothing was initialised.
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init() -> Result<(), &'static str> {
        Self::init_with(Self::default())
    }

    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_from_env() -> Result<(), &'static str> {
        Self::init_with(Self::from_env())
    }

    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| "Config already initialized")
    }

    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }
}
