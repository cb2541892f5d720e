use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::utils::ChatError;

/// A canonical question and its canned answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// On-disk layout of a FAQ file: a list of `[[faq]]` tables
#[derive(Debug, Deserialize)]
struct FaqFile {
    #[serde(default)]
    faq: Vec<FaqEntry>,
}

/// Read-only mapping from question text to answer text.
///
/// Lookups use exact string equality: no trimming, no case folding.
/// A typed question only takes the fast path if it is byte-for-byte a key.
#[derive(Debug, Clone)]
pub struct FaqRegistry {
    entries: Vec<FaqEntry>,
    index: HashMap<String, usize>,
}

impl FaqRegistry {
    /// Build a registry, keeping definition order. Questions must be unique.
    pub fn new(entries: Vec<FaqEntry>) -> Result<Self, ChatError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.question.clone(), position).is_some() {
                return Err(ChatError::DuplicateFaq(entry.question.clone()));
            }
        }
        Ok(Self { entries, index })
    }

    /// The EMS governance questions shipped with the assistant
    pub fn builtin() -> Self {
        let entries = vec![
            FaqEntry::new(
                "Qual é o código de ética da EMS?",
                "O Código de Ética da EMS estabelece os princípios e valores que devem guiar a conduta de todos os colaboradores, parceiros e fornecedores, visando a integridade, transparência e responsabilidade social. Ele aborda temas como combate à corrupção, conflito de interesses e proteção de informações confidenciais.",
            ),
            FaqEntry::new(
                "Como faço para denunciar uma conduta indevida?",
                "Denúncias de conduta indevida podem ser feitas através do Canal de Denúncias da EMS, disponível no site oficial da empresa ou por telefone. As denúncias podem ser anônimas e são tratadas com confidencialidade para garantir a segurança do denunciante.",
            ),
            FaqEntry::new(
                "Quais são as políticas de compliance da EMS?",
                "As políticas de compliance da EMS englobam diversas diretrizes para assegurar que a empresa atue em conformidade com as leis, regulamentos e padrões éticos. Isso inclui políticas anticorrupção, de privacidade de dados, de concorrência leal e de segurança do trabalho.",
            ),
            FaqEntry::new(
                "Onde posso encontrar o manual de conduta?",
                "O manual de conduta está disponível na intranet da EMS, na seção de 'Documentos Corporativos'. Caso não tenha acesso, entre em contato com o departamento de Recursos Humanos ou Compliance para obter uma cópia.",
            ),
        ];

        // The built-in questions are distinct literals
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.question.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Parse a registry from a TOML document of `[[faq]]` tables
    pub fn from_toml_str(source: &str) -> Result<Self, ChatError> {
        let file: FaqFile =
            toml::from_str(source).map_err(|e| ChatError::FaqSource(e.to_string()))?;
        Self::new(file.faq)
    }

    /// Load a registry from a TOML file on disk
    pub fn from_file(path: &Path) -> Result<Self, ChatError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Exact-match lookup of a question
    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.index
            .get(text)
            .map(|&position| self.entries[position].answer.as_str())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.index.contains_key(text)
    }

    /// All entries in definition order
    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.question.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FaqRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
